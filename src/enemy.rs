//! Enemy behaviour: pursuit, wandering, special abilities and damage.
//!
//! An [`Enemy`] is driven once per frame by its owner through
//! [`Enemy::update`]. Everything that changes over time (dash, drain and
//! glitch states, the hit flash) is advanced by the `dt` handed to that
//! call, so a simulation replayed with the same inputs and RNG seed lands
//! in the same place.

use glam::Vec2;
use log::{debug, trace};
use rand::Rng;

use crate::entities::{Behavior, DashState, DrainState, Enemy, EnemyKind, GlitchState};
use crate::steering;
use crate::world::{ArenaView, Target};

// ── Ability tunables ─────────────────────────────────────────────────────────

/// Bit bug speed while dashing.
pub const DASH_SPEED: f32 = 350.0;
/// Seconds between dashes.
pub const DASH_COOLDOWN: f32 = 2.0;
/// A dash only starts when the player is strictly closer than this.
pub const DASH_TRIGGER_RANGE: f32 = 150.0;
pub const DASH_DURATION: f32 = 0.4;

/// Memory leeches drain while the player is within this range (inclusive).
pub const DRAIN_RANGE: f32 = 120.0;
/// Seconds of dash cooldown added per second in range.
pub const DRAIN_RATE: f32 = 0.3;
/// Overclock charge drains this many times faster than the dash cooldown grows.
pub const OVERCLOCK_DRAIN_FACTOR: f32 = 10.0;

/// Syntax breakers glitch the player within this range (inclusive).
pub const GLITCH_RANGE: f32 = 100.0;
pub const GLITCH_COOLDOWN: f32 = 2.5;
pub const GLITCH_DURATION: f32 = 1.0;

// ── Movement tunables ────────────────────────────────────────────────────────

pub const FLASH_DURATION: f32 = 0.1;
/// Pursuers stop this far outside an available safe zone.
pub const SAFE_ZONE_STANDOFF: f32 = 20.0;
/// Extra clearance kept between an enemy's edge and the safe-zone border.
pub const SAFE_ZONE_BUFFER: f32 = 5.0;
/// A wander point counts as reached inside this distance.
pub const WANDER_ARRIVAL: f32 = 30.0;
/// Wander points keep at least this far from the walls.
pub const WANDER_MARGIN: f32 = 50.0;
const WANDER_ATTEMPTS: u32 = 10;
const WANDER_SPEED_FACTOR: f32 = 0.5;
const WANDER_AVOIDANCE_FACTOR: f32 = 0.5;

/// Slack for float timers accumulated from many small `dt` steps.
const TIMER_EPSILON: f32 = 1e-4;

impl Behavior {
    pub fn for_kind(kind: EnemyKind) -> Behavior {
        match kind {
            EnemyKind::Bitbug => Behavior::Dash(DashState::default()),
            EnemyKind::MemoryLeech => Behavior::Drain(DrainState::default()),
            EnemyKind::SyntaxBreaker => Behavior::Glitch(GlitchState::default()),
            EnemyKind::Datawisp | EnemyKind::Generic => Behavior::Pursue,
        }
    }
}

impl Enemy {
    pub fn new(x: f32, y: f32, kind: EnemyKind) -> Enemy {
        let profile = kind.profile();
        let pos = Vec2::new(x, y);
        Enemy {
            kind,
            pos,
            velocity: Vec2::ZERO,
            target: pos,
            radius: profile.radius,
            speed: profile.speed,
            health: profile.health,
            max_health: profile.health,
            points: profile.points,
            active: true,
            is_flashing: false,
            flash_timer: 0.0,
            aimless_target: None,
            behavior: Behavior::for_kind(kind),
        }
    }

    /// Build from a string tag; unknown tags get the generic profile.
    pub fn from_tag(x: f32, y: f32, tag: &str) -> Enemy {
        Enemy::new(x, y, EnemyKind::from_tag(tag))
    }

    pub fn is_dashing(&self) -> bool {
        matches!(&self.behavior, Behavior::Dash(dash) if dash.is_dashing)
    }

    pub fn is_draining(&self) -> bool {
        matches!(&self.behavior, Behavior::Drain(drain) if drain.is_draining)
    }

    pub fn is_glitching(&self) -> bool {
        matches!(&self.behavior, Behavior::Glitch(glitch) if glitch.is_glitching)
    }

    /// Animation clock for leeches and syntax breakers; 0 for everyone else.
    pub fn pulse_timer(&self) -> f32 {
        match &self.behavior {
            Behavior::Drain(drain) => drain.pulse_timer,
            Behavior::Glitch(glitch) => glitch.pulse_timer,
            _ => 0.0,
        }
    }

    /// Speed used while pursuing: the dash speed mid-dash, base speed otherwise.
    pub fn pursuit_speed(&self) -> f32 {
        if self.is_dashing() {
            DASH_SPEED
        } else {
            self.speed
        }
    }

    pub fn health_fraction(&self) -> f32 {
        (self.health / self.max_health).clamp(0.0, 1.0)
    }

    // ── Per-frame update ────────────────────────────────────────────────────

    /// Advance this enemy by `dt` seconds.
    ///
    /// `siblings` must yield every other enemy the owner holds, in collection
    /// order, and never this one. `arena` may be `None` for unconstrained
    /// movement. Only the player's drainable fields and glitch hook are touched.
    pub fn update<'a, P, A, I, R>(
        &mut self,
        dt: f32,
        player: &mut P,
        arena: Option<&A>,
        siblings: I,
        rng: &mut R,
    ) where
        P: Target + ?Sized,
        A: ArenaView + ?Sized,
        I: IntoIterator<Item = &'a Enemy>,
        R: Rng,
    {
        if !self.active {
            return;
        }

        self.update_behavior(dt, player);

        let (speed, avoidance_scale) = match arena {
            Some(arena) if arena.is_safe_zone_active() => {
                self.target = self.wander_target(arena, rng);
                (self.speed * WANDER_SPEED_FACTOR, WANDER_AVOIDANCE_FACTOR)
            }
            _ => {
                self.target = pursuit_target(player.position(), arena);
                (self.pursuit_speed(), 1.0)
            }
        };

        self.velocity = match steering::seek(self.pos, self.target, speed) {
            Some(heading) => {
                heading + steering::avoidance(self.pos, self.radius, siblings) * avoidance_scale
            }
            None => Vec2::ZERO,
        };

        let mut next = self.pos + self.velocity * dt;
        if let Some(arena) = arena {
            let status = arena.safe_zone_status();
            if status.in_safe_zone && status.available {
                let keep_out = arena.safe_zone_radius() + self.radius + SAFE_ZONE_BUFFER;
                next = steering::exclude_from_safe_zone(next, arena.center(), keep_out);
            }
            next = steering::clamp_to_arena(next, self.radius, arena);
        }
        self.pos = next;

        if self.is_flashing {
            self.flash_timer -= dt;
            if self.flash_timer <= 0.0 {
                self.is_flashing = false;
            }
        }
    }

    /// Advance the kind-specific ability state machine.
    fn update_behavior<P: Target + ?Sized>(&mut self, dt: f32, player: &mut P) {
        let distance = self.pos.distance(player.position());
        let kind = self.kind;

        match &mut self.behavior {
            Behavior::Pursue => {}
            Behavior::Dash(dash) => {
                dash.aggression_timer += dt;

                if dash.is_dashing {
                    dash.dash_remaining -= dt;
                    if dash.dash_remaining <= TIMER_EPSILON {
                        dash.is_dashing = false;
                        dash.dash_remaining = 0.0;
                        trace!("{} dash ended", kind.tag());
                    }
                }

                if !dash.is_dashing
                    && dash.aggression_timer + TIMER_EPSILON >= DASH_COOLDOWN
                    && distance < DASH_TRIGGER_RANGE
                {
                    dash.is_dashing = true;
                    dash.aggression_timer = 0.0;
                    dash.dash_remaining = DASH_DURATION;
                    trace!("{} dashing at distance {distance:.1}", kind.tag());
                }
            }
            Behavior::Drain(drain) => {
                drain.pulse_timer += dt;

                if distance <= DRAIN_RANGE {
                    if !drain.is_draining {
                        trace!("{} started draining", kind.tag());
                    }
                    drain.is_draining = true;

                    let fields = player.drainable();
                    if *fields.dash_cooldown_timer > 0.0 {
                        *fields.dash_cooldown_timer += DRAIN_RATE * dt;
                    }
                    if *fields.overclock_charge > 0.0 {
                        *fields.overclock_charge = (*fields.overclock_charge
                            - DRAIN_RATE * dt * OVERCLOCK_DRAIN_FACTOR)
                            .max(0.0);
                    }
                } else {
                    drain.is_draining = false;
                }
            }
            Behavior::Glitch(glitch) => {
                glitch.glitch_timer += dt;
                glitch.pulse_timer += dt;

                if glitch.is_glitching {
                    glitch.glitch_remaining -= dt;
                    if glitch.glitch_remaining <= TIMER_EPSILON {
                        glitch.is_glitching = false;
                        glitch.glitch_remaining = 0.0;
                    }
                }

                if !glitch.is_glitching
                    && glitch.glitch_timer + TIMER_EPSILON >= GLITCH_COOLDOWN
                    && distance <= GLITCH_RANGE
                {
                    glitch.is_glitching = true;
                    glitch.glitch_timer = 0.0;
                    glitch.glitch_remaining = GLITCH_DURATION;
                    debug!("{} glitch pulse at distance {distance:.1}", kind.tag());

                    if let Some(target) = player.glitchable() {
                        target.apply_glitch_effect(GLITCH_DURATION);
                    }
                }
            }
        }
    }

    /// Current wander point, rolling a new one once reached.
    fn wander_target<A, R>(&mut self, arena: &A, rng: &mut R) -> Vec2
    where
        A: ArenaView + ?Sized,
        R: Rng,
    {
        match self.aimless_target {
            Some(point) if self.pos.distance(point) >= WANDER_ARRIVAL => point,
            _ => {
                let point = random_wander_point(arena, rng);
                self.aimless_target = Some(point);
                point
            }
        }
    }

    // ── Damage & collision ──────────────────────────────────────────────────

    /// Apply `damage` and return the points earned (non-zero only on the killing blow).
    ///
    /// The owner must stop calling this once the enemy is inactive; a dead
    /// enemy hit again would pay out its points a second time.
    pub fn take_damage(&mut self, damage: f32) -> u32 {
        self.health -= damage;
        self.is_flashing = true;
        self.flash_timer = FLASH_DURATION;

        if self.health <= 0.0 {
            self.active = false;
            debug!("{} destroyed at ({:.0}, {:.0})", self.kind.tag(), self.pos.x, self.pos.y);
            return self.points;
        }
        0
    }

    /// Circle-circle overlap test (touching counts).
    pub fn check_collision(&self, point: Vec2, radius: f32) -> bool {
        self.pos.distance(point) <= self.radius + radius
    }

    /// Point-in-circle test, e.g. for a bullet without a radius.
    pub fn check_point(&self, point: Vec2) -> bool {
        self.check_collision(point, 0.0)
    }

    pub fn check_player_collision<P: Target + ?Sized>(&self, player: &P) -> bool {
        self.check_collision(player.position(), player.radius())
    }
}

/// Where a pursuer heads: the player, or the rim of an available safe zone
/// the player is hiding in.
fn pursuit_target<A: ArenaView + ?Sized>(player: Vec2, arena: Option<&A>) -> Vec2 {
    let Some(arena) = arena else {
        return player;
    };
    if arena.is_in_safe_zone(player) && arena.safe_zone_status().available {
        let center = arena.center();
        let offset = player - center;
        let distance = offset.length();
        if distance > 0.0 {
            return center + offset / distance * (arena.safe_zone_radius() + SAFE_ZONE_STANDOFF);
        }
    }
    player
}

/// Random point inside the walls, re-rolled a few times if it lands in an
/// occupied, available safe zone.
fn random_wander_point<A, R>(arena: &A, rng: &mut R) -> Vec2
where
    A: ArenaView + ?Sized,
    R: Rng,
{
    let inset = arena.border_thickness() + WANDER_MARGIN;
    let span_x = arena.width() - 2.0 * inset;
    let span_y = arena.height() - 2.0 * inset;
    let status = arena.safe_zone_status();
    let avoid_zone = status.in_safe_zone && status.available;

    let mut point = Vec2::ZERO;
    for _ in 0..WANDER_ATTEMPTS {
        point = Vec2::new(
            inset + rng.gen::<f32>() * span_x,
            inset + rng.gen::<f32>() * span_y,
        );
        if !(avoid_zone && arena.is_in_safe_zone(point)) {
            break;
        }
    }
    point
}
