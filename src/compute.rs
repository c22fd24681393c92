/// Pure game-logic functions.
///
/// Every public function takes an immutable reference to the current
/// `GameState` (and, where needed, an RNG handle) and returns a brand-new
/// `GameState`.  Side effects are limited to the injected RNG.

use glam::Vec2;
use log::info;
use rand::Rng;

use crate::config::{BORDER_THICKNESS, SAFE_ZONE_RADIUS};
use crate::entities::{Arena, Enemy, EnemyKind, GameState, GameStatus, Level, Player};
use crate::steering;
use crate::world::{ArenaView, Target};

// ── Player tunables ──────────────────────────────────────────────────────────

pub const PLAYER_RADIUS: f32 = 12.0;
pub const PLAYER_SPEED: f32 = 220.0;
pub const PLAYER_MAX_HEALTH: f32 = 100.0;
/// Distance covered by one dash.
pub const PLAYER_DASH_DISTANCE: f32 = 120.0;
/// Seconds between player dashes.
pub const PLAYER_DASH_COOLDOWN: f32 = 1.5;
pub const OVERCLOCK_MAX: f32 = 100.0;
/// Overclock charge regained per second.
pub const OVERCLOCK_REGEN: f32 = 5.0;
pub const PULSE_RADIUS: f32 = 60.0;
pub const PULSE_DAMAGE: f32 = 15.0;
pub const OVERCLOCK_RADIUS: f32 = 200.0;
pub const OVERCLOCK_DAMAGE: f32 = 60.0;
/// Health lost when an enemy touches the player.
pub const CONTACT_DAMAGE: f32 = 10.0;
/// Seconds of invulnerability after a contact hit.
pub const CONTACT_GRACE: f32 = 0.5;

// ── Safe-zone tunables ───────────────────────────────────────────────────────

/// Seconds of protection per visit before the zone closes.
pub const SAFE_ZONE_MAX_PROTECTION: f32 = 4.0;
pub const SAFE_ZONE_COOLDOWN: f32 = 10.0;

/// New enemies never appear closer than this to the player.
pub const SPAWN_MIN_DISTANCE: f32 = 200.0;
const SPAWN_ATTEMPTS: u32 = 10;

// ── Difficulty tables ────────────────────────────────────────────────────────

/// Enemies spawned for `wave` (1-based) at `level`.
pub fn wave_composition(level: &Level, wave: u32) -> Vec<(EnemyKind, u32)> {
    let table = match level {
        Level::Easy => [
            (EnemyKind::Datawisp, 2 + wave),
            (EnemyKind::Bitbug, wave / 2),
            (EnemyKind::MemoryLeech, u32::from(wave >= 3)),
            (EnemyKind::SyntaxBreaker, u32::from(wave >= 4)),
        ],
        Level::Medium => [
            (EnemyKind::Datawisp, 2 + wave),
            (EnemyKind::Bitbug, 1 + wave / 2),
            (EnemyKind::MemoryLeech, wave / 2),
            (EnemyKind::SyntaxBreaker, wave / 3),
        ],
        Level::Hard => [
            (EnemyKind::Datawisp, 3 + wave),
            (EnemyKind::Bitbug, 2 + wave),
            (EnemyKind::MemoryLeech, 1 + wave / 2),
            (EnemyKind::SyntaxBreaker, 1 + wave / 2),
        ],
    };
    table.into_iter().filter(|(_, n)| *n > 0).collect()
}

// ── Constructors ─────────────────────────────────────────────────────────────

pub fn new_arena(width: f32, height: f32) -> Arena {
    Arena {
        width,
        height,
        border_thickness: BORDER_THICKNESS,
        safe_zone_radius: SAFE_ZONE_RADIUS,
        player_in_safe_zone: false,
        protection_elapsed: 0.0,
        cooldown_remaining: 0.0,
    }
}

/// Build the initial game state for a given level and arena size.
/// No enemies exist until the first `tick` (or an explicit `spawn_wave`).
pub fn init_state(level: Level, width: f32, height: f32, high_score: u32) -> GameState {
    GameState {
        player: Player {
            // Below the safe zone so the first wave is not instantly pacified.
            pos: Vec2::new(width / 2.0, height * 0.75),
            radius: PLAYER_RADIUS,
            health: PLAYER_MAX_HEALTH,
            dash_cooldown_timer: 0.0,
            overclock_charge: 0.0,
            glitch_timer: 0.0,
            invulnerable_timer: 0.0,
        },
        arena: new_arena(width, height),
        enemies: Vec::new(),
        wave_override: None,
        score: 0,
        high_score,
        kills: 0,
        wave: 0,
        level,
        status: GameStatus::Playing,
        elapsed: 0.0,
        frame: 0,
    }
}

/// Start the next wave, placing each enemy on a random wall.
pub fn spawn_wave(state: &GameState, rng: &mut impl Rng) -> GameState {
    let wave = state.wave + 1;
    let composition = state
        .wave_override
        .clone()
        .unwrap_or_else(|| wave_composition(&state.level, wave));

    let mut enemies = state.enemies.clone();
    for (kind, count) in &composition {
        for _ in 0..*count {
            let pos = spawn_point(&state.arena, state.player.pos, kind.profile().radius, rng);
            enemies.push(Enemy::new(pos.x, pos.y, *kind));
        }
    }
    info!(
        "wave {wave} spawned {} enemies",
        enemies.len() - state.enemies.len()
    );

    GameState {
        enemies,
        wave,
        ..state.clone()
    }
}

/// A random point just inside one of the four walls, preferably far from the player.
fn spawn_point(arena: &Arena, player: Vec2, radius: f32, rng: &mut impl Rng) -> Vec2 {
    let inset = arena.border_thickness + radius + 10.0;
    let mut point = Vec2::new(inset, inset);
    for _ in 0..SPAWN_ATTEMPTS {
        let along_x = inset + rng.gen::<f32>() * (arena.width - 2.0 * inset);
        let along_y = inset + rng.gen::<f32>() * (arena.height - 2.0 * inset);
        point = match rng.gen_range(0..4) {
            0 => Vec2::new(along_x, inset),
            1 => Vec2::new(along_x, arena.height - inset),
            2 => Vec2::new(inset, along_y),
            _ => Vec2::new(arena.width - inset, along_y),
        };
        if point.distance(player) >= SPAWN_MIN_DISTANCE {
            break;
        }
    }
    point
}

// ── Input-driven state transitions (pure) ───────────────────────────────────

/// Move the player along `dir` for `dt` seconds. Controls are inverted
/// while glitched.
pub fn move_player(state: &GameState, dir: Vec2, dt: f32) -> GameState {
    let dir = if state.player.glitch_timer > 0.0 { -dir } else { dir };
    let step = dir.normalize_or_zero() * PLAYER_SPEED * dt;
    let pos = steering::clamp_to_arena(state.player.pos + step, state.player.radius, &state.arena);
    GameState {
        player: Player {
            pos,
            ..state.player.clone()
        },
        ..state.clone()
    }
}

/// Blink `PLAYER_DASH_DISTANCE` along `dir` if the dash is off cooldown.
pub fn player_dash(state: &GameState, dir: Vec2) -> GameState {
    let dir = if state.player.glitch_timer > 0.0 { -dir } else { dir };
    if state.player.dash_cooldown_timer > 0.0 || dir.length_squared() == 0.0 {
        return state.clone();
    }
    let target = state.player.pos + dir.normalize() * PLAYER_DASH_DISTANCE;
    GameState {
        player: Player {
            pos: steering::clamp_to_arena(target, state.player.radius, &state.arena),
            dash_cooldown_timer: PLAYER_DASH_COOLDOWN,
            ..state.player.clone()
        },
        ..state.clone()
    }
}

/// Short-range shockwave around the player.
pub fn player_pulse(state: &GameState) -> GameState {
    strike(state, PULSE_RADIUS, PULSE_DAMAGE)
}

/// Spend a full overclock charge on a large shockwave. No-op until charged.
pub fn player_overclock(state: &GameState) -> GameState {
    if state.player.overclock_charge < OVERCLOCK_MAX {
        return state.clone();
    }
    let mut next = strike(state, OVERCLOCK_RADIUS, OVERCLOCK_DAMAGE);
    next.player.overclock_charge = 0.0;
    next
}

/// Damage every live enemy whose body overlaps a circle around the player.
fn strike(state: &GameState, radius: f32, damage: f32) -> GameState {
    let mut next = state.clone();
    let origin = next.player.pos;
    for enemy in next.enemies.iter_mut().filter(|e| e.active) {
        if enemy.check_collision(origin, radius) {
            let points = enemy.take_damage(damage);
            if !enemy.active {
                next.score += points;
                next.kills += 1;
            }
        }
    }
    next.high_score = next.high_score.max(next.score);
    next
}

// ── Per-frame tick (RNG is injected) ─────────────────────────────────────────

/// Advance every enemy once, in collection order.
///
/// Each enemy sees all the others (already-moved ones at their new
/// positions) for avoidance, but never itself.
pub fn step_enemies<P, A, R>(
    enemies: &mut [Enemy],
    player: &mut P,
    arena: Option<&A>,
    dt: f32,
    rng: &mut R,
) where
    P: Target + ?Sized,
    A: ArenaView + ?Sized,
    R: Rng,
{
    for i in 0..enemies.len() {
        let (before, rest) = enemies.split_at_mut(i);
        let Some((current, after)) = rest.split_first_mut() else {
            break;
        };
        current.update(dt, player, arena, before.iter().chain(after.iter()), rng);
    }
}

/// Track the player's visit to the safe zone and run its cooldown.
pub fn update_safe_zone(arena: &Arena, player: Vec2, dt: f32) -> Arena {
    let mut next = arena.clone();
    next.cooldown_remaining = (next.cooldown_remaining - dt).max(0.0);
    next.player_in_safe_zone = next.is_in_safe_zone(player);

    if !next.player_in_safe_zone {
        next.protection_elapsed = 0.0;
    } else if next.safe_zone_status().available {
        next.protection_elapsed += dt;
        if next.protection_elapsed >= SAFE_ZONE_MAX_PROTECTION {
            next.protection_elapsed = 0.0;
            next.cooldown_remaining = SAFE_ZONE_COOLDOWN;
            info!("safe zone closed for {SAFE_ZONE_COOLDOWN}s");
        }
    }
    next
}

fn tick_player_timers(player: &Player, dt: f32) -> Player {
    Player {
        dash_cooldown_timer: (player.dash_cooldown_timer - dt).max(0.0),
        glitch_timer: (player.glitch_timer - dt).max(0.0),
        invulnerable_timer: (player.invulnerable_timer - dt).max(0.0),
        overclock_charge: (player.overclock_charge + OVERCLOCK_REGEN * dt).min(OVERCLOCK_MAX),
        ..player.clone()
    }
}

/// Advance the simulation by `dt` seconds.  All randomness comes through `rng`
/// so callers control determinism (useful for tests with a seeded RNG).
pub fn tick(state: &GameState, dt: f32, rng: &mut impl Rng) -> GameState {
    if state.status != GameStatus::Playing {
        return state.clone();
    }

    let mut next = state.clone();
    next.frame += 1;
    next.elapsed += dt;

    // ── 1. Arena & player timers ─────────────────────────────────────────────
    next.arena = update_safe_zone(&next.arena, next.player.pos, dt);
    next.player = tick_player_timers(&next.player, dt);

    // ── 2. Enemies ───────────────────────────────────────────────────────────
    step_enemies(&mut next.enemies, &mut next.player, Some(&next.arena), dt, rng);

    // ── 3. Contact damage ────────────────────────────────────────────────────
    let shielded = next.arena.is_safe_zone_active();
    if !shielded && next.player.invulnerable_timer <= 0.0 {
        let touched = next
            .enemies
            .iter()
            .any(|e| e.active && e.check_player_collision(&next.player));
        if touched {
            next.player.health -= CONTACT_DAMAGE;
            next.player.invulnerable_timer = CONTACT_GRACE;
        }
    }

    // ── 4. Prune & refill ────────────────────────────────────────────────────
    next.enemies.retain(|e| e.active);
    if next.enemies.is_empty() {
        next = spawn_wave(&next, rng);
    }

    // ── 5. Status ────────────────────────────────────────────────────────────
    next.high_score = next.high_score.max(next.score);
    if next.player.health <= 0.0 {
        next.player.health = 0.0;
        next.status = GameStatus::GameOver;
        info!(
            "game over at wave {} with score {} ({} kills)",
            next.wave, next.score, next.kills
        );
    }
    next
}
