use approx::assert_relative_eq;
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstest::rstest;

use byte_wars::compute::new_arena;
use byte_wars::enemy::*;
use byte_wars::entities::*;
use byte_wars::world::{ArenaView, Drainable, Target};

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn make_player(x: f32, y: f32) -> Player {
    Player {
        pos: Vec2::new(x, y),
        radius: 12.0,
        health: 100.0,
        dash_cooldown_timer: 0.0,
        overclock_charge: 0.0,
        glitch_timer: 0.0,
        invulnerable_timer: 0.0,
    }
}

/// A target without the glitch capability.
struct Dummy {
    pos: Vec2,
    dash_cooldown_timer: f32,
    overclock_charge: f32,
}

impl Target for Dummy {
    fn position(&self) -> Vec2 {
        self.pos
    }

    fn radius(&self) -> f32 {
        0.0
    }

    fn drainable(&mut self) -> Drainable<'_> {
        Drainable {
            dash_cooldown_timer: &mut self.dash_cooldown_timer,
            overclock_charge: &mut self.overclock_charge,
        }
    }
}

/// One update with no arena and no siblings.
fn step_free(enemy: &mut Enemy, player: &mut impl Target, dt: f32, rng: &mut StdRng) {
    enemy.update(dt, player, None::<&Arena>, std::iter::empty(), rng);
}

/// Arena with the player shielded at the centre.
fn shielded_arena() -> Arena {
    let mut arena = new_arena(1200.0, 800.0);
    arena.player_in_safe_zone = true;
    arena
}

// ── Construction ──────────────────────────────────────────────────────────────

#[rstest]
#[case("datawisp", 12.0, 65.0, 30.0, 10)]
#[case("bitbug", 8.0, 140.0, 15.0, 15)]
#[case("memoryleech", 15.0, 50.0, 80.0, 25)]
#[case("syntaxbreaker", 14.0, 85.0, 45.0, 20)]
#[case("default", 10.0, 60.0, 20.0, 5)]
#[case("not-a-real-kind", 10.0, 60.0, 20.0, 5)]
fn construction_uses_kind_profile(
    #[case] tag: &str,
    #[case] radius: f32,
    #[case] speed: f32,
    #[case] health: f32,
    #[case] points: u32,
) {
    let e = Enemy::from_tag(10.0, 20.0, tag);
    assert_eq!(e.pos, Vec2::new(10.0, 20.0));
    assert_eq!(e.radius, radius);
    assert_eq!(e.speed, speed);
    assert_eq!(e.health, health);
    assert_eq!(e.max_health, health);
    assert_eq!(e.points, points);
    assert!(e.active);
    assert!(!e.is_flashing);
    assert!(e.aimless_target.is_none());
}

#[test]
fn unknown_tag_falls_back_to_generic_behavior() {
    let e = Enemy::from_tag(0.0, 0.0, "glitchlord");
    assert_eq!(e.kind, EnemyKind::Generic);
    assert_eq!(e.behavior, Behavior::Pursue);
}

// ── Damage ────────────────────────────────────────────────────────────────────

#[test]
fn lethal_hit_returns_points_and_deactivates() {
    let mut e = Enemy::new(0.0, 0.0, EnemyKind::Datawisp);
    assert_eq!(e.take_damage(30.0), 10);
    assert!(!e.active);
    assert!(e.health <= 0.0);
}

#[test]
fn points_paid_only_on_crossing_hit() {
    let mut e = Enemy::new(0.0, 0.0, EnemyKind::Datawisp);
    assert_eq!(e.take_damage(10.0), 0);
    assert!(e.active);
    assert_eq!(e.take_damage(10.0), 0);
    assert!(e.active);
    assert_eq!(e.take_damage(10.0), 10);
    assert!(!e.active);
}

#[test]
fn overkill_still_pays_once_and_health_may_go_negative() {
    let mut e = Enemy::new(0.0, 0.0, EnemyKind::Bitbug);
    assert_eq!(e.take_damage(100.0), 15);
    assert_eq!(e.health, -85.0);
    assert!(!e.active);
}

#[test]
fn active_tracks_cumulative_damage() {
    let mut rng = seeded_rng();
    for kind in EnemyKind::ALL {
        let mut e = Enemy::new(0.0, 0.0, kind);
        let mut dealt = 0.0_f32;
        while e.active {
            // Whole numbers keep the running total exact.
            let hit = rng.gen_range(1..7) as f32;
            dealt += hit;
            let points = e.take_damage(hit);
            assert_eq!(e.active, dealt < e.max_health);
            assert_eq!(points > 0, !e.active);
        }
    }
}

#[test]
fn damage_flashes_then_fades() {
    let mut rng = seeded_rng();
    let mut player = make_player(500.0, 500.0);
    let mut e = Enemy::new(100.0, 100.0, EnemyKind::MemoryLeech);

    e.take_damage(1.0);
    assert!(e.is_flashing);
    assert_relative_eq!(e.flash_timer, FLASH_DURATION);

    step_free(&mut e, &mut player, 0.05, &mut rng);
    assert!(e.is_flashing);
    step_free(&mut e, &mut player, 0.06, &mut rng);
    assert!(!e.is_flashing);
}

// ── Collision queries ─────────────────────────────────────────────────────────

#[test]
fn point_test_includes_the_rim() {
    let e = Enemy::new(100.0, 100.0, EnemyKind::Datawisp); // radius 12
    assert!(e.check_point(Vec2::new(112.0, 100.0)));
    assert!(!e.check_point(Vec2::new(112.5, 100.0)));
}

#[test]
fn circle_test_adds_radii() {
    let e = Enemy::new(100.0, 100.0, EnemyKind::Datawisp);
    assert!(e.check_collision(Vec2::new(120.0, 100.0), 8.0));
    assert!(!e.check_collision(Vec2::new(120.5, 100.0), 8.0));
}

#[test]
fn player_collision_uses_player_radius() {
    let e = Enemy::new(100.0, 100.0, EnemyKind::Generic); // radius 10
    assert!(e.check_player_collision(&make_player(122.0, 100.0)));
    assert!(!e.check_player_collision(&make_player(123.0, 100.0)));
}

// ── Update basics ─────────────────────────────────────────────────────────────

#[test]
fn inactive_enemy_does_not_move() {
    let mut rng = seeded_rng();
    let mut player = make_player(500.0, 500.0);
    let mut e = Enemy::new(100.0, 100.0, EnemyKind::Datawisp);
    e.take_damage(100.0);

    step_free(&mut e, &mut player, 0.5, &mut rng);
    assert_eq!(e.pos, Vec2::new(100.0, 100.0));
}

#[test]
fn pursues_player_at_base_speed() {
    let mut rng = seeded_rng();
    let mut player = make_player(400.0, 100.0);
    let mut e = Enemy::new(100.0, 100.0, EnemyKind::Datawisp);

    step_free(&mut e, &mut player, 0.1, &mut rng);
    assert_relative_eq!(e.pos.x, 106.5, epsilon = 1e-3);
    assert_relative_eq!(e.pos.y, 100.0);
    assert_eq!(e.target, player.pos);
}

#[test]
fn standing_on_the_target_stays_put() {
    let mut rng = seeded_rng();
    let mut player = make_player(100.0, 100.0);
    let mut e = Enemy::new(100.0, 100.0, EnemyKind::Datawisp);

    step_free(&mut e, &mut player, 0.1, &mut rng);
    assert_eq!(e.pos, Vec2::new(100.0, 100.0));
    assert_eq!(e.velocity, Vec2::ZERO);
}

// ── Bit bug dash ──────────────────────────────────────────────────────────────

#[test]
fn bitbug_dashes_after_cooldown_for_fixed_duration() {
    let mut rng = seeded_rng();
    let mut player = make_player(500.0, 300.0);
    let mut e = Enemy::new(400.0, 300.0, EnemyKind::Bitbug);
    let dt = 0.05;

    let mut dash_started = None;
    for tick in 1..=39 {
        step_free(&mut e, &mut player, dt, &mut rng);
        assert!(!e.is_dashing(), "dashed early at tick {tick}");
    }

    // Tick 40 brings the aggression timer to 2.0s.
    for tick in 40..=48 {
        let before = e.pos;
        step_free(&mut e, &mut player, dt, &mut rng);
        let moved = e.pos.distance(before);
        if e.is_dashing() {
            dash_started.get_or_insert(tick);
            assert_relative_eq!(moved, DASH_SPEED * dt, epsilon = 1e-3);
        } else {
            assert_relative_eq!(moved, 140.0 * dt, epsilon = 1e-3);
        }
    }

    assert_eq!(dash_started, Some(40));
    // 8 ticks of 0.05s = 0.4s of dashing: ticks 40..=47.
    assert!(!e.is_dashing());
}

#[test]
fn bitbug_does_not_dash_when_far_away() {
    let mut rng = seeded_rng();
    let mut player = make_player(1000.0, 300.0);
    let mut e = Enemy::new(100.0, 300.0, EnemyKind::Bitbug);

    for _ in 0..60 {
        step_free(&mut e, &mut player, 0.05, &mut rng);
        assert!(!e.is_dashing());
    }
}

#[test]
fn dash_ends_on_schedule_even_after_leaving_range() {
    let mut rng = seeded_rng();
    let mut player = make_player(500.0, 300.0);
    let mut e = Enemy::new(450.0, 300.0, EnemyKind::Bitbug);
    if let Behavior::Dash(dash) = &mut e.behavior {
        dash.aggression_timer = DASH_COOLDOWN;
    }

    step_free(&mut e, &mut player, 0.1, &mut rng);
    assert!(e.is_dashing());

    // Player teleports far away; the dash still runs its course.
    player.pos = Vec2::new(5000.0, 300.0);
    for _ in 0..3 {
        step_free(&mut e, &mut player, 0.1, &mut rng);
        assert!(e.is_dashing());
    }
    step_free(&mut e, &mut player, 0.1, &mut rng);
    assert!(!e.is_dashing());
}

// ── Memory leech drain ────────────────────────────────────────────────────────

#[test]
fn memoryleech_drains_overclock_in_range() {
    let mut rng = seeded_rng();
    let mut player = make_player(500.0, 300.0);
    player.overclock_charge = 100.0;
    let mut e = Enemy::new(450.0, 300.0, EnemyKind::MemoryLeech);

    step_free(&mut e, &mut player, 1.0, &mut rng);
    assert!(e.is_draining());
    assert_relative_eq!(player.overclock_charge, 97.0, epsilon = 1e-4);
}

#[test]
fn memoryleech_extends_running_dash_cooldown_only() {
    let mut rng = seeded_rng();
    let mut player = make_player(500.0, 300.0);
    player.dash_cooldown_timer = 0.5;
    let mut e = Enemy::new(450.0, 300.0, EnemyKind::MemoryLeech);

    step_free(&mut e, &mut player, 1.0, &mut rng);
    assert_relative_eq!(player.dash_cooldown_timer, 0.8, epsilon = 1e-4);

    let mut idle = make_player(500.0, 300.0);
    let mut e = Enemy::new(450.0, 300.0, EnemyKind::MemoryLeech);
    step_free(&mut e, &mut idle, 1.0, &mut rng);
    assert_eq!(idle.dash_cooldown_timer, 0.0);
}

#[test]
fn overclock_drain_floors_at_zero() {
    let mut rng = seeded_rng();
    let mut player = make_player(500.0, 300.0);
    player.overclock_charge = 1.0;
    let mut e = Enemy::new(480.0, 300.0, EnemyKind::MemoryLeech);

    step_free(&mut e, &mut player, 1.0, &mut rng);
    assert_eq!(player.overclock_charge, 0.0);
}

#[test]
fn memoryleech_stops_draining_out_of_range() {
    let mut rng = seeded_rng();
    let mut player = make_player(500.0, 300.0);
    player.overclock_charge = 50.0;
    let mut e = Enemy::new(450.0, 300.0, EnemyKind::MemoryLeech);
    step_free(&mut e, &mut player, 0.1, &mut rng);
    assert!(e.is_draining());

    player.pos = Vec2::new(1000.0, 300.0);
    let charge = player.overclock_charge;
    step_free(&mut e, &mut player, 0.1, &mut rng);
    assert!(!e.is_draining());
    assert_eq!(player.overclock_charge, charge);
}

// ── Syntax breaker glitch ─────────────────────────────────────────────────────

#[test]
fn syntaxbreaker_glitches_player_on_cooldown() {
    let mut rng = seeded_rng();
    let mut player = make_player(500.0, 300.0);
    let mut e = Enemy::new(450.0, 300.0, EnemyKind::SyntaxBreaker);

    for _ in 0..4 {
        step_free(&mut e, &mut player, 0.5, &mut rng);
        assert!(!e.is_glitching());
    }
    assert_eq!(player.glitch_timer, 0.0);

    step_free(&mut e, &mut player, 0.5, &mut rng); // 2.5s
    assert!(e.is_glitching());
    assert_eq!(player.glitch_timer, GLITCH_DURATION);

    step_free(&mut e, &mut player, 0.5, &mut rng);
    assert!(e.is_glitching());
    step_free(&mut e, &mut player, 0.5, &mut rng); // 1.0s later
    assert!(!e.is_glitching());
}

#[test]
fn glitch_skips_targets_without_the_capability() {
    let mut rng = seeded_rng();
    let mut target = Dummy {
        pos: Vec2::new(500.0, 300.0),
        dash_cooldown_timer: 0.0,
        overclock_charge: 0.0,
    };
    let mut e = Enemy::new(450.0, 300.0, EnemyKind::SyntaxBreaker);

    for _ in 0..5 {
        e.update(0.5, &mut target, None::<&Arena>, std::iter::empty(), &mut rng);
    }
    assert!(e.is_glitching());
}

#[test]
fn syntaxbreaker_ignores_distant_player() {
    let mut rng = seeded_rng();
    let mut player = make_player(1100.0, 300.0);
    let mut e = Enemy::new(100.0, 300.0, EnemyKind::SyntaxBreaker);

    for _ in 0..6 {
        step_free(&mut e, &mut player, 0.5, &mut rng);
    }
    assert!(!e.is_glitching());
    assert_eq!(player.glitch_timer, 0.0);
}

// ── Arena constraints ─────────────────────────────────────────────────────────

#[test]
fn stays_inside_arena_bounds() {
    let mut rng = seeded_rng();
    let arena = new_arena(1200.0, 800.0);

    for _ in 0..200 {
        let kind = EnemyKind::ALL[rng.gen_range(0..EnemyKind::ALL.len())];
        let mut e = Enemy::new(
            rng.gen_range(-500.0..1700.0),
            rng.gen_range(-500.0..1300.0),
            kind,
        );
        let mut player = make_player(rng.gen_range(-100.0..1300.0), rng.gen_range(-100.0..900.0));
        for _ in 0..5 {
            let dt = rng.gen_range(0.0..0.5);
            e.update(dt, &mut player, Some(&arena), std::iter::empty(), &mut rng);
            let lo = arena.border_thickness + e.radius;
            assert!(e.pos.x >= lo && e.pos.x <= arena.width - lo, "x out of bounds: {}", e.pos.x);
            assert!(e.pos.y >= lo && e.pos.y <= arena.height - lo, "y out of bounds: {}", e.pos.y);
        }
    }
}

#[test]
fn keeps_out_of_occupied_safe_zone() {
    let mut rng = seeded_rng();
    let arena = shielded_arena();
    let center = arena.center();
    let mut player = make_player(center.x, center.y);

    for _ in 0..200 {
        let kind = EnemyKind::ALL[rng.gen_range(0..EnemyKind::ALL.len())];
        let start = center + Vec2::new(rng.gen_range(-150.0..150.0), rng.gen_range(-150.0..150.0));
        let mut e = Enemy::new(start.x, start.y, kind);
        let keep_out = arena.safe_zone_radius + e.radius + SAFE_ZONE_BUFFER;
        for _ in 0..5 {
            e.update(0.1, &mut player, Some(&arena), std::iter::empty(), &mut rng);
            assert!(e.pos.distance(center) >= keep_out - 1e-3);
        }
    }
}

#[test]
fn safe_zone_on_cooldown_does_not_repel() {
    let mut rng = seeded_rng();
    let mut arena = shielded_arena();
    arena.cooldown_remaining = 5.0;
    let center = arena.center();
    let mut player = make_player(center.x, center.y);
    let mut e = Enemy::new(center.x + 40.0, center.y, EnemyKind::Datawisp);

    e.update(0.1, &mut player, Some(&arena), std::iter::empty(), &mut rng);
    assert_relative_eq!(e.pos.x, center.x + 40.0 - 6.5, epsilon = 1e-3);
    assert!(e.aimless_target.is_none());
}

#[test]
fn shielded_player_makes_enemies_wander_at_half_speed() {
    let mut rng = seeded_rng();
    let arena = shielded_arena();
    let center = arena.center();
    let mut player = make_player(center.x, center.y);
    let mut e = Enemy::new(200.0, 200.0, EnemyKind::Datawisp);

    let before = e.pos;
    e.update(0.1, &mut player, Some(&arena), std::iter::empty(), &mut rng);

    let wander = e.aimless_target.expect("wander point chosen");
    assert_eq!(e.target, wander);
    let inset = arena.border_thickness + WANDER_MARGIN;
    assert!(wander.x >= inset && wander.x <= arena.width - inset);
    assert!(wander.y >= inset && wander.y <= arena.height - inset);
    assert!(!arena.is_in_safe_zone(wander));
    if wander.distance(before) > 3.25 {
        assert_relative_eq!(e.pos.distance(before), 65.0 * 0.5 * 0.1, epsilon = 1e-3);
    }
}

#[test]
fn reached_wander_point_is_replaced() {
    let mut rng = seeded_rng();
    let arena = shielded_arena();
    let center = arena.center();
    let mut player = make_player(center.x, center.y);
    let mut e = Enemy::new(200.0, 200.0, EnemyKind::Datawisp);
    e.aimless_target = Some(Vec2::new(210.0, 200.0));

    e.update(0.1, &mut player, Some(&arena), std::iter::empty(), &mut rng);
    assert_ne!(e.aimless_target, Some(Vec2::new(210.0, 200.0)));

    let kept = Vec2::new(900.0, 600.0);
    e.aimless_target = Some(kept);
    e.update(0.1, &mut player, Some(&arena), std::iter::empty(), &mut rng);
    assert_eq!(e.aimless_target, Some(kept));
}

#[test]
fn pursuit_stops_at_safe_zone_rim() {
    let mut rng = seeded_rng();
    // The player has just stepped into the zone; the arena has not flagged
    // the visit yet, so enemies still pursue, but only to the rim.
    let arena = new_arena(1200.0, 800.0);
    let center = arena.center();
    let mut player = make_player(center.x + 30.0, center.y);
    let mut e = Enemy::new(1000.0, 400.0, EnemyKind::Datawisp);

    e.update(0.1, &mut player, Some(&arena), std::iter::empty(), &mut rng);
    let rim = center + Vec2::X * (arena.safe_zone_radius + SAFE_ZONE_STANDOFF);
    assert_relative_eq!(e.target.x, rim.x, epsilon = 1e-3);
    assert_relative_eq!(e.target.y, rim.y, epsilon = 1e-3);
}

// ── Siblings ──────────────────────────────────────────────────────────────────

#[test]
fn siblings_push_enemies_apart() {
    let mut rng = seeded_rng();
    let mut player = make_player(100.0, 1000.0);
    let mut a = Enemy::new(100.0, 100.0, EnemyKind::Datawisp);
    let b = Enemy::new(120.0, 100.0, EnemyKind::Datawisp);

    a.update(0.1, &mut player, None::<&Arena>, [&b], &mut rng);
    // Pursuit is straight down (+y); avoidance adds a -x component.
    assert!(a.velocity.x < 0.0);
    assert_relative_eq!(a.velocity.x, -(36.0 - 20.0) / 36.0 * 150.0, epsilon = 1e-3);
}

#[test]
fn inactive_siblings_are_ignored() {
    let mut rng = seeded_rng();
    let mut player = make_player(100.0, 1000.0);
    let mut a = Enemy::new(100.0, 100.0, EnemyKind::Datawisp);
    let mut b = Enemy::new(120.0, 100.0, EnemyKind::Datawisp);
    b.take_damage(1000.0);

    a.update(0.1, &mut player, None::<&Arena>, [&b], &mut rng);
    assert_relative_eq!(a.velocity.x, 0.0);
}

#[test]
fn wandering_halves_avoidance() {
    let mut rng = seeded_rng();
    let arena = shielded_arena();
    let center = arena.center();
    let mut player = make_player(center.x, center.y);

    // Wander target straight below so only avoidance contributes to x.
    let mut a = Enemy::new(200.0, 200.0, EnemyKind::Datawisp);
    a.aimless_target = Some(Vec2::new(200.0, 700.0));
    let b = Enemy::new(220.0, 200.0, EnemyKind::Datawisp);

    a.update(0.1, &mut player, Some(&arena), [&b], &mut rng);
    assert_relative_eq!(a.velocity.x, -(36.0 - 20.0) / 36.0 * 150.0 * 0.5, epsilon = 1e-3);
    assert_relative_eq!(a.velocity.y, 32.5, epsilon = 1e-3);
}
