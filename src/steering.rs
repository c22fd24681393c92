/// Elementary steering helpers shared by every enemy kind.
///
/// All functions are pure: they take positions in and hand a vector back.

use glam::Vec2;

use crate::entities::Enemy;
use crate::world::ArenaView;

/// Neighbours closer than `radius * AVOIDANCE_RADIUS_FACTOR` push back.
pub const AVOIDANCE_RADIUS_FACTOR: f32 = 3.0;
/// Peak push (units/s) when two enemies sit on top of each other.
pub const AVOIDANCE_STRENGTH: f32 = 150.0;
/// Only the first few qualifying neighbours are considered.
pub const MAX_AVOIDANCE_NEIGHBOURS: usize = 5;
/// Neighbours nearer than this are skipped (direction is undefined).
pub const MIN_AVOIDANCE_DISTANCE: f32 = 0.1;

const SEEK_EPSILON: f32 = 1e-4;

/// Velocity heading from `from` towards `to` at `speed`.
///
/// Returns `None` when the two points coincide.
pub fn seek(from: Vec2, to: Vec2, speed: f32) -> Option<Vec2> {
    let delta = to - from;
    let distance = delta.length();
    if distance <= SEEK_EPSILON {
        return None;
    }
    Some(delta / distance * speed)
}

/// Separation force pushing an enemy at `pos` away from nearby siblings.
///
/// Contributions are averaged, not summed, so a crowd does not launch an
/// enemy across the arena. Inactive siblings are ignored.
pub fn avoidance<'a, I>(pos: Vec2, radius: f32, siblings: I) -> Vec2
where
    I: IntoIterator<Item = &'a Enemy>,
{
    let avoidance_radius = radius * AVOIDANCE_RADIUS_FACTOR;
    let mut force = Vec2::ZERO;
    let mut nearby = 0usize;

    for other in siblings {
        if !other.active {
            continue;
        }
        if nearby >= MAX_AVOIDANCE_NEIGHBOURS {
            break;
        }
        let away = pos - other.pos;
        let distance = away.length();
        if distance < avoidance_radius && distance > MIN_AVOIDANCE_DISTANCE {
            let strength = (avoidance_radius - distance) / avoidance_radius;
            force += away / distance * strength * AVOIDANCE_STRENGTH;
            nearby += 1;
        }
    }

    if nearby > 0 {
        force / nearby as f32
    } else {
        force
    }
}

/// Push `pos` out to `min_distance` from `center` along the centre→pos ray.
///
/// A point exactly on the centre has no ray; it is pushed along +x.
pub fn exclude_from_safe_zone(pos: Vec2, center: Vec2, min_distance: f32) -> Vec2 {
    let offset = pos - center;
    let distance = offset.length();
    if distance >= min_distance {
        return pos;
    }
    if distance <= 0.0 {
        return center + Vec2::X * min_distance;
    }
    center + offset / distance * min_distance
}

/// Keep a circle of `radius` fully inside the arena walls.
pub fn clamp_to_arena<A: ArenaView + ?Sized>(pos: Vec2, radius: f32, arena: &A) -> Vec2 {
    let margin = arena.border_thickness() + radius;
    // max(lo, min(hi, v)) rather than f32::clamp: never panics on a tiny arena.
    let x = pos.x.min(arena.width() - margin).max(margin);
    let y = pos.y.min(arena.height() - margin).max(margin);
    Vec2::new(x, y)
}
