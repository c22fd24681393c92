//! Contracts between the enemy simulation and the objects it reads from.
//!
//! Enemies only see the player through [`Target`] and the arena through
//! [`ArenaView`]. The concrete [`Player`] and [`Arena`] used by the game
//! implement both at the bottom of this file; tests are free to plug in
//! lighter stand-ins.

use glam::Vec2;

use crate::entities::{Arena, Player};

/// Safe-zone flags as reported by the arena.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SafeZoneStatus {
    /// The player currently stands inside the safe-zone circle.
    pub in_safe_zone: bool,
    /// The zone is not cooling down.
    pub available: bool,
}

/// The two player fields a memory leech is allowed to drain.
pub struct Drainable<'a> {
    pub dash_cooldown_timer: &'a mut f32,
    pub overclock_charge: &'a mut f32,
}

/// Optional capability: targets that react to a syntax breaker's glitch pulse.
pub trait Glitchable {
    fn apply_glitch_effect(&mut self, duration: f32);
}

/// What an enemy needs to know about (and may do to) the player.
pub trait Target {
    fn position(&self) -> Vec2;

    fn radius(&self) -> f32;

    fn drainable(&mut self) -> Drainable<'_>;

    /// `None` when the target cannot be glitched.
    fn glitchable(&mut self) -> Option<&mut dyn Glitchable> {
        None
    }
}

/// Read-only arena geometry and safe-zone state.
pub trait ArenaView {
    /// The player is currently shielded by an available safe zone.
    fn is_safe_zone_active(&self) -> bool;

    fn safe_zone_status(&self) -> SafeZoneStatus;

    fn is_in_safe_zone(&self, point: Vec2) -> bool;

    fn center(&self) -> Vec2;

    fn safe_zone_radius(&self) -> f32;

    fn border_thickness(&self) -> f32;

    fn width(&self) -> f32;

    fn height(&self) -> f32;
}

// ── Concrete game objects ────────────────────────────────────────────────────

impl Target for Player {
    fn position(&self) -> Vec2 {
        self.pos
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn drainable(&mut self) -> Drainable<'_> {
        Drainable {
            dash_cooldown_timer: &mut self.dash_cooldown_timer,
            overclock_charge: &mut self.overclock_charge,
        }
    }

    fn glitchable(&mut self) -> Option<&mut dyn Glitchable> {
        Some(self)
    }
}

impl Glitchable for Player {
    /// Overlapping glitches do not stack; the longer one wins.
    fn apply_glitch_effect(&mut self, duration: f32) {
        self.glitch_timer = self.glitch_timer.max(duration);
    }
}

impl ArenaView for Arena {
    fn is_safe_zone_active(&self) -> bool {
        let status = self.safe_zone_status();
        status.in_safe_zone && status.available
    }

    fn safe_zone_status(&self) -> SafeZoneStatus {
        SafeZoneStatus {
            in_safe_zone: self.player_in_safe_zone,
            available: self.cooldown_remaining <= 0.0,
        }
    }

    fn is_in_safe_zone(&self, point: Vec2) -> bool {
        point.distance(self.center()) <= self.safe_zone_radius
    }

    fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    fn safe_zone_radius(&self) -> f32 {
        self.safe_zone_radius
    }

    fn border_thickness(&self) -> f32 {
        self.border_thickness
    }

    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }
}
