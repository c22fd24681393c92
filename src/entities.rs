/// All game entity types: pure data, no logic.

use glam::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Datawisp,
    Bitbug,
    MemoryLeech,
    SyntaxBreaker,
    /// Fallback profile for any tag the game does not recognise.
    Generic,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 5] = [
        EnemyKind::Datawisp,
        EnemyKind::Bitbug,
        EnemyKind::MemoryLeech,
        EnemyKind::SyntaxBreaker,
        EnemyKind::Generic,
    ];

    /// Unknown tags silently degrade to `Generic`.
    pub fn from_tag(tag: &str) -> EnemyKind {
        Self::parse_tag(tag).unwrap_or(EnemyKind::Generic)
    }

    /// Strict lookup used by configuration parsing.
    pub fn parse_tag(tag: &str) -> Option<EnemyKind> {
        match tag {
            "datawisp" => Some(EnemyKind::Datawisp),
            "bitbug" => Some(EnemyKind::Bitbug),
            "memoryleech" => Some(EnemyKind::MemoryLeech),
            "syntaxbreaker" => Some(EnemyKind::SyntaxBreaker),
            "default" => Some(EnemyKind::Generic),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            EnemyKind::Datawisp => "datawisp",
            EnemyKind::Bitbug => "bitbug",
            EnemyKind::MemoryLeech => "memoryleech",
            EnemyKind::SyntaxBreaker => "syntaxbreaker",
            EnemyKind::Generic => "default",
        }
    }

    pub fn profile(&self) -> EnemyProfile {
        match self {
            EnemyKind::Datawisp => EnemyProfile { radius: 12.0, speed: 65.0, health: 30.0, points: 10 },
            EnemyKind::Bitbug => EnemyProfile { radius: 8.0, speed: 140.0, health: 15.0, points: 15 },
            EnemyKind::MemoryLeech => EnemyProfile { radius: 15.0, speed: 50.0, health: 80.0, points: 25 },
            EnemyKind::SyntaxBreaker => EnemyProfile { radius: 14.0, speed: 85.0, health: 45.0, points: 20 },
            EnemyKind::Generic => EnemyProfile { radius: 10.0, speed: 60.0, health: 20.0, points: 5 },
        }
    }
}

/// Fixed stat bundle selected by `EnemyKind`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyProfile {
    pub radius: f32,
    /// Base pursuit speed in world units per second.
    pub speed: f32,
    pub health: f32,
    /// Score awarded when the enemy is destroyed.
    pub points: u32,
}

// ── Enemy behaviour state ────────────────────────────────────────────────────

/// Per-kind special-ability state, chosen once at construction.
#[derive(Clone, Debug, PartialEq)]
pub enum Behavior {
    /// Plain pursuit / wander, no special ability.
    Pursue,
    Dash(DashState),
    Drain(DrainState),
    Glitch(GlitchState),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashState {
    /// Seconds since the last dash started (or since spawn).
    pub aggression_timer: f32,
    /// Seconds of dash left; only meaningful while `is_dashing`.
    pub dash_remaining: f32,
    pub is_dashing: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrainState {
    pub pulse_timer: f32,
    pub is_draining: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlitchState {
    pub glitch_timer: f32,
    pub pulse_timer: f32,
    pub glitch_remaining: f32,
    pub is_glitching: bool,
}

// ── Enemy ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub pos: Vec2,
    /// Recomputed every tick from the current target; never integrated on its own.
    pub velocity: Vec2,
    /// Current pursuit or wander target.
    pub target: Vec2,
    pub radius: f32,
    pub speed: f32,
    /// May drop below zero on the killing blow.
    pub health: f32,
    pub max_health: f32,
    pub points: u32,
    pub active: bool,
    pub is_flashing: bool,
    pub flash_timer: f32,
    /// Random roaming point used while the player is shielded.
    pub aimless_target: Option<Vec2>,
    pub behavior: Behavior,
}

// ── Player & arena ───────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    pub pos: Vec2,
    pub radius: f32,
    pub health: f32,
    /// Seconds until the next dash is allowed. Memory leeches extend it.
    pub dash_cooldown_timer: f32,
    /// 0..=100; a full charge unlocks the overclock burst.
    pub overclock_charge: f32,
    /// Seconds of scrambled (inverted) controls left.
    pub glitch_timer: f32,
    /// Seconds of post-hit invulnerability left.
    pub invulnerable_timer: f32,
}

#[derive(Clone, Debug)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
    pub border_thickness: f32,
    pub safe_zone_radius: f32,
    /// True while the player stands inside the safe-zone circle.
    pub player_in_safe_zone: bool,
    /// Seconds the player has spent protected during the current visit.
    pub protection_elapsed: f32,
    /// Seconds until the safe zone becomes available again; 0 when available.
    pub cooldown_remaining: f32,
}

// ── Game flow ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Easy,
    Medium,
    Hard,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameStatus {
    Playing,
    GameOver,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire game state.  Cloneable so pure update functions can
/// return a new copy without mutating the original.
#[derive(Clone, Debug)]
pub struct GameState {
    pub player: Player,
    pub arena: Arena,
    pub enemies: Vec<Enemy>,
    /// Fixed per-wave composition; `None` uses the level's table.
    pub wave_override: Option<Vec<(EnemyKind, u32)>>,
    pub score: u32,
    /// The highest score seen so far (updated live during play).
    pub high_score: u32,
    pub kills: u32,
    pub wave: u32,
    pub level: Level,
    pub status: GameStatus,
    /// Simulated seconds since the game started.
    pub elapsed: f32,
    pub frame: u64,
}
