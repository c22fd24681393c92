//! Enemy simulation for a top-down arena shooter.
//!
//! [`enemy`] holds the per-enemy behaviour driven once per frame,
//! [`compute`] the game loop that owns the enemies, player and arena, and
//! [`display`] draws all of it to a terminal.

pub mod compute;
pub mod config;
pub mod display;
pub mod enemy;
pub mod entities;
pub mod error;
pub mod logging;
pub mod steering;
pub mod world;

pub use config::{SimConfig, WaveSpec};
pub use entities::{Arena, Enemy, EnemyKind, GameState, Player};
pub use error::ConfigError;
pub use logging::init as init_logging;
pub use world::{ArenaView, Glitchable, SafeZoneStatus, Target};
