/// Simulation setup: arena geometry, RNG seed and wave composition.

use std::str::FromStr;

use crate::entities::{EnemyKind, Level};
use crate::error::ConfigError;

pub const DEFAULT_ARENA_WIDTH: f32 = 1200.0;
pub const DEFAULT_ARENA_HEIGHT: f32 = 800.0;
pub const BORDER_THICKNESS: f32 = 20.0;
pub const SAFE_ZONE_RADIUS: f32 = 80.0;

/// Clear space every arena needs inside each wall for spawns and wandering.
const MIN_PLAY_SPACE: f32 = 100.0;

/// Smallest width/height an arena may have.
pub fn min_arena_side() -> f32 {
    2.0 * (BORDER_THICKNESS + MIN_PLAY_SPACE)
}

/// A fixed wave composition, e.g. `datawisp=3,bitbug=2`.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveSpec {
    pub entries: Vec<(EnemyKind, u32)>,
}

impl WaveSpec {
    /// Parse comma-separated `kind=count` pairs.
    ///
    /// Unlike `EnemyKind::from_tag`, unknown kinds are rejected here so a
    /// typo on the command line does not quietly spawn generic enemies.
    pub fn parse(input: &str) -> Result<WaveSpec, ConfigError> {
        let mut entries = Vec::new();
        for raw in input.split(',') {
            let entry = raw.trim();
            if entry.is_empty() {
                continue;
            }
            let (tag, count) = entry
                .split_once('=')
                .ok_or_else(|| ConfigError::MalformedEntry(entry.to_string()))?;
            let (tag, count) = (tag.trim(), count.trim());

            let kind = EnemyKind::parse_tag(&tag.to_ascii_lowercase())
                .ok_or_else(|| ConfigError::UnknownKind(tag.to_string()))?;
            let count = match count.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidCount {
                        kind: tag.to_string(),
                        count: count.to_string(),
                    })
                }
            };
            entries.push((kind, count));
        }

        if entries.is_empty() {
            return Err(ConfigError::EmptyWave);
        }
        Ok(WaveSpec { entries })
    }

    pub fn total(&self) -> u32 {
        self.entries.iter().map(|(_, n)| n).sum()
    }
}

impl FromStr for WaveSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WaveSpec::parse(s)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    pub arena_width: f32,
    pub arena_height: f32,
    /// Fixed RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Overrides the level's wave table when set.
    pub wave: Option<WaveSpec>,
    pub level: Level,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            arena_width: DEFAULT_ARENA_WIDTH,
            arena_height: DEFAULT_ARENA_HEIGHT,
            seed: None,
            wave: None,
            level: Level::Medium,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let min = min_arena_side();
        if !(self.arena_width >= min && self.arena_height >= min) {
            return Err(ConfigError::ArenaTooSmall {
                width: self.arena_width,
                height: self.arena_height,
                min,
            });
        }
        Ok(())
    }
}
