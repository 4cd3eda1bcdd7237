//! Session configuration
//!
//! Flat key/value settings read once at startup.  Every field has a default
//! so a partial file (or none at all) works.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::progression::DEFAULT_POINTS_PER_LEVEL;
use crate::weapon::GunLimits;

#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "config I/O error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "config parse error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Frame interval of the main loop.
    pub tick_ms: u64,

    // === Pools ===
    pub starting_aliens: usize,
    pub max_aliens: usize,
    pub starting_asteroids: usize,
    pub max_asteroids: usize,
    pub star_count: usize,

    // === Optional producers ===
    pub enable_boss: bool,
    pub enable_asteroids: bool,
    pub enable_health_packs: bool,
    pub enable_modifiers: bool,
    pub enable_stars: bool,

    // === Audio ===
    pub sound: bool,
    pub volume: f32,

    /// Draw every entity before updating it (end-of-previous-tick view).
    pub draw_before_update: bool,

    // === Progression ===
    pub points_per_level: u32,
    /// A boss appears on every n-th level.
    pub boss_every_levels: u32,

    // === Spawning ===
    /// Rejection-sampling attempts before placement falls back to any lane.
    pub placement_retries: u32,
    /// Minimum horizontal gap between live aliens.
    pub alien_spacing: f32,
    /// Columns kept clear at both screen edges when spawning.
    pub spawn_padding: f32,
    /// Per-tick spawn probability for pickups.
    pub health_pack_chance: f64,
    pub modifier_chance: f64,
    /// Per-tick probability that an alien tries to fire.
    pub alien_fire_chance: f64,

    // === Weapon limits ===
    pub max_capacity: u32,
    pub max_power: i32,
    pub max_beam_speed: f32,
    pub min_cooldown_ms: u64,
    pub min_reload_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_ms: 33,

            starting_aliens: 3,
            max_aliens: 8,
            starting_asteroids: 2,
            max_asteroids: 6,
            star_count: 40,

            enable_boss: true,
            enable_asteroids: true,
            enable_health_packs: true,
            enable_modifiers: true,
            enable_stars: true,

            sound: true,
            volume: 0.8,

            draw_before_update: false,

            points_per_level: DEFAULT_POINTS_PER_LEVEL,
            boss_every_levels: 3,

            placement_retries: 32,
            alien_spacing: 6.0,
            spawn_padding: 2.0,
            health_pack_chance: 0.004,
            modifier_chance: 0.003,
            alien_fire_chance: 0.02,

            max_capacity: 30,
            max_power: 50,
            max_beam_speed: 60.0,
            min_cooldown_ms: 60,
            min_reload_ms: 300,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn gun_limits(&self) -> GunLimits {
        GunLimits {
            max_capacity: self.max_capacity,
            max_power: self.max_power,
            max_beam_speed: self.max_beam_speed,
            min_cooldown: Duration::from_millis(self.min_cooldown_ms),
            min_reload: Duration::from_millis(self.min_reload_ms),
        }
    }
}
