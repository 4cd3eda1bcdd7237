//! Design catalog — immutable per-kind stat templates.
//!
//! Loaded once at startup from JSON.  Producers copy what they need out of a
//! `Design` when they spawn an instance; nothing mutates a design after load.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crossterm::style::Color;
use serde::{Deserialize, Serialize};

use crate::compute::shape_footprint;
use crate::entities::Footprint;
use crate::weapon::GunStats;

/// Catalog shipped with the binary.
pub const BUILTIN_DESIGNS: &str = include_str!("../assets/designs.json");

#[derive(Debug)]
pub enum CatalogError {
    Io(String),
    Parse(String),
    /// A kind the game needs has no design in the file.
    Missing(DesignKind),
    Invalid(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Io(msg) => write!(f, "catalog I/O error: {}", msg),
            CatalogError::Parse(msg) => write!(f, "catalog parse error: {}", msg),
            CatalogError::Missing(kind) => write!(f, "catalog has no '{}' designs", kind.as_str()),
            CatalogError::Invalid(msg) => write!(f, "invalid design: {}", msg),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        CatalogError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Parse(e.to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DesignKind {
    Player,
    Alien,
    Boss,
    Asteroid,
    HealthPack,
    Modifier,
}

impl DesignKind {
    pub const ALL: [DesignKind; 6] = [
        DesignKind::Player,
        DesignKind::Alien,
        DesignKind::Boss,
        DesignKind::Asteroid,
        DesignKind::HealthPack,
        DesignKind::Modifier,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DesignKind::Player => "player",
            DesignKind::Alien => "alien",
            DesignKind::Boss => "boss",
            DesignKind::Asteroid => "asteroid",
            DesignKind::HealthPack => "health_pack",
            DesignKind::Modifier => "modifier",
        }
    }
}

fn default_glyph() -> char {
    '|'
}

/// Weapon template.  Durations are stored in milliseconds in the file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeaponDesign {
    pub capacity: u32,
    pub power: i32,
    pub beam_speed: f32,
    pub cooldown_ms: u64,
    pub reload_ms: u64,
    #[serde(default = "default_glyph")]
    pub glyph: char,
}

impl WeaponDesign {
    pub fn stats(&self) -> GunStats {
        GunStats {
            capacity: self.capacity,
            power: self.power,
            beam_speed: self.beam_speed,
            cooldown: Duration::from_millis(self.cooldown_ms),
            reload: Duration::from_millis(self.reload_ms),
            glyph: self.glyph,
        }
    }
}

fn default_color() -> String {
    "white".to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Design {
    pub name: String,
    /// Rows of glyphs; spaces are transparent.
    pub shape: Vec<String>,
    #[serde(default = "default_color")]
    pub color: String,
    pub health: i32,
    /// Base speed, cells per second.
    #[serde(default)]
    pub speed: f32,
    /// Lower end of the random spawn speed.
    #[serde(default)]
    pub min_speed: f32,
    /// Ceiling after level bonuses.
    #[serde(default)]
    pub max_speed: f32,
    #[serde(default)]
    pub points: u32,
    /// Damage dealt to whatever this body rams.
    #[serde(default)]
    pub impact: i32,
    /// Health given back to the ship when this pickup is collected.
    #[serde(default)]
    pub restore: i32,
    #[serde(default)]
    pub weapon: Option<WeaponDesign>,
}

impl Design {
    pub fn footprint(&self) -> Footprint {
        shape_footprint(&self.shape)
    }

    pub fn tint(&self) -> Color {
        parse_color(&self.color).unwrap_or(Color::White)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.shape.is_empty() {
            return Err(CatalogError::Invalid(format!("'{}' has an empty shape", self.name)));
        }
        if self.health <= 0 {
            return Err(CatalogError::Invalid(format!("'{}' has no health", self.name)));
        }
        if let Some(weapon) = &self.weapon {
            if weapon.capacity == 0 {
                return Err(CatalogError::Invalid(format!(
                    "'{}' has a weapon with no capacity",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

/// Colour names accepted in design files.
pub fn parse_color(name: &str) -> Option<Color> {
    let color = match name.to_lowercase().replace(['-', ' '], "_").as_str() {
        "black" => Color::Black,
        "dark_grey" | "dark_gray" => Color::DarkGrey,
        "red" => Color::Red,
        "dark_red" => Color::DarkRed,
        "green" => Color::Green,
        "dark_green" => Color::DarkGreen,
        "yellow" => Color::Yellow,
        "dark_yellow" => Color::DarkYellow,
        "blue" => Color::Blue,
        "dark_blue" => Color::DarkBlue,
        "magenta" => Color::Magenta,
        "dark_magenta" => Color::DarkMagenta,
        "cyan" => Color::Cyan,
        "dark_cyan" => Color::DarkCyan,
        "white" => Color::White,
        "grey" | "gray" => Color::Grey,
        _ => return None,
    };
    Some(color)
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    designs: HashMap<DesignKind, Vec<Design>>,
}

impl Catalog {
    /// Parse a catalog and check every kind the game spawns is present.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let mut raw: HashMap<String, Vec<Design>> = serde_json::from_str(json)?;
        let mut designs = HashMap::new();
        for kind in DesignKind::ALL {
            let list = raw.remove(kind.as_str()).unwrap_or_default();
            if list.is_empty() {
                return Err(CatalogError::Missing(kind));
            }
            for design in &list {
                design.validate()?;
            }
            designs.insert(kind, list);
        }
        for unknown in raw.keys() {
            log::warn!("Ignoring unknown design kind '{}'", unknown);
        }
        Ok(Self { designs })
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        log::info!("Loaded design catalog from {}", path.display());
        Ok(catalog)
    }

    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_DESIGNS)
    }

    /// First design of `kind`.
    pub fn design(&self, kind: DesignKind) -> Result<&Design, CatalogError> {
        self.designs
            .get(&kind)
            .and_then(|list| list.first())
            .ok_or(CatalogError::Missing(kind))
    }

    /// All designs of `kind`.
    pub fn designs(&self, kind: DesignKind) -> Result<&[Design], CatalogError> {
        match self.designs.get(&kind) {
            Some(list) if !list.is_empty() => Ok(list),
            _ => Err(CatalogError::Missing(kind)),
        }
    }
}
