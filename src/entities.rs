/// Core simulation data types — bodies, beams, kind tags, input events.
///
/// Pure data with a handful of small helpers; the rules that move and
/// collide these values live in `compute`.

// ── Kind tags ────────────────────────────────────────────────────────────────

/// Closed set of registry kinds.  Used as the lookup key for
/// `Registry::find_by_kind`; the player ship and the overlay are
/// semantically singular, producers tag their whole pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    PlayerShip,
    Aliens,
    Boss,
    Asteroids,
    HealthPacks,
    Modifiers,
    Starfield,
    Particles,
    Overlay,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::PlayerShip => "player",
            EntityKind::Aliens => "aliens",
            EntityKind::Boss => "boss",
            EntityKind::Asteroids => "asteroids",
            EntityKind::HealthPacks => "health_packs",
            EntityKind::Modifiers => "modifiers",
            EntityKind::Starfield => "starfield",
            EntityKind::Particles => "particles",
            EntityKind::Overlay => "overlay",
        }
    }
}

// ── Input ────────────────────────────────────────────────────────────────────

/// Abstract input, already decoded from terminal key events by the binary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Left,
    Right,
    Up,
    Down,
    Fire,
    Reload,
    Pause,
    Restart,
    Quit,
}

// ── Spatial ──────────────────────────────────────────────────────────────────

/// Continuous 2D position in grid-cell units.  `y` grows toward the player
/// (down the screen).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Rounded integer cell this position falls in.
    pub fn cell(&self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

/// Width and height in grid cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Footprint {
    pub width: u16,
    pub height: u16,
}

impl Footprint {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpatialBody {
    pub pos: Position,
    pub size: Footprint,
    /// Cells per second.
    pub speed: f32,
}

impl SpatialBody {
    pub fn new(x: f32, y: f32, size: Footprint, speed: f32) -> Self {
        Self {
            pos: Position::new(x, y),
            size,
            speed,
        }
    }

    /// Horizontal centre in continuous coordinates.
    pub fn center_x(&self) -> f32 {
        self.pos.x + self.size.width as f32 / 2.0
    }
}

/// Health pool.  `current <= max` always; `current <= 0` means dead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HealthBody {
    current: i32,
    max: i32,
}

impl HealthBody {
    pub fn new(max: i32) -> Self {
        let max = max.max(1);
        Self { current: max, max }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0
    }

    /// Subtract `amount`.  Returns true if this call is the one that killed
    /// the body, so callers can credit a kill exactly once.
    pub fn damage(&mut self, amount: i32) -> bool {
        let was_alive = !self.is_dead();
        self.current -= amount.max(0);
        was_alive && self.is_dead()
    }

    /// Restore up to `amount`, never past `max`.  Returns the amount restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.current;
        self.current = (self.current + amount.max(0)).min(self.max);
        self.current - before
    }

    pub fn kill(&mut self) {
        self.current = self.current.min(0);
    }
}

// ── Projectiles ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Heading {
    /// Up the screen, away from the player (player shots).
    AwayFromPlayer,
    /// Down the screen, toward the player (enemy shots).
    TowardPlayer,
}

impl Heading {
    /// Sign applied to `y` when advancing.
    pub fn dy(&self) -> f32 {
        match self {
            Heading::AwayFromPlayer => -1.0,
            Heading::TowardPlayer => 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Beam {
    pub pos: Position,
    pub heading: Heading,
    /// Cells per second.
    pub speed: f32,
    pub glyph: char,
}

/// A confirmed projectile hit, returned by the gun that owned the beam.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Impact {
    pub at: Position,
    pub power: i32,
}
