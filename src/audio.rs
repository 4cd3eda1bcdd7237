//! Sound sink.
//!
//! Playback itself is an external concern; the core only fires named cues
//! and never looks at the outcome.

/// Fire-and-forget sound cue.
pub trait Audio: Send {
    fn play(&self, name: &str, volume: f32);
}

pub mod cue {
    pub const FIRE: &str = "fire";
    pub const ENEMY_FIRE: &str = "enemy_fire";
    pub const IMPACT: &str = "impact";
    pub const EXPLOSION: &str = "explosion";
    pub const PICKUP: &str = "pickup";
    pub const RELOAD: &str = "reload";
    pub const LEVEL_UP: &str = "level_up";
}

/// Sound disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Audio for Silent {
    fn play(&self, _name: &str, _volume: f32) {}
}

/// Writes each cue to the log instead of a device.
#[derive(Debug, Default, Clone, Copy)]
pub struct Logged;

impl Audio for Logged {
    fn play(&self, name: &str, volume: f32) {
        log::trace!("sound {} @ {:.2}", name, volume.clamp(0.0, 1.0));
    }
}
