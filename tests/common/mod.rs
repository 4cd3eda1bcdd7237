#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use space_shooter::audio::Audio;
use space_shooter::config::Config;
use space_shooter::context::{SimContext, Viewport};
use space_shooter::design::Catalog;
use space_shooter::entities::{Footprint, SpatialBody};
use space_shooter::weapon::GunStats;

pub const SEED: u64 = 42;
pub const TICK: Duration = Duration::from_millis(33);

/// Audio sink that remembers every cue it was asked to play.
#[derive(Clone, Default)]
pub struct RecordingAudio {
    played: Arc<Mutex<Vec<(String, f32)>>>,
}

impl RecordingAudio {
    pub fn played(&self) -> Vec<String> {
        self.played.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.played.lock().unwrap().iter().filter(|(n, _)| n == name).count()
    }

    /// Volumes `name` was played at, oldest first.
    pub fn volumes(&self, name: &str) -> Vec<f32> {
        self.played
            .lock()
            .unwrap()
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| *v)
            .collect()
    }
}

impl Audio for RecordingAudio {
    fn play(&self, name: &str, volume: f32) {
        self.played.lock().unwrap().push((name.to_string(), volume));
    }
}

pub fn viewport() -> Viewport {
    Viewport::new(80, 24)
}

pub fn ctx() -> SimContext {
    SimContext::headless(viewport(), SEED)
}

/// Context whose sound cues can be inspected afterwards.
pub fn recording_ctx() -> (SimContext, RecordingAudio) {
    let audio = RecordingAudio::default();
    let ctx = SimContext::new(viewport(), SEED, Box::new(audio.clone()));
    (ctx, audio)
}

/// Context after one tick of `TICK`, so `dt` is non-zero.
pub fn ticking_ctx() -> SimContext {
    let mut ctx = ctx();
    ctx.advance_clock(TICK);
    ctx
}

pub fn catalog() -> Catalog {
    Catalog::builtin().unwrap()
}

/// Defaults with every random spawn turned off, so tests place bodies
/// themselves.
pub fn quiet_config() -> Config {
    Config {
        health_pack_chance: 0.0,
        modifier_chance: 0.0,
        alien_fire_chance: 0.0,
        ..Config::default()
    }
}

pub fn body(x: f32, y: f32, w: u16, h: u16) -> SpatialBody {
    SpatialBody::new(x, y, Footprint::new(w, h), 0.0)
}

pub fn stats(capacity: u32, power: i32, cooldown_ms: u64, reload_ms: u64) -> GunStats {
    GunStats {
        capacity,
        power,
        beam_speed: 20.0,
        cooldown: Duration::from_millis(cooldown_ms),
        reload: Duration::from_millis(reload_ms),
        glyph: '|',
    }
}

/// Poll `cond` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    while std::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}
