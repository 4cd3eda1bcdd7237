//! Gun state machine: fire, cooldown, reload, beams.
//!
//! ```text
//!   Idle ──fire──▶ Firing ──▶ Idle
//!    │                          │
//!    └──── loaded == 0 ─────────┴──▶ ReloadPending ──timer──▶ Idle (loaded = capacity)
//! ```
//!
//! All mutable gun fields sit behind one mutex.  The reload timer runs on
//! its own thread and takes the same lock to refill, while the tick loop
//! takes it to fire, advance beams and read the HUD numbers.  A generation
//! counter guards against a timer that fires after its reload was cancelled.
//!
//! Reloads follow the session clock: `suspend_reload` stops the timer and
//! banks the time left, `resume_reload` schedules that remainder.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{after, bounded, select, Sender};

use crate::audio::{cue, Audio};
use crate::compute::{advance_beam, beam_out_of_range, point_in_rect};
use crate::entities::{Beam, Heading, Impact, Position, SpatialBody};

/// Per-gun numbers copied from a design at spawn time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GunStats {
    pub capacity: u32,
    pub power: i32,
    /// Beam travel speed, cells per second.
    pub beam_speed: f32,
    pub cooldown: Duration,
    pub reload: Duration,
    pub glyph: char,
}

/// Bounds for the upgrade operations.  Cooldowns have a floor so a gun can
/// never reach a zero-length fire loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GunLimits {
    pub max_capacity: u32,
    pub max_power: i32,
    pub max_beam_speed: f32,
    pub min_cooldown: Duration,
    pub min_reload: Duration,
}

/// Hard floor applied on top of any configured minimum cooldown.
pub const COOLDOWN_FLOOR: Duration = Duration::from_millis(20);

impl Default for GunLimits {
    fn default() -> Self {
        Self {
            max_capacity: 30,
            max_power: 50,
            max_beam_speed: 60.0,
            min_cooldown: Duration::from_millis(60),
            min_reload: Duration::from_millis(300),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FireOutcome {
    /// A beam left the muzzle.
    Fired,
    /// Still inside the cooldown window.
    CoolingDown,
    /// A reload is in flight.
    Reloading,
    /// Magazine was empty; this call started the reload instead of firing.
    ReloadTriggered,
}

/// Consistent view of the ammo counters, read under one lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AmmoStatus {
    pub loaded: u32,
    pub capacity: u32,
    pub reloading: bool,
}

struct ReloadTask {
    cancel: Sender<()>,
    _handle: Option<JoinHandle<()>>,
}

impl ReloadTask {
    fn cancel(&self) {
        let _ = self.cancel.try_send(());
    }
}

struct GunState {
    stats: GunStats,
    loaded: u32,
    reloading: bool,
    generation: u64,
    /// Reload time still owed, and when the running timer started.
    reload_left: Duration,
    timer_started: Option<Instant>,
    suspended: bool,
    last_fire: Option<Duration>,
    beams: Vec<Beam>,
    task: Option<ReloadTask>,
}

fn lock(state: &Mutex<GunState>) -> MutexGuard<'_, GunState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct Gun {
    state: Arc<Mutex<GunState>>,
    heading: Heading,
}

impl std::fmt::Debug for Gun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = lock(&self.state);
        f.debug_struct("Gun")
            .field("stats", &s.stats)
            .field("loaded", &s.loaded)
            .field("reloading", &s.reloading)
            .field("beams", &s.beams.len())
            .finish()
    }
}

impl Gun {
    /// A full gun whose beams travel along `heading`.
    pub fn new(stats: GunStats, heading: Heading) -> Self {
        let stats = GunStats {
            cooldown: stats.cooldown.max(COOLDOWN_FLOOR),
            ..stats
        };
        Self {
            state: Arc::new(Mutex::new(GunState {
                stats,
                loaded: stats.capacity,
                reloading: false,
                generation: 0,
                reload_left: Duration::ZERO,
                timer_started: None,
                suspended: false,
                last_fire: None,
                beams: Vec::new(),
                task: None,
            })),
            heading,
        }
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn stats(&self) -> GunStats {
        lock(&self.state).stats
    }

    pub fn loaded(&self) -> u32 {
        lock(&self.state).loaded
    }

    pub fn is_reloading(&self) -> bool {
        lock(&self.state).reloading
    }

    pub fn is_reload_suspended(&self) -> bool {
        lock(&self.state).suspended
    }

    pub fn ammo(&self) -> AmmoStatus {
        let s = lock(&self.state);
        AmmoStatus {
            loaded: s.loaded,
            capacity: s.stats.capacity,
            reloading: s.reloading,
        }
    }

    // ── Fire / reload ────────────────────────────────────────────────────────

    /// Try to fire one beam from `muzzle` at sim time `now`.  The fire cue
    /// plays at `volume`.
    pub fn fire(&self, now: Duration, muzzle: Position, audio: &dyn Audio, volume: f32) -> FireOutcome {
        let mut s = lock(&self.state);
        if s.reloading {
            return FireOutcome::Reloading;
        }
        if let Some(last) = s.last_fire {
            if now.saturating_sub(last) < s.stats.cooldown {
                return FireOutcome::CoolingDown;
            }
        }
        if s.loaded == 0 {
            self.start_reload(&mut s);
            return FireOutcome::ReloadTriggered;
        }

        let speed = s.stats.beam_speed;
        let glyph = s.stats.glyph;
        s.beams.push(Beam {
            pos: muzzle,
            heading: self.heading,
            speed,
            glyph,
        });
        s.loaded -= 1;
        s.last_fire = Some(now);
        drop(s);

        let name = match self.heading {
            Heading::AwayFromPlayer => cue::FIRE,
            Heading::TowardPlayer => cue::ENEMY_FIRE,
        };
        audio.play(name, volume);
        FireOutcome::Fired
    }

    /// Manual reload.  Ignored while one is already in flight or when the
    /// magazine is full.  Returns true if a reload was scheduled.
    pub fn reload(&self) -> bool {
        let mut s = lock(&self.state);
        if s.reloading || s.loaded >= s.stats.capacity {
            return false;
        }
        self.start_reload(&mut s);
        true
    }

    /// Cancel an in-flight reload without refilling.  Returns true if one
    /// was pending.
    pub fn cancel_reload(&self) -> bool {
        let mut s = lock(&self.state);
        let pending = s.reloading;
        s.reloading = false;
        s.suspended = false;
        Self::stop_timer(&mut s);
        if pending {
            log::debug!("reload cancelled");
        }
        pending
    }

    /// Freeze an in-flight reload.  Returns true if one was running.
    pub fn suspend_reload(&self) -> bool {
        let mut s = lock(&self.state);
        if !s.reloading || s.suspended {
            return false;
        }
        let ran = s.timer_started.map(|t| t.elapsed()).unwrap_or_default();
        s.reload_left = s.reload_left.saturating_sub(ran);
        s.suspended = true;
        Self::stop_timer(&mut s);
        log::debug!("reload suspended ({} ms left)", s.reload_left.as_millis());
        true
    }

    /// Restart the timer of a suspended reload for the time it still owes.
    pub fn resume_reload(&self) -> bool {
        let mut s = lock(&self.state);
        if !s.reloading || !s.suspended {
            return false;
        }
        s.suspended = false;
        self.schedule(&mut s);
        true
    }

    /// Invalidate the running timer, if any.
    fn stop_timer(s: &mut GunState) {
        s.generation += 1;
        s.timer_started = None;
        if let Some(task) = s.task.take() {
            task.cancel();
        }
    }

    fn start_reload(&self, s: &mut GunState) {
        if s.reloading {
            return;
        }
        s.reloading = true;
        s.suspended = false;
        s.reload_left = s.stats.reload;
        self.schedule(s);
    }

    fn schedule(&self, s: &mut GunState) {
        s.generation += 1;
        let generation = s.generation;
        let delay = s.reload_left;
        s.timer_started = Some(Instant::now());
        log::debug!("reload scheduled ({} ms)", delay.as_millis());

        let (cancel_tx, cancel_rx) = bounded::<()>(1);
        let state = Arc::clone(&self.state);
        let spawned = thread::Builder::new()
            .name("reload".to_string())
            .spawn(move || {
                select! {
                    recv(cancel_rx) -> _ => {
                        log::trace!("reload timer {} stopped", generation);
                    }
                    recv(after(delay)) -> _ => {
                        let mut s = lock(&state);
                        if s.reloading && s.generation == generation {
                            s.loaded = s.stats.capacity;
                            s.reloading = false;
                            s.timer_started = None;
                            s.task = None;
                            log::debug!("reload complete ({} loaded)", s.loaded);
                        }
                    }
                }
            });

        match spawned {
            Ok(handle) => {
                s.task = Some(ReloadTask {
                    cancel: cancel_tx,
                    _handle: Some(handle),
                });
            }
            Err(e) => {
                log::warn!("reload thread unavailable ({}), refilling immediately", e);
                s.loaded = s.stats.capacity;
                s.reloading = false;
                s.timer_started = None;
            }
        }
    }

    // ── Beams ────────────────────────────────────────────────────────────────

    /// Move every beam and drop those that left the visible rows.
    pub fn advance(&self, dt: f32, viewport_height: u16) {
        let mut s = lock(&self.state);
        for beam in s.beams.iter_mut() {
            advance_beam(beam, dt);
        }
        s.beams.retain(|b| !beam_out_of_range(b, viewport_height));
    }

    /// Remove and report the first beam that lands inside `body`.
    pub fn strike(&self, body: &SpatialBody) -> Option<Impact> {
        let mut s = lock(&self.state);
        let index = s.beams.iter().position(|b| point_in_rect(b.pos, body))?;
        let beam = s.beams.remove(index);
        Some(Impact {
            at: beam.pos,
            power: s.stats.power,
        })
    }

    pub fn beams(&self) -> Vec<Beam> {
        lock(&self.state).beams.clone()
    }

    pub fn beam_count(&self) -> usize {
        lock(&self.state).beams.len()
    }

    // ── Upgrades ─────────────────────────────────────────────────────────────

    /// Grow the magazine by `step`, capped at `limits.max_capacity`.
    pub fn upgrade_capacity(&self, step: u32, limits: &GunLimits) -> bool {
        let mut s = lock(&self.state);
        let next = s.stats.capacity.saturating_add(step).min(limits.max_capacity);
        if next <= s.stats.capacity {
            return false;
        }
        s.stats.capacity = next;
        true
    }

    pub fn upgrade_power(&self, step: i32, limits: &GunLimits) -> bool {
        let mut s = lock(&self.state);
        let next = s.stats.power.saturating_add(step).min(limits.max_power);
        if next <= s.stats.power {
            return false;
        }
        s.stats.power = next;
        true
    }

    pub fn upgrade_beam_speed(&self, step: f32, limits: &GunLimits) -> bool {
        let mut s = lock(&self.state);
        let next = (s.stats.beam_speed + step).min(limits.max_beam_speed);
        if next <= s.stats.beam_speed {
            return false;
        }
        s.stats.beam_speed = next;
        true
    }

    /// Shorten the fire cooldown, never below the configured minimum or
    /// `COOLDOWN_FLOOR`.
    pub fn reduce_cooldown(&self, step: Duration, limits: &GunLimits) -> bool {
        let floor = limits.min_cooldown.max(COOLDOWN_FLOOR);
        let mut s = lock(&self.state);
        let next = s.stats.cooldown.saturating_sub(step).max(floor);
        if next >= s.stats.cooldown {
            return false;
        }
        s.stats.cooldown = next;
        true
    }

    pub fn reduce_reload(&self, step: Duration, limits: &GunLimits) -> bool {
        let floor = limits.min_reload.max(COOLDOWN_FLOOR);
        let mut s = lock(&self.state);
        let next = s.stats.reload.saturating_sub(step).max(floor);
        if next >= s.stats.reload {
            return false;
        }
        s.stats.reload = next;
        true
    }
}

impl Drop for Gun {
    fn drop(&mut self) {
        self.cancel_reload();
    }
}
