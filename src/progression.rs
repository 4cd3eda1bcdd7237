//! Score, kills and level.
//!
//! Level is derived from score through a triangular threshold curve, so the
//! gap between levels grows as the run goes on.  Producers subscribe at
//! construction and get told about every level they did not see yet; they
//! never ask each other.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

pub const DEFAULT_POINTS_PER_LEVEL: u32 = 100;

pub type LevelUpCallback = Box<dyn FnMut(u32) + Send>;

pub struct Progression {
    score: u64,
    kills: u32,
    level: u32,
    points_per_level: u32,
    subscribers: Vec<LevelUpCallback>,
}

impl fmt::Debug for Progression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progression")
            .field("score", &self.score)
            .field("kills", &self.kills)
            .field("level", &self.level)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Progression {
    pub fn new(points_per_level: u32) -> Self {
        Self {
            score: 0,
            kills: 0,
            level: 1,
            points_per_level: points_per_level.max(1),
            subscribers: Vec::new(),
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Score needed to reach `level`: `points_per_level * (level-1) * level / 2`.
    pub fn threshold(&self, level: u32) -> u64 {
        let n = level.max(1) as u64;
        self.points_per_level as u64 * (n - 1) * n / 2
    }

    /// Level implied by `score`.
    pub fn level_for(&self, score: u64) -> u32 {
        let mut level = 1;
        while self.threshold(level + 1) <= score {
            level += 1;
        }
        level
    }

    pub fn subscribe(&mut self, callback: LevelUpCallback) {
        self.subscribers.push(callback);
    }

    /// Add points.  Returns the new level if at least one threshold was
    /// crossed.
    pub fn add_points(&mut self, points: u32) -> Option<u32> {
        self.score += points as u64;
        self.sync_level()
    }

    /// A confirmed kill credited to the player.
    pub fn record_kill(&mut self, points: u32) -> Option<u32> {
        self.kills += 1;
        self.add_points(points)
    }

    /// Jump straight to the next level by topping the score up to its
    /// threshold, which keeps level a function of score.
    pub fn force_level_up(&mut self) -> u32 {
        let next = self.threshold(self.level + 1);
        self.score = self.score.max(next);
        self.sync_level();
        self.level
    }

    fn sync_level(&mut self) -> Option<u32> {
        let target = self.level_for(self.score);
        if target <= self.level {
            return None;
        }
        for level in self.level + 1..=target {
            log::info!("level up → {} (score {})", level, self.score);
            for callback in self.subscribers.iter_mut() {
                callback(level);
            }
        }
        self.level = target;
        Some(target)
    }
}

/// Latest level a producer has been told about.  The subscribed callback
/// stores into it; the producer polls it on its own tick.
#[derive(Clone, Debug)]
pub struct LevelWatch(Arc<AtomicU32>);

impl Default for LevelWatch {
    fn default() -> Self {
        Self(Arc::new(AtomicU32::new(1)))
    }
}

impl LevelWatch {
    /// Create a watch seeded with `progression`'s current level and
    /// subscribe it for every later level-up.
    pub fn subscribe(progression: &mut Progression) -> Self {
        let watch = Self(Arc::new(AtomicU32::new(progression.level())));
        let sink = watch.clone();
        progression.subscribe(Box::new(move |level| sink.set(level)));
        watch
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }

    pub fn set(&self, level: u32) {
        self.0.fetch_max(level, Ordering::AcqRel);
    }
}
