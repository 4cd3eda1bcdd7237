//! Simulation context threaded through every entity call.
//!
//! Holds what used to be ambient global state in a typical game loop: the
//! viewport, the shared clock, the RNG, the sound sink, progression and the
//! queue of visual effects raised during a tick.

use std::time::Duration;

use crossterm::style::Color;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::audio::{Audio, Silent};
use crate::entities::Position;
use crate::progression::{Progression, DEFAULT_POINTS_PER_LEVEL};

/// Terminal size in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Per-cell style.  Only the foreground colour is used by the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Style {
    pub fg: Color,
    pub bold: bool,
}

impl Style {
    pub fn fg(fg: Color) -> Self {
        Self { fg, bold: false }
    }

    pub fn bold(fg: Color) -> Self {
        Self { fg, bold: true }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::fg(Color::White)
    }
}

/// Rendering primitive.  Cells outside the viewport are ignored by
/// implementations, so callers may draw partially visible shapes freely.
pub trait Canvas {
    fn set_cell(&mut self, x: i32, y: i32, glyph: char, style: Style);
    fn viewport(&self) -> Viewport;
    /// Blank every cell.
    fn clear(&mut self);

    /// Draw a string left to right starting at `(x, y)`.
    fn put_str(&mut self, x: i32, y: i32, text: &str, style: Style) {
        for (i, ch) in text.chars().enumerate() {
            self.set_cell(x + i as i32, y, ch, style);
        }
    }

    /// Draw a glyph grid; spaces are transparent.
    fn put_shape(&mut self, pos: Position, shape: &[String], style: Style) {
        let (x, y) = pos.cell();
        for (row, line) in shape.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                if ch != ' ' {
                    self.set_cell(x + col as i32, y + row as i32, ch, style);
                }
            }
        }
    }
}

/// Visual side effects raised by collision code, consumed by the particle
/// system later in the same tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    Spark { at: Position, color: Color },
    Explosion { at: Position, color: Color, size: u8 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Playing,
    Paused,
    GameOver,
}

pub struct SimContext {
    pub viewport: Viewport,
    /// Seconds since the previous tick.
    pub dt: f32,
    /// Simulation clock; advanced by `dt` every tick.
    pub elapsed: Duration,
    pub rng: StdRng,
    pub audio: Box<dyn Audio>,
    pub volume: f32,
    pub progression: Progression,
    pub status: SessionStatus,
    effects: Vec<Effect>,
}

impl SimContext {
    pub fn new(viewport: Viewport, seed: u64, audio: Box<dyn Audio>) -> Self {
        Self {
            viewport,
            dt: 0.0,
            elapsed: Duration::ZERO,
            rng: StdRng::seed_from_u64(seed),
            audio,
            volume: 0.8,
            progression: Progression::new(DEFAULT_POINTS_PER_LEVEL),
            status: SessionStatus::Playing,
            effects: Vec::new(),
        }
    }

    /// Silent context, handy for tools and tests.
    pub fn headless(viewport: Viewport, seed: u64) -> Self {
        Self::new(viewport, seed, Box::new(Silent))
    }

    /// Advance the shared clock by one tick of `dt`.
    pub fn advance_clock(&mut self, dt: Duration) {
        self.dt = dt.as_secs_f32();
        self.elapsed += dt;
    }

    pub fn play(&self, name: &str) {
        self.audio.play(name, self.volume);
    }

    pub fn emit(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn pending_effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn is_playing(&self) -> bool {
        self.status == SessionStatus::Playing
    }
}
