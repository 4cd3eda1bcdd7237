//! Sparks and explosions.
//!
//! Drains the effect queue on the context, so it has to be registered after
//! every producer that raises effects.

use std::any::Any;

use crossterm::style::Color;
use rand::Rng;

use crate::context::{Canvas, Effect, SimContext, Style};
use crate::entities::{EntityKind, Position};
use crate::registry::{Entity, Peers};

/// Hard cap on live particles.
pub const MAX_PARTICLES: usize = 256;

const SPARK_LIFE: f32 = 0.25;
const EXPLOSION_LIFE: f32 = 0.6;

#[derive(Clone, Debug)]
pub struct Particle {
    pub pos: Position,
    pub vx: f32,
    pub vy: f32,
    /// Seconds alive so far.
    pub age: f32,
    /// Seconds until it disappears.
    pub life: f32,
    pub color: Color,
}

impl Particle {
    fn glyph(&self) -> char {
        let t = self.age / self.life;
        if t < 0.3 {
            '*'
        } else if t < 0.7 {
            '+'
        } else {
            '.'
        }
    }
}

#[derive(Default)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    fn burst(&mut self, rng: &mut impl Rng, at: Position, color: Color, count: usize, speed: f32, life: f32) {
        for _ in 0..count {
            if self.particles.len() >= MAX_PARTICLES {
                return;
            }
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let s = rng.gen_range(speed * 0.3..=speed);
            self.particles.push(Particle {
                pos: at,
                vx: angle.cos() * s * 2.0, // cells are roughly twice as tall as wide
                vy: angle.sin() * s,
                age: 0.0,
                life: rng.gen_range(life * 0.5..=life),
                color,
            });
        }
    }

    pub fn spawn(&mut self, ctx: &mut SimContext, effect: Effect) {
        match effect {
            Effect::Spark { at, color } => self.burst(&mut ctx.rng, at, color, 3, 6.0, SPARK_LIFE),
            Effect::Explosion { at, color, size } => {
                let count = 4 + size as usize * 3;
                self.burst(&mut ctx.rng, at, color, count, 8.0, EXPLOSION_LIFE)
            }
        }
    }
}

impl Entity for ParticleSystem {
    fn update(&mut self, ctx: &mut SimContext, _peers: &mut Peers<'_>) {
        for effect in ctx.take_effects() {
            self.spawn(ctx, effect);
        }

        let dt = ctx.dt;
        for p in self.particles.iter_mut() {
            p.pos.x += p.vx * dt;
            p.pos.y += p.vy * dt;
            p.age += dt;
        }
        self.particles.retain(|p| p.age < p.life);
    }

    fn draw(&self, _ctx: &SimContext, canvas: &mut dyn Canvas) {
        for p in &self.particles {
            let (x, y) = p.pos.cell();
            canvas.set_cell(x, y, p.glyph(), Style::fg(p.color));
        }
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Particles
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
