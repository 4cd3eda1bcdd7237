//! Background stars.  Registered first so everything else draws on top.

use std::any::Any;

use crossterm::style::Color;
use rand::Rng;

use super::uniform;
use crate::compute::{integrate, is_off_screen};
use crate::context::{Canvas, SimContext, Style};
use crate::entities::{EntityKind, Footprint, SpatialBody};
use crate::registry::{Entity, Peers};

const MIN_SPEED: f32 = 2.0;
const MAX_SPEED: f32 = 12.0;

pub struct Star {
    pub body: SpatialBody,
}

impl Star {
    fn glyph(&self) -> char {
        if self.body.speed > 8.0 {
            '|'
        } else if self.body.speed > 4.0 {
            '.'
        } else {
            '·'
        }
    }
}

pub struct StarfieldProducer {
    stars: Vec<Star>,
    capacity: usize,
    seeded: bool,
}

impl StarfieldProducer {
    pub fn new(capacity: usize) -> Self {
        Self {
            stars: Vec::with_capacity(capacity),
            capacity,
            seeded: false,
        }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    fn make_star(ctx: &mut SimContext, y: f32) -> Star {
        let x = uniform(&mut ctx.rng, 0.0, ctx.viewport.width.saturating_sub(1) as f32);
        let speed = ctx.rng.gen_range(MIN_SPEED..MAX_SPEED);
        Star {
            body: SpatialBody::new(x.floor(), y, Footprint::new(1, 1), speed),
        }
    }
}

impl Entity for StarfieldProducer {
    fn update(&mut self, ctx: &mut SimContext, _peers: &mut Peers<'_>) {
        // First tick fills the whole sky so the screen doesn't start empty
        if !self.seeded {
            self.seeded = true;
            let bottom = ctx.viewport.height.saturating_sub(3) as f32;
            for _ in 0..self.capacity {
                let y = uniform(&mut ctx.rng, 0.0, bottom);
                let star = Self::make_star(ctx, y);
                self.stars.push(star);
            }
        }

        let height = ctx.viewport.height;
        for star in self.stars.iter_mut() {
            integrate(&mut star.body, ctx.dt);
        }
        // Recycle rather than reallocate
        for i in 0..self.stars.len() {
            if is_off_screen(self.stars[i].body.pos, height) {
                self.stars[i] = Self::make_star(ctx, 0.0);
            }
        }
        while self.stars.len() < self.capacity {
            let star = Self::make_star(ctx, 0.0);
            self.stars.push(star);
        }
    }

    fn draw(&self, _ctx: &SimContext, canvas: &mut dyn Canvas) {
        let style = Style::fg(Color::DarkGrey);
        for star in &self.stars {
            let (x, y) = star.body.pos.cell();
            canvas.set_cell(x, y, star.glyph(), style);
        }
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Starfield
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
