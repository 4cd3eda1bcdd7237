//! Falling rocks.  Shootable for points; ramming the ship hurts both sides.

use std::any::Any;

use rand::Rng;

use super::{absorb_fire, explode, pick_lane, scaled_capacity, scaled_health, scaled_speed, SPAWN_ROW};
use crate::compute::{bodies_overlap, integrate, is_off_screen};
use crate::config::Config;
use crate::context::{Canvas, SimContext, Style};
use crate::design::{Catalog, CatalogError, Design, DesignKind};
use crate::entities::{EntityKind, HealthBody, SpatialBody};
use crate::player::PlayerShip;
use crate::progression::{LevelWatch, Progression};
use crate::registry::{Entity, Peers};

pub struct Asteroid {
    pub body: SpatialBody,
    pub health: HealthBody,
    variant: usize,
}

pub struct AsteroidProducer {
    designs: Vec<Design>,
    pool: Vec<Asteroid>,
    starting: usize,
    max: usize,
    capacity: usize,
    padding: f32,
    level: LevelWatch,
    applied_level: u32,
}

impl AsteroidProducer {
    pub fn new(
        catalog: &Catalog,
        config: &Config,
        progression: &mut Progression,
    ) -> Result<Self, CatalogError> {
        let level = LevelWatch::subscribe(progression);
        let applied_level = level.get();
        Ok(Self {
            designs: catalog.designs(DesignKind::Asteroid)?.to_vec(),
            pool: Vec::new(),
            starting: config.starting_asteroids,
            max: config.max_asteroids,
            capacity: scaled_capacity(config.starting_asteroids, config.max_asteroids, applied_level, 2),
            padding: config.spawn_padding,
            level,
            applied_level,
        })
    }

    pub fn members(&self) -> &[Asteroid] {
        &self.pool
    }

    pub fn members_mut(&mut self) -> &mut Vec<Asteroid> {
        &mut self.pool
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn rescale(&mut self) {
        let level = self.level.get();
        if level != self.applied_level {
            self.applied_level = level;
            self.capacity = scaled_capacity(self.starting, self.max, level, 2);
        }
    }

    pub fn spawn(&mut self, ctx: &mut SimContext) {
        let level = self.applied_level;
        let variant = ctx.rng.gen_range(0..self.designs.len());
        let design = &self.designs[variant];
        let size = design.footprint();
        let lane = pick_lane(&mut ctx.rng, ctx.viewport.width, size.width, self.padding, &[], 0.0, 0);
        let speed = scaled_speed(&mut ctx.rng, design.min_speed, design.speed, level, design.max_speed);
        self.pool.push(Asteroid {
            body: SpatialBody::new(lane.x, SPAWN_ROW, size, speed),
            health: HealthBody::new(scaled_health(design.health, level)),
            variant,
        });
    }

    fn collide(&mut self, ctx: &mut SimContext, player: &mut PlayerShip) {
        for rock in self.pool.iter_mut() {
            let design = &self.designs[rock.variant];
            let color = design.tint();

            if absorb_fire(player.gun(), &rock.body, &mut rock.health, ctx, color) {
                ctx.progression.record_kill(design.points);
                explode(ctx, &rock.body, color);
                continue;
            }

            if !rock.health.is_dead() && bodies_overlap(&rock.body, player.body()) {
                let at = super::center_of(&rock.body);
                player.take_hit(design.impact, at, ctx);
                if rock.health.damage(player.impact()) {
                    ctx.progression.record_kill(design.points);
                }
                explode(ctx, &rock.body, color);
            }
        }
    }
}

impl Entity for AsteroidProducer {
    fn update(&mut self, ctx: &mut SimContext, peers: &mut Peers<'_>) {
        self.rescale();

        for rock in self.pool.iter_mut() {
            integrate(&mut rock.body, ctx.dt);
        }

        if let Some(player) = peers.find_mut::<PlayerShip>(EntityKind::PlayerShip) {
            self.collide(ctx, player);
        }

        let height = ctx.viewport.height;
        self.pool
            .retain(|r| !r.health.is_dead() && !is_off_screen(r.body.pos, height));

        if self.pool.len() < self.capacity {
            self.spawn(ctx);
        }
    }

    fn draw(&self, _ctx: &SimContext, canvas: &mut dyn Canvas) {
        for rock in &self.pool {
            let design = &self.designs[rock.variant];
            canvas.put_shape(rock.body.pos, &design.shape, Style::fg(design.tint()));
        }
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Asteroids
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
