//! Falling med-kits.  Shooting one or flying into it repairs the ship.

use std::any::Any;

use rand::Rng;

use super::{absorb_fire, center_of, pick_lane, scaled_speed, SPAWN_ROW};
use crate::audio::cue;
use crate::compute::{bodies_overlap, integrate, is_off_screen};
use crate::config::Config;
use crate::context::{Canvas, Effect, SimContext, Style};
use crate::design::{Catalog, CatalogError, Design, DesignKind};
use crate::entities::{EntityKind, HealthBody, SpatialBody};
use crate::player::PlayerShip;
use crate::registry::{Entity, Peers};

/// Live kits on screen at once.
const CAPACITY: usize = 1;

pub struct HealthPack {
    pub body: SpatialBody,
    pub health: HealthBody,
}

pub struct HealthPackProducer {
    design: Design,
    pool: Vec<HealthPack>,
    chance: f64,
    padding: f32,
}

impl HealthPackProducer {
    pub fn new(catalog: &Catalog, config: &Config) -> Result<Self, CatalogError> {
        Ok(Self {
            design: catalog.design(DesignKind::HealthPack)?.clone(),
            pool: Vec::new(),
            chance: config.health_pack_chance.clamp(0.0, 1.0),
            padding: config.spawn_padding,
        })
    }

    pub fn members(&self) -> &[HealthPack] {
        &self.pool
    }

    pub fn members_mut(&mut self) -> &mut Vec<HealthPack> {
        &mut self.pool
    }

    pub fn spawn(&mut self, ctx: &mut SimContext) {
        let size = self.design.footprint();
        let lane = pick_lane(&mut ctx.rng, ctx.viewport.width, size.width, self.padding, &[], 0.0, 0);
        let speed = scaled_speed(&mut ctx.rng, self.design.min_speed, self.design.speed, 1, self.design.max_speed);
        self.pool.push(HealthPack {
            body: SpatialBody::new(lane.x, SPAWN_ROW, size, speed),
            health: HealthBody::new(self.design.health),
        });
    }

    fn collect(&mut self, ctx: &mut SimContext, player: &mut PlayerShip) {
        let color = self.design.tint();
        for kit in self.pool.iter_mut() {
            let shot = absorb_fire(player.gun(), &kit.body, &mut kit.health, ctx, color);
            let touched = !kit.health.is_dead() && bodies_overlap(&kit.body, player.body());
            if !(shot || touched) {
                continue;
            }
            kit.health.kill();
            let restored = player.heal(self.design.restore);
            if self.design.points > 0 {
                ctx.progression.add_points(self.design.points);
            }
            ctx.emit(Effect::Explosion {
                at: center_of(&kit.body),
                color,
                size: 1,
            });
            ctx.play(cue::PICKUP);
            log::debug!("health pack restored {}", restored);
        }
    }
}

impl Entity for HealthPackProducer {
    fn update(&mut self, ctx: &mut SimContext, peers: &mut Peers<'_>) {
        for kit in self.pool.iter_mut() {
            integrate(&mut kit.body, ctx.dt);
        }

        if let Some(player) = peers.find_mut::<PlayerShip>(EntityKind::PlayerShip) {
            self.collect(ctx, player);
        }

        let height = ctx.viewport.height;
        self.pool
            .retain(|k| !k.health.is_dead() && !is_off_screen(k.body.pos, height));

        if self.pool.len() < CAPACITY && ctx.rng.gen_bool(self.chance) {
            self.spawn(ctx);
        }
    }

    fn draw(&self, _ctx: &SimContext, canvas: &mut dyn Canvas) {
        let style = Style::bold(self.design.tint());
        for kit in &self.pool {
            canvas.put_shape(kit.body.pos, &self.design.shape, style);
        }
    }

    fn kind(&self) -> EntityKind {
        EntityKind::HealthPacks
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
