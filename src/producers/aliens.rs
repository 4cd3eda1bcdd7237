//! Alien waves: armed, spaced apart, harder every level.

use std::any::Any;

use rand::Rng;

use super::{absorb_fire, explode, pick_lane, scaled_capacity, scaled_health, scaled_speed, SPAWN_ROW};
use crate::compute::{bodies_overlap, integrate, is_off_screen};
use crate::config::Config;
use crate::context::{Canvas, SimContext, Style};
use crate::design::{Catalog, CatalogError, Design, DesignKind};
use crate::entities::{EntityKind, Heading, HealthBody, Position, SpatialBody};
use crate::player::PlayerShip;
use crate::progression::{LevelWatch, Progression};
use crate::registry::{Entity, Peers};
use crate::weapon::{Gun, GunStats};

pub struct Alien {
    pub body: SpatialBody,
    pub health: HealthBody,
    pub gun: Option<Gun>,
    variant: usize,
}

impl Alien {
    fn muzzle(&self) -> Position {
        Position::new(
            self.body.center_x().floor(),
            self.body.pos.y + self.body.size.height as f32,
        )
    }
}

pub struct AlienProducer {
    designs: Vec<Design>,
    pool: Vec<Alien>,
    starting: usize,
    max: usize,
    level: LevelWatch,
    applied_level: u32,
    capacity: usize,
    spacing: f32,
    padding: f32,
    retries: u32,
    fire_chance: f64,
}

impl AlienProducer {
    pub fn new(
        catalog: &Catalog,
        config: &Config,
        progression: &mut Progression,
    ) -> Result<Self, CatalogError> {
        let level = LevelWatch::subscribe(progression);
        let applied_level = level.get();
        Ok(Self {
            designs: catalog.designs(DesignKind::Alien)?.to_vec(),
            pool: Vec::new(),
            starting: config.starting_aliens,
            max: config.max_aliens,
            capacity: scaled_capacity(config.starting_aliens, config.max_aliens, applied_level, 1),
            level,
            applied_level,
            spacing: config.alien_spacing,
            padding: config.spawn_padding,
            retries: config.placement_retries,
            fire_chance: config.alien_fire_chance,
        })
    }

    pub fn members(&self) -> &[Alien] {
        &self.pool
    }

    pub fn members_mut(&mut self) -> &mut Vec<Alien> {
        &mut self.pool
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn level(&self) -> u32 {
        self.applied_level
    }

    fn rescale(&mut self) {
        let level = self.level.get();
        if level != self.applied_level {
            self.applied_level = level;
            self.capacity = scaled_capacity(self.starting, self.max, level, 1);
            log::debug!("aliens rescaled: level {} capacity {}", level, self.capacity);
        }
    }

    /// Gun stats for a spawn at `level`: one extra point of power per level.
    fn gun_for(design: &Design, level: u32) -> Option<Gun> {
        let weapon = design.weapon.as_ref()?;
        let base = weapon.stats();
        let stats = GunStats {
            power: base.power + level.saturating_sub(1) as i32,
            ..base
        };
        Some(Gun::new(stats, Heading::TowardPlayer))
    }

    /// Spawn one alien at a lane clear of every live peer.
    pub fn spawn(&mut self, ctx: &mut SimContext) {
        let level = self.applied_level;
        let variant = ctx.rng.gen_range(0..self.designs.len());
        let design = &self.designs[variant];
        let size = design.footprint();
        let occupied: Vec<f32> = self.pool.iter().map(|a| a.body.pos.x).collect();
        let lane = pick_lane(
            &mut ctx.rng,
            ctx.viewport.width,
            size.width,
            self.padding,
            &occupied,
            self.spacing,
            self.retries,
        );
        let speed = scaled_speed(&mut ctx.rng, design.min_speed, design.speed, level, design.max_speed);
        self.pool.push(Alien {
            body: SpatialBody::new(lane.x, SPAWN_ROW, size, speed),
            health: HealthBody::new(scaled_health(design.health, level)),
            gun: Self::gun_for(design, level),
            variant,
        });
    }

    fn collide(&mut self, ctx: &mut SimContext, player: &mut PlayerShip) {
        for alien in self.pool.iter_mut() {
            let design = &self.designs[alien.variant];
            let color = design.tint();

            if absorb_fire(player.gun(), &alien.body, &mut alien.health, ctx, color) {
                ctx.progression.record_kill(design.points);
                explode(ctx, &alien.body, color);
                continue;
            }

            if let Some(gun) = &alien.gun {
                while let Some(impact) = gun.strike(player.body()) {
                    player.take_hit(impact.power, impact.at, ctx);
                }
            }

            if !alien.health.is_dead() && bodies_overlap(&alien.body, player.body()) {
                player.take_hit(design.impact, alien.body.pos, ctx);
                if alien.health.damage(player.impact()) {
                    ctx.progression.record_kill(design.points);
                    explode(ctx, &alien.body, color);
                }
            }
        }
    }
}

impl Entity for AlienProducer {
    fn update(&mut self, ctx: &mut SimContext, peers: &mut Peers<'_>) {
        self.rescale();

        let dt = ctx.dt;
        let height = ctx.viewport.height;
        for alien in self.pool.iter_mut() {
            integrate(&mut alien.body, dt);
            if let Some(gun) = &alien.gun {
                gun.advance(dt, height);
                if ctx.rng.gen_bool(self.fire_chance.clamp(0.0, 1.0)) {
                    gun.fire(ctx.elapsed, alien.muzzle(), ctx.audio.as_ref(), ctx.volume);
                }
            }
        }

        if let Some(player) = peers.find_mut::<PlayerShip>(EntityKind::PlayerShip) {
            self.collide(ctx, player);
        }

        self.pool
            .retain(|a| !a.health.is_dead() && !is_off_screen(a.body.pos, height));

        if self.pool.len() < self.capacity {
            self.spawn(ctx);
        }
    }

    fn draw(&self, _ctx: &SimContext, canvas: &mut dyn Canvas) {
        for alien in &self.pool {
            let design = &self.designs[alien.variant];
            let style = Style::fg(design.tint());
            if let Some(gun) = &alien.gun {
                for beam in gun.beams() {
                    let (x, y) = beam.pos.cell();
                    canvas.set_cell(x, y, beam.glyph, style);
                }
            }
            canvas.put_shape(alien.body.pos, &design.shape, style);
        }
    }

    fn set_paused(&mut self, paused: bool) {
        for gun in self.pool.iter().filter_map(|a| a.gun.as_ref()) {
            if paused {
                gun.suspend_reload();
            } else {
                gun.resume_reload();
            }
        }
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Aliens
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
