//! Stat modifiers: weapon upgrades and the occasional free level.

use std::any::Any;
use std::time::Duration;

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
use crate::weapon::GunLimits;

const CAPACITY: usize = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModifierKind {
    Capacity,
    Power,
    BeamSpeed,
    Cooldown,
    Reload,
    LevelUp,
}

impl ModifierKind {
    pub const ALL: [ModifierKind; 6] = [
        ModifierKind::Capacity,
        ModifierKind::Power,
        ModifierKind::BeamSpeed,
        ModifierKind::Cooldown,
        ModifierKind::Reload,
        ModifierKind::LevelUp,
    ];

    /// Letter drawn in place of the design glyph.
    pub fn glyph(&self) -> char {
        match self {
            ModifierKind::Capacity => 'C',
            ModifierKind::Power => 'P',
            ModifierKind::BeamSpeed => 'S',
            ModifierKind::Cooldown => 'F',
            ModifierKind::Reload => 'R',
            ModifierKind::LevelUp => 'L',
        }
    }

    /// Apply to the ship.  Returns false when the stat was already at its bound.
    pub fn apply(&self, player: &PlayerShip, limits: &GunLimits, ctx: &mut SimContext) -> bool {
        let gun = player.gun();
        match self {
            ModifierKind::Capacity => gun.upgrade_capacity(2, limits),
            ModifierKind::Power => gun.upgrade_power(2, limits),
            ModifierKind::BeamSpeed => gun.upgrade_beam_speed(5.0, limits),
            ModifierKind::Cooldown => gun.reduce_cooldown(Duration::from_millis(20), limits),
            ModifierKind::Reload => gun.reduce_reload(Duration::from_millis(200), limits),
            ModifierKind::LevelUp => {
                ctx.progression.force_level_up();
                true
            }
        }
    }
}

pub struct Modifier {
    pub body: SpatialBody,
    pub health: HealthBody,
    pub effect: ModifierKind,
}

pub struct ModifierProducer {
    design: Design,
    pool: Vec<Modifier>,
    limits: GunLimits,
    chance: f64,
    padding: f32,
}

impl ModifierProducer {
    pub fn new(catalog: &Catalog, config: &Config) -> Result<Self, CatalogError> {
        Ok(Self {
            design: catalog.design(DesignKind::Modifier)?.clone(),
            pool: Vec::new(),
            limits: config.gun_limits(),
            chance: config.modifier_chance.clamp(0.0, 1.0),
            padding: config.spawn_padding,
        })
    }

    pub fn members(&self) -> &[Modifier] {
        &self.pool
    }

    pub fn members_mut(&mut self) -> &mut Vec<Modifier> {
        &mut self.pool
    }

    pub fn spawn(&mut self, ctx: &mut SimContext) {
        let effect = ModifierKind::ALL[ctx.rng.gen_range(0..ModifierKind::ALL.len())];
        self.spawn_kind(ctx, effect);
    }

    pub fn spawn_kind(&mut self, ctx: &mut SimContext, effect: ModifierKind) {
        let size = self.design.footprint();
        let lane = pick_lane(&mut ctx.rng, ctx.viewport.width, size.width, self.padding, &[], 0.0, 0);
        let speed = scaled_speed(&mut ctx.rng, self.design.min_speed, self.design.speed, 1, self.design.max_speed);
        self.pool.push(Modifier {
            body: SpatialBody::new(lane.x, SPAWN_ROW, size, speed),
            health: HealthBody::new(self.design.health),
            effect,
        });
    }

    fn collect(&mut self, ctx: &mut SimContext, player: &mut PlayerShip) {
        let color = self.design.tint();
        for item in self.pool.iter_mut() {
            let shot = absorb_fire(player.gun(), &item.body, &mut item.health, ctx, color);
            let touched = !item.health.is_dead() && bodies_overlap(&item.body, player.body());
            if !(shot || touched) {
                continue;
            }
            item.health.kill();
            let applied = item.effect.apply(player, &self.limits, ctx);
            log::debug!("modifier {:?} applied: {}", item.effect, applied);
            ctx.emit(Effect::Explosion {
                at: center_of(&item.body),
                color,
                size: 1,
            });
            ctx.play(cue::PICKUP);
        }
    }
}

impl Entity for ModifierProducer {
    fn update(&mut self, ctx: &mut SimContext, peers: &mut Peers<'_>) {
        for item in self.pool.iter_mut() {
            integrate(&mut item.body, ctx.dt);
        }

        if let Some(player) = peers.find_mut::<PlayerShip>(EntityKind::PlayerShip) {
            self.collect(ctx, player);
        }

        let height = ctx.viewport.height;
        self.pool
            .retain(|m| !m.health.is_dead() && !is_off_screen(m.body.pos, height));

        if self.pool.len() < CAPACITY && ctx.rng.gen_bool(self.chance) {
            self.spawn(ctx);
        }
    }

    fn draw(&self, _ctx: &SimContext, canvas: &mut dyn Canvas) {
        let style = Style::bold(self.design.tint());
        for item in &self.pool {
            let (x, y) = item.body.pos.cell();
            canvas.set_cell(x, y, item.effect.glyph(), style);
        }
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Modifiers
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
