//! Boss encounters.
//!
//! At most one boss is alive.  One is queued whenever the level reaches a
//! multiple of `boss_every_levels`; it tracks the ship from above instead of
//! falling, and keeps firing as fast as its gun allows.

use std::any::Any;

use super::{absorb_fire, explode, scaled_health, SPAWN_ROW};
use crate::compute::{clamp_to_viewport, seek_target, SEEK_TOLERANCE_X, SEEK_TOLERANCE_Y};
use crate::config::Config;
use crate::context::{Canvas, SimContext, Style};
use crate::design::{Catalog, CatalogError, Design, DesignKind};
use crate::entities::{EntityKind, Heading, HealthBody, Position, SpatialBody};
use crate::player::PlayerShip;
use crate::progression::{LevelWatch, Progression};
use crate::registry::{Entity, Peers};
use crate::weapon::Gun;

/// Rows kept between the boss and the ship it hunts.
pub const HOVER_OFFSET: f32 = 12.0;

pub struct Boss {
    pub body: SpatialBody,
    pub health: HealthBody,
    pub gun: Gun,
    level: u32,
}

pub struct BossProducer {
    design: Design,
    boss: Option<Boss>,
    pending: bool,
    every: u32,
    level: LevelWatch,
    applied_level: u32,
}

impl BossProducer {
    pub fn new(
        catalog: &Catalog,
        config: &Config,
        progression: &mut Progression,
    ) -> Result<Self, CatalogError> {
        let design = catalog.design(DesignKind::Boss)?.clone();
        if design.weapon.is_none() {
            return Err(CatalogError::Invalid(format!("boss design '{}' has no weapon", design.name)));
        }
        let level = LevelWatch::subscribe(progression);
        let applied_level = level.get();
        Ok(Self {
            design,
            boss: None,
            pending: false,
            every: config.boss_every_levels.max(1),
            level,
            applied_level,
        })
    }

    pub fn boss(&self) -> Option<&Boss> {
        self.boss.as_ref()
    }

    pub fn boss_mut(&mut self) -> Option<&mut Boss> {
        self.boss.as_mut()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Queue a boss for every boss level crossed since the last tick.
    fn rescale(&mut self) {
        let level = self.level.get();
        if level > self.applied_level {
            let crossed = (self.applied_level + 1..=level).any(|l| l % self.every == 0);
            if crossed {
                self.pending = true;
            }
            self.applied_level = level;
        }
    }

    /// Boss stats scale with the level it appears on.
    pub fn spawn(&mut self, ctx: &mut SimContext) {
        let level = self.applied_level;
        let size = self.design.footprint();
        let x = ((ctx.viewport.width as f32 - size.width as f32) / 2.0).max(0.0);
        let speed = {
            let s = self.design.speed + level as f32;
            if self.design.max_speed > 0.0 {
                s.min(self.design.max_speed)
            } else {
                s
            }
        };
        let Some(weapon) = self.design.weapon.as_ref() else {
            return;
        };
        let mut stats = weapon.stats();
        stats.power += level.saturating_sub(1) as i32;
        self.boss = Some(Boss {
            body: SpatialBody::new(x, SPAWN_ROW, size, speed),
            health: HealthBody::new(scaled_health(self.design.health, level)),
            gun: Gun::new(stats, Heading::TowardPlayer),
            level,
        });
        self.pending = false;
        log::info!("boss '{}' spawned at level {}", self.design.name, level);
    }

    fn engage(&mut self, ctx: &mut SimContext, player: &mut PlayerShip) {
        let Some(boss) = self.boss.as_mut() else { return };
        let color = self.design.tint();

        seek_target(
            &mut boss.body,
            player.body(),
            HOVER_OFFSET,
            (SEEK_TOLERANCE_X, SEEK_TOLERANCE_Y),
            ctx.dt,
        );
        let vp = ctx.viewport;
        clamp_to_viewport(&mut boss.body, vp.width, SPAWN_ROW, vp.height as f32);

        if absorb_fire(player.gun(), &boss.body, &mut boss.health, ctx, color) {
            ctx.progression
                .record_kill(self.design.points.saturating_mul(boss.level.max(1)));
            explode(ctx, &boss.body, color);
            log::info!("boss '{}' destroyed", self.design.name);
            return;
        }

        let muzzle = Position::new(
            boss.body.center_x().floor(),
            boss.body.pos.y + boss.body.size.height as f32,
        );
        boss.gun.fire(ctx.elapsed, muzzle, ctx.audio.as_ref(), ctx.volume);

        while let Some(impact) = boss.gun.strike(player.body()) {
            player.take_hit(impact.power, impact.at, ctx);
        }
    }
}

impl Entity for BossProducer {
    fn update(&mut self, ctx: &mut SimContext, peers: &mut Peers<'_>) {
        self.rescale();

        if let Some(boss) = &self.boss {
            boss.gun.advance(ctx.dt, ctx.viewport.height);
        }

        if let Some(player) = peers.find_mut::<PlayerShip>(EntityKind::PlayerShip) {
            self.engage(ctx, player);
        }

        if self.boss.as_ref().is_some_and(|b| b.health.is_dead()) {
            self.boss = None;
        }

        if self.pending && self.boss.is_none() {
            self.spawn(ctx);
        }
    }

    fn draw(&self, _ctx: &SimContext, canvas: &mut dyn Canvas) {
        let Some(boss) = &self.boss else { return };
        let style = Style::bold(self.design.tint());
        for beam in boss.gun.beams() {
            let (x, y) = beam.pos.cell();
            canvas.set_cell(x, y, beam.glyph, style);
        }
        canvas.put_shape(boss.body.pos, &self.design.shape, style);

        // Health bar on the row above the hull
        let width = boss.body.size.width as i32;
        let filled = (boss.health.current().max(0) as i64 * width as i64
            / boss.health.max().max(1) as i64) as i32;
        let (x, y) = boss.body.pos.cell();
        for i in 0..width {
            let glyph = if i < filled { '=' } else { '-' };
            canvas.set_cell(x + i, y - 1, glyph, style);
        }
    }

    fn set_paused(&mut self, paused: bool) {
        let Some(boss) = &self.boss else { return };
        if paused {
            boss.gun.suspend_reload();
        } else {
            boss.gun.resume_reload();
        }
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Boss
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
