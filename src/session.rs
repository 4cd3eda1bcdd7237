//! Session — builds the registry and runs ticks.
//!
//! Registration order is fixed here and is what every cross-entity rule
//! relies on: stars under everything, the ship before the producers that
//! test its beams, particles after everything that raises effects, HUD last.

use std::time::Duration;

use crate::audio::{cue, Audio, Logged, Silent};
use crate::config::Config;
use crate::context::{Canvas, SessionStatus, SimContext, Viewport};
use crate::design::{Catalog, CatalogError, DesignKind};
use crate::entities::InputEvent;
use crate::overlay::UiOverlay;
use crate::player::PlayerShip;
use crate::producers::{
    AlienProducer, AsteroidProducer, BossProducer, HealthPackProducer, ModifierProducer,
    ParticleSystem, StarfieldProducer,
};
use crate::progression::Progression;
use crate::registry::{Entity, Registry};

/// What the caller should do after feeding an input event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct Session {
    registry: Registry,
    ctx: SimContext,
    catalog: Catalog,
    config: Config,
    ticks: u64,
    /// Level shown at the end of the previous tick.
    last_level: u32,
}

impl Session {
    pub fn new(catalog: Catalog, config: Config, viewport: Viewport, seed: u64) -> Result<Self, CatalogError> {
        let audio: Box<dyn Audio> = if config.sound {
            Box::new(Logged)
        } else {
            Box::new(Silent)
        };
        let mut ctx = SimContext::new(viewport, seed, audio);
        ctx.volume = config.volume.clamp(0.0, 1.0);

        let mut session = Self {
            registry: Registry::new(),
            ctx,
            catalog,
            config,
            ticks: 0,
            last_level: 1,
        };
        session.populate()?;
        log::info!(
            "session started: {}x{}, seed {}",
            viewport.width,
            viewport.height,
            seed
        );
        Ok(session)
    }

    /// Fresh progression and a freshly built entity list.
    fn populate(&mut self) -> Result<(), CatalogError> {
        self.ctx.progression = Progression::new(self.config.points_per_level);
        self.ctx.status = SessionStatus::Playing;
        self.ctx.take_effects();
        self.last_level = self.ctx.progression.level();

        let config = &self.config;
        let catalog = &self.catalog;
        let ctx = &mut self.ctx;

        let mut entities: Vec<Box<dyn Entity>> = Vec::new();
        if config.enable_stars {
            entities.push(Box::new(StarfieldProducer::new(config.star_count)));
        }
        entities.push(Box::new(PlayerShip::new(catalog.design(DesignKind::Player)?, ctx)?));
        entities.push(Box::new(AlienProducer::new(catalog, config, &mut ctx.progression)?));
        if config.enable_boss {
            entities.push(Box::new(BossProducer::new(catalog, config, &mut ctx.progression)?));
        }
        if config.enable_asteroids {
            entities.push(Box::new(AsteroidProducer::new(catalog, config, &mut ctx.progression)?));
        }
        if config.enable_health_packs {
            entities.push(Box::new(HealthPackProducer::new(catalog, config)?));
        }
        if config.enable_modifiers {
            entities.push(Box::new(ModifierProducer::new(catalog, config)?));
        }
        entities.push(Box::new(ParticleSystem::new()));
        entities.push(Box::new(UiOverlay::new()));

        self.registry.add_all(entities);
        Ok(())
    }

    /// Clear and repopulate.  Dropping the old entities drops their guns,
    /// which cancels any reload still in flight.
    pub fn restart(&mut self) -> Result<(), CatalogError> {
        log::info!(
            "restart (previous run: score {}, level {})",
            self.ctx.progression.score(),
            self.ctx.progression.level()
        );
        self.registry.remove_all();
        self.populate()
    }

    pub fn handle_input(&mut self, event: InputEvent) -> Result<Control, CatalogError> {
        match event {
            InputEvent::Quit => return Ok(Control::Quit),
            InputEvent::Restart => self.restart()?,
            InputEvent::Pause => match self.ctx.status {
                SessionStatus::Playing => {
                    self.ctx.status = SessionStatus::Paused;
                    self.registry.set_paused(true);
                }
                SessionStatus::Paused => {
                    self.ctx.status = SessionStatus::Playing;
                    self.registry.set_paused(false);
                }
                SessionStatus::GameOver => {}
            },
            _ => {
                if self.ctx.is_playing() {
                    self.registry.dispatch_input(event, &mut self.ctx);
                }
            }
        }
        Ok(Control::Continue)
    }

    /// One tick: clear, update, draw (or draw, update when configured).
    /// Only `Playing` advances the simulation; other states just redraw.
    pub fn tick(&mut self, dt: Duration, canvas: &mut dyn Canvas) {
        canvas.clear();
        let playing = self.ctx.is_playing();
        if playing {
            self.ctx.advance_clock(dt);
            self.ticks += 1;
        }

        if self.config.draw_before_update {
            self.registry.draw_all(&self.ctx, canvas);
            if playing {
                self.registry.update_all(&mut self.ctx);
            }
        } else {
            if playing {
                self.registry.update_all(&mut self.ctx);
            }
            self.registry.draw_all(&self.ctx, canvas);
        }

        let level = self.ctx.progression.level();
        if level > self.last_level {
            self.last_level = level;
            self.ctx.play(cue::LEVEL_UP);
        }

        // Nothing left to consume effects raised after the particle system ran
        self.ctx.take_effects();
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.ctx.viewport = viewport;
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn ctx(&self) -> &SimContext {
        &self.ctx
    }

    pub fn ctx_mut(&mut self) -> &mut SimContext {
        &mut self.ctx
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn status(&self) -> SessionStatus {
        self.ctx.status
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
