//! The player ship.
//!
//! Moves on input, fires up the screen, and is the target every producer
//! looks up by kind.  Its beams are advanced during its own update, which is
//! why it must be registered ahead of the producers that test against them.

use std::any::Any;

use crossterm::style::Color;

use crate::audio::cue;
use crate::compute::clamp_to_viewport;
use crate::context::{Canvas, Effect, SimContext, SessionStatus, Style};
use crate::design::{CatalogError, Design};
use crate::entities::{EntityKind, Heading, HealthBody, InputEvent, Position, SpatialBody};
use crate::registry::{Entity, Peers};
use crate::weapon::{FireOutcome, Gun};

/// Cells moved per horizontal / vertical input event.
const STEP_X: f32 = 2.0;
const STEP_Y: f32 = 1.0;

/// Rows reserved at the bottom (ammo line + margin).
const BOTTOM_RESERVED: f32 = 2.0;

const C_BEAM: Color = Color::Cyan;

pub struct PlayerShip {
    body: SpatialBody,
    health: HealthBody,
    gun: Gun,
    shape: Vec<String>,
    color: Color,
    impact: i32,
    wrecked: bool,
}

impl PlayerShip {
    /// Ship centred on the bottom rows of `ctx.viewport`.
    pub fn new(design: &Design, ctx: &SimContext) -> Result<Self, CatalogError> {
        let weapon = design.weapon.as_ref().ok_or_else(|| {
            CatalogError::Invalid(format!("player design '{}' has no weapon", design.name))
        })?;
        let size = design.footprint();
        let vp = ctx.viewport;
        let x = (vp.width as f32 - size.width as f32) / 2.0;
        let y = vp.height as f32 - size.height as f32 - BOTTOM_RESERVED;
        Ok(Self {
            body: SpatialBody::new(x.floor().max(0.0), y.max(1.0), size, design.speed),
            health: HealthBody::new(design.health),
            gun: Gun::new(weapon.stats(), Heading::AwayFromPlayer),
            shape: design.shape.clone(),
            color: design.tint(),
            impact: design.impact,
            wrecked: false,
        })
    }

    pub fn body(&self) -> &SpatialBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut SpatialBody {
        &mut self.body
    }

    pub fn health(&self) -> &HealthBody {
        &self.health
    }

    pub fn gun(&self) -> &Gun {
        &self.gun
    }

    /// Damage this ship deals when something rams it.
    pub fn impact(&self) -> i32 {
        self.impact
    }

    pub fn is_dead(&self) -> bool {
        self.health.is_dead()
    }

    /// Take `power` damage with a spark at `at`.
    pub fn take_hit(&mut self, power: i32, at: Position, ctx: &mut SimContext) {
        self.health.damage(power);
        ctx.emit(Effect::Spark {
            at,
            color: self.color,
        });
        ctx.play(cue::IMPACT);
    }

    pub fn heal(&mut self, amount: i32) -> i32 {
        self.health.heal(amount)
    }

    /// Muzzle sits one row above the ship's centre column.
    fn muzzle(&self) -> Position {
        Position::new(self.body.center_x().floor(), self.body.pos.y - 1.0)
    }

    fn clamp(&mut self, ctx: &SimContext) {
        let vp = ctx.viewport;
        clamp_to_viewport(&mut self.body, vp.width, 1.0, vp.height as f32 - BOTTOM_RESERVED);
    }
}

impl Entity for PlayerShip {
    fn update(&mut self, ctx: &mut SimContext, _peers: &mut Peers<'_>) {
        self.gun.advance(ctx.dt, ctx.viewport.height);
        self.clamp(ctx);

        if self.health.is_dead() && !self.wrecked {
            self.wrecked = true;
            crate::producers::explode(ctx, &self.body, self.color);
            ctx.status = SessionStatus::GameOver;
            log::info!(
                "ship destroyed at level {} with score {}",
                ctx.progression.level(),
                ctx.progression.score()
            );
        }
    }

    fn draw(&self, _ctx: &SimContext, canvas: &mut dyn Canvas) {
        let beam_style = Style::fg(C_BEAM);
        for beam in self.gun.beams() {
            let (x, y) = beam.pos.cell();
            canvas.set_cell(x, y, beam.glyph, beam_style);
        }
        if !self.wrecked {
            canvas.put_shape(self.body.pos, &self.shape, Style::bold(self.color));
        }
    }

    fn handle_input(&mut self, event: InputEvent, ctx: &mut SimContext) {
        if self.wrecked {
            return;
        }
        match event {
            InputEvent::Left => self.body.pos.x -= STEP_X,
            InputEvent::Right => self.body.pos.x += STEP_X,
            InputEvent::Up => self.body.pos.y -= STEP_Y,
            InputEvent::Down => self.body.pos.y += STEP_Y,
            InputEvent::Fire => {
                let outcome = self.gun.fire(ctx.elapsed, self.muzzle(), ctx.audio.as_ref(), ctx.volume);
                if outcome == FireOutcome::ReloadTriggered {
                    ctx.play(cue::RELOAD);
                }
            }
            InputEvent::Reload => {
                if self.gun.reload() {
                    ctx.play(cue::RELOAD);
                }
            }
            _ => {}
        }
        self.clamp(ctx);
    }

    fn set_paused(&mut self, paused: bool) {
        if paused {
            self.gun.suspend_reload();
        } else {
            self.gun.resume_reload();
        }
    }

    fn kind(&self) -> EntityKind {
        EntityKind::PlayerShip
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
