//! Producers — one per enemy/pickup/background category.
//!
//! A producer owns a bounded pool of live instances, spawns new ones under
//! placement and rate rules, drives their movement and collisions each tick
//! and compacts out the dead and the off-screen.

pub mod aliens;
pub mod asteroids;
pub mod boss;
pub mod health_packs;
pub mod modifiers;
pub mod particles;
pub mod starfield;

pub use aliens::{Alien, AlienProducer};
pub use asteroids::AsteroidProducer;
pub use boss::BossProducer;
pub use health_packs::HealthPackProducer;
pub use modifiers::{Modifier, ModifierKind, ModifierProducer};
pub use particles::ParticleSystem;
pub use starfield::StarfieldProducer;

use crossterm::style::Color;
use rand::Rng;

use crate::audio::cue;
use crate::context::{Effect, SimContext};
use crate::entities::{HealthBody, Position, SpatialBody};
use crate::weapon::Gun;

/// Row new falling bodies appear on (row 0 belongs to the HUD).
pub const SPAWN_ROW: f32 = 1.0;

// ── Placement ────────────────────────────────────────────────────────────────

/// Where a spawn landed and whether it honoured the spacing rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub x: f32,
    /// False when every retry collided and the lane was picked unconstrained.
    pub spaced: bool,
}

/// Uniform draw over `[lo, hi]` that tolerates an empty or inverted range.
pub fn uniform(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.gen_range(lo..=hi)
    } else {
        lo
    }
}

/// Pick a spawn column in `[padding, width - padding - body_width]`.
///
/// With `spacing > 0` each candidate is kept if it sits more than `spacing`
/// columns from every `occupied` column; a rejected one is redrawn up to
/// `retries` times.  If every candidate is rejected the last one is used
/// as-is and `spaced` is false.
pub fn pick_lane(
    rng: &mut impl Rng,
    width: u16,
    body_width: u16,
    padding: f32,
    occupied: &[f32],
    spacing: f32,
    retries: u32,
) -> Placement {
    let lo = padding;
    let hi = (width as f32 - padding - body_width as f32).max(lo);

    let mut x = uniform(rng, lo, hi);
    if spacing <= 0.0 || occupied.is_empty() {
        return Placement { x, spaced: true };
    }
    let clear = |x: f32| occupied.iter().all(|&peer| (peer - x).abs() > spacing);
    for _ in 0..retries {
        if clear(x) {
            return Placement { x, spaced: true };
        }
        x = uniform(rng, lo, hi);
    }
    if clear(x) {
        return Placement { x, spaced: true };
    }
    log::warn!(
        "no free lane after {} tries ({} peers), placing at {:.1}",
        retries as u64 + 1,
        occupied.len(),
        x
    );
    Placement { x, spaced: false }
}

// ── Level scaling ────────────────────────────────────────────────────────────

/// `base * level`, never below `base`.
pub fn scaled_health(base: i32, level: u32) -> i32 {
    base.saturating_mul(level.max(1) as i32)
}

/// Random speed in `[min, base]` plus a per-level bonus, capped at `ceiling`
/// (a zero ceiling means uncapped).
pub fn scaled_speed(rng: &mut impl Rng, min: f32, base: f32, level: u32, ceiling: f32) -> f32 {
    let lo = if min > 0.0 { min } else { base };
    let bonus = 0.5 * level.saturating_sub(1) as f32;
    let speed = uniform(rng, lo, base) + bonus;
    if ceiling > 0.0 {
        speed.min(ceiling)
    } else {
        speed
    }
}

/// Pool size for a level: one extra slot every `per` levels, capped.
pub fn scaled_capacity(start: usize, max: usize, level: u32, per: u32) -> usize {
    let extra = (level.saturating_sub(1) / per.max(1)) as usize;
    (start + extra).min(max.max(start))
}

// ── Damage ───────────────────────────────────────────────────────────────────

/// Centre of a body, for effects.
pub fn center_of(body: &SpatialBody) -> Position {
    Position::new(
        body.pos.x + body.size.width as f32 / 2.0,
        body.pos.y + body.size.height as f32 / 2.0,
    )
}

/// Apply every beam of `gun` that lands in `body` until the body dies.
/// Each hit removes its beam, raises a spark and an impact cue.  Returns
/// true if this call killed the body.
pub fn absorb_fire(
    gun: &Gun,
    body: &SpatialBody,
    health: &mut HealthBody,
    ctx: &mut SimContext,
    color: Color,
) -> bool {
    let mut killed = false;
    while !health.is_dead() {
        let Some(impact) = gun.strike(body) else { break };
        killed |= health.damage(impact.power);
        ctx.emit(Effect::Spark {
            at: impact.at,
            color,
        });
        ctx.play(cue::IMPACT);
    }
    killed
}

/// Explosion effect and sound for a destroyed body.
pub fn explode(ctx: &mut SimContext, body: &SpatialBody, color: Color) {
    let size = body.size.width.max(body.size.height).min(u8::MAX as u16) as u8;
    ctx.emit(Effect::Explosion {
        at: center_of(body),
        color,
        size,
    });
    ctx.play(cue::EXPLOSION);
}
