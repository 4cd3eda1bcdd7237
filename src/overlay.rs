/// HUD overlay — score, level, hull, ammo and the pause / game-over boxes.
///
/// Registered last so it paints over everything.  Ship numbers are copied
/// during update, since drawing only sees the context.

use std::any::Any;

use crossterm::style::Color;

use crate::context::{Canvas, SessionStatus, SimContext, Style};
use crate::entities::EntityKind;
use crate::player::PlayerShip;
use crate::registry::{Entity, Peers};
use crate::weapon::AmmoStatus;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LEVEL: Color = Color::Green;
const C_HUD_HULL: Color = Color::Red;
const C_AMMO: Color = Color::Cyan;
const C_RELOAD: Color = Color::Magenta;
const C_HINT: Color = Color::DarkGrey;

/// What the HUD shows about the ship, refreshed every update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShipReadout {
    pub hull: i32,
    pub hull_max: i32,
    pub ammo: Option<AmmoStatus>,
}

#[derive(Default)]
pub struct UiOverlay {
    readout: ShipReadout,
}

impl UiOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn readout(&self) -> ShipReadout {
        self.readout
    }

    // ── HUD (row 0) ───────────────────────────────────────────────────────────

    fn draw_hud(&self, ctx: &SimContext, canvas: &mut dyn Canvas) {
        let width = ctx.viewport.width as i32;
        let p = &ctx.progression;

        // Score — left
        canvas.put_str(
            1,
            0,
            &format!("Score: {:>7}  Kills: {:>4}", p.score(), p.kills()),
            Style::fg(C_HUD_SCORE),
        );

        // Level — centre
        let level = format!("[ LEVEL {} ]", p.level());
        let lx = width / 2 - level.chars().count() as i32 / 2;
        canvas.put_str(lx, 0, &level, Style::bold(C_HUD_LEVEL));

        // Hull — right
        let hull = format!("Hull: {:>3}/{:<3}", self.readout.hull.max(0), self.readout.hull_max);
        let rx = width - hull.chars().count() as i32 - 1;
        canvas.put_str(rx, 0, &hull, Style::fg(C_HUD_HULL));
    }

    // ── Ammo + controls (last row) ────────────────────────────────────────────

    fn draw_footer(&self, ctx: &SimContext, canvas: &mut dyn Canvas) {
        let row = ctx.viewport.height as i32 - 1;
        let mut used = 0;
        if let Some(ammo) = self.readout.ammo {
            let (text, style) = if ammo.reloading {
                ("RELOADING...".to_string(), Style::bold(C_RELOAD))
            } else {
                let bar: String = "|".repeat(ammo.loaded as usize);
                let pad: String = ".".repeat(ammo.capacity.saturating_sub(ammo.loaded) as usize);
                (format!("Ammo {}{}", bar, pad), Style::fg(C_AMMO))
            };
            canvas.put_str(1, row, &text, style);
            used = 1 + text.chars().count() as i32;
        }
        // Right-aligned, but never over the ammo readout
        let hint = "←→↑↓ Move  SPACE Fire  E Reload  P Pause  Q Quit";
        let hx = ctx.viewport.width as i32 - hint.chars().count() as i32 - 1;
        canvas.put_str(hx.max(used + 2), row, hint, Style::fg(C_HINT));
    }

    // ── Boxes ─────────────────────────────────────────────────────────────────

    fn draw_box(ctx: &SimContext, canvas: &mut dyn Canvas, lines: &[(String, Color)]) {
        let cx = ctx.viewport.width as i32 / 2;
        let start_row = ctx.viewport.height as i32 / 2 - lines.len() as i32 / 2;
        for (i, (msg, color)) in lines.iter().enumerate() {
            let col = cx - msg.chars().count() as i32 / 2;
            canvas.put_str(col, start_row + i as i32, msg, Style::bold(*color));
        }
    }

    fn draw_game_over(ctx: &SimContext, canvas: &mut dyn Canvas) {
        let p = &ctx.progression;
        let lines = [
            ("╔══════════════════╗".to_string(), Color::Red),
            ("║    GAME  OVER    ║".to_string(), Color::Red),
            ("╚══════════════════╝".to_string(), Color::Red),
            (format!("Final Score: {}  Level: {}", p.score(), p.level()), Color::Yellow),
            ("R - Play Again  Q - Quit".to_string(), Color::White),
        ];
        Self::draw_box(ctx, canvas, &lines);
    }

    fn draw_paused(ctx: &SimContext, canvas: &mut dyn Canvas) {
        let lines = [
            ("╔══════════════════╗".to_string(), Color::Cyan),
            ("║      PAUSED      ║".to_string(), Color::Cyan),
            ("╚══════════════════╝".to_string(), Color::Cyan),
            ("P - Resume".to_string(), Color::White),
        ];
        Self::draw_box(ctx, canvas, &lines);
    }
}

impl Entity for UiOverlay {
    fn update(&mut self, _ctx: &mut SimContext, peers: &mut Peers<'_>) {
        match peers.find::<PlayerShip>(EntityKind::PlayerShip) {
            Some(player) => {
                self.readout = ShipReadout {
                    hull: player.health().current(),
                    hull_max: player.health().max(),
                    ammo: Some(player.gun().ammo()),
                };
            }
            None => self.readout.ammo = None,
        }
    }

    fn draw(&self, ctx: &SimContext, canvas: &mut dyn Canvas) {
        self.draw_hud(ctx, canvas);
        self.draw_footer(ctx, canvas);
        match ctx.status {
            SessionStatus::Paused => Self::draw_paused(ctx, canvas),
            SessionStatus::GameOver => Self::draw_game_over(ctx, canvas),
            SessionStatus::Playing => {}
        }
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Overlay
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
