/// Movement and collision primitives.
///
/// Every function here is pure over the values it is handed: positions go
/// in, positions (or verdicts) come out.  Producers and the player ship call
/// these each tick; nothing in this module touches the registry.

use crate::entities::{Beam, Footprint, Position, SpatialBody};

/// Rows kept clear at the bottom of the viewport.  A body whose `y` passes
/// `height - OFF_SCREEN_MARGIN` is gone.
pub const OFF_SCREEN_MARGIN: f32 = 2.0;

/// Default dead bands for `seek_target`, in cells.
pub const SEEK_TOLERANCE_X: f32 = 2.0;
pub const SEEK_TOLERANCE_Y: f32 = 5.0;

// ── Movement ─────────────────────────────────────────────────────────────────

/// Fall straight down toward the player: `y += speed * dt`.
pub fn integrate(body: &mut SpatialBody, dt: f32) {
    body.pos.y += body.speed * dt;
}

/// Nudge `mover` so its horizontal centre lines up with `target`'s and it
/// hovers `offset_y` rows above `target`.  Each axis stops correcting once
/// inside its tolerance band, so an aligned mover does not jitter.
pub fn seek_target(
    mover: &mut SpatialBody,
    target: &SpatialBody,
    offset_y: f32,
    tolerance: (f32, f32),
    dt: f32,
) {
    let step = mover.speed * dt;

    let dx = target.center_x() - mover.center_x();
    if dx.abs() > tolerance.0 {
        mover.pos.x += step.min(dx.abs()) * dx.signum();
    }

    let desired_y = target.pos.y - offset_y;
    let dy = desired_y - mover.pos.y;
    if dy.abs() > tolerance.1 {
        mover.pos.y += step.min(dy.abs()) * dy.signum();
    }
}

/// Advance a beam along its heading.
pub fn advance_beam(beam: &mut Beam, dt: f32) {
    beam.pos.y += beam.heading.dy() * beam.speed * dt;
}

/// A body has left the play field once it sinks past the bottom margin.
pub fn is_off_screen(pos: Position, viewport_height: u16) -> bool {
    pos.y > viewport_height as f32 - OFF_SCREEN_MARGIN
}

/// A beam is only visible while inside `[0, height - margin]`.
pub fn beam_out_of_range(beam: &Beam, viewport_height: u16) -> bool {
    beam.pos.y < 0.0 || is_off_screen(beam.pos, viewport_height)
}

/// Keep a body fully on screen horizontally and inside `[top, bottom]`.
pub fn clamp_to_viewport(body: &mut SpatialBody, width: u16, top: f32, bottom: f32) {
    let max_x = (width as f32 - body.size.width as f32).max(0.0);
    body.pos.x = body.pos.x.clamp(0.0, max_x);
    let max_y = (bottom - body.size.height as f32).max(top);
    body.pos.y = body.pos.y.clamp(top, max_y);
}

// ── Collision ────────────────────────────────────────────────────────────────

/// Integer rect `[x, x + w) × [y, y + h)` of a body, from its rounded position.
pub fn cell_rect(body: &SpatialBody) -> (i32, i32, i32, i32) {
    let (x, y) = body.pos.cell();
    (x, y, body.size.width as i32, body.size.height as i32)
}

/// Projectile vs. body: the projectile's rounded cell lies inside the body.
pub fn point_in_rect(point: Position, body: &SpatialBody) -> bool {
    let (px, py) = point.cell();
    let (x, y, w, h) = cell_rect(body);
    px >= x && px < x + w && py >= y && py < y + h
}

/// Axis-aligned overlap of two rects given as `(x, y, width, height)`.
pub fn rect_overlap(a: (i32, i32, i32, i32), b: (i32, i32, i32, i32)) -> bool {
    let (x1, y1, w1, h1) = a;
    let (x2, y2, w2, h2) = b;
    x1 < x2 + w2 && x1 + w1 > x2 && y1 < y2 + h2 && y1 + h1 > y2
}

/// Body vs. body overlap on their rounded cells.
pub fn bodies_overlap(a: &SpatialBody, b: &SpatialBody) -> bool {
    rect_overlap(cell_rect(a), cell_rect(b))
}

/// Footprint of a glyph grid: widest row × number of rows.
pub fn shape_footprint(shape: &[String]) -> Footprint {
    let width = shape.iter().map(|row| row.chars().count()).max().unwrap_or(1);
    let height = shape.len().max(1);
    Footprint::new(width as u16, height as u16)
}
