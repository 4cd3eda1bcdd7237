/// Terminal frame buffer.
///
/// Entities draw into a `FrameBuffer` through the `Canvas` trait; once per
/// tick `present` turns the buffer into queued crossterm commands and
/// flushes them in one write.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Attribute, Color, Print},
    terminal, QueueableCommand,
};

use crate::context::{Canvas, Style, Viewport};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            glyph: ' ',
            style: Style::fg(Color::Reset),
        }
    }
}

/// Off-screen grid of cells, one per terminal position.
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            width: viewport.width,
            height: viewport.height,
            cells: vec![Cell::default(); viewport.width as usize * viewport.height as usize],
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        *self = Self::new(viewport);
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|i| self.cells[i])
    }

    pub fn glyph_at(&self, x: i32, y: i32) -> Option<char> {
        self.cell(x, y).map(|c| c.glyph)
    }

    /// One row as plain text, handy for snapshots and debugging.
    pub fn row_text(&self, y: i32) -> String {
        (0..self.width as i32)
            .filter_map(|x| self.glyph_at(x, y))
            .collect()
    }

    // ── Output ────────────────────────────────────────────────────────────────

    /// Write the whole frame to `out`, changing colour only when it differs
    /// from the previous cell.
    pub fn present<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        out.queue(terminal::Clear(terminal::ClearType::All))?;

        let mut current: Option<Style> = None;
        for y in 0..self.height {
            out.queue(cursor::MoveTo(0, y))?;
            let row = &self.cells[y as usize * self.width as usize..][..self.width as usize];
            for cell in row {
                if current != Some(cell.style) {
                    out.queue(style::SetAttribute(Attribute::Reset))?;
                    if cell.style.bold {
                        out.queue(style::SetAttribute(Attribute::Bold))?;
                    }
                    out.queue(style::SetForegroundColor(cell.style.fg))?;
                    current = Some(cell.style);
                }
                out.queue(Print(cell.glyph))?;
            }
        }

        // Leave the cursor on the last row
        out.queue(style::ResetColor)?;
        out.queue(style::SetAttribute(Attribute::Reset))?;
        out.queue(cursor::MoveTo(0, self.height.saturating_sub(1)))?;
        out.flush()?;
        Ok(())
    }
}

impl Canvas for FrameBuffer {
    fn set_cell(&mut self, x: i32, y: i32, glyph: char, style: Style) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = Cell { glyph, style };
        }
    }

    fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }
}
