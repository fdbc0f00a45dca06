//! Drawing surfaces.
//!
//! A surface reports its size in pixels and presents finished frames. The
//! renderer never talks to a terminal directly, which keeps it testable with
//! the in-memory surface below.

use crate::error::RenderError;
use crate::palette::Rgb;

use super::frame::FrameBuffer;

/// Drawable area in pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

pub trait Surface {
    /// Current drawable size. Fails when no drawing context is available.
    fn viewport(&self) -> Result<Viewport, RenderError>;

    /// Present a finished frame.
    fn blit(&mut self, frame: &FrameBuffer) -> Result<(), RenderError>;
}

// =============================================================================
// IN-MEMORY SURFACE
// =============================================================================

/// Headless character grid. Used by the snapshot tool and in tests.
#[derive(Clone, Debug)]
pub struct MemorySurface {
    cols: usize,
    rows: usize,
    cell_size: f32,
    background: Rgb,
    cells: Vec<(char, Rgb)>,
    frames_presented: u64,
    last_paint_calls: usize,
}

impl MemorySurface {
    pub fn new(cols: usize, rows: usize, cell_size: f32) -> Self {
        Self {
            cols,
            rows,
            cell_size,
            background: Rgb::default(),
            cells: vec![(' ', Rgb::default()); cols * rows],
            frames_presented: 0,
            last_paint_calls: 0,
        }
    }

    /// Change the grid size. Contents are cleared.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        self.cols = cols;
        self.rows = rows;
        self.cells = vec![(' ', self.background); cols * rows];
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<(char, Rgb)> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells.get(row * self.cols + col).copied()
    }

    pub fn row_text(&self, row: usize) -> String {
        (0..self.cols).filter_map(|c| self.cell(c, row)).map(|(ch, _)| ch).collect()
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn last_paint_calls(&self) -> usize {
        self.last_paint_calls
    }
}

impl Surface for MemorySurface {
    fn viewport(&self) -> Result<Viewport, RenderError> {
        Ok(Viewport::new(self.cols as f32 * self.cell_size, self.rows as f32 * self.cell_size))
    }

    fn blit(&mut self, frame: &FrameBuffer) -> Result<(), RenderError> {
        self.background = frame.background();
        for cell in &mut self.cells {
            *cell = (' ', self.background);
        }

        for batch in frame.batches() {
            for draw in &batch.glyphs {
                let Some((col, row)) = frame.cell_of(draw) else {
                    continue;
                };
                if col < self.cols && row < self.rows {
                    self.cells[row * self.cols + col] = (draw.glyph, batch.color);
                }
            }
        }

        self.last_paint_calls = frame.paint_calls();
        self.frames_presented += 1;
        Ok(())
    }
}
