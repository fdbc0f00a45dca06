//! Per-frame draw list, grouped by color.
//!
//! Surfaces pay per color switch, so glyphs are bucketed by their resolved
//! color and each bucket is painted in one pass. The buffer is reused across
//! frames; clearing keeps the bucket allocations.

use std::collections::HashMap;

use crate::palette::Rgb;

/// One glyph at a pixel position (top-left corner of its cell)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphDraw {
    pub x: f32,
    pub y: f32,
    pub glyph: char,
}

/// Every glyph of one color
#[derive(Clone, Debug, PartialEq)]
pub struct ColorBatch {
    pub color: Rgb,
    pub glyphs: Vec<GlyphDraw>,
}

#[derive(Clone, Debug)]
pub struct FrameBuffer {
    background: Rgb,
    width: f32,
    height: f32,
    cell_size: f32,
    batches: Vec<ColorBatch>,
    lookup: HashMap<Rgb, usize>,
    active: usize,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            background: Rgb::default(),
            width: 0.0,
            height: 0.0,
            cell_size: 1.0,
            batches: Vec::new(),
            lookup: HashMap::new(),
            active: 0,
        }
    }

    /// Start a new frame filled with `background`.
    pub fn clear(&mut self, background: Rgb, width: f32, height: f32, cell_size: f32) {
        self.background = background;
        self.width = width;
        self.height = height;
        self.cell_size = cell_size;
        for batch in &mut self.batches[..self.active] {
            batch.glyphs.clear();
        }
        self.lookup.clear();
        self.active = 0;
    }

    pub fn push(&mut self, color: Rgb, draw: GlyphDraw) {
        if let Some(&index) = self.lookup.get(&color) {
            self.batches[index].glyphs.push(draw);
            return;
        }

        let index = self.active;
        if index < self.batches.len() {
            let batch = &mut self.batches[index];
            batch.color = color;
            batch.glyphs.clear();
            batch.glyphs.push(draw);
        } else {
            self.batches.push(ColorBatch { color, glyphs: vec![draw] });
        }
        self.lookup.insert(color, index);
        self.active += 1;
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Batches in first-use order
    pub fn batches(&self) -> &[ColorBatch] {
        &self.batches[..self.active]
    }

    /// Number of color switches needed to paint the frame
    pub fn paint_calls(&self) -> usize {
        self.active
    }

    pub fn glyph_count(&self) -> usize {
        self.batches().iter().map(|b| b.glyphs.len()).sum()
    }

    /// Grid cell a glyph lands on, by the position of its centre.
    /// `None` when the centre is left of or above the surface.
    pub fn cell_of(&self, draw: &GlyphDraw) -> Option<(usize, usize)> {
        let half = self.cell_size * 0.5;
        let col = ((draw.x + half) / self.cell_size).floor();
        let row = ((draw.y + half) / self.cell_size).floor();
        if col < 0.0 || row < 0.0 || !col.is_finite() || !row.is_finite() {
            return None;
        }
        Some((col as usize, row as usize))
    }
}
