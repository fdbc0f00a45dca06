//! Side-scrolling renderer.
//!
//! Keeps a ring of generated columns a little wider than the viewport. Each
//! frame the strip scrolls left by `scroll_speed` pixels; whenever a full
//! cell has scrolled off, the leftmost slot is regenerated as the next
//! column on the right. Tiles are resolved to colors through the current
//! palette, batched by color, and handed to a [`Surface`].

pub mod animation;
pub mod frame;
pub mod scheduler;
pub mod surface;
pub mod terminal;

use std::time::{Duration, Instant};

use tracing::{debug, info, trace};

use crate::clock::HourSource;
use crate::config::RendererConfig;
use crate::error::RenderError;
use crate::palette::{Palette, PaletteSet};
use crate::terrain::{Column, TerrainGenerator};

pub use frame::{ColorBatch, FrameBuffer, GlyphDraw};
pub use scheduler::{FrameScheduler, ResizeDebouncer};
pub use surface::{MemorySurface, Surface, Viewport};
pub use terminal::TerminalSurface;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RendererState {
    Initializing,
    Running,
    Stopped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Continuous,
    /// Reduced motion: draw one still frame, then stop.
    SingleFrame,
}

pub struct TerrainRenderer<S: Surface> {
    surface: S,
    generator: TerrainGenerator,
    config: RendererConfig,
    mode: RenderMode,
    hours: Box<dyn HourSource>,
    palettes: PaletteSet,
    palette: Palette,
    last_palette_check: Option<Instant>,
    state: RendererState,
    scheduler: FrameScheduler,

    // Ring buffer; `head` is the slot holding the leftmost column
    ring: Vec<Column>,
    head: usize,
    rows: usize,
    viewport: Viewport,
    next_world_x: i64,
    scroll_offset: f32,
    frame_counter: u64,
    frame: FrameBuffer,
}

impl<S: Surface> TerrainRenderer<S> {
    pub fn new(
        surface: S,
        generator: TerrainGenerator,
        config: RendererConfig,
        hours: Box<dyn HourSource>,
    ) -> Result<Self, RenderError> {
        config.validate()?;
        let palettes = PaletteSet::builtin();
        let palette = palettes.palette_at(hours.hour_of_day());

        let mut renderer = Self {
            surface,
            generator,
            scheduler: FrameScheduler::new(config.target_fps),
            next_world_x: config.start_x,
            config,
            mode: RenderMode::Continuous,
            hours,
            palettes,
            palette,
            last_palette_check: None,
            state: RendererState::Initializing,
            ring: Vec::new(),
            head: 0,
            rows: 0,
            viewport: Viewport::default(),
            scroll_offset: 0.0,
            frame_counter: 0,
            frame: FrameBuffer::new(),
        };
        renderer.resize()?;
        info!(
            seed = renderer.generator.seed(),
            cols = renderer.ring.len(),
            rows = renderer.rows,
            "renderer initialised"
        );
        Ok(renderer)
    }

    /// Replace the palette set (e.g. loaded from a file).
    pub fn with_palettes(mut self, palettes: PaletteSet) -> Self {
        self.palette = palettes.palette_at(self.hours.hour_of_day());
        self.palettes = palettes;
        self
    }

    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Begin (or resume) the frame loop. The first tick draws immediately.
    pub fn start(&mut self, now: Instant) {
        if self.state == RendererState::Running {
            return;
        }
        self.state = RendererState::Running;
        self.scheduler.start();
        self.refresh_palette_now();
        self.last_palette_check = Some(now);
        info!(left_world_x = self.left_world_x(), "renderer started");
    }

    /// Halt the frame loop. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if self.state == RendererState::Stopped {
            return;
        }
        self.state = RendererState::Stopped;
        self.scheduler.cancel();
        info!(frames = self.frame_counter, "renderer stopped");
    }

    /// Re-read the surface size and rebuild the ring from the current left
    /// edge. The scroll offset resets to zero.
    pub fn resize(&mut self) -> Result<(), RenderError> {
        let viewport = self.surface.viewport()?;
        let cell = self.config.cell_size;

        let visible = ((viewport.width / cell).ceil().max(0.0) as usize).max(1);
        let cols = visible + self.config.overscan;
        let rows = ((viewport.height / cell).ceil().max(0.0) as usize + 1).max(1);

        let origin = if self.ring.is_empty() { self.next_world_x } else { self.left_world_x() };

        self.generator.clear_cache();
        self.viewport = viewport;
        self.rows = rows;
        self.ring = (0..cols as i64)
            .map(|i| self.generator.generate_column(origin + i, rows))
            .collect();
        self.head = 0;
        self.next_world_x = origin + cols as i64;
        self.scroll_offset = 0.0;

        info!(cols, rows, origin, width = viewport.width, height = viewport.height, "ring buffer resized");
        Ok(())
    }

    /// Run one frame if it is due. Returns whether a frame was drawn.
    pub fn tick(&mut self, now: Instant) -> Result<bool, RenderError> {
        if self.state != RendererState::Running || !self.scheduler.poll(now) {
            return Ok(false);
        }

        self.refresh_palette(now);
        if self.mode == RenderMode::Continuous {
            self.scroll(self.config.scroll_speed);
        }
        self.draw();
        self.surface.blit(&self.frame)?;
        self.frame_counter += 1;

        if self.mode == RenderMode::SingleFrame {
            self.stop();
        }
        Ok(true)
    }

    /// Advance the strip by `pixels`, recycling every column that has fully
    /// scrolled past the left edge.
    pub fn scroll(&mut self, pixels: f32) {
        if !pixels.is_finite() || pixels <= 0.0 {
            return;
        }
        let cell = self.config.cell_size;
        self.scroll_offset += pixels;
        while self.scroll_offset >= cell {
            self.scroll_offset -= cell;
            self.recycle_column();
        }
    }

    /// Recompute the palette now, regardless of the refresh period.
    pub fn refresh_palette_now(&mut self) {
        let hour = self.hours.hour_of_day();
        self.palette = self.palettes.palette_at(hour);
        debug!(hour, "palette refreshed");
    }

    fn refresh_palette(&mut self, now: Instant) {
        let due = match self.last_palette_check {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.config.palette_refresh(),
        };
        if due {
            self.refresh_palette_now();
            self.last_palette_check = Some(now);
        }
    }

    fn recycle_column(&mut self) {
        let len = self.ring.len();
        if len == 0 {
            return;
        }
        let world_x = self.next_world_x;
        self.ring[self.head] = self.generator.generate_column(world_x, self.rows);
        self.head = (self.head + 1) % len;
        self.next_world_x += 1;
        trace!(world_x, "column recycled");
    }

    /// Build the frame: every on-screen tile, animated and colored.
    fn draw(&mut self) {
        let cell = self.config.cell_size;
        let width = self.viewport.width;
        let height = self.viewport.height;
        self.frame.clear(self.palette.background(), width, height, cell);

        let len = self.ring.len();
        for i in 0..len {
            let x = i as f32 * cell - self.scroll_offset;
            if x + cell <= 0.0 || x >= width {
                continue;
            }
            let column = &self.ring[(self.head + i) % len];
            for (row, tile) in column.iter().enumerate() {
                let y = row as f32 * cell;
                if y >= height {
                    break;
                }
                let (glyph, key) = animation::animate(tile, self.frame_counter);
                self.frame.push(
                    self.palette.get(key),
                    GlyphDraw { x, y, glyph: self.config.glyph_set.apply(glyph) },
                );
            }
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn state(&self) -> RendererState {
        self.state
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Ring width, including overscan
    pub fn visible_columns(&self) -> usize {
        self.ring.len()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Columns in screen order, leftmost first
    pub fn columns(&self) -> impl Iterator<Item = &Column> + '_ {
        let len = self.ring.len();
        (0..len).map(move |i| &self.ring[(self.head + i) % len])
    }

    pub fn left_world_x(&self) -> i64 {
        self.next_world_x - self.ring.len() as i64
    }

    pub fn next_world_x(&self) -> i64 {
        self.next_world_x
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn time_until_next_frame(&self, now: Instant) -> Option<Duration> {
        if self.state != RendererState::Running {
            return None;
        }
        self.scheduler.time_until_next(now)
    }

    /// One-line summary for the status bar
    pub fn status_line(&self) -> String {
        let (elevation, moisture) = self.generator.cache_stats();
        format!(
            " seed {} | x {} | frame {} | {:?} | elev {} | moist {} ",
            self.generator.seed(),
            self.left_world_x(),
            self.frame_counter,
            self.state,
            elevation.summary(),
            moisture.summary(),
        )
    }
}
