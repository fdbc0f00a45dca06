//! Procedural scrolling terrain backdrop
//!
//! Re-exports modules for use by binaries and tools.

pub mod app;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod hash;
pub mod noise_engine;
pub mod palette;
pub mod render;
pub mod terrain;

pub use config::RendererConfig;
pub use error::{ConfigError, PaletteError, RenderError};
pub use noise_engine::NoiseEngine;
pub use palette::{palette_at, ColorKey, Palette, PaletteSet, Rgb};
pub use render::{RenderMode, RendererState, Surface, TerrainRenderer};
pub use terrain::{Column, TerrainGenerator, Tile};
