//! Render a single headless frame and print it with ANSI colors.
//!
//! Usage: cargo run --bin snapshot -- --seed 42 --cols 100 --rows 30 --hour 6

use std::error::Error;
use std::io::{self, Write};
use std::time::Instant;

use clap::Parser;
use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
};

use terrain_backdrop::clock::FixedHour;
use terrain_backdrop::palette::Rgb;
use terrain_backdrop::render::{MemorySurface, RenderMode, TerrainRenderer};
use terrain_backdrop::terrain::glyphs::GlyphSet;
use terrain_backdrop::{RendererConfig, TerrainGenerator};

#[derive(Parser, Debug)]
#[command(name = "snapshot")]
#[command(about = "Print one frame of terrain to stdout")]
struct Args {
    #[arg(short, long, default_value = "42")]
    seed: u64,

    #[arg(long, default_value = "100")]
    cols: usize,

    #[arg(long, default_value = "30")]
    rows: usize,

    /// Hour of day for the palette
    #[arg(long, default_value = "12")]
    hour: f32,

    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    start_x: i64,

    #[arg(long)]
    ascii: bool,
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb { r: rgb.r, g: rgb.g, b: rgb.b }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let config = RendererConfig {
        start_x: args.start_x,
        glyph_set: if args.ascii { GlyphSet::Ascii } else { GlyphSet::Unicode },
        ..RendererConfig::default()
    };
    let surface = MemorySurface::new(args.cols, args.rows, config.cell_size);
    let mut renderer = TerrainRenderer::new(
        surface,
        TerrainGenerator::new(args.seed),
        config,
        Box::new(FixedHour(args.hour)),
    )?
    .with_mode(RenderMode::SingleFrame);

    let now = Instant::now();
    renderer.start(now);
    renderer.tick(now)?;

    let surface = renderer.surface();
    let mut out = io::stdout().lock();
    queue!(out, SetBackgroundColor(color(surface.background())))?;
    for row in 0..surface.rows() {
        for col in 0..surface.cols() {
            if let Some((glyph, fg)) = surface.cell(col, row) {
                queue!(out, SetForegroundColor(color(fg)), Print(glyph))?;
            }
        }
        queue!(out, ResetColor, Print('\n'), SetBackgroundColor(color(surface.background())))?;
    }
    queue!(out, ResetColor)?;
    out.flush()?;

    let (elevation, moisture) = renderer.generator().cache_stats();
    eprintln!("seed {} | elevation cache {} | moisture cache {}", args.seed, elevation.summary(), moisture.summary());
    Ok(())
}
