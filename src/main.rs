use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;

use clap::builder::FalseyValueParser;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use terrain_backdrop::app::{self, AppOptions};
use terrain_backdrop::clock::{FixedHour, HourSource, LocalClock};
use terrain_backdrop::palette::PaletteSet;
use terrain_backdrop::render::RenderMode;
use terrain_backdrop::terrain::glyphs::GlyphSet;
use terrain_backdrop::RendererConfig;

#[derive(Parser, Debug)]
#[command(name = "terrain_backdrop")]
#[command(about = "Endless side-scrolling procedural terrain in the terminal")]
struct Args {
    /// World seed (random if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON renderer configuration; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON palette file with day, night and dawn tables
    #[arg(long)]
    palettes: Option<PathBuf>,

    /// Pixels per grid cell
    #[arg(long)]
    cell_size: Option<f32>,

    /// Pixels scrolled per frame
    #[arg(long)]
    scroll_speed: Option<f32>,

    /// Target frames per second
    #[arg(long)]
    fps: Option<u32>,

    /// World column at the left edge on startup
    #[arg(long, allow_hyphen_values = true)]
    start_x: Option<i64>,

    /// Pin the palette clock to an hour of day (0-24)
    #[arg(long)]
    hour: Option<f32>,

    /// Use plain ASCII glyphs
    #[arg(long)]
    ascii: bool,

    /// Draw one still frame instead of scrolling
    #[arg(long, env = "TERRAIN_REDUCED_MOTION", value_parser = FalseyValueParser::new())]
    reduced_motion: bool,

    /// Show the status line
    #[arg(long)]
    status: bool,

    /// Write logs to this file (filter with RUST_LOG); logging is off without it
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    init_logging(args.log_file.as_deref())?;

    let mut config = match &args.config {
        Some(path) => RendererConfig::load(path)?,
        None => RendererConfig::default(),
    };
    if let Some(cell_size) = args.cell_size {
        config.cell_size = cell_size;
    }
    if let Some(speed) = args.scroll_speed {
        config.scroll_speed = speed;
    }
    if let Some(fps) = args.fps {
        config.target_fps = fps;
    }
    if let Some(start_x) = args.start_x {
        config.start_x = start_x;
    }
    if args.ascii {
        config.glyph_set = GlyphSet::Ascii;
    }
    config.validate()?;

    let palettes = match &args.palettes {
        Some(path) => PaletteSet::load(path)?,
        None => PaletteSet::builtin(),
    };

    let hours: Box<dyn HourSource> = match args.hour {
        Some(hour) => Box::new(FixedHour(hour)),
        None => Box::new(LocalClock),
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "starting terrain backdrop");

    app::run(AppOptions {
        seed,
        config,
        palettes,
        hours,
        mode: if args.reduced_motion { RenderMode::SingleFrame } else { RenderMode::Continuous },
        show_status: args.status,
    })
}

/// Where log output goes while the terminal UI is running
#[derive(Debug, PartialEq, Eq)]
enum LogTarget<'a> {
    File(&'a Path),
    /// RUST_LOG was set but there is nowhere safe to write
    Suppressed,
    Off,
}

/// The alternate screen owns both stdout and stderr, so logs only ever go
/// to a file.
fn log_target(log_file: Option<&Path>, rust_log_set: bool) -> LogTarget<'_> {
    match log_file {
        Some(path) => LogTarget::File(path),
        None if rust_log_set => LogTarget::Suppressed,
        None => LogTarget::Off,
    }
}

fn init_logging(log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    match log_target(log_file, std::env::var_os("RUST_LOG").is_some()) {
        LogTarget::File(path) => {
            let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        LogTarget::Suppressed => {
            eprintln!("RUST_LOG is set but logging needs --log-file while the terminal is in use; logs disabled.");
        }
        LogTarget::Off => {}
    }
    Ok(())
}
