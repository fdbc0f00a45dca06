//! Interactive terminal host.
//!
//! Owns the terminal lifecycle and the event loop: sleeps until the next
//! frame or input, coalesces resize bursts, and maps keys to renderer
//! actions.

use std::error::Error;
use std::io::{self, stdout};
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::info;

use crate::clock::HourSource;
use crate::config::RendererConfig;
use crate::palette::PaletteSet;
use crate::render::{RenderMode, RendererState, ResizeDebouncer, TerminalSurface, TerrainRenderer};
use crate::terrain::TerrainGenerator;

/// Poll timeout when nothing is scheduled (paused or stopped)
const IDLE_POLL: Duration = Duration::from_millis(250);

pub struct AppOptions {
    pub seed: u64,
    pub config: RendererConfig,
    pub palettes: PaletteSet,
    pub hours: Box<dyn HourSource>,
    pub mode: RenderMode,
    pub show_status: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    TogglePause,
    ToggleStatus,
}

pub fn key_action(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Char(' ') => Some(Action::TogglePause),
        KeyCode::Char('i') | KeyCode::Char('I') => Some(Action::ToggleStatus),
        _ => None,
    }
}

/// Raw mode plus alternate screen, undone on drop so a panic or early
/// return still leaves a usable terminal.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, cursor::Hide)?;
        Ok(TerminalGuard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

type Renderer = TerrainRenderer<TerminalSurface>;

/// Run until the user quits.
pub fn run(options: AppOptions) -> Result<(), Box<dyn Error>> {
    let AppOptions { seed, config, palettes, hours, mode, show_status } = options;

    let _guard = TerminalGuard::enter()?;
    let mut surface = TerminalSurface::new(config.cell_size)?;
    if show_status {
        surface.set_status(Some(String::new()));
    }

    let generator = TerrainGenerator::new(seed);
    let mut renderer = TerrainRenderer::new(surface, generator, config, hours)?
        .with_palettes(palettes)
        .with_mode(mode);
    let mut resize = ResizeDebouncer::default();

    renderer.start(Instant::now());

    loop {
        let now = Instant::now();

        if resize.fire(now) {
            relayout(&mut renderer, now)?;
        }

        if renderer.surface().status_visible() {
            let line = renderer.status_line();
            renderer.surface_mut().set_status(Some(line));
        }
        renderer.tick(now)?;

        let wait = [renderer.time_until_next_frame(now), resize.time_until_fire(now)]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(IDLE_POLL);

        if !event::poll(wait)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key_action(key.code) {
                Some(Action::Quit) => break,
                Some(Action::TogglePause) => {
                    if renderer.state() == RendererState::Running {
                        renderer.stop();
                    } else {
                        renderer.start(Instant::now());
                    }
                }
                Some(Action::ToggleStatus) => {
                    let visible = renderer.surface().status_visible();
                    renderer.surface_mut().set_status(if visible { None } else { Some(String::new()) });
                    relayout(&mut renderer, Instant::now())?;
                }
                None => {}
            },
            Event::Resize(cols, rows) => {
                info!(cols, rows, "terminal resized");
                resize.notify(Instant::now());
            }
            _ => {}
        }
    }

    renderer.stop();
    Ok(())
}

/// Rebuild the ring for a new viewport. A still frame is redrawn right away.
fn relayout(renderer: &mut Renderer, now: Instant) -> Result<(), Box<dyn Error>> {
    renderer.resize()?;
    if renderer.mode() == RenderMode::SingleFrame {
        renderer.start(now);
    }
    Ok(())
}
