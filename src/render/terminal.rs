//! Terminal surface backed by ratatui.
//!
//! One terminal cell stands for one `cell_size` x `cell_size` pixel square,
//! so the renderer can keep working in pixel units. An optional status line
//! takes the bottom row.

use std::io::{self, IsTerminal, Stdout};

use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Terminal,
};

use crate::error::RenderError;
use crate::palette::Rgb;

use super::frame::FrameBuffer;
use super::surface::{Surface, Viewport};

pub struct TerminalSurface {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    cell_size: f32,
    status: Option<String>,
}

impl TerminalSurface {
    /// Wrap stdout. Raw mode and the alternate screen are the caller's job.
    pub fn new(cell_size: f32) -> Result<Self, RenderError> {
        let stdout = io::stdout();
        if !stdout.is_terminal() {
            return Err(RenderError::SurfaceUnavailable("stdout is not a terminal".to_string()));
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal, cell_size, status: None })
    }

    /// Show or hide the status line. Changes the viewport height.
    pub fn set_status(&mut self, status: Option<String>) {
        self.status = status;
    }

    pub fn status_visible(&self) -> bool {
        self.status.is_some()
    }

    fn status_rows(&self) -> u16 {
        if self.status.is_some() { 1 } else { 0 }
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

impl Surface for TerminalSurface {
    fn viewport(&self) -> Result<Viewport, RenderError> {
        let size = self.terminal.size()?;
        let rows = size.height.saturating_sub(self.status_rows());
        Ok(Viewport::new(size.width as f32 * self.cell_size, rows as f32 * self.cell_size))
    }

    fn blit(&mut self, frame: &FrameBuffer) -> Result<(), RenderError> {
        let status = self.status.clone();
        self.terminal.draw(|f| {
            let area = f.area();
            let (map_area, status_area) = if status.is_some() {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(1), Constraint::Length(1)])
                    .split(area);
                (chunks[0], Some(chunks[1]))
            } else {
                (area, None)
            };

            paint_map(f.buffer_mut(), map_area, frame);

            if let (Some(text), Some(rect)) = (status, status_area) {
                let style = Style::default().fg(Color::White).bg(Color::DarkGray);
                f.render_widget(Paragraph::new(text).style(style), rect);
            }
        })?;
        Ok(())
    }
}

fn paint_map(buf: &mut ratatui::buffer::Buffer, area: Rect, frame: &FrameBuffer) {
    let bg = to_color(frame.background());
    let blank = Style::default().bg(bg);
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_char(' ').set_style(blank);
            }
        }
    }

    for batch in frame.batches() {
        let style = Style::default().fg(to_color(batch.color)).bg(bg);
        for draw in &batch.glyphs {
            let Some((col, row)) = frame.cell_of(draw) else {
                continue;
            };
            if col >= area.width as usize || row >= area.height as usize {
                continue;
            }
            let pos = (area.x + col as u16, area.y + row as u16);
            if let Some(cell) = buf.cell_mut(pos) {
                cell.set_char(draw.glyph).set_style(style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::frame::GlyphDraw;
    use ratatui::buffer::Buffer;

    #[test]
    fn test_paint_map_into_buffer() {
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        let mut frame = FrameBuffer::new();
        let bg = Rgb::new(10, 20, 30);
        let fg = Rgb::new(200, 150, 100);
        frame.clear(bg, 40.0, 20.0, 10.0);
        frame.push(fg, GlyphDraw { x: 20.0, y: 10.0, glyph: '♠' });
        frame.push(fg, GlyphDraw { x: 100.0, y: 0.0, glyph: 'x' });

        paint_map(&mut buf, area, &frame);

        let cell = buf.cell((2u16, 1u16)).expect("cell");
        assert_eq!(cell.symbol(), "♠");
        assert_eq!(cell.fg, Color::Rgb(200, 150, 100));
        assert_eq!(cell.bg, Color::Rgb(10, 20, 30));

        let empty = buf.cell((0u16, 0u16)).expect("cell");
        assert_eq!(empty.symbol(), " ");
        assert_eq!(empty.bg, Color::Rgb(10, 20, 30));
    }
}
