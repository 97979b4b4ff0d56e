//! Terminal backend on crossterm.
//!
//! The window is mapped onto a character grid of 10x20 pixel cells. A cell
//! takes the fill of any rectangle covering its centre; text is laid out one
//! character per cell, centred in its rectangle. Only cells that changed since
//! the previous frame are written.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::style::{self, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{
    self as term, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};

use titan_core::DrawCommand;
use titan_core::color::Color;
use titan_core::config::WindowConfig;
use titan_core::error::Result;
use titan_core::geometry::{Point, Rect};
use titan_core::input::{InputEvent, Shortcut};

use crate::backend::ShellBackend;

pub const CELL_W: i32 = 10;
pub const CELL_H: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::WHITE,
            bg: Color::BLACK,
        }
    }
}

/// One rasterized frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            cells: vec![Cell::default(); cols as usize * rows as usize],
        }
    }

    /// Rasterize a draw list onto a grid covering `window`.
    pub fn render(frame: &[DrawCommand], window: &WindowConfig) -> Self {
        let mut grid = Self::new(
            (window.width as i32 / CELL_W) as u16,
            (window.height as i32 / CELL_H) as u16,
        );
        let full = Rect::new(0, 0, window.width, window.height);
        let mut clips: Vec<Rect> = Vec::new();
        for cmd in frame {
            let clip = clips.last().copied().unwrap_or(full);
            match cmd {
                DrawCommand::FillRect { rect, color } => {
                    if let Some(area) = rect.intersect(&clip) {
                        grid.fill(area, *color);
                    }
                },
                DrawCommand::Text {
                    rect, text, color, ..
                } => grid.text(*rect, text, *color, clip),
                DrawCommand::PushClip(rect) => {
                    clips.push(rect.intersect(&clip).unwrap_or_default());
                },
                DrawCommand::PopClip => {
                    clips.pop();
                },
            }
        }
        grid
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cell(&self, col: u16, row: u16) -> Option<&Cell> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells.get(row as usize * self.cols as usize + col as usize)
    }

    fn cell_mut(&mut self, col: i32, row: i32) -> Option<&mut Cell> {
        if col < 0 || row < 0 || col >= self.cols as i32 || row >= self.rows as i32 {
            return None;
        }
        self.cells
            .get_mut(row as usize * self.cols as usize + col as usize)
    }

    /// Text of one row with trailing blanks removed.
    #[cfg(test)]
    pub fn row_text(&self, row: u16) -> String {
        let line: String = (0..self.cols)
            .filter_map(|c| self.cell(c, row))
            .map(|c| c.ch)
            .collect();
        line.trim_end().to_string()
    }

    fn fill(&mut self, area: Rect, color: Color) {
        for row in area.y.div_euclid(CELL_H)..=area.bottom().div_euclid(CELL_H) {
            for col in area.x.div_euclid(CELL_W)..=area.right().div_euclid(CELL_W) {
                if !area.contains(cell_centre(col, row)) {
                    continue;
                }
                if let Some(cell) = self.cell_mut(col, row) {
                    *cell = Cell {
                        ch: ' ',
                        fg: cell.fg,
                        bg: color,
                    };
                }
            }
        }
    }

    fn text(&mut self, rect: Rect, text: &str, color: Color, clip: Rect) {
        let len = text.chars().count() as i32;
        let row = (rect.y + rect.h as i32 / 2).div_euclid(CELL_H);
        let start = (rect.x + rect.w as i32 / 2).div_euclid(CELL_W) - len / 2;
        for (i, ch) in text.chars().enumerate() {
            let col = start + i as i32;
            if !clip.contains(cell_centre(col, row)) {
                continue;
            }
            if let Some(cell) = self.cell_mut(col, row) {
                cell.ch = ch;
                cell.fg = color;
            }
        }
    }
}

fn cell_centre(col: i32, row: i32) -> Point {
    Point::new(col * CELL_W + CELL_W / 2, row * CELL_H + CELL_H / 2)
}

fn term_color(c: Color) -> style::Color {
    style::Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

/// Map a crossterm event to a shell event.
pub fn map_event(event: Event) -> Option<InputEvent> {
    match event {
        Event::Key(key) => map_key(key),
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            ..
        }) => {
            let p = cell_centre(column as i32, row as i32);
            Some(InputEvent::PointerClick { x: p.x, y: p.y })
        },
        Event::Resize(cols, rows) => Some(InputEvent::Resized {
            width: cols as u32 * CELL_W as u32,
            height: rows as u32 * CELL_H as u32,
        }),
        _ => None,
    }
}

fn map_key(key: KeyEvent) -> Option<InputEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let shortcut = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return Some(InputEvent::Quit);
        },
        KeyCode::Char('q') => return Some(InputEvent::Quit),
        KeyCode::Left => Shortcut::Previous,
        KeyCode::Right => Shortcut::Next,
        KeyCode::Backspace | KeyCode::Esc => Shortcut::Back,
        KeyCode::Home | KeyCode::Char('h') => Shortcut::Home,
        KeyCode::Tab => Shortcut::RunningApps,
        KeyCode::Char('a') => Shortcut::AppList,
        _ => return None,
    };
    Some(InputEvent::Shortcut(shortcut))
}

/// Full-screen terminal host.
pub struct TerminalBackend {
    out: Stdout,
    window: WindowConfig,
    previous: Option<Grid>,
    active: bool,
}

impl TerminalBackend {
    pub fn new(window: &WindowConfig) -> Result<Self> {
        term::enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            EnableMouseCapture,
            Hide,
            Clear(ClearType::All)
        )?;
        log::info!(
            "Terminal backend initialized: {}x{} cells",
            window.width as i32 / CELL_W,
            window.height as i32 / CELL_H
        );
        Ok(Self {
            out,
            window: window.clone(),
            previous: None,
            active: true,
        })
    }

    fn restore(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        term::disable_raw_mode()?;
        execute!(
            self.out,
            ResetColor,
            Show,
            DisableMouseCapture,
            LeaveAlternateScreen
        )
    }
}

impl ShellBackend for TerminalBackend {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => {},
                Ok(false) => break,
                Err(e) => {
                    log::warn!("Terminal poll failed: {e}");
                    break;
                },
            }
            match event::read() {
                Ok(ev) => events.extend(map_event(ev)),
                Err(e) => {
                    log::warn!("Terminal read failed: {e}");
                    break;
                },
            }
        }
        events
    }

    fn present(&mut self, frame: &[DrawCommand]) -> Result<()> {
        let grid = Grid::render(frame, &self.window);
        for row in 0..grid.rows() {
            for col in 0..grid.cols() {
                let Some(cell) = grid.cell(col, row) else {
                    continue;
                };
                let unchanged = self
                    .previous
                    .as_ref()
                    .and_then(|p| p.cell(col, row))
                    .is_some_and(|old| old == cell);
                if unchanged {
                    continue;
                }
                queue!(
                    self.out,
                    MoveTo(col, row),
                    SetForegroundColor(term_color(cell.fg)),
                    SetBackgroundColor(term_color(cell.bg)),
                    Print(cell.ch)
                )?;
            }
        }
        self.out.flush()?;
        self.previous = Some(grid);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.restore()?;
        log::info!("Terminal backend shut down");
        Ok(())
    }
}

impl Drop for TerminalBackend {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            log::error!("Failed to restore terminal: {e}");
        }
    }
}
