use std::io::Write;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode};
use crossterm::terminal;
use crossterm::{cursor, queue, style};

use crate::canvas::{Canvas, Grid};
use crate::cell::{Cell, CellAttrs};
use crate::colors::ColorPairTable;
use crate::error::CanvasError;
use crate::key::{Key, KeySource};

/// RAII terminal-mode guard: enables raw mode + alternate screen on
/// construction, restores the original mode on drop. Mirrors the teacher's
/// `TerminalGuard`/`CrosstermBackend` split — entering/leaving is a
/// distinct concern from painting.
pub struct TerminalGuard {
    entered: bool,
}

impl TerminalGuard {
    pub fn new() -> Result<Self, CanvasError> {
        terminal::enable_raw_mode().map_err(CanvasError::Enter)?;
        let mut stdout = std::io::stdout();
        queue!(stdout, terminal::EnterAlternateScreen, cursor::Hide).map_err(CanvasError::Enter)?;
        stdout.flush().map_err(CanvasError::Enter)?;
        Ok(TerminalGuard { entered: true })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if !self.entered {
            return;
        }
        let mut stdout = std::io::stdout();
        let _ = queue!(stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = stdout.flush();
        let _ = terminal::disable_raw_mode();
    }
}

/// Terminal-backed [`Canvas`]: keeps a `Grid` mirror of what's been painted
/// (so reads never touch the terminal, which is unreliable and slow) and
/// diffs against it on `present()` to minimize escape-sequence traffic.
pub struct CrosstermCanvas {
    grid: Grid,
    painted: Grid,
    colors: ColorPairTable,
}

impl CrosstermCanvas {
    pub fn new() -> Result<Self, CanvasError> {
        let (cols, rows) = terminal::size().map_err(CanvasError::SizeQuery)?;
        let rows = rows as u32;
        let cols = cols as u32;
        Ok(CrosstermCanvas {
            grid: Grid::new(rows, cols),
            painted: Grid::new(rows, cols),
            colors: ColorPairTable::new(),
        })
    }

    pub fn resize(&mut self, rows: u32, cols: u32) {
        self.grid.resize(rows, cols);
        self.painted.resize(rows, cols);
    }
}

impl Canvas for CrosstermCanvas {
    fn rows(&self) -> u32 {
        self.grid.rows()
    }

    fn cols(&self) -> u32 {
        self.grid.cols()
    }

    fn set_cell(&mut self, row: u32, col: u32, glyph: char, fore: u8, back: u8, attrs: CellAttrs) {
        self.grid.set(
            row,
            col,
            Cell {
                glyph,
                fore,
                back,
                attrs,
            },
        );
    }

    fn get_glyph(&self, row: u32, col: u32) -> char {
        self.grid.get(row, col).glyph
    }

    fn get_cell(&self, row: u32, col: u32) -> Cell {
        self.grid.get(row, col)
    }

    fn clear(&mut self) {
        self.grid.clear();
    }

    fn present(&mut self) -> anyhow::Result<()> {
        let mut stdout = std::io::stdout();
        for row in 0..self.grid.rows() {
            for col in 0..self.grid.cols() {
                let cell = self.grid.get(row, col);
                if cell == self.painted.get(row, col) {
                    continue;
                }
                queue!(stdout, cursor::MoveTo(col as u16, row as u16))
                    .map_err(CanvasError::Write)?;
                if let Some((fg, bg)) = self.colors.pair(cell.fore, cell.back) {
                    queue!(
                        stdout,
                        style::SetForegroundColor(fg),
                        style::SetBackgroundColor(bg)
                    )
                    .map_err(CanvasError::Write)?;
                } else {
                    queue!(stdout, style::ResetColor).map_err(CanvasError::Write)?;
                }
                queue!(stdout, style::Print(cell.glyph)).map_err(CanvasError::Write)?;
                self.painted.set(row, col, cell);
            }
        }
        stdout.flush().map_err(CanvasError::Write)?;
        Ok(())
    }
}

/// Crossterm-backed [`KeySource`]: `timeout = None` blocks, `Some(d)` polls
/// for up to `d` and returns `None` on a miss.
#[derive(Debug, Default)]
pub struct CrosstermKeySource;

impl KeySource for CrosstermKeySource {
    fn read_key(&mut self, timeout: Option<Duration>) -> anyhow::Result<Option<Key>> {
        let poll_window = timeout.unwrap_or(Duration::from_secs(3600));
        loop {
            if !event::poll(poll_window).map_err(CanvasError::Poll)? {
                return Ok(None);
            }
            match event::read().map_err(CanvasError::Poll)? {
                Event::Key(key_event) => {
                    return Ok(Some(match key_event.code {
                        KeyCode::Esc => Key::Esc,
                        KeyCode::Char(c) => Key::Char(c),
                        _ => continue,
                    }));
                }
                _ => continue,
            }
        }
    }
}
