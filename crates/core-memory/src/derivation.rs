use rand::Rng;

use core_canvas::Canvas;
use core_grammar::{Grammar, HAnchor, Symbol, VAnchor};

use crate::active_set::ActiveSet;
use crate::memory::Memory;
use crate::wrap::WrapDims;

/// Mirror of what's actually been painted, kept independently of the real
/// `Canvas` so the matcher's context reads never touch a (possibly slow,
/// possibly unreliable) terminal read-back.
#[derive(Debug, Clone)]
struct ScreenMirror {
    rows: u32,
    cols: u32,
    glyphs: Vec<Symbol>,
}

impl ScreenMirror {
    fn new(rows: u32, cols: u32) -> Self {
        ScreenMirror {
            rows,
            cols,
            glyphs: vec![' '; (rows as usize) * (cols as usize)],
        }
    }

    fn index(&self, row: u32, col: u32) -> usize {
        (row as usize) * (self.cols as usize) + (col as usize)
    }

    fn get(&self, row: u32, col: u32) -> Symbol {
        self.glyphs[self.index(row, col)]
    }

    fn set(&mut self, row: u32, col: u32, glyph: Symbol) {
        let idx = self.index(row, col);
        self.glyphs[idx] = glyph;
    }

    fn resize(&mut self, rows: u32, cols: u32) {
        let mut fresh = ScreenMirror::new(rows, cols);
        for r in 0..self.rows.min(rows) {
            for c in 0..self.cols.min(cols) {
                fresh.set(r, c, self.get(r, c));
            }
        }
        *self = fresh;
    }

    fn clear(&mut self) {
        self.glyphs.fill(' ');
    }
}

/// Owns everything that persists across derivation steps but not across
/// program loads: `Memory`, the active non-terminal index, the screen
/// mirror, and the cached toroidal wrap dimensions.
#[derive(Debug, Clone)]
pub struct Derivation {
    memory: Memory,
    active: ActiveSet,
    mirror: ScreenMirror,
    dims: WrapDims,
    rows: u32,
    cols: u32,
}

impl Derivation {
    pub fn new(rows: u32, cols: u32, effective_rows: u32, effective_cols: u32) -> Self {
        Derivation {
            memory: Memory::new(rows, cols),
            active: ActiveSet::new(),
            mirror: ScreenMirror::new(rows, cols),
            dims: WrapDims::new(effective_rows, effective_cols),
            rows,
            cols,
        }
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn active(&self) -> &ActiveSet {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut ActiveSet {
        &mut self.active
    }

    pub fn dims(&self) -> &WrapDims {
        &self.dims
    }

    pub fn screen_glyph(&self, row: u32, col: u32) -> Symbol {
        self.mirror.get(row, col)
    }

    pub fn set_screen_glyph(&mut self, row: u32, col: u32, glyph: Symbol) {
        self.mirror.set(row, col, glyph);
    }

    pub fn wrap(&self, r: i64, c: i64) -> (u32, u32) {
        (self.dims.wrap_row(r), self.dims.wrap_col(c))
    }

    pub fn resize(&mut self, rows: u32, cols: u32, effective_rows: u32, effective_cols: u32) {
        self.memory.resize(rows, cols);
        self.mirror.resize(rows, cols);
        self.dims = WrapDims::new(effective_rows, effective_cols);
        self.rows = rows;
        self.cols = cols;
        // Non-terminals outside the new bounds are implicitly dropped, per
        // spec.md §7 CanvasResize: re-wrapping happens lazily on next write,
        // so entries simply referencing now-invalid coordinates are pruned.
        let rows_limit = self.rows;
        let cols_limit = self.cols;
        let stale: Vec<(u32, u32)> = self
            .active
            .iter()
            .filter(|&(r, c, _)| r == 0 || r >= rows_limit || c >= cols_limit)
            .map(|(r, c, _)| (r, c))
            .collect();
        for (r, c) in stale {
            self.active.erase(r, c);
        }
    }

    /// Clears memory, active set and screen mirror, then instantiates every
    /// start spec in `grammar.starts`, writing each directly onto `canvas`
    /// and into the active set.
    pub fn start(&mut self, grammar: &Grammar, canvas: &mut dyn Canvas, rng: &mut impl Rng) {
        self.memory.clear();
        self.active.clear();
        self.mirror.clear();
        canvas.clear();

        for spec in &grammar.starts {
            let row = resolve_v_anchor(spec.v_anchor, self.rows, grammar.grid_h.max(1), rng);
            let col = resolve_h_anchor(spec.h_anchor, self.cols, grammar.grid_w.max(1), rng);
            self.active.insert(row, col, spec.symbol);
            self.mirror.set(row, col, spec.symbol);
            canvas.set_cell(
                row,
                col,
                spec.symbol,
                core_grammar::DEFAULT_FORE,
                core_grammar::DEFAULT_BACK,
                core_canvas::CellAttrs::NONE,
            );
        }
    }
}

fn align_down(value: u32, grid: u32) -> u32 {
    if grid <= 1 {
        return value;
    }
    (value / grid) * grid
}

/// Resolves a vertical start anchor to a row, following
/// original_source's `Derivation::start`: `usable` is `rows - 1` (row 0 is
/// the status line), `Lower`/`LowerAligned` pin to its bottom, `Random` is
/// grid-aligned-random, and any unrecognized anchor character (`Other`)
/// falls back to fully unaligned random — the source never reads it as a
/// literal offset digit. `Center` uses the full row count (`rows / 2`), not
/// `usable / 2` — original_source's center branch divides `row` directly.
fn resolve_v_anchor(anchor: VAnchor, rows: u32, grid_h: u32, rng: &mut impl Rng) -> u32 {
    let grid_h = grid_h.max(1);
    let usable = rows.saturating_sub(1).max(1);
    let effective = align_down(usable, grid_h).max(grid_h);
    let row = match anchor {
        VAnchor::Upper => 1,
        VAnchor::Lower => usable,
        VAnchor::Center => rows / 2,
        VAnchor::LowerAligned => align_down(usable.saturating_sub(1), grid_h) + 1,
        VAnchor::CenterAligned => grid_h * ((effective / grid_h) / 2),
        VAnchor::Random => grid_h * rng.random_range(0..(usable / grid_h).max(1)) + 1,
        VAnchor::Other(_) => rng.random_range(1..=usable),
    };
    row.clamp(1, usable)
}

/// Resolves a horizontal start anchor to a column; see [`resolve_v_anchor`].
fn resolve_h_anchor(anchor: HAnchor, cols: u32, grid_w: u32, rng: &mut impl Rng) -> u32 {
    let grid_w = grid_w.max(1);
    let usable = cols.saturating_sub(1);
    let effective = align_down(cols, grid_w);
    let col = match anchor {
        HAnchor::Left => 0,
        HAnchor::Right => usable,
        HAnchor::Center => cols / 2,
        HAnchor::RightAligned => effective.saturating_sub(grid_w),
        HAnchor::CenterAligned => grid_w * ((effective / grid_w) / 2),
        HAnchor::Random => grid_w * rng.random_range(0..(effective / grid_w).max(1)),
        HAnchor::Other(_) => rng.random_range(0..=usable),
    };
    col.min(usable)
}
