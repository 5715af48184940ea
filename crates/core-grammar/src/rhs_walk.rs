/// One non-space pattern cell from a rule's `rhs`, in zero-based
/// pattern-local coordinates (row/col reset at each `\n`). Shared by
/// `core-loader` (to locate the three `@` anchors at load time) and
/// `core-engine` (to re-walk the same cells at match/apply time) so the two
/// can never drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternCell {
    pub row: i32,
    pub col: i32,
    pub ch: char,
}

/// Walks `rhs` character by character, yielding one [`PatternCell`] per
/// non-space, non-newline character. `\n` resets the column and advances
/// the row; a raw space advances the column but yields no cell ("don't
/// care" per SPEC_FULL.md §4.3/§6).
pub fn walk_rhs(rhs: &str) -> Vec<PatternCell> {
    let mut cells = Vec::new();
    let mut row = 0i32;
    let mut col = 0i32;
    for ch in rhs.chars() {
        match ch {
            '\n' => {
                row += 1;
                col = 0;
            }
            ' ' => {
                col += 1;
            }
            other => {
                cells.push(PatternCell {
                    row,
                    col,
                    ch: other,
                });
                col += 1;
            }
        }
    }
    cells
}

/// Finds the `(row, col)` of the `ord`th (0-based) occurrence of `marker`
/// in `rhs`'s walk. Used at load time to populate a rule's three `@`
/// anchors (`ro,co` / `rm,cm` / `rq,cq`).
pub fn nth_occurrence(rhs: &str, marker: char, ord: usize) -> Option<(i32, i32)> {
    walk_rhs(rhs)
        .into_iter()
        .filter(|cell| cell.ch == marker)
        .nth(ord)
        .map(|cell| (cell.row, cell.col))
}
