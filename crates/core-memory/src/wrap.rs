/// Grid-aligned effective dimensions used for toroidal wrap, cached once
/// per derivation (and recomputed on resize/restart) rather than
/// recalculated on every write, mirroring the source `Derivation`'s cached
/// `effective_max_row`/`effective_max_col`.
#[derive(Debug, Clone, Copy)]
pub struct WrapDims {
    /// Rows wrap within `[1, effective_rows]`; row 0 is the status line.
    pub effective_rows: u32,
    /// Columns wrap within `[0, effective_cols)`.
    pub effective_cols: u32,
}

impl WrapDims {
    pub fn new(effective_rows: u32, effective_cols: u32) -> Self {
        WrapDims {
            effective_rows: effective_rows.max(1),
            effective_cols: effective_cols.max(1),
        }
    }

    /// Wraps an arbitrary (possibly negative, possibly far out of range)
    /// row into `[1, effective_rows]`.
    pub fn wrap_row(&self, r: i64) -> u32 {
        let span = self.effective_rows as i64;
        let zero_based = (r - 1).rem_euclid(span);
        (zero_based + 1) as u32
    }

    /// Wraps an arbitrary column into `[0, effective_cols)`.
    pub fn wrap_col(&self, c: i64) -> u32 {
        let span = self.effective_cols as i64;
        c.rem_euclid(span) as u32
    }
}
