use crate::Symbol;

/// Vertical anchor for a start specification. Grounded on original_source's
/// `Derivation::start` `s.ul` dispatch: uppercase letters are the
/// grid-aligned counterparts of the lowercase edge/center anchors, `X` is
/// grid-aligned-random, and any unrecognized character falls back to fully
/// unaligned random placement (the source never reads it as a literal
/// offset digit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAnchor {
    /// Pinned to the top edge.
    Upper,
    /// Pinned to the bottom edge.
    Lower,
    /// Vertically centered.
    Center,
    /// Grid-aligned bottom row.
    LowerAligned,
    /// Grid-aligned center row.
    CenterAligned,
    /// Uniform-random row, grid-aligned.
    Random,
    /// Any other character: uniform-random row, not grid-aligned.
    Other(char),
}

/// Horizontal anchor for a start specification. Same shape as [`VAnchor`]
/// but over columns; see its docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAnchor {
    Left,
    Right,
    Center,
    RightAligned,
    CenterAligned,
    Random,
    Other(char),
}

/// One `^<s><ul><lr>` start directive: where to place `symbol` when a
/// derivation begins. Multiple start specs all get instantiated.
#[derive(Debug, Clone, Copy)]
pub struct StartSpec {
    pub v_anchor: VAnchor,
    pub h_anchor: HAnchor,
    pub symbol: Symbol,
}

impl VAnchor {
    pub fn parse(c: char) -> VAnchor {
        match c {
            'u' => VAnchor::Upper,
            'l' => VAnchor::Lower,
            'c' => VAnchor::Center,
            'L' => VAnchor::LowerAligned,
            'C' => VAnchor::CenterAligned,
            'X' => VAnchor::Random,
            other => VAnchor::Other(other),
        }
    }
}

impl HAnchor {
    pub fn parse(c: char) -> HAnchor {
        match c {
            'l' => HAnchor::Left,
            'r' => HAnchor::Right,
            'c' => HAnchor::Center,
            'R' => HAnchor::RightAligned,
            'C' => HAnchor::CenterAligned,
            'X' => HAnchor::Random,
            other => HAnchor::Other(other),
        }
    }
}
