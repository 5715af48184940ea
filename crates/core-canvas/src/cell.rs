/// Per-cell display attributes. Bitmask rather than `bitflags` since the
/// canvas only ever needs three bits and core-canvas keeps no bitflags
/// dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellAttrs(pub u8);

impl CellAttrs {
    pub const NONE: CellAttrs = CellAttrs(0);
    pub const BOLD: CellAttrs = CellAttrs(1);
    pub const UNDERLINE: CellAttrs = CellAttrs(2);
    pub const REVERSE: CellAttrs = CellAttrs(4);

    pub fn contains(self, other: CellAttrs) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for CellAttrs {
    type Output = CellAttrs;
    fn bitor(self, rhs: CellAttrs) -> CellAttrs {
        CellAttrs(self.0 | rhs.0)
    }
}

/// One displayed cell: glyph plus a color-pair-resolvable fg/bg and attrs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub fore: u8,
    pub back: u8,
    pub attrs: CellAttrs,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            glyph: ' ',
            fore: 7,
            back: 8,
            attrs: CellAttrs::NONE,
        }
    }
}
