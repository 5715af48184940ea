use crossterm::style::Color;

/// The eight base colors addressable by a rule's `fore`/`back` digit, in the
/// same order the source system's `initColors()` registers its curses color
/// pairs (black, red, green, yellow, blue, magenta, cyan, white).
const BASE: [Color; 8] = [
    Color::Black,
    Color::DarkRed,
    Color::DarkGreen,
    Color::DarkYellow,
    Color::DarkBlue,
    Color::DarkMagenta,
    Color::DarkCyan,
    Color::Grey,
];

/// Resolves a 0..=7 color index to a terminal color. Anything out of range
/// (i.e. the transparent sentinel `8`) has no direct color and must be
/// handled by the caller via the inherited background, per SPEC_FULL.md
/// §4.4 step 4.
pub fn resolve(index: u8) -> Option<Color> {
    BASE.get(index as usize).copied()
}

/// A 64-entry fg×bg pair table (8 foregrounds × 8 backgrounds), mirroring
/// the curses `init_pair` table the source system builds once at startup
/// (`initColors()`). Registered eagerly so painting never has to allocate
/// or look up a pair id mid-frame.
#[derive(Debug, Clone)]
pub struct ColorPairTable {
    pairs: [(Color, Color); 64],
}

impl ColorPairTable {
    pub fn new() -> Self {
        let mut pairs = [(Color::Reset, Color::Reset); 64];
        for fore in 0..8u8 {
            for back in 0..8u8 {
                let id = (fore as usize) * 8 + back as usize;
                pairs[id] = (BASE[fore as usize], BASE[back as usize]);
            }
        }
        ColorPairTable { pairs }
    }

    /// Looks up the pair for an in-range `(fore, back)`; `None` when either
    /// index is out of the 0..=7 range (transparent background, or an
    /// unresolved dictionary color), matching `getColor`'s "treat as
    /// no-attribute" fallback.
    pub fn pair(&self, fore: u8, back: u8) -> Option<(Color, Color)> {
        if fore > 7 || back > 7 {
            return None;
        }
        Some(self.pairs[(fore as usize) * 8 + back as usize])
    }
}

impl Default for ColorPairTable {
    fn default() -> Self {
        Self::new()
    }
}
