use crate::Symbol;

/// What firing a rule actually does, derived once at load time from the
/// header's load-marker column so the hot dispatch path in `gridgram-bin`'s
/// loop is a single match rather than a chain of flag tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleAction {
    /// Ordinary canvas rewrite.
    Rewrite,
    /// Plays a sample keyed by `sound` in addition to rewriting.
    PlaySound(Symbol),
    /// Program-switch rule: replaces the current grammar with `name`,
    /// optionally clearing the canvas and/or starting paused.
    SwitchProgram {
        name: String,
        clear: bool,
        pause: bool,
    },
    /// Program-switch rule whose argument resolved to `"return"`: pops the
    /// caller stack instead of pushing a new program.
    Return,
    /// Program-switch rule whose argument resolved to `"quit"`.
    Quit,
}

/// One rewriting rule: a LHS non-terminal, an activation key, a pattern body
/// with up to three `@` anchors, and the commit-time parameters (replacement
/// glyph, colors, context, z-order, reward/weight).
#[derive(Debug, Clone)]
pub struct Rule {
    pub lhs: Symbol,
    /// Raw header line (post load-marker), kept for status-line display and
    /// program-switch argument parsing.
    pub header: String,
    /// Pattern body, `*` already substituted with `lhs` at load time.
    pub rhs: String,
    /// Row/col of the first `@` (origin): matcher dry-run anchors here.
    pub ro: i32,
    pub co: i32,
    /// Row/col of the second `@` (midline): splits precondition from
    /// apply-only region.
    pub rm: i32,
    pub cm: i32,
    /// Row/col of the third `@` (apply-origin): applier commit anchors here.
    pub rq: i32,
    pub cq: i32,
    /// Activation key; `'?'` means any key.
    pub key: Symbol,
    /// Replacement for `@` at commit time.
    pub rep: Symbol,
    /// Required context glyph, `None` for `'?'`.
    pub ctx: Option<Symbol>,
    /// Replacement for `%`/`&` context-marked cells.
    pub ctxrep: Symbol,
    pub fore: u8,
    pub back: u8,
    pub reward: i64,
    pub weight: u32,
    pub zord: char,
    /// Sound symbol (`'\0'` = none); distinct from `action`'s `PlaySound`
    /// wrapper, kept for header-driven lookups during load-time classification.
    pub sound: Symbol,
    pub action: RuleAction,
}

impl Rule {
    /// `true` when the apply phase proceeds rightward from the midline
    /// (third `@` is to the right of the first); `false` means it proceeds
    /// downward past the midline.
    pub fn is_horizontal(&self) -> bool {
        self.cq > self.co
    }

    /// `false` when the rule's body carries a single `@` (no literal second
    /// occurrence), so load-time defaulting collapsed `rm`/`cm` onto `ro`/`co`.
    /// Such a rule has no precondition region at all: the whole pattern is
    /// apply.
    pub fn has_distinct_midline(&self) -> bool {
        self.rm != self.ro || self.cm != self.co
    }
}
