use core_grammar::Rule;

/// Which part of a rule's `rhs` a pattern cell belongs to, given the rule's
/// orientation (`cq > co` ⇒ horizontal, apply phase runs rightward past the
/// midline; otherwise vertical, apply phase runs downward past the
/// midline).
///
/// Grounded on `original_source`'s `dryapply()`/`apply()`: both compare the
/// pattern-local row/col straight against `rule.rm`/`cm` with strict `<`
/// (precondition) and strict `>` (apply). The literal midline cell
/// (`offset == cm`/`rm` — the second `@` itself) satisfies neither and is
/// [`Region::Midline`]: it's a textual divider, never tested, never
/// written. A rule whose second/third `@` never occur collapses `rm`/`cm`
/// (and `rq`/`cq`) down to the first `@`'s own position at load time; for
/// that shape `classify` treats the whole pattern as apply (see
/// [`Rule::has_distinct_midline`]), matching the common single-anchor
/// self-rewrite rule, which has no precondition at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Precondition,
    Midline,
    Apply,
}

/// Classifies a pattern-local `(row, col)` cell against `rule`'s midline.
pub fn classify(rule: &Rule, row: i32, col: i32) -> Region {
    let (offset, threshold) = if rule.is_horizontal() {
        (col, rule.cm)
    } else {
        (row, rule.rm)
    };
    if offset < threshold {
        Region::Precondition
    } else if offset > threshold || !rule.has_distinct_midline() {
        Region::Apply
    } else {
        Region::Midline
    }
}
