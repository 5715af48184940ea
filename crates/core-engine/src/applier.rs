use core_canvas::{Canvas, CellAttrs};
use core_grammar::{walk_rhs, Grammar, Rule, RuleAction, EMPTY};
use core_memory::{Derivation, MemoryCell};

use crate::region::{classify, Region};

/// Substitutes a pattern-body character into its "replacement" form: `@`
/// becomes the rule's `rep`, `&` becomes `ctxrep`. Literals pass through.
fn substitute_rep(ch: char, rule: &Rule) -> char {
    match ch {
        '@' => rule.rep,
        '&' => rule.ctxrep,
        other => other,
    }
}

/// Commits `rule`'s effect: walks the apply region of its `rhs` — the cells
/// past the midline, strictly beyond what Matcher already checked as
/// precondition — writing each to `canvas` and updating `derivation`'s
/// memory, screen mirror and active non-terminal index. The midline cell
/// itself is neither; see [`crate::region::Region`].
///
/// Returns `true` if the rule actually took effect — either it painted at
/// least one cell, or it carries a non-`Rewrite` action (sound/program-switch
/// rules have nothing to paint and always count as applied once Matcher has
/// passed). Z-order-shielded writes are skipped individually; a rule whose
/// every apply-region cell was shielded reports `false`, matching
/// SPEC_FULL.md §9's "Applier's stricter guards fail at commit" case.
pub fn apply(
    rule: &Rule,
    anchor: (i64, i64),
    grammar: &Grammar,
    derivation: &mut Derivation,
    canvas: &mut dyn Canvas,
) -> bool {
    let cells = walk_rhs(&rule.rhs);
    let mut wrote_any = false;

    for cell in &cells {
        if classify(rule, cell.row, cell.col) != Region::Apply {
            continue;
        }

        let rep = substitute_rep(cell.ch, rule);
        let (wr, wc) = derivation.wrap(anchor.0 + cell.row as i64, anchor.1 + cell.col as i64);

        if rep == '$' {
            restore_from_memory(derivation, canvas, wr, wc);
            wrote_any = true;
            continue;
        }

        if !derivation.memory().z_order_allows(wr, wc, rule.zord) {
            continue;
        }

        write_cell(rule, grammar, derivation, canvas, wr, wc, rep);
        wrote_any = true;
    }

    wrote_any || rule.action != RuleAction::Rewrite
}

fn restore_from_memory(derivation: &mut Derivation, canvas: &mut dyn Canvas, row: u32, col: u32) {
    let remembered = derivation.memory().get(row, col);
    canvas.set_cell(
        row,
        col,
        remembered.glyph,
        remembered.fore,
        remembered.back,
        CellAttrs::NONE,
    );
    derivation.set_screen_glyph(row, col, remembered.glyph);
    derivation.active_mut().erase(row, col);
}

fn write_cell(
    rule: &Rule,
    grammar: &Grammar,
    derivation: &mut Derivation,
    canvas: &mut dyn Canvas,
    row: u32,
    col: u32,
    rep: char,
) {
    let glyph = if rep == '~' { ' ' } else { rep };
    let effective_back = if rule.back > 7 {
        derivation.memory().get(row, col).back
    } else {
        rule.back
    };

    canvas.set_cell(row, col, glyph, rule.fore, effective_back, CellAttrs::NONE);
    let mirrored = if glyph == ' ' { EMPTY } else { glyph };
    derivation.set_screen_glyph(row, col, mirrored);

    if grammar.non_terminals.contains(&mirrored) {
        // Preserve the prior terminal beneath this non-terminal so a later
        // `$` restores it; only the background tracks the new write.
        derivation.active_mut().insert(row, col, mirrored);
        let prior = derivation.memory().get(row, col);
        derivation.memory_mut().set(
            row,
            col,
            MemoryCell {
                glyph: prior.glyph,
                fore: prior.fore,
                back: effective_back,
                zord: prior.zord,
            },
        );
    } else {
        derivation.active_mut().erase(row, col);
        derivation.memory_mut().set(
            row,
            col,
            MemoryCell {
                glyph: mirrored,
                fore: rule.fore,
                back: effective_back,
                zord: rule.zord,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_canvas::InMemoryCanvas;

    fn base_rule(rhs: &str, ro: i32, co: i32, rm: i32, cm: i32, rq: i32, cq: i32) -> Rule {
        Rule {
            lhs: 's',
            header: String::new(),
            rhs: rhs.to_string(),
            ro,
            co,
            rm,
            cm,
            rq,
            cq,
            key: '?',
            rep: 'A',
            ctx: None,
            ctxrep: ' ',
            fore: 1,
            back: 2,
            reward: 0,
            weight: 1,
            zord: 'a',
            sound: '\0',
            action: RuleAction::Rewrite,
        }
    }

    #[test]
    fn single_anchor_rewrite_writes_its_own_cell() {
        let rule = base_rule("@", 0, 0, 0, 0, 0, 0);
        let grammar = Grammar::default();
        let mut derivation = Derivation::new(10, 10, 9, 10);
        let mut canvas = InMemoryCanvas::new(10, 10);
        let anchor = (5i64 - rule.rq as i64, 5i64 - rule.cq as i64);
        let applied = apply(&rule, anchor, &grammar, &mut derivation, &mut canvas);
        assert!(applied);
        assert_eq!(canvas.get_glyph(5, 5), 'A');
    }

    #[test]
    fn z_order_shields_lower_priority_write() {
        let rule = base_rule("@", 0, 0, 0, 0, 0, 0);
        let grammar = Grammar::default();
        let mut derivation = Derivation::new(10, 10, 9, 10);
        derivation.memory_mut().set(
            5,
            5,
            MemoryCell {
                glyph: 'X',
                fore: 1,
                back: 2,
                zord: 'm',
            },
        );
        let mut canvas = InMemoryCanvas::new(10, 10);
        let anchor = (5i64, 5i64);
        let applied = apply(&rule, anchor, &grammar, &mut derivation, &mut canvas);
        assert!(!applied);
        assert_eq!(canvas.get_glyph(5, 5), ' ');
    }

    #[test]
    fn restore_sentinel_reads_back_memory() {
        let rule = base_rule("$", 0, 0, 0, 0, 0, 0);
        let grammar = Grammar::default();
        let mut derivation = Derivation::new(10, 10, 9, 10);
        derivation.memory_mut().set(
            5,
            5,
            MemoryCell {
                glyph: 'Z',
                fore: 3,
                back: 4,
                zord: 'a',
            },
        );
        let mut canvas = InMemoryCanvas::new(10, 10);
        let anchor = (5i64, 5i64);
        let applied = apply(&rule, anchor, &grammar, &mut derivation, &mut canvas);
        assert!(applied);
        assert_eq!(canvas.get_glyph(5, 5), 'Z');
    }

    #[test]
    fn transparent_background_inherits_memory() {
        let mut rule = base_rule("@", 0, 0, 0, 0, 0, 0);
        rule.back = 9;
        let grammar = Grammar::default();
        let mut derivation = Derivation::new(10, 10, 9, 10);
        derivation.memory_mut().set(
            5,
            5,
            MemoryCell {
                glyph: ' ',
                fore: 7,
                back: 3,
                zord: 'a',
            },
        );
        let mut canvas = InMemoryCanvas::new(10, 10);
        let anchor = (5i64, 5i64);
        apply(&rule, anchor, &grammar, &mut derivation, &mut canvas);
        assert_eq!(canvas.get_cell(5, 5).back, 3);
    }

    #[test]
    fn non_terminal_write_preserves_prior_glyph_in_memory() {
        let rule = base_rule("@", 0, 0, 0, 0, 0, 0);
        let mut grammar = Grammar::default();
        grammar.non_terminals.insert('A');
        let mut derivation = Derivation::new(10, 10, 9, 10);
        derivation.memory_mut().set(
            5,
            5,
            MemoryCell {
                glyph: 'Q',
                fore: 5,
                back: 6,
                zord: 'a',
            },
        );
        let mut canvas = InMemoryCanvas::new(10, 10);
        let anchor = (5i64, 5i64);
        apply(&rule, anchor, &grammar, &mut derivation, &mut canvas);
        let mem = derivation.memory().get(5, 5);
        assert_eq!(mem.glyph, 'Q');
        assert_eq!(mem.fore, 5);
        assert_eq!(mem.back, 2);
        assert_eq!(derivation.active().get(5, 5), Some('A'));
    }
}
