use core_grammar::{walk_rhs, Rule, Symbol, EMPTY};
use core_memory::Derivation;

use crate::region::{classify, Region};

/// Substitutes a pattern-body character into its "required" form: `@`
/// becomes the rule's own LHS (self-match), `&` becomes the required
/// context, a literal space becomes the empty-cell sentinel. Anything else
/// passes through unchanged.
fn substitute_req(ch: char, rule: &Rule) -> char {
    match ch {
        '@' => rule.lhs,
        '&' => rule.ctx.unwrap_or(EMPTY),
        ' ' => EMPTY,
        other => other,
    }
}

fn normalize_glyph(glyph: Symbol) -> Symbol {
    if glyph == ' ' {
        EMPTY
    } else {
        glyph
    }
}

/// Pure dry-run test: does `rule` apply when its first `@` is anchored at
/// `anchor`? Reads only `derivation`'s screen mirror; never mutates
/// anything. Safe to call repeatedly, and safe to call from multiple
/// threads against the same `Derivation` as long as nothing else is
/// writing concurrently.
pub fn matches(rule: &Rule, anchor: (i64, i64), derivation: &Derivation) -> bool {
    let cells = walk_rhs(&rule.rhs);
    for cell in &cells {
        if classify(rule, cell.row, cell.col) != Region::Precondition {
            continue;
        }
        let req = substitute_req(cell.ch, rule);
        let (wr, wc) = derivation.wrap(anchor.0 + cell.row as i64, anchor.1 + cell.col as i64);
        let ctx = normalize_glyph(derivation.screen_glyph(wr, wc));

        if req != '!' && req != '%' && req != ctx {
            return false;
        }
        if req == '!' && rule.ctx == Some(ctx) {
            return false;
        }
        if req == '%' && ctx != rule.ctxrep && Some(ctx) != rule.ctx {
            return false;
        }
    }
    true
}
