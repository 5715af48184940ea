//! Matcher and applier for one rule firing: [`matches`] is a pure read-only
//! dry-run over a rule's precondition region, [`apply`] commits its apply
//! region. Both walk the same `rhs` pattern via `core_grammar::walk_rhs` so
//! they can never disagree about which cells belong to the pattern.

mod applier;
mod matcher;
mod region;

pub use applier::apply;
pub use matcher::matches;
pub use region::{classify, Region};
