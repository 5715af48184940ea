//! Resolves a program name to a `.cfg`/`.cfg.gz` file and parses it into a
//! [`core_grammar::Grammar`]. The only fatal error is a program that cannot
//! be found at all (spec.md §7); every other malformed-input case resolves
//! to a documented default inline, matching original_source's
//! `Grammar2D::loadFromFile`.

mod error;
mod header;
mod resolve;
mod tokenizer;

pub use error::LoaderError;
pub use resolve::{resolve, ProgramSource};

use core_grammar::Grammar;

/// Resolves and parses `name` into a fresh [`Grammar`]. `name`'s directory
/// is not otherwise recorded on the grammar; callers that need to resolve
/// sound/include paths relative to it should call [`resolve`] directly.
#[tracing::instrument(skip_all, fields(program = %name))]
pub fn load_program(name: &str) -> Result<Grammar, LoaderError> {
    let source = resolve(name)?;
    let grammar = load_from_str(&source.text);
    tracing::debug!(
        rule_groups = grammar.rules.len(),
        starts = grammar.starts.len(),
        "loaded program"
    );
    Ok(grammar)
}

/// Parses already-loaded program text into a [`Grammar`]. Exposed for tests
/// and for callers that have obtained program text some other way (e.g. an
/// embedded default program).
pub fn load_from_str(text: &str) -> Grammar {
    let mut grammar = Grammar::default();
    tokenizer::tokenize(text, &mut grammar);
    grammar
}
