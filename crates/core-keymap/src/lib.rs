//! Dictionary-driven control-key remap: lets a program's `#=x<keys>`,
//! `#=q<keys>`, `#=<space><keys>` dictionary entries redirect arbitrary
//! user keystrokes onto the three internal control keys (`x`/restart,
//! `space`/pause, `q`/quit), per SPEC_FULL.md §4.1's `control_remaps` —
//! original_source declares this as `getControlKey` over
//! `control_remaps: wchar_t -> wstring`, read here as the inverse: each
//! character of the dictionary value maps back onto the control symbol.

use std::collections::HashMap;

use core_grammar::{Grammar, Symbol};

/// The three internal control symbols a user key can be remapped onto.
const CONTROL_SYMBOLS: [Symbol; 3] = ['x', ' ', 'q'];

/// Resolves a raw user keystroke to its effective control symbol, if any
/// dictionary entry remaps it; otherwise the key passes through unchanged
/// (an ordinary rule-activation key is never touched by this remap).
#[derive(Debug, Clone, Default)]
pub struct ControlKeymap {
    remap: HashMap<Symbol, Symbol>,
}

impl ControlKeymap {
    /// Builds the remap table from `grammar.dict`: for each control symbol
    /// `c` in `{'x', ' ', 'q'}`, every character in `dict[c]` (if present)
    /// is registered as remapping onto `c`.
    pub fn build(grammar: &Grammar) -> Self {
        let mut remap = HashMap::new();
        for control in CONTROL_SYMBOLS {
            if let Some(value) = grammar.dict.get(&control) {
                for user_key in value.chars() {
                    remap.insert(user_key, control);
                }
            }
        }
        ControlKeymap { remap }
    }

    /// Translates `key` through the remap table; keys with no entry pass
    /// through unchanged.
    pub fn resolve(&self, key: Symbol) -> Symbol {
        self.remap.get(&key).copied().unwrap_or(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar_with_dict(entries: &[(char, &str)]) -> Grammar {
        let mut g = Grammar::default();
        for (k, v) in entries {
            g.dict.insert(*k, (*v).to_string());
        }
        g
    }

    #[test]
    fn unmapped_key_passes_through() {
        let keymap = ControlKeymap::build(&Grammar::default());
        assert_eq!(keymap.resolve('a'), 'a');
    }

    #[test]
    fn dictionary_entry_remaps_every_listed_key() {
        let grammar = grammar_with_dict(&[('x', "ab")]);
        let keymap = ControlKeymap::build(&grammar);
        assert_eq!(keymap.resolve('a'), 'x');
        assert_eq!(keymap.resolve('b'), 'x');
        assert_eq!(keymap.resolve('c'), 'c');
    }

    #[test]
    fn space_and_quit_remap_independently() {
        let grammar = grammar_with_dict(&[(' ', "p"), ('q', "e")]);
        let keymap = ControlKeymap::build(&grammar);
        assert_eq!(keymap.resolve('p'), ' ');
        assert_eq!(keymap.resolve('e'), 'q');
    }
}
