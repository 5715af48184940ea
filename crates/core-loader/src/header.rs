use core_grammar::{nth_occurrence, Grammar, Rule, RuleAction, Symbol, DEFAULT_BACK, DEFAULT_FORE, DEFAULT_ZORD};

/// Characters at header position 2 (the load-marker slot) that mark a
/// program-switch rule instead of an ordinary sound trigger.
const LOAD_MARKERS: [char; 4] = ['>', ')', ']', '|'];

fn char_at(line: &str, idx: usize) -> Option<char> {
    line.chars().nth(idx)
}

fn rest_from(line: &str, idx: usize) -> String {
    line.chars().skip(idx).collect()
}

/// Builds one [`Rule`] from a `=`-prefixed header line and its shared body,
/// per SPEC_FULL.md §4.1's positional header layout. Registers the LHS as a
/// non-terminal and, for a sound-trigger marker, registers the sound symbol
/// on `grammar.sounds` as a side effect.
pub fn build_rule(header_line: &str, body: &str, grammar: &mut Grammar) -> Rule {
    // Position 2 (index 1): load-marker / sound-key. Position 3 (index 2):
    // LHS symbol, default 's' per original_source's addRule.
    let marker = char_at(header_line, 1);
    let lhs = char_at(header_line, 2).unwrap_or('s');
    let key = char_at(header_line, 3).unwrap_or('?');
    let rep = char_at(header_line, 4).unwrap_or(' ');
    let fore_raw = char_at(header_line, 5);
    let back_raw = char_at(header_line, 6);
    let ctx_raw = char_at(header_line, 7).unwrap_or('?');
    let ctxrep_raw = char_at(header_line, 8).unwrap_or(' ');
    let zord = char_at(header_line, 9).unwrap_or(DEFAULT_ZORD);

    let fore = fore_raw.map_or(DEFAULT_FORE, |c| grammar.get_color(c, DEFAULT_FORE));
    let back = back_raw.map_or(DEFAULT_BACK, |c| grammar.get_color(c, DEFAULT_BACK));
    let ctx = if ctx_raw == '?' { None } else { Some(ctx_raw) };
    let ctxrep = if ctxrep_raw == '*' { lhs } else { ctxrep_raw };

    let (reward, weight) = parse_reward_weight(header_line);

    let rhs = body.replace('*', &lhs.to_string());
    let origin = nth_occurrence(&rhs, '@', 0).unwrap_or((0, 0));
    let mid = nth_occurrence(&rhs, '@', 1).unwrap_or(origin);
    let apply_origin = nth_occurrence(&rhs, '@', 2).unwrap_or(mid);

    let (sound, action) = classify_action(marker, header_line, lhs);

    grammar.non_terminals.insert(lhs);
    if let RuleAction::PlaySound(sym) = action {
        grammar.sounds.insert(sym);
    }

    Rule {
        lhs,
        header: rest_from(header_line, 2),
        rhs,
        ro: origin.0,
        co: origin.1,
        rm: mid.0,
        cm: mid.1,
        rq: apply_origin.0,
        cq: apply_origin.1,
        key,
        rep,
        ctx,
        ctxrep,
        fore,
        back,
        reward,
        weight,
        zord,
        sound,
        action,
    }
}

/// Parses whitespace-separated `reward weight` starting right after the
/// nine positional header fields (index 10, per spec.md §4.1's 1-indexed
/// table — see SPEC_FULL.md §9(iii) for why this is one less than
/// original_source's raw `substr(11)`). Missing/unparsable tokens fall back
/// to `(0, 1)`; weight is clamped to at least 1.
fn parse_reward_weight(header_line: &str) -> (i64, u32) {
    let tail = rest_from(header_line, 10);
    let mut tokens = tail.split_whitespace();
    let reward = tokens.next().and_then(|t| t.parse::<i64>().ok()).unwrap_or(0);
    let weight = tokens
        .next()
        .and_then(|t| t.parse::<u32>().ok())
        .unwrap_or(1)
        .max(1);
    (reward, weight)
}

/// Determines a rule's sound symbol and derived [`RuleAction`] from its
/// load-marker character (header index 1). `>`/`)`/`]`/`|` mark a
/// program-switch rule (`)`/`|` imply clear, `]`/`|` imply pause); any
/// other character is registered as a sound-trigger symbol instead.
fn classify_action(marker: Option<char>, header_line: &str, lhs: Symbol) -> (Symbol, RuleAction) {
    let Some(marker) = marker else {
        return ('\0', RuleAction::Rewrite);
    };

    if LOAD_MARKERS.contains(&marker) {
        let clear = marker == ')' || marker == '|';
        let pause = marker == ']' || marker == '|';
        let name = program_argument(header_line);
        let action = match name.as_str() {
            "quit" => RuleAction::Quit,
            "return" => RuleAction::Return,
            _ => RuleAction::SwitchProgram { name, clear, pause },
        };
        ('\0', action)
    } else {
        let _ = lhs;
        (marker, RuleAction::PlaySound(marker))
    }
}

/// Extracts the program-switch argument: the first whitespace-delimited
/// token starting at header index 5 (where an ordinary rule's fore color
/// would sit — program-switch rules repurpose that tail as the literal
/// target name/path), matching original_source's `lhsa.substr(5)`.
fn program_argument(header_line: &str) -> String {
    rest_from(header_line, 5)
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_string()
}
