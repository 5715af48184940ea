use core_grammar::{HAnchor, StartSpec, VAnchor};

use crate::header::build_rule;
use core_grammar::Grammar;

/// One accumulated `=` header group plus the body text that follows it, up
/// to (but not including) the next header line or directive. Mirrors
/// original_source's `loadFromFile` accumulation: consecutive header lines
/// share one body when no body line separates them.
struct PendingRule {
    headers: Vec<String>,
    body: Vec<String>,
}

/// Parses program source text into `grammar`, dispatching each line by its
/// leading character per SPEC_FULL.md §4.1: `#` directives, `^` start specs,
/// `=` rule headers, and bare body lines. Grounded on original_source's
/// `Grammar2D::loadFromFile`/`_process`.
pub fn tokenize(text: &str, grammar: &mut Grammar) {
    let mut pending: Option<PendingRule> = None;
    let mut first_line = true;

    for line in text.lines() {
        let first = line.chars().next();
        match first {
            Some('#') => {
                flush_if_bodied(&mut pending, grammar);
                handle_directive(line, grammar, first_line);
            }
            Some('^') => {
                flush_if_bodied(&mut pending, grammar);
                handle_start(line, grammar);
            }
            Some('=') => {
                let needs_flush = pending
                    .as_ref()
                    .is_some_and(|p| !p.body.is_empty());
                if needs_flush {
                    flush(pending.take().unwrap(), grammar);
                }
                pending
                    .get_or_insert_with(|| PendingRule {
                        headers: Vec::new(),
                        body: Vec::new(),
                    })
                    .headers
                    .push(line.to_string());
            }
            _ => {
                if let Some(p) = pending.as_mut() {
                    p.body.push(line.to_string());
                }
            }
        }
        first_line = false;
    }

    if let Some(p) = pending {
        if !p.body.is_empty() {
            flush(p, grammar);
        }
    }
}

fn flush_if_bodied(pending: &mut Option<PendingRule>, grammar: &mut Grammar) {
    if pending.as_ref().is_some_and(|p| !p.body.is_empty()) {
        flush(pending.take().unwrap(), grammar);
    }
}

/// Builds one [`Rule`](core_grammar::Rule) per accumulated header line,
/// sharing the single accumulated body (trimmed of its trailing newline by
/// construction, per spec.md §4.1 — `Vec<&str>::join` never adds one).
fn flush(pending: PendingRule, grammar: &mut Grammar) {
    let body = pending.body.join("\n");
    for header_line in &pending.headers {
        let rule = build_rule(header_line, &body, grammar);
        grammar.rules.entry(rule.lhs).or_default().push(rule);
    }
}

fn char_at(line: &str, idx: usize) -> Option<char> {
    line.chars().nth(idx)
}

fn rest_from(line: &str, idx: usize) -> String {
    line.chars().skip(idx).collect()
}

/// Handles a `#`-prefixed directive line: `#!` (first line only) sets the
/// help string, `#=G` sets grid dimensions, `#=<k><v>` adds a dictionary
/// entry, anything else is a plain comment.
fn handle_directive(line: &str, grammar: &mut Grammar, first_line: bool) {
    if first_line && line.starts_with("#!") {
        grammar.help = line[2..].to_string();
        return;
    }
    if !line.starts_with("#=") {
        return;
    }
    if char_at(line, 2) == Some('G') {
        handle_grid(line, grammar);
        return;
    }
    if let Some(key) = char_at(line, 2) {
        let value = rest_from(line, 3);
        grammar.dict.insert(key, value.clone());
        if key == 'T' {
            apply_timing(&value, grammar);
        }
    }
}

/// `#=G<width> <height>`: grid alignment dimensions, each defaulting to 1
/// and clamped to at least 1.
fn handle_grid(line: &str, grammar: &mut Grammar) {
    let tail = rest_from(line, 3);
    let mut tokens = tail.split_whitespace();
    let width = tokens.next().and_then(|t| t.parse::<u32>().ok()).unwrap_or(1).max(1);
    let height = tokens.next().and_then(|t| t.parse::<u32>().ok()).unwrap_or(1).max(1);
    grammar.grid_w = width;
    grammar.grid_h = height;
}

/// Parses `dict['T']` = "B M T" (milliseconds) into the three step fields,
/// defaulting to 500/50/0 per original_source's timing setup in
/// `zahradnice.cpp`'s main loop.
fn apply_timing(value: &str, grammar: &mut Grammar) {
    let mut tokens = value.split_whitespace();
    grammar.b_step_ms = tokens.next().and_then(|t| t.parse().ok()).unwrap_or(500);
    grammar.m_step_ms = tokens.next().and_then(|t| t.parse().ok()).unwrap_or(50);
    grammar.t_step_ms = tokens.next().and_then(|t| t.parse().ok()).unwrap_or(0);
}

/// `^<symbol><v><h>`: a start spec. A bare `^` with nothing else instead
/// requests that the canvas be cleared at derivation start.
fn handle_start(line: &str, grammar: &mut Grammar) {
    if line.chars().count() <= 1 {
        grammar.clear_requested = true;
        return;
    }
    let symbol = char_at(line, 1).unwrap_or(core_grammar::EMPTY);
    let v = char_at(line, 2).map(VAnchor::parse).unwrap_or(VAnchor::Center);
    let h = char_at(line, 3).map(HAnchor::parse).unwrap_or(HAnchor::Center);
    grammar.starts.push(StartSpec {
        v_anchor: v,
        h_anchor: h,
        symbol,
    });
}
