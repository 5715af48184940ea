//! Weighted stochastic rule selection for one derivation step: gathers
//! every `(position, rule)` candidate whose key matches and whose Matcher
//! passes, draws one by weight, and commits it with the Applier. Matching
//! (read-only) may be spread across a bounded worker pool; selection and
//! application always run on the calling thread, matching SPEC_FULL.md §5's
//! single-writer rule.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use core_canvas::Canvas;
use core_engine::{apply, matches};
use core_grammar::{Grammar, Rule, RuleAction, Symbol};
use core_memory::Derivation;

/// Outcome of one [`Scheduler::step`] call: whether a rule fired, and if
/// so, what it did — its header (for status-line display), any sound it
/// wants played, and its resolved action (for program-switch dispatch).
#[derive(Debug, Clone, Default)]
pub struct StepOutcome {
    pub applied: bool,
    pub header: Option<String>,
    pub sounds: Vec<Symbol>,
    pub action: Option<RuleAction>,
}

/// Drives one derivation step at a time. Owns the explicit seeded RNG and
/// the running score, per SPEC_FULL.md §9 ("keep one seeded PRNG as an
/// explicit `Scheduler` field rather than a process-wide singleton").
pub struct Scheduler {
    rng: StdRng,
    thread_count: usize,
    pub score: i64,
}

impl Scheduler {
    /// `seed == 0` resolves to a time-derived seed, matching
    /// original_source's `srand(seed ? seed : time(NULL))`.
    pub fn new(seed: u64, thread_count: usize) -> Self {
        let resolved = if seed == 0 { time_seed() } else { seed };
        Scheduler {
            rng: StdRng::seed_from_u64(resolved),
            thread_count: thread_count.max(1),
            score: 0,
        }
    }

    /// Runs one derivation step for input key `k`. Builds the candidate set
    /// (active non-terminal cells whose symbol has a rule keyed to `k`),
    /// dry-run matches each, draws one by weight, and applies it.
    pub fn step(
        &mut self,
        key: Symbol,
        grammar: &Grammar,
        derivation: &mut Derivation,
        canvas: &mut dyn Canvas,
    ) -> StepOutcome {
        let candidates = self.gather_candidates(key, grammar, derivation);
        if candidates.is_empty() {
            return StepOutcome::default();
        }

        let passed = self.evaluate_matches(&candidates, derivation);
        let weighted: Vec<(u32, u32, &Rule)> = candidates
            .into_iter()
            .zip(passed)
            .filter_map(|(cand, ok)| ok.then_some(cand))
            .collect();
        if weighted.is_empty() {
            return StepOutcome::default();
        }

        let total_weight: u64 = weighted.iter().map(|(_, _, rule)| rule.weight as u64).sum();
        let draw = self.rng.random_range(0..total_weight);
        let mut cumulative = 0u64;
        let (row, col, rule) = weighted
            .iter()
            .find(|(_, _, rule)| {
                cumulative += rule.weight as u64;
                draw < cumulative
            })
            .copied()
            .unwrap_or(*weighted.last().unwrap());

        let anchor = (row as i64 - rule.rq as i64, col as i64 - rule.cq as i64);
        let applied = apply(rule, anchor, grammar, derivation, canvas);

        if applied {
            self.score += rule.reward;
            let sounds = if rule.sound != '\0' {
                vec![rule.sound]
            } else {
                Vec::new()
            };
            StepOutcome {
                applied: true,
                header: Some(rule.header.clone()),
                sounds,
                action: Some(rule.action.clone()),
            }
        } else {
            StepOutcome::default()
        }
    }

    /// Active non-terminal cells whose symbol carries at least one rule
    /// keyed to `key` (or `'?'`), paired with that matching rule.
    fn gather_candidates<'g>(
        &self,
        key: Symbol,
        grammar: &'g Grammar,
        derivation: &Derivation,
    ) -> Vec<(u32, u32, &'g Rule)> {
        let mut out = Vec::new();
        for (row, col, symbol) in derivation.active().iter() {
            for rule in grammar.rules_for_key(symbol, key) {
                out.push((row, col, rule));
            }
        }
        out
    }

    /// Dry-run matches every candidate, splitting the work across
    /// `thread_count` workers when there's more than one and parallelism
    /// is enabled; runs inline otherwise.
    fn evaluate_matches(
        &self,
        candidates: &[(u32, u32, &Rule)],
        derivation: &Derivation,
    ) -> Vec<bool> {
        if self.thread_count <= 1 || candidates.len() < 2 {
            return candidates
                .iter()
                .map(|&(row, col, rule)| matches_at(row, col, rule, derivation))
                .collect();
        }

        let (job_tx, job_rx) = crossbeam_channel::unbounded::<usize>();
        let (res_tx, res_rx) = crossbeam_channel::unbounded::<(usize, bool)>();
        for i in 0..candidates.len() {
            let _ = job_tx.send(i);
        }
        drop(job_tx);

        std::thread::scope(|scope| {
            for _ in 0..self.thread_count {
                let job_rx = job_rx.clone();
                let res_tx = res_tx.clone();
                scope.spawn(|| {
                    while let Ok(i) = job_rx.recv() {
                        let (row, col, rule) = candidates[i];
                        let ok = matches_at(row, col, rule, derivation);
                        let _ = res_tx.send((i, ok));
                    }
                });
            }
        });
        drop(res_tx);

        let mut results = vec![false; candidates.len()];
        while let Ok((i, ok)) = res_rx.recv() {
            results[i] = ok;
        }
        results
    }
}

fn matches_at(row: u32, col: u32, rule: &Rule, derivation: &Derivation) -> bool {
    let anchor = (row as i64 - rule.ro as i64, col as i64 - rule.co as i64);
    matches(rule, anchor, derivation)
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_canvas::InMemoryCanvas;

    fn base_rule(key: char, weight: u32) -> Rule {
        Rule {
            lhs: 's',
            header: format!("rule-{key}-{weight}"),
            rhs: "@".to_string(),
            ro: 0,
            co: 0,
            rm: 0,
            cm: 0,
            rq: 0,
            cq: 0,
            key,
            rep: 'A',
            ctx: None,
            ctxrep: ' ',
            fore: 7,
            back: 8,
            reward: 1,
            weight,
            zord: 'a',
            sound: '\0',
            action: RuleAction::Rewrite,
        }
    }

    fn single_cell_grammar(rules: Vec<Rule>) -> Grammar {
        let mut grammar = Grammar::default();
        grammar.non_terminals.insert('s');
        grammar.rules.insert('s', rules);
        grammar
    }

    #[test]
    fn no_active_non_terminals_returns_unapplied() {
        let grammar = single_cell_grammar(vec![base_rule('?', 1)]);
        let mut derivation = Derivation::new(10, 10, 9, 10);
        let mut canvas = InMemoryCanvas::new(10, 10);
        let mut scheduler = Scheduler::new(1, 1);
        let outcome = scheduler.step('?', &grammar, &mut derivation, &mut canvas);
        assert!(!outcome.applied);
    }

    #[test]
    fn single_candidate_fires_deterministically() {
        let grammar = single_cell_grammar(vec![base_rule('x', 1)]);
        let mut derivation = Derivation::new(10, 10, 9, 10);
        derivation.active_mut().insert(5, 5, 's');
        derivation.set_screen_glyph(5, 5, 's');
        let mut canvas = InMemoryCanvas::new(10, 10);
        let mut scheduler = Scheduler::new(42, 1);
        let outcome = scheduler.step('x', &grammar, &mut derivation, &mut canvas);
        assert!(outcome.applied);
        assert_eq!(canvas.get_glyph(5, 5), 'A');
        assert_eq!(scheduler.score, 1);
    }

    #[test]
    fn same_seed_and_match_set_selects_same_rule() {
        let grammar = single_cell_grammar(vec![base_rule('x', 1), base_rule('x', 1)]);
        let run = || {
            let mut derivation = Derivation::new(10, 10, 9, 10);
            derivation.active_mut().insert(5, 5, 's');
            derivation.set_screen_glyph(5, 5, 's');
            let mut canvas = InMemoryCanvas::new(10, 10);
            let mut scheduler = Scheduler::new(7, 1);
            let outcome = scheduler.step('x', &grammar, &mut derivation, &mut canvas);
            outcome.header
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn weighted_draw_converges_to_weight_ratio() {
        let grammar = single_cell_grammar(vec![base_rule('x', 1), base_rule('x', 3)]);
        let mut scheduler = Scheduler::new(1234, 1);
        let mut first_count = 0u32;
        let trials = 10_000;
        for _ in 0..trials {
            let mut derivation = Derivation::new(10, 10, 9, 10);
            derivation.active_mut().insert(5, 5, 's');
            derivation.set_screen_glyph(5, 5, 's');
            let mut canvas = InMemoryCanvas::new(10, 10);
            let outcome = scheduler.step('x', &grammar, &mut derivation, &mut canvas);
            if outcome.header.as_deref() == Some("rule-x-1") {
                first_count += 1;
            }
        }
        let ratio = first_count as f64 / trials as f64;
        assert!((ratio - 0.25).abs() < 0.02, "ratio was {ratio}");
    }

    #[test]
    fn parallel_matcher_agrees_with_inline() {
        let grammar = single_cell_grammar(vec![base_rule('x', 1), base_rule('x', 1)]);
        let mut derivation = Derivation::new(10, 10, 9, 10);
        derivation.active_mut().insert(5, 5, 's');
        derivation.set_screen_glyph(5, 5, 's');
        let mut canvas = InMemoryCanvas::new(10, 10);
        let mut scheduler = Scheduler::new(99, 4);
        let outcome = scheduler.step('x', &grammar, &mut derivation, &mut canvas);
        assert!(outcome.applied);
    }
}
