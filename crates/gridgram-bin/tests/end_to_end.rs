//! End-to-end scenarios from SPEC_FULL.md §8, driven directly against
//! `core-scheduler`/`core-memory`/`core-canvas` rather than through the
//! binary's own `GameLoop` — the loop is a thin dispatch shell around these
//! crates, so exercising them here covers the derivation semantics without
//! a real terminal.

use core_canvas::InMemoryCanvas;
use core_grammar::{Grammar, HAnchor, Rule, RuleAction, StartSpec, VAnchor};
use core_memory::{Derivation, MemoryCell};
use core_scheduler::Scheduler;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn plain_rule(key: char, rep: char, reward: i64, weight: u32) -> Rule {
    Rule {
        lhs: 's',
        header: "test".to_string(),
        rhs: "@".to_string(),
        ro: 0,
        co: 0,
        rm: 0,
        cm: 0,
        rq: 0,
        cq: 0,
        key,
        rep,
        ctx: None,
        ctxrep: ' ',
        fore: 7,
        back: 8,
        reward,
        weight,
        zord: 'a',
        sound: '\0',
        action: RuleAction::Rewrite,
    }
}

/// Scenario 1: single-rule deterministic write.
#[test]
fn single_rule_deterministic_write() {
    let mut grammar = Grammar::default();
    grammar.non_terminals.insert('s');
    grammar.starts.push(StartSpec {
        v_anchor: VAnchor::Center,
        h_anchor: HAnchor::Center,
        symbol: 's',
    });
    grammar.rules.insert('s', vec![plain_rule('x', 'A', 0, 1)]);

    let (rows, cols) = (10, 10);
    let eff_rows = grammar.effective_rows(rows);
    let eff_cols = grammar.effective_cols(cols);
    let mut derivation = Derivation::new(rows, cols, eff_rows, eff_cols);
    let mut canvas = InMemoryCanvas::new(rows, cols);
    let mut rng = StdRng::seed_from_u64(1);
    derivation.start(&grammar, &mut canvas, &mut rng);

    assert_eq!(canvas.get_glyph(5, 5), 's');
    assert_eq!(derivation.active().get(5, 5), Some('s'));

    let mut scheduler = Scheduler::new(7, 1);
    let outcome = scheduler.step('x', &grammar, &mut derivation, &mut canvas);

    assert!(outcome.applied);
    assert_eq!(canvas.get_glyph(5, 5), 'A');
    assert_eq!(derivation.active().get(5, 5), None);
    assert_eq!(scheduler.score, 0);
}

/// Scenario 2: negative context rejects the rule and leaves all state
/// untouched. `rm` sits one row past `ro` so the context row falls below
/// the midline threshold (precondition region), the same construction
/// `core-engine`'s own matcher tests use for this shape.
#[test]
fn negative_context_rejects_and_state_is_untouched() {
    let mut rule = Rule {
        lhs: 's',
        header: "test".to_string(),
        rhs: "!\n@".to_string(),
        ro: 1,
        co: 0,
        rm: 1,
        cm: 0,
        rq: 1,
        cq: 0,
        key: 'x',
        rep: 'A',
        ctx: Some('A'),
        ctxrep: ' ',
        fore: 7,
        back: 8,
        reward: 0,
        weight: 1,
        zord: 'a',
        sound: '\0',
        action: RuleAction::Rewrite,
    };
    rule.ctx = Some('A');

    let mut grammar = Grammar::default();
    grammar.non_terminals.insert('s');
    grammar.rules.insert('s', vec![rule]);

    let mut derivation = Derivation::new(10, 10, 9, 10);
    let mut canvas = InMemoryCanvas::new(10, 10);
    canvas.set_cell(5, 5, 's', 7, 8, core_canvas::CellAttrs::NONE);
    canvas.set_cell(4, 5, 'A', 7, 8, core_canvas::CellAttrs::NONE);
    derivation.active_mut().insert(5, 5, 's');
    derivation.set_screen_glyph(5, 5, 's');
    derivation.set_screen_glyph(4, 5, 'A');

    let mut scheduler = Scheduler::new(1, 1);
    let outcome = scheduler.step('x', &grammar, &mut derivation, &mut canvas);

    assert!(!outcome.applied);
    assert_eq!(canvas.get_glyph(5, 5), 's');
    assert_eq!(derivation.active().get(5, 5), Some('s'));
    assert_eq!(scheduler.score, 0);
}

/// Scenario 3: weighted choice converges to the weight ratio over many
/// independent draws with a fixed seed sequence.
#[test]
fn weighted_choice_converges_to_weight_ratio() {
    let mut grammar = Grammar::default();
    grammar.non_terminals.insert('s');
    grammar.rules.insert(
        's',
        vec![plain_rule('x', 'L', 0, 1), plain_rule('x', 'H', 0, 3)],
    );

    let mut scheduler = Scheduler::new(4242, 1);
    let mut low_count = 0u32;
    let trials = 8000;
    for _ in 0..trials {
        let mut derivation = Derivation::new(10, 10, 9, 10);
        derivation.active_mut().insert(5, 5, 's');
        derivation.set_screen_glyph(5, 5, 's');
        let mut canvas = InMemoryCanvas::new(10, 10);
        let outcome = scheduler.step('x', &grammar, &mut derivation, &mut canvas);
        assert!(outcome.applied);
        if canvas.get_glyph(5, 5) == 'L' {
            low_count += 1;
        }
    }
    let ratio = low_count as f64 / trials as f64;
    assert!((ratio - 0.25).abs() < 0.03, "ratio was {ratio}");
}

/// Scenario 4: toroidal wrap on column — a write one column past the right
/// edge reappears at column 0 of the same row.
#[test]
fn wrap_on_column_reappears_at_zero() {
    let mut rule = plain_rule('x', ' ', 0, 1);
    rule.rhs = "@A".to_string();

    let mut grammar = Grammar::default();
    grammar.non_terminals.insert('s');
    grammar.rules.insert('s', vec![rule]);

    let mut derivation = Derivation::new(10, 10, 9, 10);
    derivation.active_mut().insert(5, 9, 's');
    derivation.set_screen_glyph(5, 9, 's');
    let mut canvas = InMemoryCanvas::new(10, 10);
    canvas.set_cell(5, 9, 's', 7, 8, core_canvas::CellAttrs::NONE);

    let mut scheduler = Scheduler::new(1, 1);
    let outcome = scheduler.step('x', &grammar, &mut derivation, &mut canvas);

    assert!(outcome.applied);
    assert_eq!(canvas.get_glyph(5, 0), 'A');
}

/// Scenario 5: z-order shielding — a later, lower-priority write at a cell
/// already claimed by a higher z-order write is rejected, leaving the
/// earlier glyph in place.
#[test]
fn z_order_shields_a_later_lower_priority_write() {
    let mut high = plain_rule('a', 'X', 0, 1);
    high.zord = 'm';
    let mut low = plain_rule('b', 'Y', 0, 1);
    low.zord = 'a';

    let mut grammar = Grammar::default();
    grammar.non_terminals.insert('s');
    grammar.non_terminals.insert('t');
    grammar.rules.insert('s', vec![high]);
    grammar.rules.insert('t', vec![low]);

    let mut derivation = Derivation::new(10, 10, 9, 10);
    let mut canvas = InMemoryCanvas::new(10, 10);
    derivation.active_mut().insert(4, 4, 's');
    derivation.set_screen_glyph(4, 4, 's');

    let mut scheduler = Scheduler::new(1, 1);
    let first = scheduler.step('a', &grammar, &mut derivation, &mut canvas);
    assert!(first.applied);
    assert_eq!(canvas.get_glyph(4, 4), 'X');
    assert_eq!(derivation.memory().get(4, 4).zord, 'm');

    // A second, independent non-terminal lands on the same cell (as could
    // happen from another rule's write elsewhere) and tries to overwrite it
    // at a lower z-order.
    derivation.active_mut().insert(4, 4, 't');
    derivation.set_screen_glyph(4, 4, 't');

    let second = scheduler.step('b', &grammar, &mut derivation, &mut canvas);
    assert!(!second.applied);
    assert_eq!(canvas.get_glyph(4, 4), 'X');
}

/// Scenario 6: program chain with return. Firing P1's switch rule resolves
/// a `SwitchProgram` action; P2's return rule resolves to `Return`. This
/// exercises `core-scheduler`'s action resolution; the caller-stack
/// push/pop itself is `gridgram-bin`'s `GameLoop` responsibility (not a
/// library concern), mirrored here with a plain `Vec` to confirm the
/// contract the loop relies on.
#[test]
fn program_chain_switch_then_return() {
    let mut switch_rule = plain_rule('x', 's', 0, 1);
    switch_rule.action = RuleAction::SwitchProgram {
        name: "garden2".to_string(),
        clear: false,
        pause: false,
    };

    let mut p1 = Grammar::default();
    p1.non_terminals.insert('s');
    p1.rules.insert('s', vec![switch_rule]);

    let mut return_rule = plain_rule('x', 's', 0, 1);
    return_rule.action = RuleAction::Return;
    let mut p2 = Grammar::default();
    p2.non_terminals.insert('s');
    p2.rules.insert('s', vec![return_rule]);

    let mut derivation = Derivation::new(10, 10, 9, 10);
    let mut canvas = InMemoryCanvas::new(10, 10);
    derivation.active_mut().insert(5, 5, 's');
    derivation.set_screen_glyph(5, 5, 's');
    canvas.set_cell(5, 5, 's', 7, 8, core_canvas::CellAttrs::NONE);

    let mut scheduler = Scheduler::new(1, 1);
    let mut caller_stack: Vec<String> = Vec::new();
    let mut current = "garden1".to_string();

    let outcome = scheduler.step('x', &p1, &mut derivation, &mut canvas);
    assert!(outcome.applied);
    match outcome.action {
        Some(RuleAction::SwitchProgram { name, clear, pause }) => {
            assert!(!clear);
            assert!(!pause);
            caller_stack.push(std::mem::replace(&mut current, name));
        }
        other => panic!("expected SwitchProgram, got {other:?}"),
    }
    assert_eq!(current, "garden2");
    assert_eq!(caller_stack, vec!["garden1".to_string()]);

    // Canvas is untouched by the switch itself (no `clear` requested).
    assert_eq!(canvas.get_glyph(5, 5), 's');

    let outcome = scheduler.step('x', &p2, &mut derivation, &mut canvas);
    assert!(outcome.applied);
    match outcome.action {
        Some(RuleAction::Return) => {
            let popped = caller_stack.pop().expect("caller stack has P1");
            current = popped;
        }
        other => panic!("expected Return, got {other:?}"),
    }
    assert_eq!(current, "garden1");
    assert!(caller_stack.is_empty());
    assert_eq!(canvas.get_glyph(5, 5), 's');
}

/// `$`-restore coherence: writing a non-terminal over a terminal cell then
/// restoring it returns the exact prior glyph/fore/zord, per SPEC_FULL.md §8.
#[test]
fn restore_sentinel_round_trips_prior_cell_through_a_non_terminal_overlay() {
    let mut overlay = plain_rule('o', 'n', 0, 1);
    overlay.zord = 'a';
    let mut restore = plain_rule('r', '$', 0, 1);
    restore.lhs = 'n';
    restore.zord = 'a';

    let mut grammar = Grammar::default();
    grammar.non_terminals.insert('s');
    grammar.non_terminals.insert('n');
    grammar.rules.insert('s', vec![overlay]);
    grammar.rules.insert('n', vec![restore]);

    let mut derivation = Derivation::new(10, 10, 9, 10);
    let mut canvas = InMemoryCanvas::new(10, 10);
    derivation.memory_mut().set(
        3,
        3,
        MemoryCell {
            glyph: 'Z',
            fore: 2,
            back: 1,
            zord: 'a',
        },
    );
    derivation.active_mut().insert(3, 3, 's');
    derivation.set_screen_glyph(3, 3, 's');
    canvas.set_cell(3, 3, 'Z', 2, 1, core_canvas::CellAttrs::NONE);

    let mut scheduler = Scheduler::new(1, 1);
    let first = scheduler.step('o', &grammar, &mut derivation, &mut canvas);
    assert!(first.applied);
    assert_eq!(canvas.get_glyph(3, 3), 'n');
    let mem = derivation.memory().get(3, 3);
    assert_eq!(mem.glyph, 'Z');
    assert_eq!(mem.fore, 2);

    let second = scheduler.step('r', &grammar, &mut derivation, &mut canvas);
    assert!(second.applied);
    assert_eq!(canvas.get_glyph(3, 3), 'Z');
    let restored = derivation.memory().get(3, 3);
    assert_eq!(restored.glyph, 'Z');
    assert_eq!(restored.fore, 2);
}
