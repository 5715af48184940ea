//! `gridgram` entrypoint: loads a program, wires the terminal collaborators,
//! and drives the timed derivation loop (spec.md §4.6).
use std::path::Path;
use std::sync::Once;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use core_canvas::{
    Canvas, CellAttrs, CrosstermCanvas, CrosstermKeySource, NoopSoundSink, SoundSink,
    TerminalGuard,
};
use core_grammar::{Grammar, RuleAction, DEFAULT_BACK, DEFAULT_FORE};
use core_input::InputDispatcher;
use core_keymap::ControlKeymap;
use core_memory::Derivation;
use core_scheduler::Scheduler;
use core_text::{display_width, truncate_to_width};

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "gridgram", version, about = "Two-dimensional rewriting grammar interpreter")]
struct Args {
    /// Program name to load (resolves to `name`, `name.gz`, `name/index.cfg[.gz]`).
    pub program: Option<String>,
    /// RNG seed; 0 means time-seeded.
    pub seed: Option<u64>,
    /// Worker threads for the parallel matcher; 0 means auto-detect.
    pub max_threads: Option<usize>,
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("gridgram.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "gridgram.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        Err(_err) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
}

/// Owns everything that lives for the duration of the process: the running
/// program, its `Derivation`, the terminal collaborators, and the caller
/// stack for `return` chaining.
struct GameLoop {
    grammar: Grammar,
    current_program: String,
    derivation: Derivation,
    canvas: CrosstermCanvas,
    keymap: ControlKeymap,
    dispatcher: InputDispatcher<CrosstermKeySource>,
    scheduler: Scheduler,
    start_rng: StdRng,
    sound_sink: Box<dyn SoundSink>,
    seed: u64,
    max_threads: usize,
    paused: bool,
    b_tick_seen: bool,
    last_header: Option<String>,
    last_step_succeeded: bool,
    steps: u64,
    caller_stack: Vec<(String, Grammar)>,
}

impl GameLoop {
    fn new(program: &str, seed: u64, max_threads: usize) -> Result<Self> {
        let grammar = core_loader::load_program(program)?;
        let canvas = CrosstermCanvas::new()?;
        let (rows, cols) = (canvas.rows(), canvas.cols());
        let eff_rows = grammar.effective_rows(rows);
        let eff_cols = grammar.effective_cols(cols);
        let mut derivation = Derivation::new(rows, cols, eff_rows, eff_cols);

        let resolved_seed = if seed == 0 { time_seed() } else { seed };
        let mut start_rng = StdRng::seed_from_u64(resolved_seed);
        let mut canvas = canvas;
        derivation.start(&grammar, &mut canvas, &mut start_rng);

        let keymap = ControlKeymap::build(&grammar);
        let dispatcher = InputDispatcher::new(
            CrosstermKeySource,
            grammar.b_step_ms,
            grammar.m_step_ms,
            grammar.t_step_ms,
        );
        let scheduler = Scheduler::new(seed, max_threads);

        Ok(GameLoop {
            grammar,
            current_program: program.to_string(),
            derivation,
            canvas,
            keymap,
            dispatcher,
            scheduler,
            start_rng,
            sound_sink: Box::new(NoopSoundSink),
            seed,
            max_threads,
            paused: true,
            b_tick_seen: false,
            last_header: None,
            last_step_succeeded: true,
            steps: 0,
            caller_stack: Vec::new(),
        })
    }

    fn run(&mut self) -> Result<()> {
        loop {
            self.render_status_line();
            self.canvas.present()?;

            let raw_key = self.dispatcher.next(self.paused)?;
            let key = self.keymap.resolve(raw_key);

            if key == 'B' {
                self.b_tick_seen = true;
            }

            if key == core_input::ESC {
                info!(target: "runtime", "quit_on_esc");
                return Ok(());
            }

            match key {
                'x' => {
                    self.restart();
                    continue;
                }
                ' ' => {
                    self.paused = !self.paused;
                    continue;
                }
                'q' if self.paused && !self.last_step_succeeded => {
                    info!(target: "runtime", "quit_on_q");
                    return Ok(());
                }
                _ => {}
            }

            let outcome = self
                .scheduler
                .step(key, &self.grammar, &mut self.derivation, &mut self.canvas);
            self.last_step_succeeded = outcome.applied;
            self.dispatcher.record_result(outcome.applied);

            if outcome.applied {
                self.steps += 1;
                self.last_header = outcome.header.clone();
                for sound in &outcome.sounds {
                    self.sound_sink.play(*sound);
                }
                if let Some(action) = outcome.action {
                    if self.dispatch_action(action)? {
                        return Ok(());
                    }
                }
            } else if key == 'T' {
                std::thread::sleep(Duration::from_millis(50));
            }
        }
    }

    fn restart(&mut self) {
        self.derivation.start(&self.grammar, &mut self.canvas, &mut self.start_rng);
        self.paused = true;
        self.b_tick_seen = false;
        self.dispatcher.reset_clock();
    }

    /// Handles a fired rule's resolved [`RuleAction`]. Returns `true` when
    /// the loop should exit (`Quit`).
    fn dispatch_action(&mut self, action: RuleAction) -> Result<bool> {
        match action {
            RuleAction::Rewrite | RuleAction::PlaySound(_) => Ok(false),
            RuleAction::Quit => {
                info!(target: "runtime", "quit_on_rule");
                Ok(true)
            }
            RuleAction::Return => {
                if let Some((name, grammar)) = self.caller_stack.pop() {
                    info!(target: "runtime.program", to = %name, "return");
                    self.current_program = name;
                    self.grammar = grammar;
                    self.keymap = ControlKeymap::build(&self.grammar);
                    self.dispatcher = InputDispatcher::new(
                        CrosstermKeySource,
                        self.grammar.b_step_ms,
                        self.grammar.m_step_ms,
                        self.grammar.t_step_ms,
                    );
                } else {
                    warn!(target: "runtime.program", "return_with_empty_caller_stack");
                }
                Ok(false)
            }
            RuleAction::SwitchProgram { name, clear, pause } => {
                self.switch_program(name, clear, pause)?;
                Ok(false)
            }
        }
    }

    fn switch_program(&mut self, name: String, clear: bool, pause: bool) -> Result<()> {
        let new_grammar = core_loader::load_program(&name).map_err(|err| {
            error!(target: "runtime.program", program = %name, ?err, "program_switch_failed");
            err
        })?;
        info!(target: "runtime.program", from = %self.current_program, to = %name, clear, pause, "switch");

        self.caller_stack.push((
            std::mem::replace(&mut self.current_program, name),
            std::mem::replace(&mut self.grammar, new_grammar),
        ));

        if clear || self.grammar.clear_requested {
            let (rows, cols) = (self.canvas.rows(), self.canvas.cols());
            let eff_rows = self.grammar.effective_rows(rows);
            let eff_cols = self.grammar.effective_cols(cols);
            self.derivation.resize(rows, cols, eff_rows, eff_cols);
            self.derivation
                .start(&self.grammar, &mut self.canvas, &mut self.start_rng);
        }

        self.keymap = ControlKeymap::build(&self.grammar);
        self.dispatcher = InputDispatcher::new(
            CrosstermKeySource,
            self.grammar.b_step_ms,
            self.grammar.m_step_ms,
            self.grammar.t_step_ms,
        );
        self.scheduler = Scheduler::new(self.seed, self.max_threads);
        self.paused = pause;
        self.b_tick_seen = false;
        Ok(())
    }

    fn render_status_line(&mut self) {
        if self.paused || !self.b_tick_seen {
            self.paint_status(&self.grammar.help.clone(), "");
            return;
        }
        let left = format!("Score: {} Steps: {}", self.scheduler.score, self.steps);
        let right = self.last_header.clone().unwrap_or_default();
        self.paint_status(&left, &right);
    }

    /// Writes `left` left-aligned and `right` right-aligned (truncated to
    /// fit, per display width) into row 0, blanking everything in between.
    fn paint_status(&mut self, left: &str, right: &str) {
        let cols = self.canvas.cols();
        for c in 0..cols {
            self.canvas
                .set_cell(0, c, ' ', DEFAULT_FORE, DEFAULT_BACK, CellAttrs::NONE);
        }

        let mut col = 0u32;
        for ch in left.chars() {
            if col >= cols {
                break;
            }
            self.canvas
                .set_cell(0, col, ch, DEFAULT_FORE, DEFAULT_BACK, CellAttrs::NONE);
            col += 1;
        }

        if right.is_empty() {
            return;
        }
        let budget = cols.saturating_sub(col) as usize;
        let truncated = truncate_to_width(right, budget);
        let right_width = display_width(truncated) as u32;
        let mut col = cols.saturating_sub(right_width);
        for ch in truncated.chars() {
            if col >= cols {
                break;
            }
            self.canvas
                .set_cell(0, col, ch, DEFAULT_FORE, DEFAULT_BACK, CellAttrs::NONE);
            col += 1;
        }
    }
}

fn main() -> Result<()> {
    let _log_guard = configure_logging();
    install_panic_hook();

    let args = Args::parse();
    let program = args.program.unwrap_or_else(|| ".".to_string());
    let seed = args.seed.unwrap_or(0);
    let max_threads = args.max_threads.unwrap_or(0);
    let max_threads = if max_threads == 0 {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    } else {
        max_threads
    };

    info!(target: "runtime", program = %program, seed, max_threads, "startup");

    let mut game = match GameLoop::new(&program, seed, max_threads) {
        Ok(game) => game,
        Err(err) => {
            error!(target: "runtime", program = %program, ?err, "program_not_found");
            eprintln!("gridgram: failed to load program {program:?}: {err}");
            std::process::exit(1);
        }
    };

    let _terminal_guard = TerminalGuard::new()?;
    game.run()
}
