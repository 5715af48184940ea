//! Timed key dispatch: derives synthetic `T`/`M`/`B` ticks from elapsed
//! time when no real key is waiting, and suppresses a key that just failed
//! to apply from being retried verbatim on the very next poll. Grounded on
//! `zahradnice.cpp`'s main loop (`el_t`/`el_m`/`el_b` vs
//! `elapsed_t`/`elapsed_m`/`elapsed_b`, and the `last == wch` check).

use std::time::{Duration, Instant};

use core_canvas::{Key, KeySource};

/// Dispatched when neither a real key nor a tick threshold has fired —
/// the loop keeps polling without doing anything, mirroring
/// original_source's idle `wch == 0`.
pub const IDLE: char = '\0';
/// Dispatched for [`Key::Esc`]; quits unconditionally regardless of pause
/// state (spec.md §4.6 step 5).
pub const ESC: char = '\u{1b}';

/// Derives synthetic `T` (fastest), `M`, `B` (slowest) ticks from elapsed
/// wall-clock time against three millisecond thresholds. `t_step_ms == 0`
/// is a special case: `T` fires on every poll rather than never, matching
/// original_source's `T > 0 ? duration/T : elapsed_t + 1`.
#[derive(Debug, Clone, Copy)]
pub struct TickClock {
    b_step_ms: u64,
    m_step_ms: u64,
    t_step_ms: u64,
    elapsed_t: i64,
    elapsed_m: i64,
    elapsed_b: i64,
}

impl TickClock {
    pub fn new(b_step_ms: u64, m_step_ms: u64, t_step_ms: u64) -> Self {
        TickClock {
            b_step_ms,
            m_step_ms,
            t_step_ms,
            elapsed_t: 0,
            elapsed_m: 0,
            elapsed_b: 0,
        }
    }

    /// Resets the threshold counters (but not the configured steps) — used
    /// when the Loop's clock restarts alongside a derivation restart.
    pub fn reset(&mut self) {
        self.elapsed_t = 0;
        self.elapsed_m = 0;
        self.elapsed_b = 0;
    }

    /// Checks `elapsed` against all three thresholds in `T`, `M`, `B`
    /// order; a later check overwrites an earlier one's result within the
    /// same call, so when multiple thresholds advance simultaneously `B`
    /// wins, then `M`, then `T` — matching the source's sequential
    /// assignment to the same `wch` variable.
    pub fn poll(&mut self, elapsed: Duration) -> Option<char> {
        let millis = elapsed.as_millis() as i64;
        let el_t = if self.t_step_ms > 0 {
            millis / self.t_step_ms as i64
        } else {
            self.elapsed_t + 1
        };
        let el_m = millis / self.m_step_ms.max(1) as i64;
        let el_b = millis / self.b_step_ms.max(1) as i64;

        let mut tick = None;
        if el_t > self.elapsed_t {
            tick = Some('T');
            self.elapsed_t = el_t;
        }
        if el_m > self.elapsed_m {
            tick = Some('M');
            self.elapsed_m = el_m;
        }
        if el_b > self.elapsed_b {
            tick = Some('B');
            self.elapsed_b = el_b;
        }
        tick
    }
}

/// Composes a [`KeySource`] with a [`TickClock`] and the "don't retry a
/// key that just failed" suppression rule into the single dispatched
/// character the Loop acts on each iteration.
pub struct InputDispatcher<K> {
    keys: K,
    clock: TickClock,
    start: Instant,
    last_key: Option<char>,
    last_succeeded: bool,
}

impl<K: KeySource> InputDispatcher<K> {
    pub fn new(keys: K, b_step_ms: u64, m_step_ms: u64, t_step_ms: u64) -> Self {
        InputDispatcher {
            keys,
            clock: TickClock::new(b_step_ms, m_step_ms, t_step_ms),
            start: Instant::now(),
            last_key: None,
            last_succeeded: true,
        }
    }

    /// Restarts the elapsed-time clock, e.g. when the derivation restarts
    /// (`x`) or a program switch begins a fresh Loop iteration.
    pub fn reset_clock(&mut self) {
        self.start = Instant::now();
        self.clock.reset();
    }

    /// Tells the dispatcher whether the key it last returned actually
    /// applied, so the next identical key (if one arrives before anything
    /// else changes) is suppressed into a tick instead of retried.
    pub fn record_result(&mut self, succeeded: bool) {
        self.last_succeeded = succeeded;
    }

    /// Reads one key (blocking if `paused`, non-blocking polling
    /// otherwise) and returns the character to dispatch: the real key, a
    /// synthetic tick, or [`IDLE`] if nothing fired.
    pub fn next(&mut self, paused: bool) -> anyhow::Result<char> {
        let timeout = if paused { None } else { Some(Duration::ZERO) };
        let candidate = match self.keys.read_key(timeout)? {
            Some(Key::Esc) => {
                self.last_key = Some(ESC);
                return Ok(ESC);
            }
            Some(Key::Char(c)) => Some(c),
            None => None,
        };

        let candidate = if !self.last_succeeded && candidate == self.last_key {
            None
        } else {
            candidate
        };

        let dispatched = match candidate {
            Some(c) => c,
            None => self.clock.poll(self.start.elapsed()).unwrap_or(IDLE),
        };
        self.last_key = Some(dispatched);
        Ok(dispatched)
    }
}
