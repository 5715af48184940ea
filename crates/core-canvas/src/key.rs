use std::time::Duration;

/// A key as seen by the `Loop`, before control-key remapping. Synthetic
/// timing ticks (`T`/`M`/`B`) are represented as ordinary `Char` values,
/// matching how the source system overloads its key-code type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    /// Escape: quits unconditionally regardless of pause state.
    Esc,
}

/// Blocking or non-blocking key input. `timeout = None` blocks until a key
/// arrives (used while paused); `timeout = Some(Duration::ZERO)` polls
/// without blocking (the `Loop` then synthesizes a tick on a miss).
pub trait KeySource {
    fn read_key(&mut self, timeout: Option<Duration>) -> anyhow::Result<Option<Key>>;
}

/// Fixed queue of keys for tests: returns them in order, then `None`
/// forever (simulating "no key available" on every subsequent poll).
#[derive(Debug, Default)]
pub struct ScriptedKeySource {
    queue: std::collections::VecDeque<Key>,
}

impl ScriptedKeySource {
    pub fn new(keys: impl IntoIterator<Item = Key>) -> Self {
        ScriptedKeySource {
            queue: keys.into_iter().collect(),
        }
    }
}

impl KeySource for ScriptedKeySource {
    fn read_key(&mut self, _timeout: Option<Duration>) -> anyhow::Result<Option<Key>> {
        Ok(self.queue.pop_front())
    }
}
