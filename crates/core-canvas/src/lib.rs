//! Abstract terminal surface: a grid [`Canvas`], a [`KeySource`] for
//! blocking/non-blocking key reads, and a [`SoundSink`] for audio fan-out.
//! Real back-ends (`crossterm`) live here too; `core-engine`/`core-scheduler`
//! depend only on the traits.

mod canvas;
mod cell;
mod colors;
mod crossterm_backend;
mod error;
mod key;
mod sound;

pub use canvas::{Canvas, Grid, InMemoryCanvas};
pub use cell::{Cell, CellAttrs};
pub use colors::ColorPairTable;
pub use crossterm_backend::{CrosstermCanvas, CrosstermKeySource, TerminalGuard};
pub use error::CanvasError;
pub use key::{Key, KeySource, ScriptedKeySource};
pub use sound::{NoopSoundSink, RecordingSoundSink, SoundSink};
