use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced while resolving and loading a program file.
///
/// Only [`LoaderError::ProgramNotFound`] is fatal (SPEC_FULL.md §7 /
/// spec.md §7): every other malformed-input case resolves to a documented
/// default inline rather than an `Err`, mirroring the teacher's
/// `core-config::load_from`.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("program {name} not found (tried {tried:?})")]
    ProgramNotFound { name: String, tried: Vec<PathBuf> },
    #[error("failed to read program file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("program file {path} is not valid UTF-8: {source}")]
    InvalidUtf8 {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },
}
