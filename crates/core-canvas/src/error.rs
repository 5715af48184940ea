use thiserror::Error;

/// Errors surfaced by the terminal canvas/key backends. Everything here is
/// about the external collaborator failing, never about grammar content.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("failed to query terminal size: {0}")]
    SizeQuery(#[source] std::io::Error),
    #[error("failed to enter terminal raw mode: {0}")]
    Enter(#[source] std::io::Error),
    #[error("failed to leave terminal raw mode: {0}")]
    Leave(#[source] std::io::Error),
    #[error("failed to write to terminal: {0}")]
    Write(#[source] std::io::Error),
    #[error("failed to poll terminal input: {0}")]
    Poll(#[source] std::io::Error),
}
