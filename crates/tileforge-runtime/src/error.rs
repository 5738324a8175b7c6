#![forbid(unsafe_code)]

use thiserror::Error;

use tileforge_diff::DiffError;
use tileforge_palette::PaletteError;

/// Errors raised by command dispatch and by handlers.
///
/// A failed execute leaves both stacks exactly as they were; a failed undo
/// or redo puts the entry back on the stack it came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// No handler is registered for this command type.
    #[error("unknown command type {0:?}")]
    UnknownCommandType(String),
    /// A payload or stored result had a different type than the handler expects.
    #[error("{command}: expected {expected}, got {actual}")]
    PayloadMismatch {
        command: String,
        expected: &'static str,
        actual: &'static str,
    },
    /// Routing was attempted with no current document.
    #[error("no active document")]
    NoActiveDocument,
    /// The document id is not open.
    #[error("document {0} is not open")]
    UnknownDocument(u64),
    /// A diff-backed mutation could not be applied or reverted.
    #[error(transparent)]
    Patch(#[from] DiffError),
    /// A palette operation failed.
    #[error(transparent)]
    Palette(#[from] PaletteError),
    /// A handler rejected its input.
    #[error("{0}")]
    Handler(String),
}

impl CommandError {
    /// Shorthand for [`CommandError::Handler`].
    #[must_use]
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler(message.into())
    }
}
