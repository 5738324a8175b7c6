#![forbid(unsafe_code)]

//! Errors raised while applying or reverting patches.

use thiserror::Error;

/// Failure applying or reverting a [`Patch`](crate::Patch).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    /// An edit operation addressed an index outside the sequence.
    ///
    /// The sequence is rolled back to its state before the patch started.
    #[error("patch operation {op} addresses index {index}, sequence length is {len}")]
    InvalidPatch {
        /// Position of the offending operation within the patch.
        op: usize,
        /// Index the operation tried to touch.
        index: usize,
        /// Length of the sequence when the operation was attempted.
        len: usize,
    },
    /// Undo was requested for a tracked patch that is not currently applied.
    #[error("cannot undo a patch that has not been applied")]
    InvalidUndoState,
    /// A tracked patch was applied a second time.
    #[error("patch has already been applied")]
    AlreadyApplied,
}
