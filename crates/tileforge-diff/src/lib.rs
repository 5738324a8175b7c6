#![forbid(unsafe_code)]

//! Sequence diffing for diff-based undo.
//!
//! Commands that rewrite a large ordered collection (a tile grid, a pixel
//! buffer) store an inverse patch instead of a before/after snapshot, so undo
//! memory is proportional to the size of the change.
//!
//! - [`diff`] computes an index-addressed edit script between two sequences.
//! - [`apply`] / [`apply_in_place`] apply a patch and return its inverse in
//!   the same pass.
//! - [`TrackedPatch`] wraps a patch with an applied/undone state so a handler
//!   can store it as undo data and have misuse detected.
//!
//! # Example
//!
//! ```
//! use tileforge_diff::{TrackedPatch, apply, diff};
//!
//! let old = vec![1, 2, 3];
//! let new = vec![1, 4, 3, 5];
//!
//! let patch = diff(&old, &new);
//! let (patched, inverse) = apply(&old, &patch).unwrap();
//! assert_eq!(patched, new);
//! assert_eq!(apply(&patched, &inverse).unwrap().0, old);
//!
//! let mut seq = old.clone();
//! let mut tracked = TrackedPatch::between(&old, &new);
//! tracked.apply_to(&mut seq).unwrap();
//! tracked.undo_on(&mut seq).unwrap();
//! assert_eq!(seq, old);
//! ```

pub mod edit;
pub mod error;
pub mod myers;
pub mod tracked;

pub use edit::{EditOp, Patch, apply, apply_in_place};
pub use error::DiffError;
pub use myers::diff;
pub use tracked::{PatchState, TrackedPatch};
