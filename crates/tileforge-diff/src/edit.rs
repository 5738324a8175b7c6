#![forbid(unsafe_code)]

//! Edit operations, patches, and patch application.
//!
//! A [`Patch`] is an ordered list of [`EditOp`]s. Operations are applied one
//! after another, and every index refers to the sequence *as it is when that
//! operation runs* (earlier inserts and removals shift later positions).
//!
//! Applying a patch always yields its inverse as a by-product: each operation
//! records what it displaced, so the inverse is assembled in the same pass
//! without a second diff.
//!
//! ```text
//! seq      [a, b, c]
//! patch    Replace{1, x}, Insert{3, d}
//! result   [a, x, c, d]
//! inverse  Remove{3}, Replace{1, b}
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::DiffError;

/// One index-addressed edit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "op", rename_all = "snake_case"))]
pub enum EditOp<T> {
    /// Insert `value` so that it ends up at `index` (`index == len` appends).
    Insert { index: usize, value: T },
    /// Remove the element at `index`.
    Remove { index: usize },
    /// Overwrite the element at `index` with `value`.
    Replace { index: usize, value: T },
}

impl<T> EditOp<T> {
    /// Index this operation addresses.
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::Insert { index, .. } | Self::Remove { index } | Self::Replace { index, .. } => {
                *index
            }
        }
    }
}

/// An ordered list of edit operations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Patch<T> {
    ops: Vec<EditOp<T>>,
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Patch<T> {
    /// Wrap a list of operations.
    #[must_use]
    pub fn new(ops: Vec<EditOp<T>>) -> Self {
        Self { ops }
    }

    /// A patch that changes nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self { ops: Vec::new() }
    }

    /// The operations, in application order.
    #[must_use]
    pub fn ops(&self) -> &[EditOp<T>] {
        &self.ops
    }

    /// Number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True when the patch has no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Consume the patch, returning its operations.
    #[must_use]
    pub fn into_ops(self) -> Vec<EditOp<T>> {
        self.ops
    }
}

impl<T> FromIterator<EditOp<T>> for Patch<T> {
    fn from_iter<I: IntoIterator<Item = EditOp<T>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Apply `patch` to a copy of `seq`.
///
/// Returns the patched sequence together with the inverse patch, which turns
/// the patched sequence back into `seq`.
///
/// # Errors
///
/// [`DiffError::InvalidPatch`] if any operation addresses an out-of-range
/// index.
pub fn apply<T: Clone>(seq: &[T], patch: &Patch<T>) -> Result<(Vec<T>, Patch<T>), DiffError> {
    let mut patched = seq.to_vec();
    let inverse = apply_in_place(&mut patched, patch)?;
    Ok((patched, inverse))
}

/// Apply `patch` to `seq` in place and return the inverse patch.
///
/// On failure every operation already applied is reverted, so `seq` is left
/// exactly as it was on entry.
///
/// # Errors
///
/// [`DiffError::InvalidPatch`] if any operation addresses an out-of-range
/// index.
pub fn apply_in_place<T: Clone>(seq: &mut Vec<T>, patch: &Patch<T>) -> Result<Patch<T>, DiffError> {
    let mut undo: Vec<EditOp<T>> = Vec::with_capacity(patch.len());

    for (position, op) in patch.ops.iter().enumerate() {
        match apply_op(seq, op.clone()) {
            Ok(inverse) => undo.push(inverse),
            Err(index) => {
                let len = seq.len();
                for inverse in undo.into_iter().rev() {
                    // Inverses of successfully applied ops are always in range.
                    let _ = apply_op(seq, inverse);
                }
                tracing::warn!(op = position, index, len, "rejected out-of-range patch");
                return Err(DiffError::InvalidPatch {
                    op: position,
                    index,
                    len,
                });
            }
        }
    }

    undo.reverse();
    Ok(Patch::new(undo))
}

/// Apply one operation, returning its inverse or the offending index.
fn apply_op<T>(seq: &mut Vec<T>, op: EditOp<T>) -> Result<EditOp<T>, usize> {
    match op {
        EditOp::Insert { index, value } => {
            if index > seq.len() {
                return Err(index);
            }
            seq.insert(index, value);
            Ok(EditOp::Remove { index })
        }
        EditOp::Remove { index } => {
            if index >= seq.len() {
                return Err(index);
            }
            let value = seq.remove(index);
            Ok(EditOp::Insert { index, value })
        }
        EditOp::Replace { index, value } => {
            let Some(slot) = seq.get_mut(index) else {
                return Err(index);
            };
            let value = std::mem::replace(slot, value);
            Ok(EditOp::Replace { index, value })
        }
    }
}
