#![forbid(unsafe_code)]

//! Patches that remember whether they have been applied.
//!
//! A [`TrackedPatch`] is the undo record for a mutation of a large ordered
//! collection. It starts out holding the forward patch. Applying it swaps the
//! forward operations for their inverse, so the record only ever stores the
//! operations needed for the *next* step and its size tracks the size of the
//! change, never the size of the collection.
//!
//! ```text
//! between(old, new)   Pending  { forward ops }
//! apply_to(seq)       Applied  { inverse ops }
//! undo_on(seq)        Undone   { inverse ops, spent }
//! ```
//!
//! Undo is only legal from `Applied`. Calling it in any other state is a
//! handler bug and fails with [`DiffError::InvalidUndoState`] rather than
//! corrupting the sequence.

use std::cell::Cell;

use crate::edit::{Patch, apply_in_place};
use crate::error::DiffError;
use crate::myers::diff;

/// Lifecycle of a [`TrackedPatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchState {
    /// Holds the forward patch; not yet applied.
    Pending,
    /// Applied; holds the inverse patch.
    Applied,
    /// The inverse has been consumed.
    Undone,
}

/// A patch plus its applied/undone state.
///
/// The state lives in a [`Cell`] so undo works through a shared reference:
/// undo records are owned by an immutable history entry.
#[derive(Debug, Clone)]
pub struct TrackedPatch<T> {
    patch: Patch<T>,
    state: Cell<PatchState>,
}

impl<T: Clone + PartialEq> TrackedPatch<T> {
    /// Record the edit that turns `old` into `new`.
    #[must_use]
    pub fn between(old: &[T], new: &[T]) -> Self {
        Self::new(diff(old, new))
    }
}

impl<T: Clone> TrackedPatch<T> {
    /// Wrap a forward patch.
    #[must_use]
    pub fn new(patch: Patch<T>) -> Self {
        Self {
            patch,
            state: Cell::new(PatchState::Pending),
        }
    }

    /// Apply the forward patch to `seq` and keep the inverse.
    ///
    /// # Errors
    ///
    /// - [`DiffError::AlreadyApplied`] if this patch left `Pending` already.
    /// - [`DiffError::InvalidPatch`] if `seq` does not match the patch; `seq`
    ///   is left untouched.
    pub fn apply_to(&mut self, seq: &mut Vec<T>) -> Result<(), DiffError> {
        if self.state.get() != PatchState::Pending {
            return Err(DiffError::AlreadyApplied);
        }
        self.patch = apply_in_place(seq, &self.patch)?;
        self.state.set(PatchState::Applied);
        Ok(())
    }

    /// Revert a previously applied patch.
    ///
    /// # Errors
    ///
    /// - [`DiffError::InvalidUndoState`] unless the patch is `Applied`.
    /// - [`DiffError::InvalidPatch`] if `seq` drifted since the patch was
    ///   applied; `seq` is left untouched and the patch stays `Applied`.
    pub fn undo_on(&self, seq: &mut Vec<T>) -> Result<(), DiffError> {
        if self.state.get() != PatchState::Applied {
            return Err(DiffError::InvalidUndoState);
        }
        apply_in_place(seq, &self.patch)?;
        self.state.set(PatchState::Undone);
        Ok(())
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PatchState {
        self.state.get()
    }

    /// True once applied and not yet undone.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        self.state.get() == PatchState::Applied
    }

    /// The patch currently held (forward while pending, inverse afterwards).
    #[must_use]
    pub fn patch(&self) -> &Patch<T> {
        &self.patch
    }

    /// Number of stored operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patch.len()
    }

    /// True when the recorded change is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patch.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_then_undo_restores() {
        let old = vec![1, 2, 3, 4];
        let new = vec![1, 5, 3, 4, 6];
        let mut seq = old.clone();

        let mut tracked = TrackedPatch::between(&old, &new);
        assert_eq!(tracked.state(), PatchState::Pending);

        tracked.apply_to(&mut seq).unwrap();
        assert_eq!(seq, new);
        assert!(tracked.is_applied());

        tracked.undo_on(&mut seq).unwrap();
        assert_eq!(seq, old);
        assert_eq!(tracked.state(), PatchState::Undone);
    }

    #[test]
    fn undo_before_apply_is_rejected() {
        let tracked = TrackedPatch::between(&[1], &[2]);
        let mut seq = vec![1];
        assert_eq!(tracked.undo_on(&mut seq), Err(DiffError::InvalidUndoState));
        assert_eq!(seq, vec![1]);
    }

    #[test]
    fn double_undo_is_rejected() {
        let mut tracked = TrackedPatch::between(&[1, 2], &[1]);
        let mut seq = vec![1, 2];
        tracked.apply_to(&mut seq).unwrap();
        tracked.undo_on(&mut seq).unwrap();
        assert_eq!(tracked.undo_on(&mut seq), Err(DiffError::InvalidUndoState));
        assert_eq!(seq, vec![1, 2]);
    }

    #[test]
    fn double_apply_is_rejected() {
        let mut tracked = TrackedPatch::between(&[1], &[1, 2]);
        let mut seq = vec![1];
        tracked.apply_to(&mut seq).unwrap();
        assert_eq!(tracked.apply_to(&mut seq), Err(DiffError::AlreadyApplied));
        assert_eq!(seq, vec![1, 2]);
    }

    #[test]
    fn drifted_sequence_keeps_patch_applied() {
        let mut tracked = TrackedPatch::between(&[1, 2, 3], &[1, 2]);
        let mut seq = vec![1, 2, 3];
        tracked.apply_to(&mut seq).unwrap();

        // Inverse wants to re-insert at index 2; a shorter sequence rejects it.
        let mut drifted = vec![1];
        assert!(matches!(
            tracked.undo_on(&mut drifted),
            Err(DiffError::InvalidPatch { .. })
        ));
        assert!(tracked.is_applied());
    }

    #[test]
    fn stored_ops_scale_with_change() {
        let old: Vec<u32> = (0..10_000).collect();
        let mut new = old.clone();
        new[4_321] = 0;
        let tracked = TrackedPatch::between(&old, &new);
        assert_eq!(tracked.len(), 1);
    }
}
