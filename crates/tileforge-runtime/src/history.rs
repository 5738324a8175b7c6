#![forbid(unsafe_code)]

//! Per-document undo/redo history.
//!
//! [`CommandHistory`] owns one document, the registry of handlers that may
//! mutate it, and two stacks of [`ExecutedCommand`]s.
//!
//! ```text
//! execute(c5)
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [c1, c2, c3, c4, c5]              │
//! │ Redo Stack: []                                │
//! └───────────────────────────────────────────────┘
//!
//! undo() x2
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [c1, c2, c3]                      │
//! │ Redo Stack: [c5, c4]                          │
//! └───────────────────────────────────────────────┘
//!
//! redo()      <-- re-runs c4's payload as a new entry c4'
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [c1, c2, c3, c4']                 │
//! │ Redo Stack: [c5]                              │
//! └───────────────────────────────────────────────┘
//!
//! execute(c6) <-- new branch, clears redo
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [c1, c2, c3, c4', c6]             │
//! │ Redo Stack: []                                │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. `history().len() <= config.max_history_length` after every operation.
//! 2. Sequence numbers strictly increase across execute and redo; undo never
//!    allocates one.
//! 3. A successful execute that is not a redo empties the redo stack.
//! 4. A failed execute pushes nothing and allocates no sequence number.
//! 5. Each successful execute, undo or redo emits exactly one
//!    [`StateChange`].
//!
//! Entries evicted by the capacity bound are gone for good; nothing is
//! folded into a base snapshot.

use std::collections::VecDeque;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::command::{Command, ExecutedCommand};
use crate::error::CommandError;
use crate::notify::{StateChange, StateChangeFeed, StateChangeKind, Subscription};
use crate::registry::{CommandRegistry, Namespace};

/// Default bound on the undo stack.
pub const DEFAULT_MAX_HISTORY_LENGTH: usize = 10_000;

/// History limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HistoryConfig {
    /// Maximum number of entries on the undo stack.
    pub max_history_length: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history_length: DEFAULT_MAX_HISTORY_LENGTH,
        }
    }
}

impl HistoryConfig {
    #[must_use]
    pub fn new(max_history_length: usize) -> Self {
        Self { max_history_length }
    }

    /// No practical bound (for testing).
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_history_length: usize::MAX,
        }
    }
}

/// Undo/redo history bound to a single document.
pub struct CommandHistory<D> {
    document: D,
    registry: CommandRegistry<D>,
    /// Newest at back.
    undo_stack: VecDeque<ExecutedCommand>,
    /// Newest at back.
    redo_stack: VecDeque<ExecutedCommand>,
    next_sequence: u64,
    config: HistoryConfig,
    feed: StateChangeFeed,
}

impl<D: fmt::Debug> fmt::Debug for CommandHistory<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHistory")
            .field("document", &self.document)
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .field("next_sequence", &self.next_sequence)
            .field("config", &self.config)
            .finish()
    }
}

impl<D> CommandHistory<D> {
    /// A history with its own notification feed.
    #[must_use]
    pub fn new(document: D, config: HistoryConfig) -> Self {
        Self::with_feed(document, config, StateChangeFeed::new())
    }

    /// A history that reports to an existing feed.
    #[must_use]
    pub fn with_feed(document: D, config: HistoryConfig, feed: StateChangeFeed) -> Self {
        Self {
            document,
            registry: CommandRegistry::new(),
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            next_sequence: 1,
            config,
            feed,
        }
    }

    // ========================================================================
    // Registration
    // ========================================================================

    #[must_use]
    pub fn registry(&self) -> &CommandRegistry<D> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CommandRegistry<D> {
        &mut self.registry
    }

    /// Register every verb of `namespace` for this document.
    pub fn register_namespace(&mut self, namespace: &Namespace<D>) {
        self.registry.register_namespace(namespace);
    }

    // ========================================================================
    // Core Operations
    // ========================================================================

    /// Run `command` against the document and record it.
    ///
    /// Returns the sequence number assigned to the new entry.
    ///
    /// # Errors
    ///
    /// [`CommandError::UnknownCommandType`] for an unregistered type, or
    /// whatever the handler returns. Nothing is recorded on error.
    pub fn execute_command(&mut self, command: Command) -> Result<u64, CommandError> {
        self.run(command, StateChangeKind::Execute)
    }

    /// Revert the newest entry and move it to the redo stack.
    ///
    /// Returns the entry's description, or `None` when there is nothing to
    /// undo.
    ///
    /// # Errors
    ///
    /// Whatever the handler returns; the entry stays on the undo stack.
    pub fn undo(&mut self) -> Result<Option<String>, CommandError> {
        let Some(entry) = self.undo_stack.pop_back() else {
            return Ok(None);
        };
        let kind = entry.command().kind().clone();

        let reverted = self.registry.lookup(&kind).and_then(|handler| {
            handler.undo(
                &kind,
                &mut self.document,
                entry.result(),
                entry.command().payload(),
            )
        });
        if let Err(err) = reverted {
            tracing::warn!(command_type = %kind, error = %err, "undo failed");
            self.undo_stack.push_back(entry);
            return Err(err);
        }

        let description = entry.description().to_owned();
        tracing::debug!(
            command_type = %kind,
            sequence = entry.sequence_number(),
            description = %description,
            "undo"
        );
        self.redo_stack.push_back(entry);
        self.feed.emit(&StateChange {
            kind: StateChangeKind::Undo,
            description: description.clone(),
            sequence_number: None,
        });
        Ok(Some(description))
    }

    /// Re-run the newest undone command as a new entry.
    ///
    /// The payload is reused; the handler runs again and the entry gets a
    /// fresh result and sequence number. Returns the description, or `None`
    /// when there is nothing to redo.
    ///
    /// # Errors
    ///
    /// Whatever the handler returns; the entry stays on the redo stack.
    pub fn redo(&mut self) -> Result<Option<String>, CommandError> {
        let Some(entry) = self.redo_stack.pop_back() else {
            return Ok(None);
        };
        let description = entry.description().to_owned();
        match self.run(entry.command().clone(), StateChangeKind::Redo) {
            Ok(_) => Ok(Some(description)),
            Err(err) => {
                self.redo_stack.push_back(entry);
                Err(err)
            }
        }
    }

    fn run(&mut self, command: Command, origin: StateChangeKind) -> Result<u64, CommandError> {
        let kind = command.kind().clone();
        let outcome = self.registry.lookup(&kind).and_then(|handler| {
            let description = handler.describe(&kind, command.payload())?;
            let result = handler.execute(&kind, &mut self.document, command.payload())?;
            Ok((description, result))
        });
        let (description, result) = match outcome {
            Ok(done) => done,
            Err(err) => {
                tracing::warn!(command_type = %kind, origin = %origin, error = %err, "command failed");
                return Err(err);
            }
        };

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.undo_stack.push_back(ExecutedCommand::new(
            command,
            result,
            description.clone(),
            sequence,
        ));
        if origin != StateChangeKind::Redo {
            self.redo_stack.clear();
        }
        self.enforce_limit();

        tracing::debug!(
            command_type = %kind,
            sequence,
            description = %description,
            origin = %origin,
            "command executed"
        );
        self.feed.emit(&StateChange {
            kind: origin,
            description,
            sequence_number: Some(sequence),
        });
        Ok(sequence)
    }

    fn enforce_limit(&mut self) {
        while self.undo_stack.len() > self.config.max_history_length {
            if let Some(evicted) = self.undo_stack.pop_front() {
                tracing::trace!(
                    command_type = %evicted.command().kind(),
                    sequence = evicted.sequence_number(),
                    "evicted oldest history entry"
                );
            }
        }
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    // ========================================================================
    // Info
    // ========================================================================

    /// Undo stack, oldest first.
    #[must_use]
    pub fn history(&self) -> &VecDeque<ExecutedCommand> {
        &self.undo_stack
    }

    /// Redo stack; the back is the next entry to redo.
    #[must_use]
    pub fn redo_history(&self) -> &VecDeque<ExecutedCommand> {
        &self.redo_stack
    }

    #[must_use]
    pub fn document(&self) -> &D {
        &self.document
    }

    /// Direct document access, bypassing history.
    ///
    /// For state that is not undoable, such as selection highlights.
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    /// Give up the document, dropping the history.
    #[must_use]
    pub fn into_document(self) -> D {
        self.document
    }

    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// The sequence number the next execute or redo will receive.
    #[must_use]
    pub fn next_sequence_number(&self) -> u64 {
        self.next_sequence
    }

    /// Handle to this history's notification feed.
    #[must_use]
    pub fn feed(&self) -> &StateChangeFeed {
        &self.feed
    }

    pub fn subscribe(&self, callback: impl Fn(&StateChange) + 'static) -> Subscription {
        self.feed.subscribe(callback)
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Drop both stacks. Sequence numbers keep counting.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

// ============================================================================
// Tests
// ============================================================================
