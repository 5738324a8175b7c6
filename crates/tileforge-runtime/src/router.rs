#![forbid(unsafe_code)]

//! Multi-document command routing.
//!
//! [`DocumentCommandRouter`] owns one [`CommandHistory`] per open document
//! and remembers every namespace registered through
//! [`commands`](DocumentCommandRouter::commands). Registration applies to
//! all open documents immediately and is replayed onto each document opened
//! later, before it can run anything.
//!
//! Execution, undo and redo always target the current document. Switching
//! documents replays nothing; histories are independent.

use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::command::{Command, CommandType, CommandValue};
use crate::error::CommandError;
use crate::history::{CommandHistory, HistoryConfig};
use crate::notify::{StateChange, StateChangeFeed, Subscription};
use crate::registry::{BoundCommand, Bindings, Namespace};

/// Identifies an open document. Never reused within a router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DocumentId(u64);

impl DocumentId {
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Routes commands to the current document's history.
pub struct DocumentCommandRouter<D> {
    documents: BTreeMap<DocumentId, CommandHistory<D>>,
    namespaces: Vec<Namespace<D>>,
    current: Option<DocumentId>,
    next_id: u64,
    config: HistoryConfig,
    feed: StateChangeFeed,
}

impl<D> fmt::Debug for DocumentCommandRouter<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentCommandRouter")
            .field("documents", &self.documents.keys().collect::<Vec<_>>())
            .field("namespaces", &self.namespaces)
            .field("current", &self.current)
            .field("config", &self.config)
            .finish()
    }
}

impl<D> Default for DocumentCommandRouter<D> {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl<D> DocumentCommandRouter<D> {
    /// A router with no documents. Each opened document gets `config`.
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            documents: BTreeMap::new(),
            namespaces: Vec::new(),
            current: None,
            next_id: 1,
            config,
            feed: StateChangeFeed::new(),
        }
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register `namespace` on every open document and on all future ones.
    ///
    /// Returns its payload signatures so callers can bind typed commands.
    pub fn commands(&mut self, namespace: Namespace<D>) -> Bindings {
        for history in self.documents.values_mut() {
            history.register_namespace(&namespace);
        }
        let bindings = namespace.bindings();
        tracing::debug!(
            namespace = namespace.name(),
            verbs = namespace.verbs().count(),
            documents = self.documents.len(),
            "registered command namespace"
        );
        self.namespaces.push(namespace);
        bindings
    }

    // ========================================================================
    // Documents
    // ========================================================================

    /// Open `document`, register every known namespace on it and make it
    /// current.
    pub fn open(&mut self, document: D) -> DocumentId {
        let id = DocumentId(self.next_id);
        self.next_id += 1;

        let mut history = CommandHistory::with_feed(document, self.config, self.feed.clone());
        for namespace in &self.namespaces {
            history.register_namespace(namespace);
        }
        self.documents.insert(id, history);
        self.current = Some(id);
        tracing::info!(document = %id, open = self.documents.len(), "opened document");
        id
    }

    /// Close `id` and hand back its document; its history is dropped.
    ///
    /// If it was current, the most recently opened remaining document
    /// becomes current.
    ///
    /// # Errors
    ///
    /// [`CommandError::UnknownDocument`] if `id` is not open.
    pub fn close(&mut self, id: DocumentId) -> Result<D, CommandError> {
        let history = self
            .documents
            .remove(&id)
            .ok_or(CommandError::UnknownDocument(id.0))?;
        if self.current == Some(id) {
            self.current = self.documents.keys().next_back().copied();
        }
        tracing::info!(document = %id, current = ?self.current, "closed document");
        Ok(history.into_document())
    }

    /// Make `id` the target of execute, undo and redo.
    ///
    /// # Errors
    ///
    /// [`CommandError::UnknownDocument`] if `id` is not open.
    pub fn set_current(&mut self, id: DocumentId) -> Result<(), CommandError> {
        if !self.documents.contains_key(&id) {
            return Err(CommandError::UnknownDocument(id.0));
        }
        if self.current != Some(id) {
            tracing::info!(from = ?self.current, to = %id, "switched document");
        }
        self.current = Some(id);
        Ok(())
    }

    #[must_use]
    pub fn current_id(&self) -> Option<DocumentId> {
        self.current
    }

    #[must_use]
    pub fn current(&self) -> Option<&CommandHistory<D>> {
        self.current.and_then(|id| self.documents.get(&id))
    }

    pub fn current_mut(&mut self) -> Option<&mut CommandHistory<D>> {
        self.current.and_then(|id| self.documents.get_mut(&id))
    }

    #[must_use]
    pub fn history(&self, id: DocumentId) -> Option<&CommandHistory<D>> {
        self.documents.get(&id)
    }

    pub fn history_mut(&mut self, id: DocumentId) -> Option<&mut CommandHistory<D>> {
        self.documents.get_mut(&id)
    }

    /// Open documents, oldest first.
    pub fn documents(&self) -> impl Iterator<Item = DocumentId> + '_ {
        self.documents.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    // ========================================================================
    // Routing
    // ========================================================================

    fn active(&mut self) -> Result<&mut CommandHistory<D>, CommandError> {
        let id = self.current.ok_or(CommandError::NoActiveDocument)?;
        self.documents
            .get_mut(&id)
            .ok_or(CommandError::UnknownDocument(id.0))
    }

    /// Run `namespace.verb` with `payload` on the current document.
    ///
    /// # Errors
    ///
    /// [`CommandError::NoActiveDocument`], or whatever
    /// [`CommandHistory::execute_command`] returns.
    pub fn execute<P: CommandValue>(
        &mut self,
        namespace: &str,
        verb: &str,
        payload: P,
    ) -> Result<u64, CommandError> {
        self.execute_command(Command::new(CommandType::new(namespace, verb), payload))
    }

    /// Run a pre-bound command on the current document.
    ///
    /// # Errors
    ///
    /// As [`execute`](Self::execute).
    pub fn run<P: CommandValue>(
        &mut self,
        bound: &BoundCommand<P>,
        payload: P,
    ) -> Result<u64, CommandError> {
        self.execute_command(bound.command(payload))
    }

    /// Run `command` on the current document.
    ///
    /// # Errors
    ///
    /// As [`execute`](Self::execute).
    pub fn execute_command(&mut self, command: Command) -> Result<u64, CommandError> {
        self.active()?.execute_command(command)
    }

    /// Undo on the current document.
    ///
    /// # Errors
    ///
    /// [`CommandError::NoActiveDocument`], or whatever the handler returns.
    pub fn undo(&mut self) -> Result<Option<String>, CommandError> {
        self.active()?.undo()
    }

    /// Redo on the current document.
    ///
    /// # Errors
    ///
    /// [`CommandError::NoActiveDocument`], or whatever the handler returns.
    pub fn redo(&mut self) -> Result<Option<String>, CommandError> {
        self.active()?.redo()
    }

    /// Subscribe to state changes from every document, present and future.
    pub fn subscribe(&self, callback: impl Fn(&StateChange) + 'static) -> Subscription {
        self.feed.subscribe(callback)
    }
}
