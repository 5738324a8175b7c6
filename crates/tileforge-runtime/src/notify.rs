#![forbid(unsafe_code)]

//! Push notifications for history mutations.
//!
//! Every successful execute, undo and redo emits exactly one
//! [`StateChange`] on the history's [`StateChangeFeed`]. Delivery is
//! synchronous and ordered: callbacks run in registration order before the
//! mutating call returns, once per live subscriber.
//!
//! Cloning a feed yields a handle to the same subscriber list, which is how
//! every document history opened by a router reports to one place.
//!
//! # Failure Modes
//!
//! - **Subscriber leak**: callbacks live as long as their [`Subscription`]
//!   guard. Dead entries are pruned on the next emit.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

type CallbackRc = Rc<dyn Fn(&StateChange)>;
type CallbackWeak = Weak<dyn Fn(&StateChange)>;

/// Which history operation produced a [`StateChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StateChangeKind {
    Execute,
    Undo,
    Redo,
}

impl fmt::Display for StateChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Execute => "execute",
            Self::Undo => "undo",
            Self::Redo => "redo",
        })
    }
}

/// One history mutation, for transient UI feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StateChange {
    pub kind: StateChangeKind,
    /// The handler's `describe` output for the command involved.
    pub description: String,
    /// Sequence number assigned by execute or redo; `None` for undo.
    pub sequence_number: Option<u64>,
}

/// A shared list of state-change subscribers.
#[derive(Clone, Default)]
pub struct StateChangeFeed {
    subscribers: Rc<RefCell<Vec<CallbackWeak>>>,
}

impl fmt::Debug for StateChangeFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateChangeFeed")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

impl StateChangeFeed {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback`. It stays registered while the guard lives.
    pub fn subscribe(&self, callback: impl Fn(&StateChange) + 'static) -> Subscription {
        let strong: CallbackRc = Rc::new(callback);
        self.subscribers.borrow_mut().push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Registered callbacks, including dead ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Deliver `change` to every live subscriber.
    pub fn emit(&self, change: &StateChange) {
        // Collect first so callbacks may subscribe without a borrow conflict.
        let callbacks: Vec<CallbackRc> = {
            let mut subscribers = self.subscribers.borrow_mut();
            subscribers.retain(|w| w.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        tracing::trace!(
            kind = %change.kind,
            description = %change.description,
            subscribers = callbacks.len(),
            "state change"
        );
        for callback in &callbacks {
            callback(change);
        }
    }
}

/// RAII guard for a subscriber; dropping it unsubscribes.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
