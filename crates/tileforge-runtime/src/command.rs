#![forbid(unsafe_code)]

//! Commands, handlers, and executed-command records.
//!
//! A [`Command`] is a namespaced type string plus a payload. A
//! [`CommandHandler`] is the describe/execute/undo triple for one command
//! type, written against concrete payload and output types. The registry
//! stores handlers type-erased behind [`ErasedHandler`]; payloads and
//! outputs cross that boundary as `dyn CommandValue` and are downcast back
//! before the typed handler sees them.
//!
//! # Invariants
//!
//! - `undo(execute(doc, p), p)` restores `doc`, for a correct handler.
//! - An [`ExecutedCommand`] never changes after creation; it only moves
//!   between the undo and redo stacks.

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::error::CommandError;

// ============================================================================
// Values
// ============================================================================

/// A payload or handler output carried through the type-erased registry.
pub trait CommandValue: Any + fmt::Debug {
    /// Downcast support.
    fn as_any(&self) -> &dyn Any;

    /// Concrete type name, for error messages.
    fn type_name(&self) -> &'static str;
}

impl<T: Any + fmt::Debug> CommandValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

fn downcast<'a, T: 'static>(
    value: &'a dyn CommandValue,
    kind: &CommandType,
) -> Result<&'a T, CommandError> {
    value
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| CommandError::PayloadMismatch {
            command: kind.to_string(),
            expected: std::any::type_name::<T>(),
            actual: value.type_name(),
        })
}

// ============================================================================
// Command type
// ============================================================================

/// A fully qualified command type, `"<namespace>.<verb>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CommandType(String);

impl CommandType {
    /// Join a namespace and a verb.
    #[must_use]
    pub fn new(namespace: &str, verb: &str) -> Self {
        Self(format!("{namespace}.{verb}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part before the first `.`, or the whole string.
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.0.split_once('.').map_or(&self.0, |(ns, _)| ns)
    }

    /// The part after the first `.`, or empty.
    #[must_use]
    pub fn verb(&self) -> &str {
        self.0.split_once('.').map_or("", |(_, verb)| verb)
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommandType {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for CommandType {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ============================================================================
// Command
// ============================================================================

/// A request to mutate a document.
///
/// The payload is shared so redo can re-run the exact same payload.
#[derive(Clone)]
pub struct Command {
    kind: CommandType,
    payload: Rc<dyn CommandValue>,
}

impl Command {
    #[must_use]
    pub fn new<P: CommandValue>(kind: impl Into<CommandType>, payload: P) -> Self {
        Self {
            kind: kind.into(),
            payload: Rc::new(payload),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &CommandType {
        &self.kind
    }

    #[must_use]
    pub fn payload(&self) -> &dyn CommandValue {
        &*self.payload
    }

    /// The payload as `P`, if that is its type.
    #[must_use]
    pub fn payload_as<P: 'static>(&self) -> Option<&P> {
        (*self.payload).as_any().downcast_ref::<P>()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("kind", &self.kind)
            .field("payload", &self.payload)
            .finish()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// The describe/execute/undo triple for one command type.
///
/// `Output` is whatever `undo` needs to reverse `execute`: an inverse patch,
/// a prior snapshot. It is stored in the history entry and handed back by
/// shared reference, so one-shot undo data needs interior state (see
/// `tileforge_diff::TrackedPatch`).
pub trait CommandHandler<D>: 'static {
    type Payload: CommandValue;
    type Output: CommandValue;

    /// Human-readable label, shown in history and notifications.
    fn describe(&self, payload: &Self::Payload) -> String;

    /// Mutate `document`. On error the document must be left unchanged.
    fn execute(&self, document: &mut D, payload: &Self::Payload)
    -> Result<Self::Output, CommandError>;

    /// Reverse a previous `execute` that produced `output`.
    fn undo(
        &self,
        document: &mut D,
        output: &Self::Output,
        payload: &Self::Payload,
    ) -> Result<(), CommandError>;
}

/// Object-safe view of a [`CommandHandler`], as stored in the registry.
pub trait ErasedHandler<D> {
    /// `TypeId` of the payload the handler accepts.
    fn payload_type(&self) -> TypeId;

    /// Name of the payload type, for diagnostics.
    fn payload_type_name(&self) -> &'static str;

    fn describe(&self, kind: &CommandType, payload: &dyn CommandValue)
    -> Result<String, CommandError>;

    fn execute(
        &self,
        kind: &CommandType,
        document: &mut D,
        payload: &dyn CommandValue,
    ) -> Result<Box<dyn CommandValue>, CommandError>;

    fn undo(
        &self,
        kind: &CommandType,
        document: &mut D,
        output: &dyn CommandValue,
        payload: &dyn CommandValue,
    ) -> Result<(), CommandError>;
}

pub(crate) struct Erased<H>(pub(crate) H);

impl<D, H: CommandHandler<D>> ErasedHandler<D> for Erased<H> {
    fn payload_type(&self) -> TypeId {
        TypeId::of::<H::Payload>()
    }

    fn payload_type_name(&self) -> &'static str {
        std::any::type_name::<H::Payload>()
    }

    fn describe(
        &self,
        kind: &CommandType,
        payload: &dyn CommandValue,
    ) -> Result<String, CommandError> {
        Ok(self.0.describe(downcast(payload, kind)?))
    }

    fn execute(
        &self,
        kind: &CommandType,
        document: &mut D,
        payload: &dyn CommandValue,
    ) -> Result<Box<dyn CommandValue>, CommandError> {
        let output = self.0.execute(document, downcast(payload, kind)?)?;
        Ok(Box::new(output))
    }

    fn undo(
        &self,
        kind: &CommandType,
        document: &mut D,
        output: &dyn CommandValue,
        payload: &dyn CommandValue,
    ) -> Result<(), CommandError> {
        self.0
            .undo(document, downcast(output, kind)?, downcast(payload, kind)?)
    }
}

/// A handler assembled from three closures.
pub struct FnHandler<P, O, Desc, Exec, Undo> {
    describe: Desc,
    execute: Exec,
    undo: Undo,
    _types: PhantomData<fn(&P) -> O>,
}

/// Build a [`CommandHandler`] from closures.
///
/// ```
/// use tileforge_runtime::{CommandHandler, handler_fn};
///
/// let add = handler_fn(
///     |n: &i64| format!("Add {n}"),
///     |doc: &mut i64, n: &i64| {
///         *doc += n;
///         Ok(())
///     },
///     |doc: &mut i64, _: &(), n: &i64| {
///         *doc -= n;
///         Ok(())
///     },
/// );
/// let mut doc: i64 = 1;
/// add.execute(&mut doc, &2).unwrap();
/// assert_eq!(doc, 3);
/// ```
pub fn handler_fn<D, P, O, Desc, Exec, Undo>(
    describe: Desc,
    execute: Exec,
    undo: Undo,
) -> FnHandler<P, O, Desc, Exec, Undo>
where
    Desc: Fn(&P) -> String + 'static,
    Exec: Fn(&mut D, &P) -> Result<O, CommandError> + 'static,
    Undo: Fn(&mut D, &O, &P) -> Result<(), CommandError> + 'static,
{
    FnHandler {
        describe,
        execute,
        undo,
        _types: PhantomData,
    }
}

impl<D, P, O, Desc, Exec, Undo> CommandHandler<D> for FnHandler<P, O, Desc, Exec, Undo>
where
    P: CommandValue,
    O: CommandValue,
    Desc: Fn(&P) -> String + 'static,
    Exec: Fn(&mut D, &P) -> Result<O, CommandError> + 'static,
    Undo: Fn(&mut D, &O, &P) -> Result<(), CommandError> + 'static,
{
    type Payload = P;
    type Output = O;

    fn describe(&self, payload: &P) -> String {
        (self.describe)(payload)
    }

    fn execute(&self, document: &mut D, payload: &P) -> Result<O, CommandError> {
        (self.execute)(document, payload)
    }

    fn undo(&self, document: &mut D, output: &O, payload: &P) -> Result<(), CommandError> {
        (self.undo)(document, output, payload)
    }
}

// ============================================================================
// Executed commands
// ============================================================================

/// A command that ran, plus what its handler needs to undo it.
pub struct ExecutedCommand {
    command: Command,
    result: Box<dyn CommandValue>,
    description: String,
    sequence_number: u64,
    executed_at: Instant,
}

impl ExecutedCommand {
    pub(crate) fn new(
        command: Command,
        result: Box<dyn CommandValue>,
        description: String,
        sequence_number: u64,
    ) -> Self {
        Self {
            command,
            result,
            description,
            sequence_number,
            executed_at: Instant::now(),
        }
    }

    #[must_use]
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// The handler's undo data.
    #[must_use]
    pub fn result(&self) -> &dyn CommandValue {
        &*self.result
    }

    /// The handler's undo data as `T`, if that is its type.
    #[must_use]
    pub fn result_as<T: 'static>(&self) -> Option<&T> {
        (*self.result).as_any().downcast_ref::<T>()
    }

    /// The handler's `describe` output for this command's payload.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    #[must_use]
    pub fn executed_at(&self) -> Instant {
        self.executed_at
    }
}

impl fmt::Debug for ExecutedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutedCommand")
            .field("kind", &self.command.kind)
            .field("description", &self.description)
            .field("sequence_number", &self.sequence_number)
            .finish()
    }
}
