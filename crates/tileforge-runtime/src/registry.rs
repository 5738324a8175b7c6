#![forbid(unsafe_code)]

//! Command-type to handler table.
//!
//! Handlers are registered in namespace batches: a [`Namespace`] names a
//! prefix and maps verbs to handlers, and every verb becomes the full type
//! `"<namespace>.<verb>"`. Registering a type that already exists replaces
//! the old handler.

use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use ahash::AHashMap;

use crate::command::{Command, CommandHandler, CommandType, CommandValue, Erased, ErasedHandler};
use crate::error::CommandError;

/// Shared, type-erased handler.
pub type SharedHandler<D> = Rc<dyn ErasedHandler<D>>;

/// Handlers keyed by exact command type.
pub struct CommandRegistry<D> {
    handlers: AHashMap<CommandType, SharedHandler<D>>,
}

impl<D> Default for CommandRegistry<D> {
    fn default() -> Self {
        Self {
            handlers: AHashMap::new(),
        }
    }
}

impl<D> fmt::Debug for CommandRegistry<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&str> = self.handlers.keys().map(CommandType::as_str).collect();
        types.sort_unstable();
        f.debug_struct("CommandRegistry")
            .field("types", &types)
            .finish()
    }
}

impl<D> CommandRegistry<D> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `kind`, replacing any previous handler.
    pub fn register<H: CommandHandler<D>>(&mut self, kind: impl Into<CommandType>, handler: H) {
        self.register_shared(kind.into(), Rc::new(Erased(handler)));
    }

    /// Register an already shared handler.
    pub fn register_shared(&mut self, kind: CommandType, handler: SharedHandler<D>) {
        if self.handlers.insert(kind.clone(), handler).is_some() {
            tracing::trace!(command_type = %kind, "replaced command handler");
        }
    }

    /// Register every verb of `namespace`.
    pub fn register_namespace(&mut self, namespace: &Namespace<D>) {
        for (verb, handler) in &namespace.verbs {
            self.register_shared(CommandType::new(&namespace.name, verb), Rc::clone(handler));
        }
    }

    /// Handler for `kind`.
    ///
    /// # Errors
    ///
    /// [`CommandError::UnknownCommandType`] if nothing is registered.
    pub fn lookup(&self, kind: &CommandType) -> Result<&SharedHandler<D>, CommandError> {
        self.handlers
            .get(kind)
            .ok_or_else(|| CommandError::UnknownCommandType(kind.to_string()))
    }

    #[must_use]
    pub fn contains(&self, kind: &CommandType) -> bool {
        self.handlers.contains_key(kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered types, sorted.
    #[must_use]
    pub fn command_types(&self) -> Vec<&CommandType> {
        let mut types: Vec<&CommandType> = self.handlers.keys().collect();
        types.sort_unstable();
        types
    }
}

// ============================================================================
// Namespaces
// ============================================================================

/// A namespace and its verb handlers, registered as one batch.
pub struct Namespace<D> {
    name: String,
    verbs: Vec<(String, SharedHandler<D>)>,
}

impl<D> Clone for Namespace<D> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            verbs: self.verbs.clone(),
        }
    }
}

impl<D> fmt::Debug for Namespace<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("name", &self.name)
            .field("verbs", &self.verbs.iter().map(|(v, _)| v).collect::<Vec<_>>())
            .finish()
    }
}

impl<D> Namespace<D> {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            verbs: Vec::new(),
        }
    }

    /// Add a verb. A repeated verb replaces the earlier handler.
    #[must_use]
    pub fn verb<H: CommandHandler<D>>(mut self, verb: impl Into<String>, handler: H) -> Self {
        let verb = verb.into();
        let handler: SharedHandler<D> = Rc::new(Erased(handler));
        match self.verbs.iter_mut().find(|(v, _)| *v == verb) {
            Some(slot) => slot.1 = handler,
            None => self.verbs.push((verb, handler)),
        }
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Verb names in registration order.
    pub fn verbs(&self) -> impl Iterator<Item = &str> {
        self.verbs.iter().map(|(v, _)| v.as_str())
    }

    /// Payload signatures of every verb, for binding.
    #[must_use]
    pub fn bindings(&self) -> Bindings {
        Bindings {
            namespace: self.name.clone(),
            verbs: self
                .verbs
                .iter()
                .map(|(verb, handler)| {
                    (
                        verb.clone(),
                        (handler.payload_type(), handler.payload_type_name()),
                    )
                })
                .collect(),
        }
    }
}

/// Payload signatures for the verbs of a registered namespace.
///
/// [`bind`](Self::bind) turns a verb into a typed [`BoundCommand`], checking
/// the payload type once up front instead of on every dispatch.
#[derive(Debug, Clone)]
pub struct Bindings {
    namespace: String,
    verbs: AHashMap<String, (TypeId, &'static str)>,
}

impl Bindings {
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Typed constructor for `verb`.
    ///
    /// # Errors
    ///
    /// - [`CommandError::UnknownCommandType`] if the verb is not in the namespace.
    /// - [`CommandError::PayloadMismatch`] if its handler takes another payload type.
    pub fn bind<P: CommandValue>(&self, verb: &str) -> Result<BoundCommand<P>, CommandError> {
        let kind = CommandType::new(&self.namespace, verb);
        let Some(&(payload_type, expected)) = self.verbs.get(verb) else {
            return Err(CommandError::UnknownCommandType(kind.to_string()));
        };
        if payload_type != TypeId::of::<P>() {
            return Err(CommandError::PayloadMismatch {
                command: kind.to_string(),
                expected,
                actual: std::any::type_name::<P>(),
            });
        }
        Ok(BoundCommand {
            kind,
            _payload: PhantomData,
        })
    }
}

/// A command type whose payload type has been checked.
pub struct BoundCommand<P> {
    kind: CommandType,
    _payload: PhantomData<fn(P)>,
}

impl<P> Clone for BoundCommand<P> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            _payload: PhantomData,
        }
    }
}

impl<P> fmt::Debug for BoundCommand<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BoundCommand").field(&self.kind).finish()
    }
}

impl<P: CommandValue> BoundCommand<P> {
    #[must_use]
    pub fn kind(&self) -> &CommandType {
        &self.kind
    }

    /// A command carrying `payload`.
    #[must_use]
    pub fn command(&self, payload: P) -> Command {
        Command::new(self.kind.clone(), payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::handler_fn;

    fn setter(label: &'static str) -> impl CommandHandler<i32, Payload = i32, Output = i32> {
        handler_fn(
            move |v: &i32| format!("{label} {v}"),
            |doc: &mut i32, v: &i32| Ok(std::mem::replace(doc, *v)),
            |doc: &mut i32, old: &i32, _: &i32| {
                *doc = *old;
                Ok(())
            },
        )
    }

    #[test]
    fn namespace_derives_full_types() {
        let ns = Namespace::new("math").verb("set", setter("Set")).verb("reset", setter("Reset"));
        let mut registry = CommandRegistry::new();
        registry.register_namespace(&ns);

        let types: Vec<&str> = registry.command_types().into_iter().map(CommandType::as_str).collect();
        assert_eq!(types, vec!["math.reset", "math.set"]);
        assert!(registry.contains(&CommandType::from("math.set")));
    }

    #[test]
    fn unknown_type_is_an_error() {
        let registry: CommandRegistry<i32> = CommandRegistry::new();
        let err = registry.lookup(&CommandType::from("nope.verb")).err();
        assert_eq!(err, Some(CommandError::UnknownCommandType("nope.verb".into())));
    }

    #[test]
    fn last_registration_wins() {
        let mut registry = CommandRegistry::new();
        registry.register("math.set", setter("First"));
        registry.register("math.set", setter("Second"));
        assert_eq!(registry.len(), 1);

        let kind = CommandType::from("math.set");
        let handler = registry.lookup(&kind).unwrap();
        assert_eq!(handler.describe(&kind, &3).unwrap(), "Second 3");
    }

    #[test]
    fn bind_checks_payload_type() {
        let ns = Namespace::new("math").verb("set", setter("Set"));
        let bindings = ns.bindings();

        let bound = bindings.bind::<i32>("set").unwrap();
        assert_eq!(bound.kind().as_str(), "math.set");
        assert_eq!(bound.command(4).payload_as::<i32>(), Some(&4));

        assert!(matches!(
            bindings.bind::<u8>("set"),
            Err(CommandError::PayloadMismatch { expected: "i32", actual: "u8", .. })
        ));
        assert!(matches!(
            bindings.bind::<i32>("missing"),
            Err(CommandError::UnknownCommandType(_))
        ));
    }

    #[test]
    fn repeated_verb_replaces_within_namespace() {
        let ns = Namespace::new("math").verb("set", setter("A")).verb("set", setter("B"));
        assert_eq!(ns.verbs().collect::<Vec<_>>(), vec!["set"]);
    }
}
