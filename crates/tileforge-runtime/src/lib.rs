#![forbid(unsafe_code)]

//! Namespaced command dispatch with per-document undo/redo.
//!
//! - [`CommandRegistry`] maps `"<namespace>.<verb>"` to a
//!   [`CommandHandler`] (describe, execute, undo).
//! - [`CommandHistory`] runs commands against one document and keeps
//!   bounded undo and redo stacks of [`ExecutedCommand`]s.
//! - [`DocumentCommandRouter`] owns one history per open document, replays
//!   namespace registrations onto new documents and routes every call to
//!   the current one.
//! - [`StateChangeFeed`] pushes one [`StateChange`] per successful execute,
//!   undo or redo.
//!
//! Everything runs synchronously on the calling thread.
//!
//! # Example
//!
//! ```
//! use tileforge_runtime::{DocumentCommandRouter, HistoryConfig, Namespace, handler_fn};
//!
//! let mut router = DocumentCommandRouter::new(HistoryConfig::default());
//! router.commands(Namespace::new("text").verb(
//!     "append",
//!     handler_fn(
//!         |s: &String| format!("Append {s:?}"),
//!         |doc: &mut String, s: &String| {
//!             doc.push_str(s);
//!             Ok(s.len())
//!         },
//!         |doc: &mut String, len: &usize, _: &String| {
//!             doc.truncate(doc.len() - len);
//!             Ok(())
//!         },
//!     ),
//! ));
//!
//! let doc = router.open(String::from("hello"));
//! router.execute("text", "append", String::from(" world")).unwrap();
//! assert_eq!(router.history(doc).unwrap().document(), "hello world");
//!
//! router.undo().unwrap();
//! assert_eq!(router.history(doc).unwrap().document(), "hello");
//! ```

pub mod command;
pub mod error;
pub mod history;
pub mod notify;
pub mod registry;
pub mod router;

pub use command::{
    Command, CommandHandler, CommandType, CommandValue, ErasedHandler, ExecutedCommand,
    FnHandler, handler_fn,
};
pub use error::CommandError;
pub use history::{CommandHistory, DEFAULT_MAX_HISTORY_LENGTH, HistoryConfig};
pub use notify::{StateChange, StateChangeFeed, StateChangeKind, Subscription};
pub use registry::{Bindings, BoundCommand, CommandRegistry, Namespace, SharedHandler};
pub use router::{DocumentCommandRouter, DocumentId};
