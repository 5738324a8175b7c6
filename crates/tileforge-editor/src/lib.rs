#![forbid(unsafe_code)]

//! Multi-document tileset editing on top of `tileforge-runtime`.
//!
//! # Role in Tileforge
//! `tileforge-editor` is the application layer. It defines the
//! [`TilesetDocument`] the runtime's histories own, the command namespaces
//! that mutate it, and the [`Editor`] context that wires everything to a
//! [`DocumentCommandRouter`](tileforge_runtime::DocumentCommandRouter).
//!
//! # Layout
//! - [`document`]: tiles, tile-major pixels, palettes.
//! - [`tiles`]: tile diffs used as compact undo data.
//! - [`commands`]: the `palettes`, `tiles` and `image` namespaces.
//! - [`editor`]: the editor context and its typed command handles.
//! - [`selection`]: the two-color pick used by merges.
//! - [`config`] and [`logging`]: startup plumbing for hosts.

pub mod commands;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod logging;
pub mod selection;
pub mod tiles;

pub use commands::PaletteSnapshot;
pub use commands::image::{MergeColors, MergeUndo};
pub use commands::palettes::{
    AddPalette, AddTiles, DeletePalette, RemoveTiles, SetTransparencyColor, SortPalette,
};
pub use commands::tiles::SelectByPaletteColors;
pub use config::{ConfigError, EditorConfig};
pub use document::{Tile, TilePixels, TilesetDocument};
pub use editor::{Editor, ImageCommands, PaletteCommands, TileCommands};
pub use error::EditorError;
pub use logging::{LoggingError, init_logging};
pub use selection::ColorSelection;
