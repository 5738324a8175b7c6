#![forbid(unsafe_code)]

use thiserror::Error;

/// Errors produced by palette operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaletteError {
    /// A color string was not of the form `#rrggbb`.
    #[error("invalid hex color {0:?}, expected #rrggbb")]
    InvalidHex(String),
    /// The clustering output referenced an entry that is not in the palette.
    #[error("sorted order references unknown palette entry {id}")]
    MissingEntry { id: usize },
}
