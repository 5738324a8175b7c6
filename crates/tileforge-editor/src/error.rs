#![forbid(unsafe_code)]

use thiserror::Error;

use tileforge_runtime::CommandError;

use crate::config::ConfigError;

/// Errors raised while building documents or the editor itself.
///
/// Command failures during editing surface as [`CommandError`] directly.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The pixel buffer is not a whole number of tiles.
    #[error("{len} pixels do not divide into tiles of {tile_area}")]
    PixelLayout { len: usize, tile_area: usize },
    /// The configuration failed to load or validate.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A built-in namespace could not be bound.
    #[error(transparent)]
    Command(#[from] CommandError),
}
