#![forbid(unsafe_code)]

//! Process-wide `tracing` setup for hosts embedding the editor.
//!
//! The library crates only emit events; nothing is printed until a host
//! installs a subscriber. [`init_logging`] installs a formatted one whose
//! filter comes from `TILEFORGE_LOG` when set, else from the caller.
//!
//! ```rust,ignore
//! tileforge_editor::init_logging("tileforge_runtime=debug,info")?;
//! ```

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Environment variable that overrides the caller's filter.
pub const LOG_ENV: &str = "TILEFORGE_LOG";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),
    #[error("a global subscriber is already installed: {0}")]
    Init(#[from] TryInitError),
}

/// The filter [`init_logging`] would install: `TILEFORGE_LOG` if it parses,
/// otherwise `default`.
pub fn env_filter(default: &str) -> Result<EnvFilter, LoggingError> {
    match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(default)?),
    }
}

/// Install a global fmt subscriber filtered by [`env_filter`].
///
/// # Errors
///
/// [`LoggingError::Filter`] for a malformed `default`, and
/// [`LoggingError::Init`] if a global subscriber is already set.
pub fn init_logging(default: &str) -> Result<(), LoggingError> {
    let filter = env_filter(default)?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()?;
    tracing::debug!(env = LOG_ENV, "logging initialized");
    Ok(())
}
