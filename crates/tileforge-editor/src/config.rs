#![forbid(unsafe_code)]

//! Editor configuration, loadable from TOML or JSON.
//!
//! ```toml
//! # tileforge.toml
//! default_transparency = "#ff00ff"
//!
//! [history]
//! max_history_length = 500
//!
//! [cluster]
//! seed = 42
//! ```
//!
//! ```rust,ignore
//! let config = EditorConfig::from_toml_file("tileforge.toml")?;
//! let config = EditorConfig::from_json_str(json)?;
//! ```
//!
//! Every field is optional; missing ones take the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tileforge_palette::{ClusterConfig, Color};
use tileforge_runtime::HistoryConfig;

// ---------------------------------------------------------------------------
// EditorConfig
// ---------------------------------------------------------------------------

/// Everything tunable about an [`Editor`](crate::Editor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Transparency color for documents opened through the editor.
    #[serde(with = "hex_color")]
    pub default_transparency: Color,

    /// Undo bound applied to every document.
    pub history: HistoryConfig,

    /// Shuffle seed for palette sorting. Unseeded by default.
    pub cluster: ClusterConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_transparency: Color::MAGENTA,
            history: HistoryConfig::default(),
            cluster: ClusterConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Check parameter ranges.
    ///
    /// Returns a list of problems. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.history.max_history_length == 0 {
            errors.push(String::from("history.max_history_length must be > 0"));
        }
        errors
    }

    /// [`validate`](Self::validate) as a `Result`.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Serialize to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading an editor configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ---------------------------------------------------------------------------
// Serde helpers for Color
// ---------------------------------------------------------------------------

/// Colors as `"#rrggbb"` strings.
mod hex_color {
    use serde::{Deserialize, Deserializer, Serializer};

    use tileforge_palette::Color;

    pub fn serialize<S: Serializer>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&color.to_hex())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
