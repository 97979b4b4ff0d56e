//! Error types for Titan.

use std::io;

/// Errors produced by the Titan shell.
#[derive(Debug, thiserror::Error)]
pub enum TitanError {
    #[error("config error: {0}")]
    Config(String),

    #[error("lookup error: no app named '{0}'")]
    Lookup(String),

    #[error("plugin error in '{code}': {message}")]
    Plugin { code: String, message: String },

    #[error("a page transition is already in progress")]
    TransitionInProgress,

    #[error("surface error: {0}")]
    Surface(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl TitanError {
    /// Shorthand for a plugin failure attributed to `code`.
    pub fn plugin(code: &str, message: impl Into<String>) -> Self {
        Self::Plugin {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, TitanError>;
