//! PWO-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, PwoError>;

/// Top-level error type for the password option engine.
#[derive(Debug, Error)]
pub enum PwoError {
    #[error("[PWO-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[PWO-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[PWO-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[PWO-2001] no character class enabled")]
    EmptyAlphabet,

    #[error("[PWO-2002] invalid password length {length}")]
    InvalidLength { length: u32 },

    #[error("[PWO-2003] required characters ({required}) exceed password length ({length})")]
    InfeasibleMinimums { required: u32, length: u32 },

    #[error("[PWO-3001] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[PWO-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[PWO-3003] clipboard write failed: {details}")]
    Clipboard { details: String },

    #[error("[PWO-3004] runtime failure: {details}")]
    Runtime { details: String },
}

impl PwoError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "PWO-1001",
            Self::MissingConfig { .. } => "PWO-1002",
            Self::ConfigParse { .. } => "PWO-1003",
            Self::EmptyAlphabet => "PWO-2001",
            Self::InvalidLength { .. } => "PWO-2002",
            Self::InfeasibleMinimums { .. } => "PWO-2003",
            Self::Serialization { .. } => "PWO-3001",
            Self::Io { .. } => "PWO-3002",
            Self::Clipboard { .. } => "PWO-3003",
            Self::Runtime { .. } => "PWO-3004",
        }
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for PwoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for PwoError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
