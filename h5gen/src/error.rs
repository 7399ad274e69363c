//! Error types for the generator
//!
//! Only boundary failures are errors. Problems with individual fields or
//! records are reported as [`crate::schema::diagnostic::Diagnostic`] values and
//! never abort a run.

use std::path::PathBuf;
use thiserror::Error;

/// Failures obtaining descriptors from the input boundary
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Descriptor file does not exist
    #[error("descriptor file `{}` does not exist, check filename and current working directory", .0.display())]
    NotFound(PathBuf),

    /// Descriptor file exists but could not be read
    #[error("failed to read descriptor file `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML descriptors did not match the descriptor schema
    #[error("malformed YAML descriptors in `{}`: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },

    /// JSON descriptors did not match the descriptor schema
    #[error("malformed JSON descriptors in `{}`: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Descriptor file names no source header
    #[error("descriptor file `{}` does not name its source header", .0.display())]
    MissingSource(PathBuf),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("config file `{}` not found", .0.display())]
    NotFound(PathBuf),

    /// Config file could not be read
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    /// Invalid config format
    #[error("invalid config format: {0}")]
    InvalidFormat(#[from] serde_yml::Error),

    /// Namespace is not a valid C++ namespace path
    #[error("invalid namespace `{0}`")]
    InvalidNamespace(String),

    /// A name list contains an empty entry
    #[error("`{0}` contains an empty entry")]
    EmptyEntry(&'static str),
}

/// Main error type for a generation run
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Writing an output artifact failed
    #[error("failed to write `{}`: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
