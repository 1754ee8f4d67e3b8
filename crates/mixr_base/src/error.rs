//! Error types for the object runtime and configuration loading.

use std::path::PathBuf;

/// Errors raised by the object runtime.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObjectError {
    /// `ref`/`unref` observed a count that was already at or below zero.
    #[error("Invalid reference count: {0}")]
    InvalidRefCount(i32),

    /// The object was released while references were still outstanding.
    #[error("Invalid reference count at delete: {0}")]
    InvalidRefCountAtDelete(i32),

    #[error("Unknown factory name: {0}")]
    UnknownFactory(String),

    #[error("Not a component: {0}")]
    NotAComponent(String),
}

pub type ObjectResult<T> = Result<T, ObjectError>;

/// Errors raised while building objects from a configuration document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Object description is missing its 'type' key")]
    MissingType,

    #[error("Object error: {0}")]
    Object(#[from] ObjectError),

    #[error("Object '{0}' failed validation")]
    Invalid(String),

    #[error("Root object '{0}' is not a component")]
    RootNotComponent(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised by the worker thread wrappers.
#[derive(Debug, thiserror::Error)]
pub enum ThreadError {
    #[error("Failed to spawn thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Invalid thread rate: {0} Hz")]
    InvalidRate(f64),

    #[error("Thread '{0}' panicked")]
    Panicked(String),
}

pub type ThreadResult<T> = Result<T, ThreadError>;
