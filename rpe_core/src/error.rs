//! Error types for the rpe_core library.
//!
//! The prescription engine itself never fails: missing numbers come back as
//! `None` and out-of-range numbers are clamped. These errors cover file I/O,
//! parsing and session lifecycle misuse.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for rpe_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Training block validation error
    #[error("Block error: {0}")]
    Program(String),

    /// Session lifecycle error (bad index, editing a completed session, ...)
    #[error("Session error: {0}")]
    Session(String),
}
