//! Error types for the Imagemill batch processor.
//!
//! Errors are split by blast radius: `BatchError` aborts a whole run
//! before any job is dispatched, while `TaskError` is always recovered
//! at the per-job boundary and surfaced as a `Failure` outcome.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Imagemill operations.
#[derive(Error, Debug)]
pub enum ImagemillError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Coordinator-level batch errors
    #[error("Batch error: {0}")]
    Batch(#[from] BatchError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Fatal coordinator errors, raised before any job is dispatched.
///
/// Per-file failures never produce these; they become `TaskError`s
/// inside a `Failure` outcome instead.
#[derive(Error, Debug)]
pub enum BatchError {
    /// The input directory does not exist or is not a directory
    #[error("Input directory not found: {0}")]
    InputDirMissing(PathBuf),

    /// The input directory exists but cannot be listed
    #[error("Cannot read input directory {path}: {message}")]
    InputDirUnreadable { path: PathBuf, message: String },

    /// The output directory cannot be created
    #[error("Cannot create output directory {path}: {message}")]
    OutputDirCreate { path: PathBuf, message: String },
}

/// Per-job errors. Always converted to a `Failure` outcome and never
/// allowed to cross the worker boundary as a panic or abort the batch.
#[derive(Error, Debug)]
pub enum TaskError {
    /// The source could not be decoded, or a transform step failed
    #[error("Failed to process {path}: {message}")]
    CorruptedFile { path: PathBuf, message: String },

    /// Requested output format is outside the supported set
    #[error("Format '{format}' not supported. Use: jpeg, webp, png")]
    UnsupportedFormat { format: String },

    /// Encoding succeeded but the result could not be written
    #[error("Failed to write {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// Two input files map to the same destination path
    #[error("Destination {destination} already claimed by {other_source}")]
    DestinationCollision {
        destination: PathBuf,
        other_source: PathBuf,
    },

    /// A worker task panicked; the panic is contained to this job
    #[error("Worker panicked: {message}")]
    Panicked { message: String },
}

/// Convenience type alias for Imagemill results.
pub type Result<T> = std::result::Result<T, ImagemillError>;

/// Convenience type alias for per-job results.
pub type TaskResult<T> = std::result::Result<T, TaskError>;
