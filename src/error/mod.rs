//! # Error Module
//!
//! Error types for the duplicate image finder.
//!
//! ## Design Principles
//! - Worker-local failures (a single bad file) are logged and swallowed;
//!   they never abort the pipeline.
//! - Only bad CLI arguments and database invariant violations are fatal.
//! - Every error carries enough context (paths, reasons) to explain itself.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error.
#[derive(Error, Debug)]
pub enum PcollError {
    #[error("{0}")]
    Usage(#[from] UsageError),

    #[error("{0}")]
    Scan(#[from] ScanError),

    #[error("{0}")]
    Hash(#[from] HashError),

    #[error("{0}")]
    Database(#[from] DatabaseError),
}

/// Errors in command-line argument parsing. Reported to the user via a
/// usage message; never logged as a worker-local failure.
#[derive(Error, Debug)]
pub enum UsageError {
    #[error("directory '{path}' does not exist")]
    DirectoryNotFound { path: PathBuf },

    #[error("'{path}' is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("no search directories were given")]
    NoDirectories,

    #[error("the similarity value must be an integer 0-100 or a float 0.0-1.0, got '{value}'")]
    InvalidPercentage { value: String },

    #[error("the thread count must be a positive integer, got '{value}'")]
    InvalidThreadCount { value: String },
}

/// Errors that occur while walking directories. Worker-local: logged to
/// the console and swallowed, never fatal to the pipeline.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("permission denied reading {path}")]
    PermissionDenied { path: PathBuf },

    #[error("failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from hashing a single file. `Io` is worker-local and logged;
/// `Decode` is not surfaced as an error at all (a file that fails to
/// decode as an image simply has no perceptual hash).
#[derive(Error, Debug)]
pub enum HashError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a decodable image: {reason}")]
    Decode { path: PathBuf, reason: String },
}

/// Invariant violations in the fingerprint database. The `FatalError`
/// case: the result pass aborts rather than returning a partial,
/// inconsistent answer.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("invariant violation: path {path} has no recorded content hash")]
    MissingContentHash { path: PathBuf },

    #[error("invariant violation: content hash has an empty path set")]
    EmptyPathSet,
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, PcollError>;
