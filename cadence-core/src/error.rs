//! Error types for cadence-core

use thiserror::Error;

/// Main error type for the cadence-core library
///
/// Programmer errors (negative offsets, unsupported period kinds) surface
/// immediately to the caller. Data-quality problems — malformed series dates,
/// checkpoints that cannot be reconciled with today — are recovered close to
/// where they occur with a safe default, so a metrics computation always
/// produces a number instead of an error screen.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid argument passed to a period or streak function
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A series key that is not a valid ISO calendar date
    #[error("malformed series date: {0:?}")]
    MalformedDate(String),

    /// A persisted checkpoint that cannot be reconciled with today
    #[error("stale checkpoint: {0}")]
    StaleCheckpoint(String),

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for cadence-core
pub type Result<T> = std::result::Result<T, Error>;
