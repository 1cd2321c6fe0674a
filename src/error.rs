//! Error types for linting operations.
//!
//! This module provides the [`LintError`] type for all fatal conditions and the
//! [`Result`] convenience type. Quality issues found in records are *not*
//! errors; they are reported as [`Issue`](crate::issue::Issue) values.

use thiserror::Error;

/// Error type for all fatal linting conditions.
///
/// Every variant aborts the run. There is no retry path.
#[derive(Error, Debug)]
pub enum LintError {
    /// A line could not be decoded into an intermediate schema record.
    #[error("Decode error on line {line}: {source}")]
    Decode {
        /// One-based input line number.
        line: u64,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Sampling ratio outside of `[0, 1]`.
    #[error("Invalid sample ratio: {0} (must be between 0 and 1)")]
    InvalidSampleRatio(f64),

    /// A rule name passed at startup is not part of the rule set.
    #[error("Unknown rule: {0}")]
    UnknownRule(String),

    /// A kind name could not be parsed.
    #[error("Unknown issue kind: {0}")]
    UnknownKind(String),

    /// Pipeline configuration that cannot run (zero workers, zero batch size).
    #[error("Invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// A snapshot could not be serialized.
    #[error("Snapshot serialization error: {0}")]
    Snapshot(#[source] serde_json::Error),

    /// A pipeline stage hung up before the run finished.
    #[error("Pipeline channel closed unexpectedly")]
    ChannelClosed,

    /// A pipeline thread panicked.
    #[error("Pipeline thread panicked: {0}")]
    ThreadPanicked(&'static str),

    /// IO error from the input, an asset file or an output sink.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Convenience type alias for [`std::result::Result`] with [`LintError`].
pub type Result<T> = std::result::Result<T, LintError>;
