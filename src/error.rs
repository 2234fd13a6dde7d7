use thiserror::Error;

/// Failure modes of the load pipeline.
///
/// Only `Resolver` is fatal, and only at startup. Everything else surfaces
/// as a dashboard banner; the previous snapshot stays visible and `r`
/// retries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("could not resolve project path: {reason}")]
    Resolver { reason: String },

    #[error("no log files found for this project")]
    NoLogFiles,

    #[error("no log entries matched the current filter")]
    NoEntriesMatch,

    #[error("invalid time filter: {0} (use today, yesterday, 1h, 7d, or YYYY-MM-DD)")]
    InvalidTimeFilter(String),

    #[error("analysis failed: {0}")]
    Analyzer(String),
}

pub type LoadResult<T> = Result<T, LoadError>;
