use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type used across the probe crates.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The backing OS data source is missing or unreadable.
    #[error("source unavailable: {}: {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Fewer fields were recovered from a source than expected.
    #[error("{source_name}: parsed {found} of {expected} fields")]
    ParseIncomplete {
        source_name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("report error: {0}")]
    Report(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl ProbeError {
    /// Wrap an I/O failure on `path` as [`ProbeError::SourceUnavailable`].
    pub fn unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = ProbeError> = std::result::Result<T, E>;
