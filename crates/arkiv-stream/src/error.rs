use std::path::PathBuf;

use thiserror::Error;

/// Errors from record streams and the external sorter.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Physical end of file reached before the `{}` sentinel line.
    /// The file was truncated mid-write and must not be read as a
    /// shorter-but-valid stream.
    #[error("stream {path} ended without the EOF sentinel (truncated file)")]
    CorruptStream { path: PathBuf },

    #[error("record is not valid JSON at {path} line {line}: {reason}")]
    MalformedRecord {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StreamError>;
