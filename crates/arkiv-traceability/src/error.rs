use thiserror::Error;

/// Errors from one traceability run.
///
/// The taxonomy is deliberately flat: validation failures never reach this
/// crate (they are rejected at `LogEntry` construction), I/O and stream
/// corruption arrive through `arkiv-stream`, and the two external
/// collaborators get their own variants so callers can tell a FATAL
/// authority failure from a retryable store failure.
#[derive(Debug, Error)]
pub enum TraceabilityError {
    #[error("timestamp authority failure: {0}")]
    TimestampAuthority(String),

    #[error("object store failure: {0}")]
    ObjectStore(String),

    #[error("audit logbook failure: {0}")]
    Logbook(String),

    #[error("period cursor failure: {0}")]
    Cursor(String),

    #[error("offer log source failure: {0}")]
    OfferLog(String),

    #[error(transparent)]
    Stream(#[from] arkiv_stream::StreamError),

    #[error(transparent)]
    Archive(#[from] arkiv_archive::ArchiveError),

    #[error(transparent)]
    Types(#[from] arkiv_types::TypeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TraceabilityError>;
