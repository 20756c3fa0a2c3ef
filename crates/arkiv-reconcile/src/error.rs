use thiserror::Error;

/// Errors from a reconciliation pass.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Stream(#[from] arkiv_stream::StreamError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
