use thiserror::Error;

/// Errors produced by type construction and parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("mandatory field `{field}` is missing or empty for event type {event_type}")]
    MissingMandatoryField { field: String, event_type: String },

    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("unknown digest algorithm: {0}")]
    UnknownDigestAlgorithm(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
