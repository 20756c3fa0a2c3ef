use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArchiveError {
    #[error("invalid archive magic: expected {expected}, got {actual}")]
    InvalidMagic { expected: String, actual: String },

    #[error("unsupported archive version: {0}")]
    UnsupportedVersion(u32),

    #[error("archive checksum mismatch")]
    ChecksumMismatch,

    #[error("corrupt archive at offset {offset}: {reason}")]
    Corrupt { offset: usize, reason: String },

    #[error("archive entry {index} is `{actual}`, expected `{expected}`")]
    EntryOutOfOrder {
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("missing property `{0}`")]
    MissingProperty(String),

    #[error("invalid property `{key}`: {reason}")]
    InvalidProperty { key: String, reason: String },

    #[error("payload hash mismatch: archive says {recorded}, recomputed {computed}")]
    PayloadHashMismatch { recorded: String, computed: String },

    #[error("merkle root mismatch: archive says {recorded}, recomputed {computed}")]
    MerkleRootMismatch { recorded: String, computed: String },

    #[error("element count mismatch: archive says {recorded}, found {found} log lines")]
    ElementCountMismatch { recorded: u64, found: u64 },

    #[error("custody chain mismatch against previous archive")]
    ChainMismatch,

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type ArchiveResult<T> = std::result::Result<T, ArchiveError>;
