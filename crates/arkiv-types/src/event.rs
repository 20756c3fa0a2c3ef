use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Kind of storage operation recorded by a log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Create,
    Delete,
    Access,
    Update,
}

impl EventType {
    /// Event types that describe writing object content into the store.
    ///
    /// Write-family events must carry digest, digest algorithm, size, and the
    /// list of offers holding a copy. Delete and access events do not: the
    /// object's bytes are not part of the operation.
    pub fn is_write_family(self) -> bool {
        matches!(self, Self::Create | Self::Update)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "CREATE",
            Self::Delete => "DELETE",
            Self::Access => "ACCESS",
            Self::Update => "UPDATE",
        };
        write!(f, "{s}")
    }
}

/// Result of the storage operation as seen by the offer backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Ok,
    Ko,
    Pending,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ok => "OK",
            Self::Ko => "KO",
            Self::Pending => "PENDING",
        };
        write!(f, "{s}")
    }
}

/// Digest algorithm used for content addressing and leaf hashing.
///
/// SHA-512 is the default for archive material; BLAKE3 is available where
/// interoperability with external verifiers is not required.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    #[serde(rename = "SHA-256")]
    Sha256,
    #[default]
    #[serde(rename = "SHA-512")]
    Sha512,
    #[serde(rename = "BLAKE3")]
    Blake3,
}

impl DigestAlgorithm {
    /// Digest output length in bytes.
    pub fn digest_len(self) -> usize {
        match self {
            Self::Sha256 | Self::Blake3 => 32,
            Self::Sha512 => 64,
        }
    }

    /// Canonical wire name, as written in log entries and archive metadata.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "SHA-256",
            Self::Sha512 => "SHA-512",
            Self::Blake3 => "BLAKE3",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SHA-256" => Ok(Self::Sha256),
            "SHA-512" => Ok(Self::Sha512),
            "BLAKE3" => Ok(Self::Blake3),
            other => Err(TypeError::UnknownDigestAlgorithm(other.to_string())),
        }
    }
}
