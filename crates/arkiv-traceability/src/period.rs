use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use arkiv_crypto::ChainedPeriod;

/// One secured snapshot window of the storage log.
///
/// Created transiently by a single administration run and persisted only as
/// archive metadata plus the audit logbook pointer. Never updated after
/// creation: a correction is a new period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceabilityPeriod {
    pub strategy_id: String,
    /// Exclusive lower bound; `None` is the beginning-of-time sentinel for
    /// the first period of a strategy.
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound, `now - overlap_delay` at run time.
    pub end_date: DateTime<Utc>,
    pub number_of_elements: u64,
    /// Merkle root over the window's log-line digests (hex; empty when the
    /// window held nothing).
    pub merkle_root: String,
    /// Digest of the archive payload (hex).
    pub current_hash: String,
    /// Base64 digest of the previous period's token; absent for the first
    /// period.
    pub previous_timestamp_token: Option<String>,
    /// Opaque token from the timestamp authority.
    #[serde(with = "token_bytes")]
    pub timestamp_token: Vec<u8>,
}

impl ChainedPeriod for TraceabilityPeriod {
    fn current_hash(&self) -> &str {
        &self.current_hash
    }

    fn previous_token_reference(&self) -> Option<&str> {
        self.previous_timestamp_token.as_deref()
    }

    fn token(&self) -> &[u8] {
        &self.timestamp_token
    }
}

/// Tokens are opaque bytes; render them as hex in JSON.
mod token_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}

/// The persisted per-strategy chaining state: where the last successful
/// period ended and which token it produced.
///
/// This is the only mutable shared state in the subsystem. It is advanced
/// in one atomic step after a fully successful run, which makes it the sole
/// coordination point between scheduled runs of the same strategy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodCursor {
    pub end_date: DateTime<Utc>,
    #[serde(with = "token_bytes")]
    pub token: Vec<u8>,
}
