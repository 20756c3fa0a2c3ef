use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use arkiv_types::{DigestAlgorithm, LogEntry};

use crate::error::Result;
use crate::logbook::AuditRecord;
use crate::period::PeriodCursor;

/// One offer-log entry with its append-sequence number.
///
/// Collection orders by `sequence`, never by content: the archive must
/// replay the log in the order it was written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequencedEntry {
    pub sequence: u64,
    pub entry: LogEntry,
}

/// Read boundary over the per-offer storage logs of a strategy.
pub trait OfferLogSource: Send + Sync {
    /// All entries of the strategy's offers with event time strictly after
    /// `from` (None = beginning of time), in append-sequence order.
    fn entries_since(
        &self,
        strategy_id: &str,
        from: Option<DateTime<Utc>>,
    ) -> Result<Vec<SequencedEntry>>;
}

/// External timestamp authority, treated as an opaque signing oracle.
///
/// The single call is synchronous; implementations impose their own timeout
/// and surface expiry as an error. Authority failure is FATAL for a run.
pub trait TimestampAuthority: Send + Sync {
    fn generate_token(&self, payload: &[u8], algorithm: DigestAlgorithm) -> Result<Vec<u8>>;
}

/// Durable object store holding the secure archives.
pub trait ObjectStore: Send + Sync {
    fn store(&self, strategy_id: &str, category: &str, name: &str, bytes: &[u8]) -> Result<()>;

    fn get(&self, strategy_id: &str, category: &str, name: &str) -> Result<Vec<u8>>;
}

/// Operations logbook recording every run's outcome, including failures.
pub trait AuditLogbook: Send + Sync {
    /// Open a record when a run starts.
    fn create(&self, record: &AuditRecord) -> Result<()>;

    /// Close out the record with the run's final outcome.
    fn update(&self, record: &AuditRecord) -> Result<()>;
}

/// Persisted per-strategy period cursor.
///
/// `advance` is the single atomic commit step of a run; implementations
/// must apply it with at-most-one-writer semantics per strategy.
pub trait CursorStore: Send + Sync {
    fn load(&self, strategy_id: &str) -> Result<Option<PeriodCursor>>;

    fn advance(&self, strategy_id: &str, cursor: &PeriodCursor) -> Result<()>;
}
