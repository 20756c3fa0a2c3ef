use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Final outcome of one traceability run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunOutcome {
    /// Window secured and archived.
    Ok,
    /// Nothing to secure in the window. Not a failure.
    Warning,
    /// The run failed; the window will be retried.
    Ko,
}

/// States of the per-period run machine, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RunState {
    Idle,
    Collecting,
    Hashing,
    Timestamping,
    Packaging,
    Done,
}

/// One audit logbook record: opened when a run starts, closed with the
/// run's outcome on every path, including FATAL ones.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub run_id: String,
    pub strategy_id: String,
    pub started_at: DateTime<Utc>,
    pub outcome: Option<RunOutcome>,
    pub state_reached: RunState,
    pub number_of_elements: u64,
    /// Hex digest of the period's timestamp token.
    pub token_digest: Option<String>,
    /// Base64 digest reference to the previous period's token.
    pub previous_token_reference: Option<String>,
    /// Object-store name of the published archive.
    pub archive_name: Option<String>,
    pub message: Option<String>,
}

impl AuditRecord {
    /// An open (in-progress) record for a starting run.
    pub fn open(run_id: impl Into<String>, strategy_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            strategy_id: strategy_id.into(),
            started_at: Utc::now(),
            outcome: None,
            state_reached: RunState::Idle,
            number_of_elements: 0,
            token_digest: None,
            previous_token_reference: None,
            archive_name: None,
            message: None,
        }
    }
}
