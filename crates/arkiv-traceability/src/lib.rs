//! Traceability administration: turns windows of the append-only storage
//! log into timestamped, chained, content-addressed secure archives.
//!
//! One [`run::TraceabilityAdministration::secure_period`] call secures one
//! window per strategy. The collaborating systems (offer logs, timestamp
//! authority, object store, audit logbook, cursor persistence) sit behind
//! traits; [`memory`] carries in-memory implementations for tests and
//! embedding.

pub mod config;
pub mod error;
pub mod logbook;
pub mod memory;
pub mod period;
pub mod run;
pub mod traits;

pub use config::TraceabilityConfig;
pub use error::{Result, TraceabilityError};
pub use logbook::{AuditRecord, RunOutcome, RunState};
pub use period::{PeriodCursor, TraceabilityPeriod};
pub use run::{RunReport, TraceabilityAdministration};
pub use traits::{
    AuditLogbook, CursorStore, ObjectStore, OfferLogSource, SequencedEntry, TimestampAuthority,
};
