//! In-memory collaborator implementations for tests, demos, and embedding.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use arkiv_crypto::Digester;
use arkiv_types::DigestAlgorithm;

use crate::error::{Result, TraceabilityError};
use crate::logbook::AuditRecord;
use crate::period::PeriodCursor;
use crate::traits::{
    AuditLogbook, CursorStore, ObjectStore, OfferLogSource, SequencedEntry, TimestampAuthority,
};

/// In-memory offer log: sequenced entries per strategy.
#[derive(Default)]
pub struct InMemoryOfferLog {
    inner: RwLock<HashMap<String, Vec<SequencedEntry>>>,
}

impl InMemoryOfferLog {
    /// Append an entry, assigning the next sequence number for the strategy.
    pub fn append(&self, strategy_id: &str, entry: arkiv_types::LogEntry) -> u64 {
        let mut inner = self.inner.write().expect("offer log lock poisoned");
        let stream = inner.entry(strategy_id.to_string()).or_default();
        let sequence = stream.len() as u64 + 1;
        stream.push(SequencedEntry { sequence, entry });
        sequence
    }
}

impl OfferLogSource for InMemoryOfferLog {
    fn entries_since(
        &self,
        strategy_id: &str,
        from: Option<DateTime<Utc>>,
    ) -> Result<Vec<SequencedEntry>> {
        let inner = self.inner.read().expect("offer log lock poisoned");
        let stream = inner.get(strategy_id).cloned().unwrap_or_default();
        Ok(stream
            .into_iter()
            .filter(|e| from.map_or(true, |f| e.entry.event_date_time > f))
            .collect())
    }
}

/// Deterministic in-memory timestamp authority: the token is a tagged digest
/// of the payload, so tests can predict and re-derive it.
#[derive(Default)]
pub struct InMemoryTimestampAuthority;

impl TimestampAuthority for InMemoryTimestampAuthority {
    fn generate_token(&self, payload: &[u8], algorithm: DigestAlgorithm) -> Result<Vec<u8>> {
        let digester = Digester::new(algorithm);
        let mut token = b"tsp-v1:".to_vec();
        token.extend_from_slice(digester.hash_hex(payload).as_bytes());
        Ok(token)
    }
}

/// Timestamp authority that always fails. For FATAL-path tests.
#[derive(Default)]
pub struct FailingTimestampAuthority;

impl TimestampAuthority for FailingTimestampAuthority {
    fn generate_token(&self, _payload: &[u8], _algorithm: DigestAlgorithm) -> Result<Vec<u8>> {
        Err(TraceabilityError::TimestampAuthority(
            "authority unreachable".into(),
        ))
    }
}

/// In-memory object store keyed by (strategy, category, name).
#[derive(Default)]
pub struct InMemoryObjectStore {
    inner: RwLock<HashMap<(String, String, String), Vec<u8>>>,
}

impl InMemoryObjectStore {
    pub fn names(&self, strategy_id: &str, category: &str) -> Vec<String> {
        let inner = self.inner.read().expect("object store lock poisoned");
        let mut names: Vec<String> = inner
            .keys()
            .filter(|(s, c, _)| s == strategy_id && c == category)
            .map(|(_, _, n)| n.clone())
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("object store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn store(&self, strategy_id: &str, category: &str, name: &str, bytes: &[u8]) -> Result<()> {
        let mut inner = self.inner.write().expect("object store lock poisoned");
        inner.insert(
            (strategy_id.to_string(), category.to_string(), name.to_string()),
            bytes.to_vec(),
        );
        Ok(())
    }

    fn get(&self, strategy_id: &str, category: &str, name: &str) -> Result<Vec<u8>> {
        let inner = self.inner.read().expect("object store lock poisoned");
        inner
            .get(&(strategy_id.to_string(), category.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| TraceabilityError::ObjectStore(format!("not found: {name}")))
    }
}

/// In-memory audit logbook: records keyed by run id, create-then-update.
#[derive(Default)]
pub struct InMemoryAuditLogbook {
    inner: RwLock<Vec<AuditRecord>>,
}

impl InMemoryAuditLogbook {
    pub fn records(&self) -> Vec<AuditRecord> {
        self.inner.read().expect("logbook lock poisoned").clone()
    }
}

impl AuditLogbook for InMemoryAuditLogbook {
    fn create(&self, record: &AuditRecord) -> Result<()> {
        let mut inner = self.inner.write().expect("logbook lock poisoned");
        inner.push(record.clone());
        Ok(())
    }

    fn update(&self, record: &AuditRecord) -> Result<()> {
        let mut inner = self.inner.write().expect("logbook lock poisoned");
        match inner.iter_mut().find(|r| r.run_id == record.run_id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(TraceabilityError::Logbook(format!(
                "no open record for run {}",
                record.run_id
            ))),
        }
    }
}

/// In-memory cursor store with per-strategy last-write-wins semantics.
#[derive(Default)]
pub struct InMemoryCursorStore {
    inner: RwLock<HashMap<String, PeriodCursor>>,
}

impl CursorStore for InMemoryCursorStore {
    fn load(&self, strategy_id: &str) -> Result<Option<PeriodCursor>> {
        let inner = self.inner.read().expect("cursor lock poisoned");
        Ok(inner.get(strategy_id).cloned())
    }

    fn advance(&self, strategy_id: &str, cursor: &PeriodCursor) -> Result<()> {
        let mut inner = self.inner.write().expect("cursor lock poisoned");
        inner.insert(strategy_id.to_string(), cursor.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use arkiv_types::{EventType, LogEntryBuilder, Outcome};
    use chrono::TimeZone;

    use super::*;

    fn entry(day: u32) -> arkiv_types::LogEntry {
        LogEntryBuilder::new(EventType::Delete)
            .event_date_time(Utc.with_ymd_and_hms(2024, 5, day, 0, 0, 0).unwrap())
            .request_id(format!("req-{day}"))
            .tenant_id("0")
            .object_identifier(format!("obj-{day}"))
            .data_category("OBJECT")
            .agent_identifier_requester("svc")
            .outcome(Outcome::Ok)
            .build()
            .unwrap()
    }

    #[test]
    fn offer_log_sequences_and_filters() {
        let log = InMemoryOfferLog::default();
        assert_eq!(log.append("default", entry(1)), 1);
        assert_eq!(log.append("default", entry(2)), 2);
        assert_eq!(log.append("default", entry(3)), 3);

        let all = log.entries_since("default", None).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].sequence, 1);

        let from = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let later = log.entries_since("default", Some(from)).unwrap();
        // Strictly-after bound: day 1 itself is excluded.
        assert_eq!(later.len(), 2);
    }

    #[test]
    fn authority_is_deterministic() {
        let authority = InMemoryTimestampAuthority;
        let t1 = authority.generate_token(b"payload", DigestAlgorithm::Sha512).unwrap();
        let t2 = authority.generate_token(b"payload", DigestAlgorithm::Sha512).unwrap();
        assert_eq!(t1, t2);
        assert!(t1.starts_with(b"tsp-v1:"));
    }

    #[test]
    fn object_store_roundtrip() {
        let store = InMemoryObjectStore::default();
        store.store("default", "traceability", "a.arkv", b"bytes").unwrap();
        assert_eq!(store.get("default", "traceability", "a.arkv").unwrap(), b"bytes");
        assert!(store.get("default", "traceability", "missing").is_err());
        assert_eq!(store.names("default", "traceability"), vec!["a.arkv"]);
    }

    #[test]
    fn logbook_update_requires_open_record() {
        let logbook = InMemoryAuditLogbook::default();
        let record = AuditRecord::open("run-1", "default");
        assert!(logbook.update(&record).is_err());
        logbook.create(&record).unwrap();
        assert!(logbook.update(&record).is_ok());
        assert_eq!(logbook.records().len(), 1);
    }

    #[test]
    fn cursor_store_roundtrip() {
        let cursors = InMemoryCursorStore::default();
        assert!(cursors.load("default").unwrap().is_none());
        let cursor = PeriodCursor {
            end_date: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            token: b"tok".to_vec(),
        };
        cursors.advance("default", &cursor).unwrap();
        assert_eq!(cursors.load("default").unwrap(), Some(cursor));
    }
}
