use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use arkiv_archive::ArchiveDraft;
use arkiv_crypto::{timestamp_request_payload, token_reference, Digester};
use arkiv_stream::{sort_large_file, RecordReader, RecordWriter};

use crate::config::TraceabilityConfig;
use crate::error::Result;
use crate::logbook::{AuditRecord, RunOutcome, RunState};
use crate::period::{PeriodCursor, TraceabilityPeriod};
use crate::traits::{
    AuditLogbook, CursorStore, ObjectStore, OfferLogSource, SequencedEntry, TimestampAuthority,
};

/// What one run did.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub run_id: String,
    pub strategy_id: String,
    pub outcome: RunOutcome,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: DateTime<Utc>,
    pub number_of_elements: u64,
    pub period: Option<TraceabilityPeriod>,
    pub archive_name: Option<String>,
}

/// Orchestrates one secure period per invocation:
/// `IDLE → COLLECTING → HASHING → TIMESTAMPING → PACKAGING → DONE`.
///
/// The persisted per-strategy cursor is the only shared mutable state; it is
/// advanced in one step after the archive has been durably stored. A failed
/// run leaves the cursor untouched, so the same window is retried on the
/// next schedule. Runs for distinct strategies are independent.
pub struct TraceabilityAdministration {
    source: Arc<dyn OfferLogSource>,
    authority: Arc<dyn TimestampAuthority>,
    store: Arc<dyn ObjectStore>,
    logbook: Arc<dyn AuditLogbook>,
    cursors: Arc<dyn CursorStore>,
    config: TraceabilityConfig,
}

impl TraceabilityAdministration {
    pub fn new(
        source: Arc<dyn OfferLogSource>,
        authority: Arc<dyn TimestampAuthority>,
        store: Arc<dyn ObjectStore>,
        logbook: Arc<dyn AuditLogbook>,
        cursors: Arc<dyn CursorStore>,
        config: TraceabilityConfig,
    ) -> Self {
        Self {
            source,
            authority,
            store,
            logbook,
            cursors,
            config,
        }
    }

    /// Attempt to secure the next period of `strategy_id`.
    ///
    /// The audit logbook record is closed on every path, including FATAL
    /// ones; only full success (or the explicit empty-window WARNING)
    /// advances the cursor.
    pub fn secure_period(&self, strategy_id: &str) -> Result<RunReport> {
        let run_id = Uuid::now_v7().to_string();
        let mut record = AuditRecord::open(&run_id, strategy_id);
        self.logbook.create(&record)?;
        info!(run_id, strategy_id, "traceability run started");

        match self.run_inner(strategy_id, &run_id, &mut record) {
            Ok(report) => {
                record.outcome = Some(report.outcome);
                record.state_reached = RunState::Done;
                self.logbook.update(&record)?;
                info!(
                    run_id,
                    strategy_id,
                    outcome = ?report.outcome,
                    elements = report.number_of_elements,
                    "traceability run finished"
                );
                Ok(report)
            }
            Err(e) => {
                record.outcome = Some(RunOutcome::Ko);
                record.message = Some(e.to_string());
                // The run error is what the caller must see; a logbook
                // failure on top of it is only logged.
                if let Err(logbook_err) = self.logbook.update(&record) {
                    warn!(run_id, error = %logbook_err, "failed to close audit record");
                }
                warn!(run_id, strategy_id, error = %e, "traceability run failed");
                Err(e)
            }
        }
    }

    fn run_inner(
        &self,
        strategy_id: &str,
        run_id: &str,
        record: &mut AuditRecord,
    ) -> Result<RunReport> {
        // Determine the window. start is the previous period's end (None is
        // the beginning-of-time sentinel); end deliberately lags `now` so
        // entries appended concurrently with this run fall into the next
        // period instead of racing into this one.
        let cursor = self.cursors.load(strategy_id)?;
        let start = cursor.as_ref().map(|c| c.end_date);
        let previous_token = cursor.map(|c| c.token);
        let end = Utc::now() - self.config.overlap_delay;

        if start.map_or(false, |s| end <= s) {
            debug!(run_id, "window not yet open; nothing to do");
            record.message = Some("window not yet open".into());
            return Ok(RunReport {
                run_id: run_id.to_string(),
                strategy_id: strategy_id.to_string(),
                outcome: RunOutcome::Warning,
                start_date: start,
                end_date: end,
                number_of_elements: 0,
                period: None,
                archive_name: None,
            });
        }

        record.state_reached = RunState::Collecting;
        let mut entries = self.source.entries_since(strategy_id, start)?;
        entries.retain(|e| e.entry.event_date_time <= end);
        debug!(run_id, count = entries.len(), "collected window entries");
        let lines = self.collect_lines(entries)?;

        record.state_reached = RunState::Hashing;
        let digester = Digester::new(self.config.digest_algorithm);
        let draft = ArchiveDraft::from_lines(&digester, &lines);
        let number_of_elements = draft.element_count();

        let (token, outcome) = if lines.is_empty() {
            // Nothing to secure: carry the previous token forward unchanged
            // and report WARNING. The chain is not advanced, only restated.
            (previous_token.clone().unwrap_or_default(), RunOutcome::Warning)
        } else {
            record.state_reached = RunState::Timestamping;
            let payload = timestamp_request_payload(draft.current_hash(), previous_token.as_deref());
            let token = self
                .authority
                .generate_token(&payload, self.config.digest_algorithm)?;
            (token, RunOutcome::Ok)
        };

        record.state_reached = RunState::Packaging;
        let previous_reference = previous_token
            .as_deref()
            .map(|t| token_reference(&digester, t));
        let period = TraceabilityPeriod {
            strategy_id: strategy_id.to_string(),
            start_date: start,
            end_date: end,
            number_of_elements,
            merkle_root: draft.merkle_root().to_string(),
            current_hash: draft.current_hash().to_string(),
            previous_timestamp_token: previous_reference.clone(),
            timestamp_token: token.clone(),
        };

        let archive = draft.into_archive(token, previous_reference.clone());
        let bytes = archive.to_bytes()?;
        let address = archive.content_address()?;
        let name = format!("{strategy_id}_{}.arkv", &address[..32]);
        self.store
            .store(strategy_id, &self.config.archive_category, &name, &bytes)?;
        debug!(run_id, name, size = bytes.len(), "archive stored");

        // Single atomic commit step: the cursor moves only now that the
        // archive is durable.
        self.cursors.advance(
            strategy_id,
            &PeriodCursor {
                end_date: end,
                token: archive.token.clone(),
            },
        )?;

        record.number_of_elements = number_of_elements;
        record.token_digest = Some(digester.hash_hex(&archive.token));
        record.previous_token_reference = previous_reference;
        record.archive_name = Some(name.clone());

        Ok(RunReport {
            run_id: run_id.to_string(),
            strategy_id: strategy_id.to_string(),
            outcome,
            start_date: start,
            end_date: end,
            number_of_elements,
            period: Some(period),
            archive_name: Some(name),
        })
    }

    /// Order collected entries by append sequence and render their lines.
    ///
    /// Small windows sort in memory. Beyond `spill_threshold` the entries
    /// spill to disk and go through the external sorter, keeping the memory
    /// bound independent of window size.
    fn collect_lines(&self, mut entries: Vec<SequencedEntry>) -> Result<Vec<String>> {
        if entries.len() <= self.config.spill_threshold {
            entries.sort_by_key(|e| e.sequence);
            return entries
                .iter()
                .map(|e| e.entry.to_json_line().map_err(Into::into))
                .collect();
        }

        let dir = tempfile::tempdir()?;
        let collected = dir.path().join("collected.jsonl");
        let ordered = dir.path().join("ordered.jsonl");

        let mut writer = RecordWriter::create(&collected)?;
        for entry in &entries {
            writer.write(entry)?;
        }
        writer.close()?;
        entries.clear();

        let report = sort_large_file::<SequencedEntry, _>(
            &collected,
            &ordered,
            &self.config.sort,
            |a, b| a.sequence.cmp(&b.sequence),
        )?;
        debug!(records = report.records, runs = report.runs_created, "window spilled and ordered");

        let mut lines = Vec::new();
        for record in RecordReader::<SequencedEntry>::open(&ordered)? {
            lines.push(record?.entry.to_json_line()?);
        }
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use arkiv_archive::SecureArchive;
    use arkiv_stream::SortConfig;
    use arkiv_types::{EventType, LogEntryBuilder, Outcome};
    use chrono::Duration;

    use crate::error::TraceabilityError;
    use crate::memory::{
        FailingTimestampAuthority, InMemoryAuditLogbook, InMemoryCursorStore,
        InMemoryObjectStore, InMemoryOfferLog, InMemoryTimestampAuthority,
    };

    use super::*;

    struct Fixture {
        offer_log: Arc<InMemoryOfferLog>,
        store: Arc<InMemoryObjectStore>,
        logbook: Arc<InMemoryAuditLogbook>,
        cursors: Arc<InMemoryCursorStore>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                offer_log: Arc::new(InMemoryOfferLog::default()),
                store: Arc::new(InMemoryObjectStore::default()),
                logbook: Arc::new(InMemoryAuditLogbook::default()),
                cursors: Arc::new(InMemoryCursorStore::default()),
            }
        }

        fn admin(&self, config: TraceabilityConfig) -> TraceabilityAdministration {
            TraceabilityAdministration::new(
                self.offer_log.clone(),
                Arc::new(InMemoryTimestampAuthority),
                self.store.clone(),
                self.logbook.clone(),
                self.cursors.clone(),
                config,
            )
        }

        fn failing_admin(&self, config: TraceabilityConfig) -> TraceabilityAdministration {
            TraceabilityAdministration::new(
                self.offer_log.clone(),
                Arc::new(FailingTimestampAuthority),
                self.store.clone(),
                self.logbook.clone(),
                self.cursors.clone(),
                config,
            )
        }

        fn append(&self, n: usize) {
            for i in 0..n {
                let entry = LogEntryBuilder::new(EventType::Create)
                    .event_date_time(Utc::now())
                    .request_id(format!("req-{i}"))
                    .tenant_id("0")
                    .object_identifier(format!("obj-{i}"))
                    .data_category("OBJECT")
                    .digest(format!("digest-{i}"))
                    .digest_algorithm(arkiv_types::DigestAlgorithm::Sha512)
                    .size(100 + i as u64)
                    .agent_identifiers(vec!["offer-1".into(), "offer-2".into()])
                    .agent_identifier_requester("ingest")
                    .outcome(Outcome::Ok)
                    .build()
                    .unwrap();
                self.offer_log.append("default", entry);
            }
        }

        fn stored_archive(&self, report: &RunReport) -> SecureArchive {
            let name = report.archive_name.as_ref().expect("archive name");
            let bytes = self.store.get("default", "traceability", name).unwrap();
            SecureArchive::from_bytes(&bytes).unwrap()
        }
    }

    fn instant_config() -> TraceabilityConfig {
        TraceabilityConfig {
            overlap_delay: Duration::zero(),
            ..TraceabilityConfig::default()
        }
    }

    #[test]
    fn first_run_secures_the_window() {
        let fx = Fixture::new();
        fx.append(3);
        let admin = fx.admin(instant_config());

        let report = admin.secure_period("default").unwrap();
        assert_eq!(report.outcome, RunOutcome::Ok);
        assert_eq!(report.number_of_elements, 3);
        assert!(report.start_date.is_none());

        let archive = fx.stored_archive(&report);
        assert_eq!(archive.lines().len(), 3);
        assert!(archive.verify(&Digester::default()).is_ok());
        assert!(archive.computing.previous_timestamp_token.is_none());

        let cursor = fx.cursors.load("default").unwrap().expect("cursor advanced");
        assert_eq!(cursor.end_date, report.end_date);
        assert_eq!(cursor.token, archive.token);

        let records = fx.logbook.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].outcome, Some(RunOutcome::Ok));
        assert_eq!(records[0].state_reached, RunState::Done);
        assert_eq!(records[0].number_of_elements, 3);
    }

    #[test]
    fn consecutive_periods_chain() {
        let fx = Fixture::new();
        let admin = fx.admin(instant_config());

        fx.append(2);
        let first = admin.secure_period("default").unwrap();
        fx.append(3);
        let second = admin.secure_period("default").unwrap();

        assert_eq!(second.outcome, RunOutcome::Ok);
        assert_eq!(second.number_of_elements, 3);
        assert_eq!(second.start_date, Some(first.end_date));

        let a1 = fx.stored_archive(&first);
        let a2 = fx.stored_archive(&second);
        assert!(a2.verify_chained(&Digester::default(), &a1).is_ok());
        assert_eq!(
            a2.computing.previous_timestamp_token.as_deref(),
            Some(token_reference(&Digester::default(), &a1.token).as_str())
        );
    }

    #[test]
    fn zero_element_window_is_a_warning() {
        let fx = Fixture::new();
        let admin = fx.admin(instant_config());

        let report = admin.secure_period("default").unwrap();
        assert_eq!(report.outcome, RunOutcome::Warning);
        assert_eq!(report.number_of_elements, 0);

        // An empty archive is still published and verifiable.
        let archive = fx.stored_archive(&report);
        assert!(archive.data.is_empty());
        assert!(archive.verify(&Digester::default()).is_ok());

        // Cursor advances past the (empty) attempted window.
        let cursor = fx.cursors.load("default").unwrap().expect("cursor advanced");
        assert_eq!(cursor.end_date, report.end_date);

        let records = fx.logbook.records();
        assert_eq!(records[0].outcome, Some(RunOutcome::Warning));
    }

    #[test]
    fn empty_window_carries_token_forward() {
        let fx = Fixture::new();
        let admin = fx.admin(instant_config());

        fx.append(2);
        let first = admin.secure_period("default").unwrap();
        let token_after_first = fx.cursors.load("default").unwrap().unwrap().token;

        let second = admin.secure_period("default").unwrap();
        assert_eq!(second.outcome, RunOutcome::Warning);
        let token_after_second = fx.cursors.load("default").unwrap().unwrap().token;
        assert_eq!(token_after_first, token_after_second);
        let _ = first;
    }

    #[test]
    fn authority_failure_is_fatal_and_leaves_no_trace_state() {
        let fx = Fixture::new();
        fx.append(2);
        let admin = fx.failing_admin(instant_config());

        let err = admin.secure_period("default").unwrap_err();
        assert!(matches!(err, TraceabilityError::TimestampAuthority(_)));

        // No archive, no cursor movement; logbook still closed as KO.
        assert!(fx.store.is_empty());
        assert!(fx.cursors.load("default").unwrap().is_none());
        let records = fx.logbook.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].outcome, Some(RunOutcome::Ko));

        // The same window succeeds on the next scheduled run.
        let admin = fx.admin(instant_config());
        let report = admin.secure_period("default").unwrap();
        assert_eq!(report.outcome, RunOutcome::Ok);
        assert_eq!(report.number_of_elements, 2);
    }

    #[test]
    fn overlap_delay_excludes_concurrent_entries() {
        let fx = Fixture::new();
        fx.append(2);
        let delayed = fx.admin(TraceabilityConfig {
            overlap_delay: Duration::hours(1),
            ..TraceabilityConfig::default()
        });

        // Entries written "now" sit after the lagged window end.
        let report = delayed.secure_period("default").unwrap();
        assert_eq!(report.outcome, RunOutcome::Warning);
        assert_eq!(report.number_of_elements, 0);

        // The next run with a caught-up window picks them up instead.
        let admin = fx.admin(instant_config());
        let report = admin.secure_period("default").unwrap();
        assert_eq!(report.outcome, RunOutcome::Ok);
        assert_eq!(report.number_of_elements, 2);
    }

    #[test]
    fn unopened_window_does_not_move_the_cursor() {
        let fx = Fixture::new();
        fx.append(1);
        let admin = fx.admin(instant_config());
        let first = admin.secure_period("default").unwrap();

        // A lagged follow-up run computes end < cursor: nothing to do.
        let delayed = fx.admin(TraceabilityConfig {
            overlap_delay: Duration::hours(1),
            ..TraceabilityConfig::default()
        });
        let report = delayed.secure_period("default").unwrap();
        assert_eq!(report.outcome, RunOutcome::Warning);
        assert!(report.period.is_none());
        assert!(report.archive_name.is_none());

        let cursor = fx.cursors.load("default").unwrap().unwrap();
        assert_eq!(cursor.end_date, first.end_date);
    }

    #[test]
    fn spill_path_produces_the_same_archive_order() {
        let in_memory = Fixture::new();
        let spilling = Fixture::new();
        in_memory.append(50);
        // Mirror the same entries into the second fixture.
        for e in in_memory.offer_log.entries_since("default", None).unwrap() {
            spilling.offer_log.append("default", e.entry);
        }

        let plain = in_memory.admin(instant_config()).secure_period("default").unwrap();
        let spilled = spilling
            .admin(TraceabilityConfig {
                overlap_delay: Duration::zero(),
                spill_threshold: 10,
                sort: SortConfig {
                    chunk_size: 8,
                    merge_fan_in: 3,
                },
                ..TraceabilityConfig::default()
            })
            .secure_period("default")
            .unwrap();

        assert_eq!(spilled.outcome, RunOutcome::Ok);
        assert_eq!(spilled.number_of_elements, 50);
        let a = in_memory.stored_archive(&plain);
        let b = spilling.stored_archive(&spilled);
        assert_eq!(a.data, b.data);
        assert_eq!(a.merkle_tree, b.merkle_tree);
    }

    #[test]
    fn strategies_are_independent() {
        let fx = Fixture::new();
        fx.append(2);
        let admin = fx.admin(instant_config());

        let default_run = admin.secure_period("default").unwrap();
        let other_run = admin.secure_period("other").unwrap();

        assert_eq!(default_run.outcome, RunOutcome::Ok);
        assert_eq!(other_run.outcome, RunOutcome::Warning);
        assert!(fx.cursors.load("other").unwrap().is_some());
        assert_ne!(
            fx.cursors.load("default").unwrap().unwrap().token,
            fx.cursors.load("other").unwrap().unwrap().token
        );
    }
}
