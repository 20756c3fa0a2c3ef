use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::event::{DigestAlgorithm, EventType, Outcome};

/// One storage operation, as recorded in the storage log.
///
/// Entries are immutable once built: construction goes through
/// [`LogEntryBuilder`], which enforces the mandatory-field subset of the
/// entry's event type. There are no setters.
///
/// Serialization is deterministic (struct declaration order, absent optional
/// fields skipped), so the same entry always produces the same line and the
/// same leaf digest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub event_date_time: DateTime<Utc>,
    pub request_id: String,
    pub tenant_id: String,
    pub event_type: EventType,
    pub object_identifier: String,
    pub data_category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_group_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest_algorithm: Option<DigestAlgorithm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Offers holding a copy of the object, in replication order.
    pub agent_identifiers: Vec<String>,
    pub agent_identifier_requester: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archives_id: Option<String>,
}

impl LogEntry {
    /// Serialize to a single JSON line (no trailing newline).
    pub fn to_json_line(&self) -> Result<String, TypeError> {
        serde_json::to_string(self).map_err(|e| TypeError::Serialization(e.to_string()))
    }
}

/// Builder for [`LogEntry`] with table-driven mandatory-field validation.
///
/// Every event type requires the common field set; write-family events
/// (create/update) additionally require digest, digest algorithm, size, and
/// at least one agent identifier. `build` fails naming the first missing
/// field.
#[derive(Clone, Debug, Default)]
pub struct LogEntryBuilder {
    event_date_time: Option<DateTime<Utc>>,
    request_id: Option<String>,
    tenant_id: Option<String>,
    event_type: Option<EventType>,
    object_identifier: Option<String>,
    data_category: Option<String>,
    object_group_identifier: Option<String>,
    digest: Option<String>,
    digest_algorithm: Option<DigestAlgorithm>,
    size: Option<u64>,
    agent_identifiers: Vec<String>,
    agent_identifier_requester: Option<String>,
    outcome: Option<Outcome>,
    qualifier: Option<String>,
    version: Option<String>,
    context_id: Option<String>,
    contract_id: Option<String>,
    archives_id: Option<String>,
}

impl LogEntryBuilder {
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type: Some(event_type),
            ..Self::default()
        }
    }

    pub fn event_date_time(mut self, value: DateTime<Utc>) -> Self {
        self.event_date_time = Some(value);
        self
    }

    pub fn request_id(mut self, value: impl Into<String>) -> Self {
        self.request_id = Some(value.into());
        self
    }

    pub fn tenant_id(mut self, value: impl Into<String>) -> Self {
        self.tenant_id = Some(value.into());
        self
    }

    pub fn object_identifier(mut self, value: impl Into<String>) -> Self {
        self.object_identifier = Some(value.into());
        self
    }

    pub fn data_category(mut self, value: impl Into<String>) -> Self {
        self.data_category = Some(value.into());
        self
    }

    pub fn object_group_identifier(mut self, value: impl Into<String>) -> Self {
        self.object_group_identifier = Some(value.into());
        self
    }

    pub fn digest(mut self, value: impl Into<String>) -> Self {
        self.digest = Some(value.into());
        self
    }

    pub fn digest_algorithm(mut self, value: DigestAlgorithm) -> Self {
        self.digest_algorithm = Some(value);
        self
    }

    pub fn size(mut self, value: u64) -> Self {
        self.size = Some(value);
        self
    }

    pub fn agent_identifiers(mut self, value: Vec<String>) -> Self {
        self.agent_identifiers = value;
        self
    }

    pub fn agent_identifier_requester(mut self, value: impl Into<String>) -> Self {
        self.agent_identifier_requester = Some(value.into());
        self
    }

    pub fn outcome(mut self, value: Outcome) -> Self {
        self.outcome = Some(value);
        self
    }

    pub fn qualifier(mut self, value: impl Into<String>) -> Self {
        self.qualifier = Some(value.into());
        self
    }

    pub fn version(mut self, value: impl Into<String>) -> Self {
        self.version = Some(value.into());
        self
    }

    pub fn context_id(mut self, value: impl Into<String>) -> Self {
        self.context_id = Some(value.into());
        self
    }

    pub fn contract_id(mut self, value: impl Into<String>) -> Self {
        self.contract_id = Some(value.into());
        self
    }

    pub fn archives_id(mut self, value: impl Into<String>) -> Self {
        self.archives_id = Some(value.into());
        self
    }

    /// Validate the mandatory-field table and produce an immutable entry.
    pub fn build(self) -> Result<LogEntry, TypeError> {
        let event_type = self.event_type.ok_or_else(|| TypeError::MissingMandatoryField {
            field: "eventType".into(),
            event_type: "<unset>".into(),
        })?;

        // Per-family mandatory-field table. An empty string counts as missing.
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        let mut table: Vec<(&str, bool)> = vec![
            ("eventDateTime", self.event_date_time.is_some()),
            ("requestId", present(&self.request_id)),
            ("tenantId", present(&self.tenant_id)),
            ("objectIdentifier", present(&self.object_identifier)),
            ("dataCategory", present(&self.data_category)),
            (
                "agentIdentifierRequester",
                present(&self.agent_identifier_requester),
            ),
            ("outcome", self.outcome.is_some()),
        ];
        if event_type.is_write_family() {
            table.extend([
                ("digest", present(&self.digest)),
                ("digestAlgorithm", self.digest_algorithm.is_some()),
                ("size", self.size.is_some()),
                ("agentIdentifiers", !self.agent_identifiers.is_empty()),
            ]);
        }

        for (field, ok) in table {
            if !ok {
                return Err(TypeError::MissingMandatoryField {
                    field: field.to_string(),
                    event_type: event_type.to_string(),
                });
            }
        }

        Ok(LogEntry {
            event_date_time: self.event_date_time.expect("validated above"),
            request_id: self.request_id.expect("validated above"),
            tenant_id: self.tenant_id.expect("validated above"),
            event_type,
            object_identifier: self.object_identifier.expect("validated above"),
            data_category: self.data_category.expect("validated above"),
            object_group_identifier: self.object_group_identifier,
            digest: self.digest,
            digest_algorithm: self.digest_algorithm,
            size: self.size,
            agent_identifiers: self.agent_identifiers,
            agent_identifier_requester: self.agent_identifier_requester.expect("validated above"),
            outcome: self.outcome.expect("validated above"),
            qualifier: self.qualifier,
            version: self.version,
            context_id: self.context_id,
            contract_id: self.contract_id,
            archives_id: self.archives_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn base_builder(event_type: EventType) -> LogEntryBuilder {
        LogEntryBuilder::new(event_type)
            .event_date_time(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
            .request_id("req-1")
            .tenant_id("0")
            .object_identifier("obj-1")
            .data_category("OBJECT")
            .agent_identifier_requester("ingest-svc")
            .outcome(Outcome::Ok)
    }

    fn write_builder() -> LogEntryBuilder {
        base_builder(EventType::Create)
            .digest("abc123")
            .digest_algorithm(DigestAlgorithm::Sha512)
            .size(42)
            .agent_identifiers(vec!["offer-1".into(), "offer-2".into()])
    }

    #[test]
    fn create_with_all_fields_builds() {
        let entry = write_builder().build().unwrap();
        assert_eq!(entry.event_type, EventType::Create);
        assert_eq!(entry.size, Some(42));
        assert_eq!(entry.agent_identifiers.len(), 2);
    }

    #[test]
    fn create_without_digest_rejected() {
        let err = base_builder(EventType::Create)
            .digest_algorithm(DigestAlgorithm::Sha512)
            .size(42)
            .agent_identifiers(vec!["offer-1".into()])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            TypeError::MissingMandatoryField {
                field: "digest".into(),
                event_type: "CREATE".into(),
            }
        );
    }

    #[test]
    fn create_with_empty_digest_rejected() {
        let err = write_builder().digest("").build().unwrap_err();
        assert!(matches!(
            err,
            TypeError::MissingMandatoryField { field, .. } if field == "digest"
        ));
    }

    #[test]
    fn create_without_agents_rejected() {
        let err = write_builder()
            .agent_identifiers(vec![])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            TypeError::MissingMandatoryField { field, .. } if field == "agentIdentifiers"
        ));
    }

    #[test]
    fn delete_does_not_require_digest() {
        let entry = base_builder(EventType::Delete).build().unwrap();
        assert_eq!(entry.event_type, EventType::Delete);
        assert!(entry.digest.is_none());
    }

    #[test]
    fn delete_still_requires_request_id() {
        let err = LogEntryBuilder::new(EventType::Delete)
            .event_date_time(Utc::now())
            .tenant_id("0")
            .object_identifier("obj-1")
            .data_category("OBJECT")
            .agent_identifier_requester("svc")
            .outcome(Outcome::Ok)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            TypeError::MissingMandatoryField { field, .. } if field == "requestId"
        ));
    }

    #[test]
    fn serialization_is_deterministic() {
        let entry = write_builder().build().unwrap();
        let line1 = entry.to_json_line().unwrap();
        let line2 = entry.to_json_line().unwrap();
        assert_eq!(line1, line2);
    }

    #[test]
    fn json_line_roundtrip() {
        let entry = write_builder()
            .object_group_identifier("og-1")
            .qualifier("BinaryMaster")
            .build()
            .unwrap();
        let line = entry.to_json_line().unwrap();
        let parsed: LogEntry = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn wire_format_uses_camel_case() {
        let entry = write_builder().build().unwrap();
        let line = entry.to_json_line().unwrap();
        assert!(line.contains("\"eventDateTime\""));
        assert!(line.contains("\"agentIdentifierRequester\""));
        assert!(!line.contains("event_date_time"));
    }

    #[test]
    fn absent_optionals_are_skipped() {
        let entry = base_builder(EventType::Delete).build().unwrap();
        let line = entry.to_json_line().unwrap();
        assert!(!line.contains("objectGroupIdentifier"));
        assert!(!line.contains("\"digest\""));
    }
}
