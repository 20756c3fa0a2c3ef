use chrono::Duration;

use arkiv_stream::SortConfig;
use arkiv_types::DigestAlgorithm;

/// Configuration for traceability runs.
#[derive(Clone, Debug)]
pub struct TraceabilityConfig {
    /// The window's upper bound is `now - overlap_delay`. Entries written
    /// concurrently with the run land after the bound and are picked up by
    /// the next period instead of racing into this one.
    pub overlap_delay: Duration,
    /// Digest algorithm for leaf hashes, the payload hash, and token
    /// references.
    pub digest_algorithm: DigestAlgorithm,
    /// Entry count above which collection spills to disk and goes through
    /// the external sorter.
    pub spill_threshold: usize,
    /// External sorter bounds for the spill path.
    pub sort: SortConfig,
    /// Object-store category under which archives are filed.
    pub archive_category: String,
}

impl Default for TraceabilityConfig {
    fn default() -> Self {
        Self {
            overlap_delay: Duration::seconds(300),
            digest_algorithm: DigestAlgorithm::Sha512,
            spill_threshold: 100_000,
            sort: SortConfig::default(),
            archive_category: "traceability".into(),
        }
    }
}
