//! Sorted merge-compare of two per-offer inventories.
//!
//! Both inventories go through the external sorter first, so arbitrarily
//! large and arbitrarily ordered inputs reconcile under a fixed memory
//! bound. The comparison itself is a single streaming merge-join over the
//! two sorted files.

use std::cmp::Ordering;
use std::path::Path;

use tracing::debug;

use arkiv_stream::{sort_large_file, RecordReader, SortConfig};
use arkiv_types::ObjectEntry;

use crate::drift::{Drift, DriftReport};
use crate::error::Result;

/// Bounds for the sort phase of a reconciliation pass.
#[derive(Clone, Debug, Default)]
pub struct ReconcileConfig {
    pub sort: SortConfig,
}

/// Compare two inventory record streams and report every divergence.
///
/// Inputs need not be sorted. The report lists drifts in `object_id`
/// order; identical inventories produce an empty report.
pub fn reconcile(left: &Path, right: &Path, config: &ReconcileConfig) -> Result<DriftReport> {
    let arena = tempfile::Builder::new()
        .prefix(".arkiv-reconcile-")
        .tempdir()?;
    let left_sorted = arena.path().join("left.jsonl");
    let right_sorted = arena.path().join("right.jsonl");

    let left_report =
        sort_large_file::<ObjectEntry, _>(left, &left_sorted, &config.sort, ObjectEntry::cmp)?;
    let right_report =
        sort_large_file::<ObjectEntry, _>(right, &right_sorted, &config.sort, ObjectEntry::cmp)?;
    debug!(
        left = left_report.records,
        right = right_report.records,
        "inventories sorted"
    );

    let mut left_reader = RecordReader::<ObjectEntry>::open(&left_sorted)?;
    let mut right_reader = RecordReader::<ObjectEntry>::open(&right_sorted)?;

    let mut report = DriftReport::default();
    let mut left_head = left_reader.next().transpose()?;
    let mut right_head = right_reader.next().transpose()?;

    loop {
        match (left_head.take(), right_head.take()) {
            (None, None) => break,
            (Some(l), None) => {
                report.left_count += 1;
                report.drifts.push(Drift::MissingRight { entry: l });
                left_head = left_reader.next().transpose()?;
            }
            (None, Some(r)) => {
                report.right_count += 1;
                report.drifts.push(Drift::MissingLeft { entry: r });
                right_head = right_reader.next().transpose()?;
            }
            (Some(l), Some(r)) => match l.object_id.cmp(&r.object_id) {
                Ordering::Less => {
                    report.left_count += 1;
                    report.drifts.push(Drift::MissingRight { entry: l });
                    left_head = left_reader.next().transpose()?;
                    right_head = Some(r);
                }
                Ordering::Greater => {
                    report.right_count += 1;
                    report.drifts.push(Drift::MissingLeft { entry: r });
                    left_head = Some(l);
                    right_head = right_reader.next().transpose()?;
                }
                Ordering::Equal => {
                    report.left_count += 1;
                    report.right_count += 1;
                    if l.size == r.size {
                        report.matched += 1;
                    } else {
                        report.drifts.push(Drift::SizeMismatch {
                            object_id: l.object_id,
                            left_size: l.size,
                            right_size: r.size,
                        });
                    }
                    left_head = left_reader.next().transpose()?;
                    right_head = right_reader.next().transpose()?;
                }
            },
        }
    }

    debug!(
        matched = report.matched,
        drifts = report.drifts.len(),
        "reconciliation finished"
    );
    Ok(report)
}
