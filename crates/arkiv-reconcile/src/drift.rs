//! Drift classification between two per-offer inventories.
//!
//! Inventories are compared after sorting by `object_id`; the merge-join
//! classifies each divergence and the report aggregates them.

use serde::Serialize;

use arkiv_types::ObjectEntry;

/// The result of comparing two sorted inventories.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftReport {
    /// Objects scanned on the left inventory.
    pub left_count: u64,
    /// Objects scanned on the right inventory.
    pub right_count: u64,
    /// Objects present on both sides with matching sizes.
    pub matched: u64,
    /// The list of divergences, in `object_id` order.
    pub drifts: Vec<Drift>,
}

impl DriftReport {
    /// Returns `true` if the two inventories agree completely.
    pub fn is_empty(&self) -> bool {
        self.drifts.is_empty()
    }

    /// Number of divergences.
    pub fn len(&self) -> usize {
        self.drifts.len()
    }

    /// Objects present only on the right side.
    pub fn missing_left(&self) -> usize {
        self.drifts
            .iter()
            .filter(|d| matches!(d, Drift::MissingLeft { .. }))
            .count()
    }

    /// Objects present only on the left side.
    pub fn missing_right(&self) -> usize {
        self.drifts
            .iter()
            .filter(|d| matches!(d, Drift::MissingRight { .. }))
            .count()
    }

    /// Objects present on both sides with diverging sizes.
    pub fn size_mismatches(&self) -> usize {
        self.drifts
            .iter()
            .filter(|d| matches!(d, Drift::SizeMismatch { .. }))
            .count()
    }
}

/// A single divergence between the two inventories.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Drift {
    /// The object exists only in the right inventory.
    MissingLeft { entry: ObjectEntry },
    /// The object exists only in the left inventory.
    MissingRight { entry: ObjectEntry },
    /// The object exists on both sides with different sizes.
    SizeMismatch {
        object_id: String,
        left_size: u64,
        right_size: u64,
    },
}

impl Drift {
    /// The identifier of the divergent object.
    pub fn object_id(&self) -> &str {
        match self {
            Drift::MissingLeft { entry } | Drift::MissingRight { entry } => &entry.object_id,
            Drift::SizeMismatch { object_id, .. } => object_id,
        }
    }
}
