use serde::{Deserialize, Serialize};

/// One object in a per-offer inventory listing.
///
/// Carries no operation semantics; used only for sorting and drift
/// comparison between offers. The total order is lexicographic on
/// `object_id` (derived `Ord` with `object_id` as the first field).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectEntry {
    pub object_id: String,
    pub size: u64,
}

impl ObjectEntry {
    pub fn new(object_id: impl Into<String>, size: u64) -> Self {
        Self {
            object_id: object_id.into(),
            size,
        }
    }
}
