//! Offer inventory reconciliation.
//!
//! Sorts two per-offer `ObjectEntry` inventories through the external
//! sorter, then merge-compares the sorted streams into a [`DriftReport`].

pub mod drift;
pub mod error;
pub mod reconcile;

pub use drift::{Drift, DriftReport};
pub use error::{ReconcileError, Result};
pub use reconcile::{reconcile, ReconcileConfig};
