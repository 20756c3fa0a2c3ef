//! Foundation types for the Arkiv storage integrity layer.
//!
//! This crate provides the storage log model and the shared value types used
//! throughout the Arkiv workspace. Every other Arkiv crate depends on
//! `arkiv-types`.
//!
//! # Key Types
//!
//! - [`LogEntry`]: one storage operation, built through a mandatory-field
//!   validated [`LogEntryBuilder`]
//! - [`ObjectEntry`]: inventory unit for offer reconciliation
//! - [`EventType`] / [`Outcome`]: operation kind and result
//! - [`DigestAlgorithm`]: content-hash algorithm selection

pub mod entry;
pub mod error;
pub mod event;
pub mod object;

pub use entry::{LogEntry, LogEntryBuilder};
pub use error::TypeError;
pub use event::{DigestAlgorithm, EventType, Outcome};
pub use object::ObjectEntry;
