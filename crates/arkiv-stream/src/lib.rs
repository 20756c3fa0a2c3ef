//! Record streams and external sorting for the Arkiv storage integrity layer.
//!
//! Two pieces live here:
//!
//! - [`RecordWriter`] / [`RecordReader`]: the line-delimited, sentinel-terminated
//!   file format shared by every on-disk record stream. A stream ends at the
//!   `{}` sentinel line; physical EOF without it means the file was truncated.
//! - [`sort_large_file`]: bounded-memory external merge sort over such
//!   streams, used to prepare traceability input and to diff per-offer
//!   inventories.

pub mod error;
pub mod record;
pub mod sort;

pub use error::{Result, StreamError};
pub use record::{RecordReader, RecordWriter, EOF_SENTINEL};
pub use sort::{sort_large_file, SortConfig, SortReport};
