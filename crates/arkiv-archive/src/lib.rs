//! Secure archive packaging for the Arkiv storage integrity layer.
//!
//! One traceability period produces one [`SecureArchive`]: a fixed-layout
//! container holding exactly five entries in a contractual order
//! (`data.txt`, `merkleTree.json`, `token.tsp`, `computing_information.txt`,
//! `additional_information.txt`). The container is write-once and
//! content-addressed by its trailing digest.
//!
//! Verifiers re-hash `data.txt` to confirm `currentHash`, re-derive the
//! Merkle root, and chain `previousTimestampToken` back to the prior
//! archive.

pub mod archive;
pub mod container;
pub mod error;
pub mod properties;

pub use archive::{ArchiveDraft, SecureArchive};
pub use container::ENTRY_NAMES;
pub use error::{ArchiveError, ArchiveResult};
pub use properties::{AdditionalInformation, ComputingInformation};
