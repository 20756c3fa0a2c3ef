//! Cryptographic primitives for the Arkiv storage integrity layer.
//!
//! Provides algorithm-parameterized content digests (SHA-512 by default),
//! binary Merkle trees with inclusion proofs, and timestamp-token custody
//! chaining.
//!
//! All crypto operations wrap established libraries; no custom cryptography.

pub mod chain;
pub mod digest;
pub mod merkle;

pub use chain::{
    timestamp_request_payload, token_reference, ChainError, ChainedPeriod, CustodyChainVerifier,
    GENESIS_TOKEN,
};
pub use digest::Digester;
pub use merkle::{MerkleProof, MerkleTree, Side};
