use sha2::{Digest, Sha256, Sha512};

use arkiv_types::DigestAlgorithm;

/// Content digester parameterized by algorithm.
///
/// All archive material is hashed through this type so the algorithm choice
/// lives in exactly one place. SHA-512 is the default for externally
/// verifiable material; BLAKE3 is available for internal use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Digester {
    algorithm: DigestAlgorithm,
}

impl Digester {
    pub const fn new(algorithm: DigestAlgorithm) -> Self {
        Self { algorithm }
    }

    /// The algorithm this digester applies.
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Hash raw bytes. Output length depends on the algorithm.
    pub fn hash(&self, data: &[u8]) -> Vec<u8> {
        match self.algorithm {
            DigestAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            DigestAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
            DigestAlgorithm::Blake3 => blake3::hash(data).as_bytes().to_vec(),
        }
    }

    /// Hash raw bytes and render as lowercase hex.
    pub fn hash_hex(&self, data: &[u8]) -> String {
        hex::encode(self.hash(data))
    }

    /// Verify that `data` hashes to `expected_hex`.
    pub fn verify_hex(&self, data: &[u8], expected_hex: &str) -> bool {
        self.hash_hex(data) == expected_hex
    }
}
