use arkiv_crypto::{token_reference, Digester, MerkleTree};

use crate::error::{ArchiveError, ArchiveResult};
use crate::properties::{AdditionalInformation, ComputingInformation};

/// Hashed-but-not-yet-timestamped archive material.
///
/// Produced from the period's log lines before the timestamp authority is
/// called: the authority signs over [`ArchiveDraft::current_hash`], so the
/// hash must exist before the token does.
#[derive(Clone, Debug)]
pub struct ArchiveDraft {
    data: Vec<u8>,
    merkle_tree: MerkleTree,
    current_hash: String,
}

impl ArchiveDraft {
    /// Hash the period's log lines: leaf digest per line, Merkle tree over
    /// the leaves, payload digest over the newline-joined lines.
    pub fn from_lines(digester: &Digester, lines: &[String]) -> Self {
        let data = lines.join("\n").into_bytes();
        let leaves = lines.iter().map(|l| digester.hash_hex(l.as_bytes())).collect();
        let merkle_tree = MerkleTree::from_leaves(digester.algorithm(), leaves);
        let current_hash = digester.hash_hex(&data);
        Self {
            data,
            merkle_tree,
            current_hash,
        }
    }

    /// Digest of the raw `data.txt` payload (hex).
    pub fn current_hash(&self) -> &str {
        &self.current_hash
    }

    /// Merkle root over the line digests (hex; empty for zero lines).
    pub fn merkle_root(&self) -> &str {
        self.merkle_tree.root()
    }

    /// Number of secured log lines.
    pub fn element_count(&self) -> u64 {
        self.merkle_tree.leaf_count() as u64
    }

    /// Attach the timestamp token and chain reference, completing the bundle.
    pub fn into_archive(
        self,
        token: Vec<u8>,
        previous_timestamp_token: Option<String>,
    ) -> SecureArchive {
        let number_of_element = self.element_count();
        SecureArchive {
            data: self.data,
            merkle_tree: self.merkle_tree,
            token,
            computing: ComputingInformation {
                current_hash: self.current_hash,
                previous_timestamp_token,
            },
            additional: AdditionalInformation { number_of_element },
        }
    }
}

/// The self-verifying bundle persisted for one traceability period.
///
/// Maps one-to-one onto the five container entries: `data.txt`,
/// `merkleTree.json`, `token.tsp`, `computing_information.txt`,
/// `additional_information.txt`. Write-once; content-addressed by the
/// container digest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecureArchive {
    /// Raw log lines, newline-joined (`data.txt`).
    pub data: Vec<u8>,
    /// Merkle tree over the line digests (`merkleTree.json`).
    pub merkle_tree: MerkleTree,
    /// Opaque timestamp-authority token (`token.tsp`).
    pub token: Vec<u8>,
    /// Payload hash and chain reference (`computing_information.txt`).
    pub computing: ComputingInformation,
    /// Element count (`additional_information.txt`).
    pub additional: AdditionalInformation,
}

impl SecureArchive {
    /// The log lines carried in `data.txt`.
    pub fn lines(&self) -> Vec<&str> {
        if self.data.is_empty() {
            return vec![];
        }
        std::str::from_utf8(&self.data)
            .map(|s| s.split('\n').collect())
            .unwrap_or_default()
    }

    /// Standalone verification: re-hash `data.txt` against `currentHash`,
    /// re-derive the Merkle root, and check the recorded element count.
    pub fn verify(&self, digester: &Digester) -> ArchiveResult<()> {
        let computed = digester.hash_hex(&self.data);
        if computed != self.computing.current_hash {
            return Err(ArchiveError::PayloadHashMismatch {
                recorded: self.computing.current_hash.clone(),
                computed,
            });
        }

        let lines = self.lines();
        let leaves: Vec<String> = lines
            .iter()
            .map(|l| digester.hash_hex(l.as_bytes()))
            .collect();
        let rebuilt = MerkleTree::from_leaves(digester.algorithm(), leaves);
        if rebuilt.root() != self.merkle_tree.root() {
            return Err(ArchiveError::MerkleRootMismatch {
                recorded: self.merkle_tree.root().to_string(),
                computed: rebuilt.root().to_string(),
            });
        }

        if self.additional.number_of_element != lines.len() as u64 {
            return Err(ArchiveError::ElementCountMismatch {
                recorded: self.additional.number_of_element,
                found: lines.len() as u64,
            });
        }

        Ok(())
    }

    /// Chained verification: standalone checks plus the custody link back to
    /// the previous period's archive.
    pub fn verify_chained(
        &self,
        digester: &Digester,
        previous: &SecureArchive,
    ) -> ArchiveResult<()> {
        self.verify(digester)?;
        let expected = token_reference(digester, &previous.token);
        if self.computing.previous_timestamp_token.as_deref() != Some(expected.as_str()) {
            return Err(ArchiveError::ChainMismatch);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use arkiv_types::DigestAlgorithm;

    use super::*;

    fn digester() -> Digester {
        Digester::new(DigestAlgorithm::Sha512)
    }

    fn lines(n: usize) -> Vec<String> {
        (0..n)
            .map(|i| format!("{{\"objectIdentifier\":\"obj{i}\"}}"))
            .collect()
    }

    fn archive(n: usize, previous: Option<&SecureArchive>) -> SecureArchive {
        let d = digester();
        let draft = ArchiveDraft::from_lines(&d, &lines(n));
        let prev_ref = previous.map(|p| token_reference(&d, &p.token));
        draft.into_archive(format!("token-over-{n}").into_bytes(), prev_ref)
    }

    #[test]
    fn draft_exposes_hashes() {
        let draft = ArchiveDraft::from_lines(&digester(), &lines(3));
        assert_eq!(draft.element_count(), 3);
        assert!(!draft.current_hash().is_empty());
        assert!(!draft.merkle_root().is_empty());
    }

    #[test]
    fn zero_line_draft() {
        let draft = ArchiveDraft::from_lines(&digester(), &[]);
        assert_eq!(draft.element_count(), 0);
        assert!(draft.merkle_root().is_empty());
        // Empty payload still has a hash: it addresses the empty archive.
        assert_eq!(draft.current_hash(), digester().hash_hex(b""));
    }

    #[test]
    fn verify_accepts_untampered_archive() {
        assert!(archive(5, None).verify(&digester()).is_ok());
    }

    #[test]
    fn verify_accepts_empty_archive() {
        let a = archive(0, None);
        assert!(a.lines().is_empty());
        assert!(a.verify(&digester()).is_ok());
    }

    #[test]
    fn tampered_data_detected_by_payload_hash() {
        let mut a = archive(5, None);
        a.data[0] ^= 0xFF;
        let err = a.verify(&digester()).unwrap_err();
        assert!(matches!(err, ArchiveError::PayloadHashMismatch { .. }));
    }

    #[test]
    fn tampered_tree_detected_by_root() {
        let mut a = archive(5, None);
        a.merkle_tree = MerkleTree::from_leaves(
            DigestAlgorithm::Sha512,
            vec![digester().hash_hex(b"unrelated")],
        );
        let err = a.verify(&digester()).unwrap_err();
        assert!(matches!(err, ArchiveError::MerkleRootMismatch { .. }));
    }

    #[test]
    fn tampered_count_detected() {
        let mut a = archive(5, None);
        a.additional.number_of_element = 99;
        let err = a.verify(&digester()).unwrap_err();
        assert!(matches!(err, ArchiveError::ElementCountMismatch { recorded: 99, found: 5 }));
    }

    #[test]
    fn chained_verification_passes_for_linked_periods() {
        let first = archive(3, None);
        let second = archive(4, Some(&first));
        assert!(second.verify_chained(&digester(), &first).is_ok());
    }

    #[test]
    fn chained_verification_detects_swapped_predecessor() {
        let first = archive(3, None);
        let impostor = archive(2, None);
        let second = archive(4, Some(&first));
        let err = second.verify_chained(&digester(), &impostor).unwrap_err();
        assert_eq!(err, ArchiveError::ChainMismatch);
    }

    #[test]
    fn lines_roundtrip_through_data() {
        let a = archive(4, None);
        assert_eq!(a.lines().len(), 4);
        assert_eq!(a.lines()[2], lines(4)[2]);
    }
}
