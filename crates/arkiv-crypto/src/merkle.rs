use serde::{Deserialize, Serialize};

use arkiv_types::DigestAlgorithm;

use crate::digest::Digester;

/// Side of a sibling in a Merkle proof path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// Binary Merkle tree over hex-encoded leaf digests.
///
/// Built from the leaf digests of log lines. The pairing rule for an odd
/// node at any level is: hash the node with itself. The rule is applied
/// uniformly at every level, so an archive's root is byte-reproducible.
///
/// An empty leaf set produces an empty root string; a single leaf is its
/// own root. The whole tree (all levels, leaf first) serializes to JSON for
/// archive embedding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleTree {
    algorithm: DigestAlgorithm,
    leaf_count: usize,
    root: String,
    /// All node hashes, level by level. Level 0 = leaves, last = root.
    levels: Vec<Vec<String>>,
}

impl MerkleTree {
    /// Build a tree from hex leaf digests with the given algorithm.
    pub fn from_leaves(algorithm: DigestAlgorithm, leaves: Vec<String>) -> Self {
        if leaves.is_empty() {
            return Self {
                algorithm,
                leaf_count: 0,
                root: String::new(),
                levels: vec![],
            };
        }

        let digester = Digester::new(algorithm);
        let leaf_count = leaves.len();
        let mut levels: Vec<Vec<String>> = vec![leaves.clone()];
        let mut current = leaves;

        while current.len() > 1 {
            let mut next = Vec::with_capacity((current.len() + 1) / 2);
            for pair in current.chunks(2) {
                let hash = if pair.len() == 2 {
                    hash_pair(&digester, &pair[0], &pair[1])
                } else {
                    // Odd node: hash with itself
                    hash_pair(&digester, &pair[0], &pair[0])
                };
                next.push(hash);
            }
            levels.push(next.clone());
            current = next;
        }

        let root = current.into_iter().next().unwrap_or_default();

        Self {
            algorithm,
            leaf_count,
            root,
            levels,
        }
    }

    /// The root hash (hex). Empty string for a leafless tree.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// The digest algorithm used for internal nodes.
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Recompute the root from the embedded leaves and compare against the
    /// embedded root. Detects tampering with either.
    pub fn is_consistent(&self) -> bool {
        let leaves = self.levels.first().cloned().unwrap_or_default();
        let rebuilt = Self::from_leaves(self.algorithm, leaves);
        rebuilt.root == self.root && rebuilt.leaf_count == self.leaf_count
    }

    /// Generate an inclusion proof for the leaf at `index`.
    pub fn proof(&self, index: usize) -> Option<MerkleProof> {
        let leaves = self.levels.first()?;
        if index >= leaves.len() {
            return None;
        }

        let mut path = Vec::new();
        let mut idx = index;

        for level in &self.levels[..self.levels.len() - 1] {
            let sibling_idx = if idx % 2 == 0 { idx + 1 } else { idx - 1 };
            let sibling = if sibling_idx < level.len() {
                level[sibling_idx].clone()
            } else {
                // Odd node was hashed with itself
                level[idx].clone()
            };
            let side = if idx % 2 == 0 { Side::Right } else { Side::Left };
            path.push((sibling, side));
            idx /= 2;
        }

        Some(MerkleProof {
            algorithm: self.algorithm,
            leaf: leaves[index].clone(),
            path,
            root: self.root.clone(),
        })
    }
}

/// Merkle inclusion proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleProof {
    pub algorithm: DigestAlgorithm,
    pub leaf: String,
    pub path: Vec<(String, Side)>,
    pub root: String,
}

impl MerkleProof {
    /// Verify the proof: recompute the root from the leaf and path.
    pub fn verify(&self) -> bool {
        let digester = Digester::new(self.algorithm);
        let mut current = self.leaf.clone();
        for (sibling, side) in &self.path {
            current = match side {
                Side::Left => hash_pair(&digester, sibling, &current),
                Side::Right => hash_pair(&digester, &current, sibling),
            };
        }
        current == self.root
    }
}

fn hash_pair(digester: &Digester, left: &str, right: &str) -> String {
    let mut input = Vec::with_capacity(left.len() + right.len());
    input.extend_from_slice(left.as_bytes());
    input.extend_from_slice(right.as_bytes());
    digester.hash_hex(&input)
}
