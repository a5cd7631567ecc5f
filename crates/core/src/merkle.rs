//! Merkle tree implementation for transaction roots and inclusion proofs.
//!
//! Odd layers are padded by duplicating their last element before pairing,
//! so every layer below the root has even length. A single leaf `h` therefore
//! has root `hash(h || h)`, and an empty leaf list has root `hash("")`.

use crate::hash::{hash, hash_concat, Hash};
use thiserror::Error;

/// Errors that can occur when building trees or issuing proofs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerkleError {
    #[error("merkle tree requires at least one leaf")]
    EmptyLeaves,

    #[error("leaf index {index} out of range (tree has {leaf_count} leaves)")]
    IndexOutOfRange { index: usize, leaf_count: usize },
}

/// Compute the merkle root of a list of hashes.
pub fn merkle_root(hashes: &[Hash]) -> Hash {
    MerkleTree::new(hashes).root()
}

/// A merkle tree for efficient proofs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    /// All layers in the tree, leaves first. Non-root layers are padded to even length.
    layers: Vec<Vec<Hash>>,
    /// Number of leaves supplied by the caller, before padding.
    leaf_count: usize,
}

/// Sibling hashes from leaf to root. Left/right order is recovered from the leaf index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MerkleProof {
    pub siblings: Vec<Hash>,
}

impl MerkleProof {
    /// Number of sibling hashes (one per non-root layer).
    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Hash> {
        self.siblings.iter()
    }
}

impl MerkleTree {
    /// Build a merkle tree from a list of leaf hashes.
    ///
    /// An empty list yields a single-layer tree whose root is `hash("")`.
    pub fn new(leaves: &[Hash]) -> Self {
        if leaves.is_empty() {
            return Self {
                layers: vec![vec![hash(b"")]],
                leaf_count: 0,
            };
        }

        let mut layers = Vec::new();
        let mut current = leaves.to_vec();

        // A lone leaf is still paired with itself, so at least one fold always runs.
        loop {
            if current.len() % 2 == 1 {
                let last = current[current.len() - 1];
                current.push(last);
            }

            let next: Vec<Hash> = current
                .chunks_exact(2)
                .map(|pair| hash_concat(&[pair[0].as_ref(), pair[1].as_ref()]))
                .collect();

            layers.push(current);
            if next.len() == 1 {
                layers.push(next);
                break;
            }
            current = next;
        }

        Self {
            layers,
            leaf_count: leaves.len(),
        }
    }

    /// Build a merkle tree, rejecting an empty leaf list.
    pub fn try_new(leaves: &[Hash]) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyLeaves);
        }
        Ok(Self::new(leaves))
    }

    /// Get the root of the merkle tree.
    pub fn root(&self) -> Hash {
        // Construction always leaves a single-element root layer.
        self.layers
            .last()
            .and_then(|layer| layer.first())
            .copied()
            .unwrap_or_default()
    }

    /// Get the number of leaves in the tree, excluding padding.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Get the leaf at the given index.
    pub fn leaf(&self, index: usize) -> Option<Hash> {
        if index >= self.leaf_count {
            return None;
        }
        Some(self.layers[0][index])
    }

    /// All layers, leaves first and root last.
    pub fn layers(&self) -> &[Vec<Hash>] {
        &self.layers
    }

    /// Generate a proof for the leaf at the given index.
    pub fn proof(&self, index: usize) -> Result<MerkleProof, MerkleError> {
        if index >= self.leaf_count {
            return Err(MerkleError::IndexOutOfRange {
                index,
                leaf_count: self.leaf_count,
            });
        }

        let mut siblings = Vec::with_capacity(self.layers.len() - 1);
        let mut idx = index;

        for layer in &self.layers[..self.layers.len() - 1] {
            let sibling_idx = if idx % 2 == 0 {
                if idx + 1 < layer.len() {
                    idx + 1
                } else {
                    idx
                }
            } else {
                idx - 1
            };

            siblings.push(layer[sibling_idx]);
            idx /= 2;
        }

        Ok(MerkleProof { siblings })
    }

    /// Verify a proof for `leaf` at `index` against this tree's root.
    pub fn verify_proof(&self, leaf: &Hash, proof: &MerkleProof, index: usize) -> bool {
        verify_proof(leaf, proof, &self.root(), index)
    }
}

/// Verify a merkle proof for `leaf` at `index` against a given root.
pub fn verify_proof(leaf: &Hash, proof: &MerkleProof, root: &Hash, index: usize) -> bool {
    let mut current = *leaf;
    let mut idx = index;

    for sibling in proof.iter() {
        current = if idx % 2 == 0 {
            hash_concat(&[current.as_ref(), sibling.as_ref()])
        } else {
            hash_concat(&[sibling.as_ref(), current.as_ref()])
        };
        idx /= 2;
    }

    current == *root
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_hashes(n: usize) -> Vec<Hash> {
        (0..n).map(|i| hash(&[i as u8])).collect()
    }

    fn pair(a: &Hash, b: &Hash) -> Hash {
        hash_concat(&[a.as_ref(), b.as_ref()])
    }

    #[test]
    fn test_merkle_root_empty() {
        let root = merkle_root(&[]);
        assert_eq!(root, hash(b""));
    }

    #[test]
    fn test_try_new_rejects_empty() {
        assert_eq!(MerkleTree::try_new(&[]), Err(MerkleError::EmptyLeaves));
        assert!(MerkleTree::try_new(&make_hashes(1)).is_ok());
    }

    #[test]
    fn test_merkle_root_single_is_duplicated() {
        let hashes = make_hashes(1);
        let root = merkle_root(&hashes);
        assert_eq!(root, pair(&hashes[0], &hashes[0]));
        assert_ne!(root, hashes[0]);
    }

    #[test]
    fn test_merkle_root_two() {
        let hashes = make_hashes(2);
        let root = merkle_root(&hashes);
        assert_eq!(root, pair(&hashes[0], &hashes[1]));
    }

    #[test]
    fn test_merkle_root_three_duplicates_last() {
        let h = make_hashes(3);
        let expected = pair(&pair(&h[0], &h[1]), &pair(&h[2], &h[2]));
        assert_eq!(merkle_root(&h), expected);
    }

    #[test]
    fn test_merkle_root_deterministic() {
        let hashes = make_hashes(10);
        let r1 = merkle_root(&hashes);
        let r2 = merkle_root(&hashes);
        assert_eq!(r1, r2);
    }

    #[test]
    fn test_merkle_root_order_matters() {
        let hashes = make_hashes(4);
        let mut swapped = hashes.clone();
        swapped.swap(1, 2);

        assert_ne!(merkle_root(&hashes), merkle_root(&swapped));
    }

    #[test]
    fn test_layers_are_padded_to_even_length() {
        let tree = MerkleTree::new(&make_hashes(5));
        let layers = tree.layers();

        assert_eq!(layers.len(), 4);
        for layer in &layers[..layers.len() - 1] {
            assert_eq!(layer.len() % 2, 0);
        }
        assert_eq!(layers.last().unwrap().len(), 1);
        assert_eq!(tree.leaf_count(), 5);
    }

    #[test]
    fn test_merkle_proof_valid() {
        let hashes = make_hashes(8);
        let tree = MerkleTree::new(&hashes);

        for (i, leaf) in hashes.iter().enumerate() {
            let proof = tree.proof(i).unwrap();
            assert_eq!(proof.len(), 3);
            assert!(tree.verify_proof(leaf, &proof, i));
            assert!(verify_proof(leaf, &proof, &tree.root(), i));
        }
    }

    #[test]
    fn test_merkle_proof_odd_leaves() {
        for n in [1usize, 3, 5, 7, 9] {
            let hashes = make_hashes(n);
            let tree = MerkleTree::new(&hashes);

            for (i, leaf) in hashes.iter().enumerate() {
                let proof = tree.proof(i).unwrap();
                assert!(tree.verify_proof(leaf, &proof, i), "n={n} i={i}");
            }
        }
    }

    #[test]
    fn test_merkle_proof_last_odd_leaf_uses_itself() {
        let hashes = make_hashes(3);
        let tree = MerkleTree::new(&hashes);
        let proof = tree.proof(2).unwrap();
        assert_eq!(proof.siblings[0], hashes[2]);
    }

    #[test]
    fn test_merkle_proof_invalid_index() {
        let hashes = make_hashes(4);
        let tree = MerkleTree::new(&hashes);
        assert_eq!(
            tree.proof(10),
            Err(MerkleError::IndexOutOfRange {
                index: 10,
                leaf_count: 4
            })
        );
        assert!(MerkleTree::new(&[]).proof(0).is_err());
    }

    #[test]
    fn test_merkle_proof_wrong_index() {
        let hashes = make_hashes(4);
        let tree = MerkleTree::new(&hashes);
        let proof = tree.proof(0).unwrap();
        assert!(!tree.verify_proof(&hashes[0], &proof, 1));
    }

    #[test]
    fn test_merkle_proof_wrong_root() {
        let hashes = make_hashes(4);
        let tree = MerkleTree::new(&hashes);
        let proof = tree.proof(0).unwrap();

        let wrong_root = hash(b"wrong");
        assert!(!verify_proof(&hashes[0], &proof, &wrong_root, 0));
    }

    #[test]
    fn test_transactions_abc_scenario() {
        let leaves: Vec<Hash> = ["a", "b", "c"].iter().map(|t| hash(t.as_bytes())).collect();
        let first = MerkleTree::new(&leaves);
        let second = MerkleTree::new(&leaves);

        assert_eq!(first.layers()[0].len(), 4);
        assert_eq!(first.layers()[1].len(), 2);
        assert_eq!(first.root().to_hex(), second.root().to_hex());
    }
}
