use proptest::prelude::*;
use toychain_core::{hash, hash_concat, merkle_root, verify_proof, Hash, MerkleTree};

fn leaves_strategy() -> impl Strategy<Value = Vec<Hash>> {
    prop::collection::vec(any::<[u8; 32]>().prop_map(Hash::from_bytes), 1..40)
}

/// Pairwise fold written out level by level, duplicating an odd tail.
fn folded_root(leaves: &[Hash]) -> Hash {
    let mut level = leaves.to_vec();
    if level.len() == 1 {
        level.push(level[0]);
    }
    while level.len() > 1 {
        let mut next = Vec::new();
        let mut i = 0;
        while i < level.len() {
            let left = level[i];
            let right = if i + 1 < level.len() { level[i + 1] } else { left };
            next.push(hash_concat(&[left.as_ref(), right.as_ref()]));
            i += 2;
        }
        level = next;
    }
    level[0]
}

proptest! {
    #[test]
    fn root_is_deterministic(leaves in leaves_strategy()) {
        let first = MerkleTree::new(&leaves.clone()).root();
        let second = MerkleTree::new(&leaves.clone()).root();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn root_matches_pairwise_fold(leaves in leaves_strategy()) {
        prop_assert_eq!(merkle_root(&leaves), folded_root(&leaves));
    }

    #[test]
    fn every_proof_verifies(leaves in leaves_strategy()) {
        let tree = MerkleTree::new(&leaves);
        let root = tree.root();
        for (i, leaf) in leaves.iter().enumerate() {
            let proof = tree.proof(i).unwrap();
            prop_assert!(verify_proof(leaf, &proof, &root, i));
        }
    }

    #[test]
    fn swapping_distinct_leaves_changes_root(
        leaves in leaves_strategy(),
        a in any::<prop::sample::Index>(),
        b in any::<prop::sample::Index>(),
    ) {
        let i = a.index(leaves.len());
        let j = b.index(leaves.len());
        prop_assume!(leaves[i] != leaves[j]);

        let mut swapped = leaves.clone();
        swapped.swap(i, j);
        prop_assert_ne!(merkle_root(&leaves), merkle_root(&swapped));
    }

    #[test]
    fn flipped_leaf_bit_fails(
        leaves in leaves_strategy(),
        pick in any::<prop::sample::Index>(),
        bit in 0usize..256,
    ) {
        let tree = MerkleTree::new(&leaves);
        let i = pick.index(leaves.len());
        let proof = tree.proof(i).unwrap();

        let mut bytes = leaves[i].0;
        bytes[bit / 8] ^= 1 << (bit % 8);
        prop_assert!(!verify_proof(&Hash(bytes), &proof, &tree.root(), i));
    }

    #[test]
    fn flipped_sibling_bit_fails(
        leaves in leaves_strategy(),
        pick in any::<prop::sample::Index>(),
        level in any::<prop::sample::Index>(),
        bit in 0usize..256,
    ) {
        let tree = MerkleTree::new(&leaves);
        let i = pick.index(leaves.len());
        let mut proof = tree.proof(i).unwrap();

        let k = level.index(proof.len());
        proof.siblings[k].0[bit / 8] ^= 1 << (bit % 8);
        prop_assert!(!verify_proof(&leaves[i], &proof, &tree.root(), i));
    }
}

#[test]
fn three_leaves_duplicate_the_last() {
    let h: Vec<Hash> = [b"h0", b"h1", b"h2"].iter().map(|d| hash(*d)).collect();
    let left = hash_concat(&[h[0].as_ref(), h[1].as_ref()]);
    let right = hash_concat(&[h[2].as_ref(), h[2].as_ref()]);
    let expected = hash_concat(&[left.as_ref(), right.as_ref()]);

    assert_eq!(merkle_root(&h), expected);
}
