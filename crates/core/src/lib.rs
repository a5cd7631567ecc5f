//! Core blockchain primitives for toychain.
//!
//! This crate provides the integrity building blocks of the chain:
//! - SHA-256 hashing
//! - Merkle trees with inclusion proofs
//! - Blocks and canonical block header hashing
//! - Bounded proof-of-work mining
//! - secp256k1 ECDSA block signatures

pub mod block;
pub mod crypto;
pub mod hash;
pub mod merkle;
pub mod pow;

// Re-export commonly used types at the crate root
pub use block::{transactions_root, Block, BlockHeader, GENESIS_TRANSACTION};
pub use crypto::{CryptoError, Keypair, PublicKey, Signature};
pub use hash::{hash, hash_concat, Hash, H256};
pub use merkle::{merkle_root, verify_proof, MerkleError, MerkleProof, MerkleTree};
pub use pow::{mine, MiningOutcome};
