//! Block and block header structures.

use crate::crypto::{Keypair, PublicKey, Signature};
use crate::hash::{hash, Hash};
use crate::merkle::{merkle_root, verify_proof, MerkleError, MerkleProof, MerkleTree};
use crate::pow::{self, MiningOutcome};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// The single transaction carried by every genesis block.
pub const GENESIS_TRANSACTION: &str = "Genesis Block";

/// Decimal places kept when a timestamp enters the canonical header.
pub const TIMESTAMP_PRECISION: usize = 6;

/// The header of a block containing metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Position in the chain (0 for genesis).
    pub index: u64,
    /// Seconds since the Unix epoch at creation.
    pub timestamp: f64,
    /// Header hash of the previous block.
    pub previous_hash: Hash,
    /// Merkle root of transactions.
    pub merkle_root: Hash,
    /// Proof-of-work nonce.
    pub nonce: u64,
}

/// Key-sorted view of the header used for hashing. Field order is the JSON key order.
#[derive(Serialize)]
struct CanonicalHeader<'a> {
    index: u64,
    merkle_root: &'a Hash,
    nonce: u64,
    previous_hash: &'a Hash,
    timestamp: f64,
}

impl BlockHeader {
    /// Compact, key-sorted JSON encoding of the header.
    ///
    /// `{"index":1,"merkle_root":"…","nonce":0,"previous_hash":"…","timestamp":1700000000.123456}`
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let canonical = CanonicalHeader {
            index: self.index,
            merkle_root: &self.merkle_root,
            nonce: self.nonce,
            previous_hash: &self.previous_hash,
            timestamp: round_timestamp(self.timestamp),
        };
        serde_json::to_vec(&canonical).expect("serialization should not fail")
    }

    /// Calculate the hash of this block header.
    pub fn hash(&self) -> Hash {
        hash(&self.canonical_bytes())
    }

    /// Get the current Unix timestamp with sub-second precision.
    pub fn current_timestamp() -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default()
    }
}

/// Round to [`TIMESTAMP_PRECISION`] decimals from the exact binary value.
fn round_timestamp(timestamp: f64) -> f64 {
    format!("{:.*}", TIMESTAMP_PRECISION, timestamp)
        .parse()
        .unwrap_or(timestamp)
}

/// Merkle root over `hash(tx)` for each transaction.
pub fn transactions_root(transactions: &[String]) -> Hash {
    merkle_root(&transaction_hashes(transactions))
}

fn transaction_hashes(transactions: &[String]) -> Vec<Hash> {
    transactions.iter().map(|tx| hash(tx.as_bytes())).collect()
}

/// A complete block including header, transactions, and signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Block header.
    pub header: BlockHeader,
    /// Opaque transaction payloads.
    pub transactions: Vec<String>,
    /// Signature over the header hash.
    pub signature: Option<Signature>,
    /// Compressed public key of the signer.
    pub signer: Option<PublicKey>,
}

impl Block {
    /// Create a new unsigned, unmined block.
    pub fn new(index: u64, previous_hash: Hash, transactions: Vec<String>) -> Self {
        let merkle_root = transactions_root(&transactions);

        Self {
            header: BlockHeader {
                index,
                timestamp: BlockHeader::current_timestamp(),
                previous_hash,
                merkle_root,
                nonce: 0,
            },
            transactions,
            signature: None,
            signer: None,
        }
    }

    /// Create the genesis block. It is unsigned until signed explicitly.
    pub fn genesis() -> Self {
        Self::new(0, Hash::ZERO, vec![GENESIS_TRANSACTION.to_string()])
    }

    /// Get the block hash (hash of the header).
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// Get the block index.
    pub fn index(&self) -> u64 {
        self.header.index
    }

    /// Check if this is the genesis block.
    pub fn is_genesis(&self) -> bool {
        self.header.index == 0 && self.header.previous_hash == Hash::ZERO
    }

    /// Get the number of transactions in this block.
    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }

    /// Run a bounded nonce search on this block's header.
    pub fn mine(&mut self, difficulty_prefix: &str, max_attempts: u64) -> MiningOutcome {
        pow::mine(&mut self.header, difficulty_prefix, max_attempts)
    }

    /// Sign the header hash and record the signer's public key.
    pub fn sign(&mut self, keypair: &Keypair) {
        let hash = self.header.hash();
        self.signature = Some(keypair.sign_hash(&hash));
        self.signer = Some(keypair.public_key());
    }

    /// Create a signed block.
    pub fn signed(mut self, keypair: &Keypair) -> Self {
        self.sign(keypair);
        self
    }

    /// Verify the block signature against the recorded signer.
    ///
    /// Any missing field, undecodable key or signature, or mismatch yields `false`.
    pub fn verify_signature(&self) -> bool {
        let (Some(signature), Some(signer)) = (&self.signature, &self.signer) else {
            return false;
        };
        signer.verify_hash(&self.header.hash(), signature).is_ok()
    }

    /// Verify the merkle root matches the transactions.
    pub fn verify_merkle_root(&self) -> bool {
        transactions_root(&self.transactions) == self.header.merkle_root
    }

    /// Inclusion proof for the transaction at `tx_index`.
    pub fn transaction_proof(&self, tx_index: usize) -> Result<MerkleProof, MerkleError> {
        MerkleTree::new(&transaction_hashes(&self.transactions)).proof(tx_index)
    }

    /// Check that `tx` sits at `tx_index` under this block's recorded merkle root.
    pub fn verify_transaction(&self, tx: &str, proof: &MerkleProof, tx_index: usize) -> bool {
        verify_proof(
            &hash(tx.as_bytes()),
            proof,
            &self.header.merkle_root,
            tx_index,
        )
    }
}
