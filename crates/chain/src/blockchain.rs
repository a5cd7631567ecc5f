//! Main blockchain orchestration.
//!
//! Owns the ordered block sequence, drives mining and signing on append and
//! replays every integrity check on validation.

use crate::config::{BlockchainConfig, ConfigError};
use crate::mempool::{Mempool, MempoolError};
use thiserror::Error;
use toychain_core::{Block, Hash, Keypair, MerkleError, MerkleProof, MiningOutcome};
use tracing::{debug, info, warn};

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("merkle error: {0}")]
    Merkle(#[from] MerkleError),

    #[error("mempool error: {0}")]
    Mempool(#[from] MempoolError),

    #[error("block not found: {0}")]
    BlockNotFound(u64),
}

pub type Result<T> = std::result::Result<T, BlockchainError>;

/// The first integrity check that failed during chain validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid previous_hash at block {index}")]
    BrokenLink {
        index: u64,
        expected: Hash,
        found: Hash,
    },

    #[error("merkle root mismatch at block {index}")]
    MerkleRootMismatch { index: u64 },

    #[error("signature verification failed at block {index}")]
    InvalidSignature { index: u64 },
}

impl ValidationError {
    /// Index of the block that failed.
    pub fn index(&self) -> u64 {
        match self {
            ValidationError::BrokenLink { index, .. }
            | ValidationError::MerkleRootMismatch { index }
            | ValidationError::InvalidSignature { index } => *index,
        }
    }
}

/// A freshly appended block together with the result of its nonce search.
#[derive(Debug)]
pub struct AppendedBlock<'a> {
    pub block: &'a Block,
    /// `None` when the block was appended without mining.
    pub mining: Option<MiningOutcome>,
}

/// Main blockchain struct: an append-only sequence of blocks.
#[derive(Debug, Clone)]
pub struct Blockchain {
    /// Blocks in index order. Never empty: genesis is inserted on construction.
    blocks: Vec<Block>,
    /// Transactions waiting for the next pending block.
    pending: Mempool,
    /// Configuration.
    config: BlockchainConfig,
}

impl Blockchain {
    /// Create a new blockchain seeded with an unsigned genesis block.
    pub fn new(config: BlockchainConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            blocks: vec![Self::create_genesis()],
            pending: Mempool::new(),
            config,
        })
    }

    /// Create a blockchain with the default difficulty and attempt budget.
    pub fn with_defaults() -> Self {
        Self {
            blocks: vec![Self::create_genesis()],
            pending: Mempool::new(),
            config: BlockchainConfig::default(),
        }
    }

    /// Build the unsigned genesis block.
    pub fn create_genesis() -> Block {
        Block::genesis()
    }

    /// Sign the genesis block. Must be called before genesis takes part in signature checks.
    pub fn sign_genesis(&mut self, keypair: &Keypair) {
        self.blocks[0].sign(keypair);
    }

    /// Get the configuration.
    pub fn config(&self) -> &BlockchainConfig {
        &self.config
    }

    /// Number of blocks, genesis included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false: the chain holds at least its genesis block.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// All blocks in index order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Get a block by index.
    pub fn block(&self, index: u64) -> Option<&Block> {
        usize::try_from(index).ok().and_then(|i| self.blocks.get(i))
    }

    /// Mutable access to a stored block, for tamper drills.
    ///
    /// The chain itself never rewrites blocks; changes made here are what
    /// [`Blockchain::validate`] is meant to catch.
    pub fn block_mut(&mut self, index: u64) -> Option<&mut Block> {
        usize::try_from(index).ok().and_then(|i| self.blocks.get_mut(i))
    }

    /// Get the latest block.
    pub fn latest(&self) -> &Block {
        &self.blocks[self.blocks.len() - 1]
    }

    /// Header hash of the latest block.
    pub fn last_hash(&self) -> Hash {
        self.latest().hash()
    }

    /// Build, optionally mine, sign and append a block.
    ///
    /// An exhausted nonce search is logged and returned in
    /// [`AppendedBlock::mining`], but the block is still signed and appended
    /// with whatever nonce the search reached.
    pub fn add_block(
        &mut self,
        transactions: Vec<String>,
        keypair: &Keypair,
        mine: bool,
    ) -> AppendedBlock<'_> {
        let index = self.blocks.len() as u64;
        let mut block = Block::new(index, self.last_hash(), transactions);

        let mining = if mine {
            let outcome = block.mine(&self.config.difficulty_prefix, self.config.max_attempts);
            match outcome {
                MiningOutcome::Mined { hash, attempts } => {
                    info!(index, nonce = block.header.nonce, attempts, %hash, "mined block");
                }
                MiningOutcome::Exhausted { attempts } => {
                    warn!(
                        index,
                        attempts,
                        difficulty = %self.config.difficulty_prefix,
                        "mining failed, appending block without proof of work"
                    );
                }
            }
            Some(outcome)
        } else {
            None
        };

        block.sign(keypair);
        debug!(index, txs = block.tx_count(), hash = %block.hash(), "appended block");
        self.blocks.push(block);

        AppendedBlock {
            block: self.latest(),
            mining,
        }
    }

    /// Queue a transaction for the next [`Blockchain::add_pending_block`].
    pub fn submit_transaction(&mut self, tx: impl Into<String>) -> Result<()> {
        self.pending.add(tx.into())?;
        debug!(pending = self.pending.len(), "queued transaction");
        Ok(())
    }

    /// Transactions waiting to be included.
    pub fn pending(&self) -> &Mempool {
        &self.pending
    }

    /// Drain the pending pool into a new block and append it like
    /// [`Blockchain::add_block`]. An empty pool yields an empty block.
    pub fn add_pending_block(&mut self, keypair: &Keypair, mine: bool) -> AppendedBlock<'_> {
        let transactions = self.pending.drain();
        self.add_block(transactions, keypair, mine)
    }

    /// Check every block after genesis, stopping at the first failure.
    ///
    /// Per block, in order: link to the previous header hash, merkle root,
    /// then signature.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        for pair in self.blocks.windows(2) {
            let (prev, block) = (&pair[0], &pair[1]);
            let index = block.index();

            let expected = prev.hash();
            if block.header.previous_hash != expected {
                return Err(ValidationError::BrokenLink {
                    index,
                    expected,
                    found: block.header.previous_hash,
                });
            }

            if !block.verify_merkle_root() {
                return Err(ValidationError::MerkleRootMismatch { index });
            }

            if !block.verify_signature() {
                return Err(ValidationError::InvalidSignature { index });
            }
        }
        Ok(())
    }

    /// Boolean form of [`Blockchain::validate`]; logs the failing block.
    pub fn validate_chain(&self) -> bool {
        match self.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!(index = e.index(), "{e}");
                false
            }
        }
    }

    /// Inclusion proof for a transaction of a stored block.
    pub fn prove_transaction(&self, block_index: u64, tx_index: usize) -> Result<MerkleProof> {
        let block = self
            .block(block_index)
            .ok_or(BlockchainError::BlockNotFound(block_index))?;
        Ok(block.transaction_proof(tx_index)?)
    }
}
