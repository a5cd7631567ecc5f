//! Blockchain orchestration for toychain.
//!
//! This crate brings the core primitives together into a working chain:
//! - **Blockchain**: append-only block sequence with mining, signing and validation
//! - **Config**: difficulty prefix and mining attempt budget
//! - **Ledger**: owned account balance state
//! - **Mempool**: pending transactions drained into the next block
//!
//! # Example
//!
//! ```rust,no_run
//! use toychain_chain::{Blockchain, BlockchainConfig};
//! use toychain_core::Keypair;
//!
//! let keypair = Keypair::generate();
//! let mut chain = Blockchain::new(BlockchainConfig::default()).unwrap();
//!
//! // Genesis is created unsigned.
//! chain.sign_genesis(&keypair);
//!
//! chain.add_block(vec!["Alice pays Bob 10".into()], &keypair, true);
//! assert!(chain.validate_chain());
//! ```

pub mod blockchain;
pub mod config;
pub mod ledger;
pub mod mempool;

// Re-export commonly used types
pub use blockchain::{AppendedBlock, Blockchain, BlockchainError, ValidationError};
pub use config::{BlockchainConfig, ConfigError, DEFAULT_DIFFICULTY_PREFIX, DEFAULT_MAX_ATTEMPTS};
pub use ledger::{Ledger, LedgerError};
pub use mempool::{Mempool, MempoolError, DEFAULT_MAX_PENDING};
