//! Blockchain configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default difficulty prefix: three leading zero hex digits.
pub const DEFAULT_DIFFICULTY_PREFIX: &str = "000";

/// Default cap on nonce attempts per block.
pub const DEFAULT_MAX_ATTEMPTS: u64 = 3_000_000;

/// Errors raised when a configuration is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid difficulty prefix {0:?}: expected at most 64 lowercase hex digits")]
    InvalidDifficulty(String),
}

/// Blockchain configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// Hex prefix every mined header hash must start with.
    pub difficulty_prefix: String,
    /// Maximum nonce attempts per block before mining gives up.
    pub max_attempts: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            difficulty_prefix: DEFAULT_DIFFICULTY_PREFIX.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl BlockchainConfig {
    pub fn new(difficulty_prefix: impl Into<String>, max_attempts: u64) -> Self {
        Self {
            difficulty_prefix: difficulty_prefix.into(),
            max_attempts,
        }
    }

    /// Reject prefixes that no lowercase hex digest could ever match.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let prefix = &self.difficulty_prefix;
        let is_lower_hex = prefix
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));

        if prefix.len() > 64 || !is_lower_hex {
            return Err(ConfigError::InvalidDifficulty(prefix.clone()));
        }
        Ok(())
    }
}
