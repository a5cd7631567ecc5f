//! Bounded proof-of-work nonce search.
//!
//! A header satisfies a difficulty prefix when the lowercase hex form of its
//! hash starts with that prefix. The search is a single-threaded linear scan
//! over nonces that stops after `max_attempts` hash evaluations.

use crate::block::BlockHeader;
use crate::hash::Hash;

/// Result of a nonce search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiningOutcome {
    /// A qualifying hash was found; the header's nonce is the winning value.
    Mined { hash: Hash, attempts: u64 },
    /// The attempt budget ran out; the header's nonce is where the scan stopped.
    Exhausted { attempts: u64 },
}

impl MiningOutcome {
    pub fn is_mined(&self) -> bool {
        matches!(self, MiningOutcome::Mined { .. })
    }

    /// Number of header hashes evaluated.
    pub fn attempts(&self) -> u64 {
        match self {
            MiningOutcome::Mined { attempts, .. } | MiningOutcome::Exhausted { attempts } => {
                *attempts
            }
        }
    }
}

/// Check whether a hash meets a hex difficulty prefix (case-sensitive).
pub fn meets_difficulty(hash: &Hash, difficulty_prefix: &str) -> bool {
    hash.to_hex().starts_with(difficulty_prefix)
}

/// Expected number of attempts for a prefix, `16^len`.
pub fn expected_attempts(difficulty_prefix: &str) -> f64 {
    16f64.powi(difficulty_prefix.len() as i32)
}

/// Search nonces upward from the header's current nonce.
pub fn mine(header: &mut BlockHeader, difficulty_prefix: &str, max_attempts: u64) -> MiningOutcome {
    let mut attempts = 0u64;

    while attempts < max_attempts {
        let hash = header.hash();
        attempts += 1;
        if meets_difficulty(&hash, difficulty_prefix) {
            return MiningOutcome::Mined { hash, attempts };
        }
        header.nonce = header.nonce.wrapping_add(1);
    }

    MiningOutcome::Exhausted { attempts }
}
