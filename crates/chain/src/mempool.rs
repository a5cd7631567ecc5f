//! Pool of pending transactions.
//!
//! Submitted transactions wait here, in arrival order, until the next block
//! drains them.

use std::collections::VecDeque;
use thiserror::Error;

/// Default cap on queued transactions.
pub const DEFAULT_MAX_PENDING: usize = 10_000;

/// Errors that can occur during mempool operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MempoolError {
    #[error("mempool is full (capacity: {0})")]
    MempoolFull(usize),
}

pub type Result<T> = std::result::Result<T, MempoolError>;

/// FIFO queue of transaction payloads.
#[derive(Debug, Clone)]
pub struct Mempool {
    /// Queued payloads, oldest first.
    transactions: VecDeque<String>,
    /// Maximum number of queued payloads.
    max_transactions: usize,
}

impl Default for Mempool {
    fn default() -> Self {
        Self::new()
    }
}

impl Mempool {
    /// Create a mempool with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_PENDING)
    }

    /// Create a mempool holding at most `max_transactions` payloads.
    pub fn with_capacity(max_transactions: usize) -> Self {
        Self {
            transactions: VecDeque::new(),
            max_transactions,
        }
    }

    /// Get the number of queued transactions.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Check if the mempool is empty.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Maximum number of queued transactions.
    pub fn capacity(&self) -> usize {
        self.max_transactions
    }

    /// Queued transactions, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.transactions.iter()
    }

    /// Queue a transaction. Identical payloads are kept as separate entries.
    pub fn add(&mut self, tx: String) -> Result<()> {
        if self.transactions.len() >= self.max_transactions {
            return Err(MempoolError::MempoolFull(self.max_transactions));
        }
        self.transactions.push_back(tx);
        Ok(())
    }

    /// Remove and return every queued transaction in arrival order.
    pub fn drain(&mut self) -> Vec<String> {
        self.transactions.drain(..).collect()
    }

    /// Clear all transactions from the mempool.
    pub fn clear(&mut self) {
        self.transactions.clear();
    }
}
