//! Account balance ledger.
//!
//! Balances live in an owned `Ledger` value passed by reference; there is no
//! process-wide state.

use std::collections::HashMap;
use thiserror::Error;
use toychain_core::PublicKey;
use tracing::debug;

/// Errors that can occur when moving funds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("insufficient balance (required {required}, available {available})")]
    InsufficientBalance { required: u64, available: u64 },

    #[error("balance overflow for {0}")]
    Overflow(String),
}

/// Balances keyed by address.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    balances: HashMap<String, u64>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address of a signer: hex SHA-256 of its compressed public key.
    pub fn address_of(public_key: &PublicKey) -> String {
        public_key.to_address()
    }

    /// Balance of an address; unknown addresses hold zero.
    pub fn balance(&self, address: &str) -> u64 {
        self.balances.get(address).copied().unwrap_or(0)
    }

    /// Add funds to an address.
    pub fn credit(&mut self, address: &str, amount: u64) -> Result<(), LedgerError> {
        let balance = self.balances.entry(address.to_string()).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow(address.to_string()))?;
        Ok(())
    }

    /// Move funds between addresses. Balances are untouched on failure.
    pub fn transfer(&mut self, from: &str, to: &str, amount: u64) -> Result<(), LedgerError> {
        let available = self.balance(from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                required: amount,
                available,
            });
        }
        if from != to && self.balance(to).checked_add(amount).is_none() {
            return Err(LedgerError::Overflow(to.to_string()));
        }

        self.balances.insert(from.to_string(), available - amount);
        let receiver = self.balances.entry(to.to_string()).or_insert(0);
        *receiver += amount;

        debug!(from, to, amount, "transfer applied");
        Ok(())
    }
}
