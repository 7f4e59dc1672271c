//! Per-address experience point ledger.
//!
//! In-process only; totals live for the lifetime of the server. Addresses
//! are normalized before they reach this store, so casing variants of the
//! same account share one entry.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::address::Address;

/// Shared experience point totals keyed by account address.
#[derive(Debug, Default)]
pub struct XpStore {
    entries: RwLock<HashMap<Address, u64>>,
}

impl XpStore {
    /// Current total for an address; unknown addresses read as zero.
    #[must_use]
    pub fn total(&self, address: &Address) -> u64 {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(address)
            .copied()
            .unwrap_or(0)
    }

    /// Add `amount` to an address and return the new total (saturating).
    pub fn award(&self, address: &Address, amount: u64) -> u64 {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let total = entries.entry(address.clone()).or_insert(0);
        *total = total.saturating_add(amount);
        *total
    }
}
