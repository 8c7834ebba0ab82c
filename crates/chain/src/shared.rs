//! Thread-safe handle to a single ledger.
//!
//! All mutations and all consistency-sensitive reads go through one
//! `RwLock`. The nonce search is the only long-running step and never holds
//! the lock: the tip is captured under a read lock, the search runs unlocked,
//! and the write lock is taken only for the final append.

use crate::ledger::{ChainError, Ledger, LedgerStats, MiningTarget, Result};
use carchain_consensus::CancelToken;
use carchain_core::{Block, Transaction, VinState};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

/// Cloneable handle to a shared [`Ledger`].
#[derive(Debug, Clone, Default)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    /// Validate and pool a transaction.
    ///
    /// The VIN's state is projected and the transaction appended under the
    /// same write lock, so concurrent submissions are always checked against
    /// each other.
    pub fn submit(&self, tx: Transaction) -> Result<u64> {
        self.inner.write().submit(tx)
    }

    /// Mine the pending pool into a new block.
    ///
    /// If another commit lands while the nonce search is running, the search
    /// is repeated on top of the new tip.
    pub fn mine(&self, token: &CancelToken) -> Result<Block> {
        loop {
            let (target, pow) = {
                let ledger = self.inner.read();
                (ledger.mining_target()?, ledger.config().pow.clone())
            };

            let nonce = pow.search(target.previous_nonce, &target.previous_hash, token)?;

            let mut ledger = self.inner.write();
            if ledger.height() == target.height {
                return Ok(ledger.create_block(nonce, target.previous_hash));
            }
            warn!(
                expected = target.height,
                actual = ledger.height(),
                "tip moved during nonce search, retrying"
            );
        }
    }

    /// Copy of the committed chain.
    pub fn chain(&self) -> Vec<Block> {
        self.inner.read().chain().to_vec()
    }

    /// Number of committed blocks.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Copy of the pending pool.
    pub fn pending(&self) -> Vec<Transaction> {
        self.inner.read().pending().to_vec()
    }

    pub fn mining_target(&self) -> Result<MiningTarget> {
        self.inner.read().mining_target()
    }

    pub fn vin_history(&self, vin: &str) -> Vec<Transaction> {
        let history = self.inner.read().vin_history(vin);
        debug!(vin, records = history.len(), "vin history");
        history
    }

    pub fn latest_vin_state(&self, vin: &str) -> VinState {
        self.inner.read().latest_vin_state(vin)
    }

    pub fn verify(&self) -> std::result::Result<(), ChainError> {
        self.inner.read().verify()
    }

    pub fn stats(&self) -> Result<LedgerStats> {
        self.inner.read().stats()
    }

    /// Run `f` against a consistent view of the ledger.
    pub fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.inner.read())
    }
}
