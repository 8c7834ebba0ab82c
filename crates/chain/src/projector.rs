//! Read-only projections over the ledger.

use crate::mempool::TransactionPool;
use carchain_core::{Block, Transaction, VinState};

/// Answers per-VIN queries by replaying committed blocks, then the pending
/// pool.
///
/// Committed transactions are visited by ascending height and in stored order
/// within a block; pending transactions follow in submission order. That
/// sequence is the causal order used to fold state.
pub struct StateProjector<'a> {
    chain: &'a [Block],
    pool: &'a TransactionPool,
}

impl<'a> StateProjector<'a> {
    pub fn new(chain: &'a [Block], pool: &'a TransactionPool) -> Self {
        Self { chain, pool }
    }

    /// Iterate every transaction referring to `vin`, in replay order.
    pub fn history_iter(&self, vin: &'a str) -> impl Iterator<Item = &'a Transaction> + 'a {
        let (chain, pool) = (self.chain, self.pool);
        chain
            .iter()
            .flat_map(move |block| block.transactions_for(vin))
            .chain(pool.matching(vin))
    }

    /// Every transaction referring to `vin`, in replay order.
    pub fn vin_history(&self, vin: &'a str) -> Vec<Transaction> {
        self.history_iter(vin).cloned().collect()
    }

    /// Current state of `vin`, folded from its history.
    pub fn latest_vin_state(&self, vin: &'a str) -> VinState {
        VinState::replay(self.history_iter(vin))
    }
}
