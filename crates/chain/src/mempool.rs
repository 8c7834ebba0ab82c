//! Pool of pending transactions.
//!
//! The pool stores accepted transactions waiting to be committed in the next
//! block, strictly in submission order.

use carchain_core::Transaction;

/// FIFO buffer of pending transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionPool {
    transactions: Vec<Transaction>,
}

impl TransactionPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of transactions in the pool.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Check if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Append a transaction at the back of the queue.
    pub fn push(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    /// Pending transactions in submission order.
    pub fn as_slice(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter()
    }

    /// Pending transactions for a VIN, in submission order.
    pub fn matching<'a>(&'a self, vin: &'a str) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.transactions.iter().filter(move |tx| tx.is_for(vin))
    }

    /// Remove and return every pending transaction, leaving the pool empty.
    ///
    /// Only the ledger calls this, when it commits a block.
    pub(crate) fn drain(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.transactions)
    }

    /// Get pool statistics.
    pub fn stats(&self) -> PoolStats {
        let mut vins: Vec<&str> = self.transactions.iter().map(Transaction::vin).collect();
        vins.sort_unstable();
        vins.dedup();

        PoolStats {
            total_transactions: self.len(),
            unique_vins: vins.len(),
        }
    }
}

/// Pool statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
    /// Total number of transactions.
    pub total_transactions: usize,
    /// Number of distinct VINs referenced.
    pub unique_vins: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_preserves_submission_order() {
        let mut pool = TransactionPool::new();
        let txs = vec![
            Transaction::register("VIN1", "Alice"),
            Transaction::register("VIN2", "Bob"),
            Transaction::odometer("VIN1", 10.0),
        ];

        for tx in &txs {
            pool.push(tx.clone());
        }

        assert_eq!(pool.len(), 3);
        assert_eq!(pool.as_slice(), txs.as_slice());
    }

    #[test]
    fn test_pool_keeps_identical_transactions() {
        let mut pool = TransactionPool::new();
        let tx = Transaction::odometer("VIN1", 10.0);

        pool.push(tx.clone());
        pool.push(tx);

        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_pool_matching() {
        let mut pool = TransactionPool::new();
        pool.push(Transaction::register("VIN1", "Alice"));
        pool.push(Transaction::register("VIN2", "Bob"));
        pool.push(Transaction::odometer("VIN1", 10.0));

        let kinds: Vec<_> = pool.matching("VIN1").map(Transaction::kind).collect();
        assert_eq!(kinds, vec!["register_vehicle", "odometer_update"]);
    }

    #[test]
    fn test_pool_drain() {
        let mut pool = TransactionPool::new();
        pool.push(Transaction::register("VIN1", "Alice"));

        let drained = pool.drain();
        assert_eq!(drained.len(), 1);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_pool_stats() {
        let mut pool = TransactionPool::new();
        pool.push(Transaction::register("VIN1", "Alice"));
        pool.push(Transaction::odometer("VIN1", 3.0));
        pool.push(Transaction::register("VIN2", "Bob"));

        let stats = pool.stats();
        assert_eq!(stats.total_transactions, 3);
        assert_eq!(stats.unique_vins, 2);
    }
}
