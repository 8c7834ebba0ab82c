//! Block structure and content hashing.

use crate::hash::{hash_canonical, Hash};
use crate::transaction::{current_timestamp, Transaction};
use serde::{Deserialize, Serialize};

/// `previous_hash` marker carried by the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Nonce carried by the genesis block.
pub const GENESIS_NONCE: u64 = 1;

/// A committed batch of transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Block height (1 for genesis).
    pub height: u64,
    /// Unix timestamp in fractional seconds.
    pub timestamp: f64,
    /// Transactions in submission order.
    pub transactions: Vec<Transaction>,
    /// Proof-of-work nonce.
    pub nonce: u64,
    /// Lowercase hex hash of the previous block, `"0"` for genesis.
    pub previous_hash: String,
}

impl Block {
    /// Create a new block stamped with the current time.
    pub fn new(
        height: u64,
        transactions: Vec<Transaction>,
        nonce: u64,
        previous_hash: impl Into<String>,
    ) -> Self {
        Self {
            height,
            timestamp: current_timestamp(),
            transactions,
            nonce,
            previous_hash: previous_hash.into(),
        }
    }

    /// Create the genesis block.
    pub fn genesis() -> Self {
        Self::new(1, Vec::new(), GENESIS_NONCE, GENESIS_PREVIOUS_HASH)
    }

    /// Content hash over the block's canonical encoding.
    pub fn hash(&self) -> Hash {
        hash_canonical(self)
    }

    /// Content hash as lowercase hex, the form stored in `previous_hash`.
    pub fn hash_hex(&self) -> String {
        self.hash().to_hex()
    }

    /// Check if this block has the genesis shape.
    pub fn is_genesis(&self) -> bool {
        self.height == 1
            && self.previous_hash == GENESIS_PREVIOUS_HASH
            && self.nonce == GENESIS_NONCE
            && self.transactions.is_empty()
    }

    /// Get the number of transactions in this block.
    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }

    /// Iterate the transactions referring to a VIN, in stored order.
    pub fn transactions_for<'a>(&'a self, vin: &'a str) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.transactions.iter().filter(move |tx| tx.is_for(vin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_block() -> Block {
        Block {
            height: 2,
            timestamp: 1713050000.25,
            transactions: vec![Transaction::RegisterVehicle {
                vin: "VIN1".into(),
                owner: "Alice".into(),
                timestamp: 1713050000.0,
            }],
            nonce: 42,
            previous_hash: "ab".repeat(32),
        }
    }

    #[test]
    fn test_genesis_block() {
        let genesis = Block::genesis();

        assert!(genesis.is_genesis());
        assert_eq!(genesis.height, 1);
        assert_eq!(genesis.previous_hash, "0");
        assert_eq!(genesis.nonce, 1);
        assert!(genesis.transactions.is_empty());
    }

    #[test]
    fn test_block_hash_deterministic() {
        let block = sample_block();
        assert_eq!(block.hash(), block.clone().hash());
        assert_eq!(block.hash_hex().len(), 64);
    }

    #[test]
    fn test_block_hash_ignores_field_order() {
        let block = sample_block();
        let shuffled = json!({
            "previous_hash": "ab".repeat(32),
            "nonce": 42,
            "transactions": [{
                "timestamp": 1713050000.0,
                "owner": "Alice",
                "vin": "VIN1",
                "type": "register_vehicle"
            }],
            "timestamp": 1713050000.25,
            "height": 2
        });

        assert_eq!(block.hash(), hash_canonical(&shuffled));
    }

    #[test]
    fn test_block_hash_changes_on_any_field() {
        let base = sample_block();
        let original = base.hash();

        let mut b = base.clone();
        b.height += 1;
        assert_ne!(b.hash(), original);

        let mut b = base.clone();
        b.timestamp += 0.001;
        assert_ne!(b.hash(), original);

        let mut b = base.clone();
        b.nonce += 1;
        assert_ne!(b.hash(), original);

        let mut b = base.clone();
        b.previous_hash.replace_range(0..1, "c");
        assert_ne!(b.hash(), original);

        let mut b = base.clone();
        b.transactions.push(Transaction::OdometerUpdate {
            vin: "VIN1".into(),
            mileage: 1.0,
            timestamp: 1.0,
        });
        assert_ne!(b.hash(), original);

        let mut b = base;
        if let Transaction::RegisterVehicle { owner, .. } = &mut b.transactions[0] {
            *owner = "Mallory".into();
        }
        assert_ne!(b.hash(), original);
    }

    #[test]
    fn test_block_wire_fields() {
        let value = serde_json::to_value(sample_block()).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["height", "nonce", "previous_hash", "timestamp", "transactions"]
        );
    }

    #[test]
    fn test_transactions_for() {
        let mut block = sample_block();
        block.transactions.push(Transaction::odometer("VIN2", 5.0));
        block.transactions.push(Transaction::odometer("VIN1", 7.0));

        let matched: Vec<_> = block.transactions_for("VIN1").collect();
        assert_eq!(matched.len(), 2);
        assert_eq!(block.tx_count(), 3);
    }
}
