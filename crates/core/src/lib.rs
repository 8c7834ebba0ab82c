//! Core ledger primitives for carchain.
//!
//! This crate provides the fundamental types used throughout the ledger:
//! - Hashing (Blake3 digests, canonical JSON content hashing)
//! - Vehicle lifecycle transactions
//! - Blocks
//! - Derived per-VIN state

pub mod block;
pub mod hash;
pub mod transaction;
pub mod vin;

// Re-export commonly used types at the crate root
pub use block::{Block, GENESIS_NONCE, GENESIS_PREVIOUS_HASH};
pub use hash::{canonical_json, hash, hash_canonical, Hash, H256};
pub use transaction::{current_timestamp, Transaction};
pub use vin::VinState;
