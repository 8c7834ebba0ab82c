//! Ledger orchestration for carchain.
//!
//! This crate brings together all components into a working vehicle ledger:
//! - **Mempool**: FIFO pool of pending transactions
//! - **Ledger**: the chain, block commits and chain verification
//! - **Projector**: per-VIN history and state replay
//! - **Shared**: a lock-guarded handle for concurrent callers
//!
//! # Example
//!
//! ```rust
//! use carchain_chain::{Ledger, LedgerConfig, SharedLedger};
//! use carchain_consensus::CancelToken;
//! use carchain_core::Transaction;
//!
//! let ledger = SharedLedger::new(Ledger::new(LedgerConfig::with_difficulty("0").unwrap()));
//!
//! // Submit, then commit
//! ledger.submit(Transaction::register("1HGCM82633A123456", "Alice")).unwrap();
//! ledger.mine(&CancelToken::new()).unwrap();
//!
//! let state = ledger.latest_vin_state("1HGCM82633A123456");
//! assert_eq!(state.owner.as_deref(), Some("Alice"));
//! ```

pub mod ledger;
pub mod mempool;
pub mod projector;
pub mod shared;

// Re-export commonly used types
pub use ledger::{
    verify_chain, ChainError, Ledger, LedgerConfig, LedgerError, LedgerStats, MiningTarget,
};
pub use mempool::{PoolStats, TransactionPool};
pub use projector::StateProjector;
pub use shared::SharedLedger;
