//! Proof of Work and submission rules for carchain.
//!
//! This crate provides:
//! - A minimal-nonce Proof of Work search with cooperative cancellation
//! - Submission validation of vehicle transactions against projected VIN state
//!
//! # Example
//!
//! ```rust
//! use carchain_consensus::{CancelToken, ProofOfWork, SubmissionValidator};
//! use carchain_core::{Block, Transaction, VinState};
//!
//! // Check a registration against an unknown VIN
//! let validator = SubmissionValidator::default();
//! let tx = Transaction::register("1HGCM82633A123456", "Alice");
//! validator.validate(&tx, &VinState::absent()).unwrap();
//!
//! // Search a nonce on top of genesis
//! let pow = ProofOfWork::new("0").unwrap();
//! let genesis = Block::genesis();
//! let nonce = pow
//!     .search(genesis.nonce, &genesis.hash_hex(), &CancelToken::new())
//!     .unwrap();
//! assert!(pow.is_valid(genesis.nonce, &genesis.hash_hex(), nonce));
//! ```

pub mod pow;
pub mod validator;

// Re-export commonly used types
pub use pow::{find_nonce, CancelToken, PowError, ProofOfWork, DEFAULT_DIFFICULTY_PREFIX};
pub use validator::{RegistrationPolicy, SubmissionValidator, ValidationError};
