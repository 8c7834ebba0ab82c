//! The ledger: committed blocks plus the pending pool.
//!
//! This module brings together the chain, the transaction pool, proof of
//! work and the submission rules.

use crate::mempool::TransactionPool;
use crate::projector::StateProjector;
use carchain_consensus::{
    CancelToken, PowError, ProofOfWork, RegistrationPolicy, SubmissionValidator, ValidationError,
};
use carchain_core::{Block, Transaction, VinState};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("proof of work error: {0}")]
    Pow(#[from] PowError),

    #[error("chain has no blocks")]
    EmptyChain,
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Integrity violations found while verifying a chain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("chain has no blocks")]
    Empty,

    #[error("first block is not a valid genesis block")]
    InvalidGenesis,

    #[error("block height mismatch (expected {expected}, got {got})")]
    InvalidHeight { expected: u64, got: u64 },

    #[error("block {height} is not linked to its predecessor")]
    BrokenLink { height: u64 },

    #[error("block {height} nonce does not satisfy proof of work")]
    InvalidNonce { height: u64 },
}

/// Ledger configuration.
#[derive(Debug, Clone, Default)]
pub struct LedgerConfig {
    /// Proof of work parameters.
    pub pow: ProofOfWork,
    /// Handling of registrations for already registered VINs.
    pub registration_policy: RegistrationPolicy,
}

impl LedgerConfig {
    /// Configuration with a custom difficulty prefix.
    pub fn with_difficulty(difficulty_prefix: &str) -> std::result::Result<Self, PowError> {
        Ok(Self {
            pow: ProofOfWork::new(difficulty_prefix)?,
            ..Self::default()
        })
    }
}

/// What a miner needs to know about the current tip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiningTarget {
    /// Height of the tip.
    pub height: u64,
    /// Nonce of the tip.
    pub previous_nonce: u64,
    /// Hex hash of the tip.
    pub previous_hash: String,
}

/// The ledger: ordered blocks, pending pool, and the rules to extend them.
#[derive(Debug, Clone)]
pub struct Ledger {
    /// Committed blocks, genesis first.
    chain: Vec<Block>,
    /// Transactions waiting for the next block.
    pool: TransactionPool,
    /// Configuration.
    config: LedgerConfig,
    validator: SubmissionValidator,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

impl Ledger {
    /// Create a new ledger holding only the genesis block.
    pub fn new(config: LedgerConfig) -> Self {
        let validator = SubmissionValidator::new(config.registration_policy);
        Self {
            chain: vec![Block::genesis()],
            pool: TransactionPool::new(),
            config,
            validator,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Committed blocks, genesis first.
    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    /// Number of committed blocks (equal to the tip height).
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// A ledger always holds at least genesis.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Height of the tip.
    pub fn height(&self) -> u64 {
        self.chain.len() as u64
    }

    pub fn pool(&self) -> &TransactionPool {
        &self.pool
    }

    /// Pending transactions in submission order.
    pub fn pending(&self) -> &[Transaction] {
        self.pool.as_slice()
    }

    /// Get the last block.
    pub fn get_previous_block(&self) -> Result<&Block> {
        self.chain.last().ok_or(LedgerError::EmptyChain)
    }

    /// Append a transaction to the pending pool without checking it.
    ///
    /// Returns the height of the block the transaction will land in.
    pub fn add_transaction(&mut self, tx: Transaction) -> u64 {
        debug!(vin = tx.vin(), kind = tx.kind(), "transaction added to pool");
        self.pool.push(tx);
        self.height() + 1
    }

    /// Validate a transaction against the VIN's current state, then add it.
    pub fn submit(&mut self, tx: Transaction) -> Result<u64> {
        let state = self.latest_vin_state(tx.vin());
        self.validator.validate(&tx, &state)?;
        Ok(self.add_transaction(tx))
    }

    /// Commit the whole pending pool as a new block.
    ///
    /// The pool is emptied and the block appended in one step. No checks are
    /// made on `nonce` or `previous_hash`; use [`Ledger::verify`] to audit.
    pub fn create_block(&mut self, nonce: u64, previous_hash: impl Into<String>) -> Block {
        let transactions = self.pool.drain();
        let block = Block::new(self.height() + 1, transactions, nonce, previous_hash);

        info!(
            height = block.height,
            txs = block.tx_count(),
            nonce,
            "block committed"
        );

        self.chain.push(block.clone());
        block
    }

    /// Nonce and hash of the tip, as inputs for the next nonce search.
    pub fn mining_target(&self) -> Result<MiningTarget> {
        let tip = self.get_previous_block()?;
        Ok(MiningTarget {
            height: tip.height,
            previous_nonce: tip.nonce,
            previous_hash: tip.hash_hex(),
        })
    }

    /// Search a nonce for the tip and commit the pool as a new block.
    ///
    /// Runs the search while holding `&mut self`; shared ledgers should use
    /// [`crate::SharedLedger::mine`] instead.
    pub fn mine(&mut self, token: &CancelToken) -> Result<Block> {
        let target = self.mining_target()?;
        let nonce = self
            .config
            .pow
            .search(target.previous_nonce, &target.previous_hash, token)?;
        Ok(self.create_block(nonce, target.previous_hash))
    }

    /// Projection over the current chain and pool.
    pub fn projector(&self) -> StateProjector<'_> {
        StateProjector::new(&self.chain, &self.pool)
    }

    /// Every transaction referring to `vin`, committed first, then pending.
    pub fn vin_history(&self, vin: &str) -> Vec<Transaction> {
        self.projector().vin_history(vin)
    }

    /// Current state of `vin`.
    pub fn latest_vin_state(&self, vin: &str) -> VinState {
        self.projector().latest_vin_state(vin)
    }

    /// Verify linkage and proof of work of the whole chain.
    pub fn verify(&self) -> std::result::Result<(), ChainError> {
        verify_chain(&self.chain, &self.config.pow)
    }

    /// Get ledger statistics.
    pub fn stats(&self) -> Result<LedgerStats> {
        let tip = self.get_previous_block()?;
        let pool = self.pool.stats();

        Ok(LedgerStats {
            height: tip.height,
            latest_block_hash: tip.hash_hex(),
            latest_timestamp: tip.timestamp,
            pending_transactions: pool.total_transactions,
            pending_vins: pool.unique_vins,
            difficulty_prefix: self.config.pow.difficulty_prefix().to_string(),
        })
    }
}

/// Check a block sequence for genesis shape, heights, hash links and proof
/// of work, reporting the first violation.
pub fn verify_chain(blocks: &[Block], pow: &ProofOfWork) -> std::result::Result<(), ChainError> {
    let genesis = blocks.first().ok_or(ChainError::Empty)?;
    if !genesis.is_genesis() {
        return Err(ChainError::InvalidGenesis);
    }

    for (index, pair) in blocks.windows(2).enumerate() {
        let (previous, block) = (&pair[0], &pair[1]);
        let expected = index as u64 + 2;

        if block.height != expected {
            return Err(ChainError::InvalidHeight {
                expected,
                got: block.height,
            });
        }
        if block.previous_hash != previous.hash_hex() {
            return Err(ChainError::BrokenLink {
                height: block.height,
            });
        }
        if !pow.is_valid(previous.nonce, &block.previous_hash, block.nonce) {
            return Err(ChainError::InvalidNonce {
                height: block.height,
            });
        }
    }

    Ok(())
}

/// Ledger statistics.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerStats {
    /// Current chain height.
    pub height: u64,
    /// Hash of the latest block.
    pub latest_block_hash: String,
    /// Timestamp of the latest block.
    pub latest_timestamp: f64,
    /// Number of pending transactions.
    pub pending_transactions: usize,
    /// Distinct VINs touched by pending transactions.
    pub pending_vins: usize,
    /// Proof of work difficulty prefix.
    pub difficulty_prefix: String,
}
