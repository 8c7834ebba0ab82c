//! Proof of Work nonce search.
//!
//! A nonce is valid for a block when the hex digest of
//! `previous_nonce || previous_hash || nonce` (decimal integers, plain string
//! concatenation) starts with the difficulty prefix. The search walks nonces
//! upward from zero, so the nonce it returns is always the smallest valid one.

use carchain_core::hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Default difficulty: four leading hex zeros (16 bits).
pub const DEFAULT_DIFFICULTY_PREFIX: &str = "0000";

/// Candidates tried between two checks of the cancel token.
const POLL_INTERVAL: u64 = 1024;

/// Errors and non-success outcomes of the nonce search.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PowError {
    #[error("difficulty prefix must be lowercase hex, got {0:?}")]
    InvalidDifficulty(String),

    #[error("nonce search cancelled after {attempts} attempts")]
    Cancelled { attempts: u64 },

    #[error("nonce search exceeded its deadline after {attempts} attempts")]
    DeadlineExceeded { attempts: u64 },

    #[error("nonce space exhausted")]
    Exhausted,
}

pub type Result<T> = std::result::Result<T, PowError>;

/// Cooperative stop signal for a running search.
///
/// Clones share the same flag, so a token handed to a worker can be
/// cancelled from anywhere else.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// A token that is never cancelled unless asked to.
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that also expires after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancelled: Arc::default(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Request the search to stop.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Check the token, mapping a stop request to the matching error.
    fn check(&self, attempts: u64) -> Result<()> {
        if self.is_cancelled() {
            return Err(PowError::Cancelled { attempts });
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(PowError::DeadlineExceeded { attempts });
        }
        Ok(())
    }
}

/// Proof of Work parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty_prefix: String,
}

impl Default for ProofOfWork {
    fn default() -> Self {
        Self {
            difficulty_prefix: DEFAULT_DIFFICULTY_PREFIX.to_string(),
        }
    }
}

impl ProofOfWork {
    /// Create a new ProofOfWork with the given difficulty prefix.
    ///
    /// The prefix is compared against a lowercase hex digest, so anything
    /// outside `[0-9a-f]` could never match.
    pub fn new(difficulty_prefix: impl Into<String>) -> Result<Self> {
        let difficulty_prefix = difficulty_prefix.into();
        if !difficulty_prefix
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        {
            return Err(PowError::InvalidDifficulty(difficulty_prefix));
        }
        Ok(Self { difficulty_prefix })
    }

    pub fn difficulty_prefix(&self) -> &str {
        &self.difficulty_prefix
    }

    /// Hex digest of one candidate.
    pub fn digest(previous_nonce: u64, previous_hash: &str, nonce: u64) -> String {
        hash(format!("{previous_nonce}{previous_hash}{nonce}").as_bytes()).to_hex()
    }

    /// Check whether `nonce` satisfies the difficulty predicate.
    pub fn is_valid(&self, previous_nonce: u64, previous_hash: &str, nonce: u64) -> bool {
        Self::digest(previous_nonce, previous_hash, nonce).starts_with(&self.difficulty_prefix)
    }

    /// Find the smallest valid nonce, running until one is found.
    pub fn find_nonce(&self, previous_nonce: u64, previous_hash: &str) -> Result<u64> {
        self.search(previous_nonce, previous_hash, &CancelToken::new())
    }

    /// Find the smallest valid nonce, stopping early if `token` says so.
    ///
    /// The token is polled between candidates, never instead of one, so a
    /// returned nonce is minimal regardless of how often polling happens.
    pub fn search(&self, previous_nonce: u64, previous_hash: &str, token: &CancelToken) -> Result<u64> {
        let started = Instant::now();
        let mut nonce: u64 = 0;

        loop {
            if nonce % POLL_INTERVAL == 0 {
                if let Err(e) = token.check(nonce) {
                    warn!(attempts = nonce, error = %e, "nonce search stopped");
                    return Err(e);
                }
            }

            if self.is_valid(previous_nonce, previous_hash, nonce) {
                debug!(
                    nonce,
                    previous_nonce,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "found nonce"
                );
                return Ok(nonce);
            }

            nonce = nonce.checked_add(1).ok_or(PowError::Exhausted)?;
        }
    }
}

/// Find the smallest nonce for `difficulty_prefix`, without cancellation.
pub fn find_nonce(previous_nonce: u64, previous_hash: &str, difficulty_prefix: &str) -> Result<u64> {
    ProofOfWork::new(difficulty_prefix)?.find_nonce(previous_nonce, previous_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREV_HASH: &str = "5feceb66ffc86f38d952786c6d696c79c2dbc239dd4e91b46729d73a27fb57e9";

    fn assert_minimal(pow: &ProofOfWork, previous_nonce: u64, previous_hash: &str, nonce: u64) {
        assert!(pow.is_valid(previous_nonce, previous_hash, nonce));
        for smaller in 0..nonce {
            assert!(
                !pow.is_valid(previous_nonce, previous_hash, smaller),
                "nonce {} is valid but {} was returned",
                smaller,
                nonce
            );
        }
    }

    #[test]
    fn test_default_difficulty() {
        assert_eq!(ProofOfWork::default().difficulty_prefix(), "0000");
    }

    #[test]
    fn test_invalid_difficulty_rejected() {
        assert!(matches!(
            ProofOfWork::new("00G"),
            Err(PowError::InvalidDifficulty(_))
        ));
        assert!(ProofOfWork::new("00A").is_err());
        assert!(ProofOfWork::new("0a").is_ok());
    }

    #[test]
    fn test_empty_prefix_accepts_zero() {
        let pow = ProofOfWork::new("").unwrap();
        assert_eq!(pow.find_nonce(1, PREV_HASH).unwrap(), 0);
    }

    #[test]
    fn test_find_nonce_is_minimal_low_difficulty() {
        let pow = ProofOfWork::new("00").unwrap();
        for previous_nonce in [0, 1, 7, 12345] {
            let nonce = pow.find_nonce(previous_nonce, PREV_HASH).unwrap();
            assert_minimal(&pow, previous_nonce, PREV_HASH, nonce);
        }
    }

    #[test]
    fn test_find_nonce_is_minimal_default_difficulty() {
        let pow = ProofOfWork::default();
        let nonce = pow.find_nonce(1, PREV_HASH).unwrap();
        assert_minimal(&pow, 1, PREV_HASH, nonce);
        assert!(ProofOfWork::digest(1, PREV_HASH, nonce).starts_with("0000"));
    }

    #[test]
    fn test_free_function_matches_method() {
        let pow = ProofOfWork::new("0").unwrap();
        assert_eq!(
            find_nonce(3, PREV_HASH, "0").unwrap(),
            pow.find_nonce(3, PREV_HASH).unwrap()
        );
        assert!(find_nonce(3, PREV_HASH, "xyz").is_err());
    }

    #[test]
    fn test_digest_uses_string_concatenation() {
        assert_eq!(
            ProofOfWork::digest(12, "ab", 3),
            hash(b"12ab3").to_hex()
        );
    }

    #[test]
    fn test_cancelled_search() {
        // A full-length prefix is unreachable in practice.
        let pow = ProofOfWork::new("0".repeat(64)).unwrap();
        let token = CancelToken::new();
        token.cancel();

        assert_eq!(
            pow.search(1, PREV_HASH, &token),
            Err(PowError::Cancelled { attempts: 0 })
        );
    }

    #[test]
    fn test_cancel_from_another_thread() {
        let pow = ProofOfWork::new("0".repeat(64)).unwrap();
        let token = CancelToken::new();
        let remote = token.clone();

        let worker = std::thread::spawn(move || pow.search(1, PREV_HASH, &remote));
        std::thread::sleep(Duration::from_millis(20));
        token.cancel();

        assert!(matches!(
            worker.join().unwrap(),
            Err(PowError::Cancelled { .. })
        ));
    }

    #[test]
    fn test_deadline_exceeded() {
        let pow = ProofOfWork::new("0".repeat(64)).unwrap();
        let token = CancelToken::with_timeout(Duration::from_millis(10));

        assert!(matches!(
            pow.search(1, PREV_HASH, &token),
            Err(PowError::DeadlineExceeded { .. })
        ));
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_generous_deadline_still_finds_minimal_nonce() {
        let pow = ProofOfWork::new("00").unwrap();
        let token = CancelToken::with_timeout(Duration::from_secs(60));
        let nonce = pow.search(5, PREV_HASH, &token).unwrap();
        assert_minimal(&pow, 5, PREV_HASH, nonce);
    }
}
