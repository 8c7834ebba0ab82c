//! Submission rules for vehicle transactions.
//!
//! Every transaction is checked against the VIN's current projected state
//! before it may enter the pending pool. The ledger itself knows nothing about
//! these rules.

use carchain_core::{Transaction, VinState};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during validation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("VIN {vin} already registered")]
    DuplicateRegistration { vin: String },

    #[error("VIN {vin} not registered")]
    UnknownVin { vin: String },

    #[error("transfer denied: incorrect owner (current owner {expected:?}, got {got:?})")]
    OwnershipMismatch { expected: Option<String>, got: String },

    #[error("invalid mileage: cannot decrease (last {last}, got {attempted})")]
    MileageRegression { last: f64, attempted: f64 },
}

pub type Result<T> = std::result::Result<T, ValidationError>;

/// What to do with a registration for a VIN that already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationPolicy {
    /// Reject with [`ValidationError::DuplicateRegistration`].
    #[default]
    Reject,
    /// Accept; the projection resets owner and mileage.
    AllowReset,
}

/// Transaction validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionValidator {
    registration_policy: RegistrationPolicy,
}

impl SubmissionValidator {
    pub fn new(registration_policy: RegistrationPolicy) -> Self {
        Self {
            registration_policy,
        }
    }

    pub fn registration_policy(&self) -> RegistrationPolicy {
        self.registration_policy
    }

    /// Shape checks that need no ledger state.
    pub fn validate_format(tx: &Transaction) -> Result<()> {
        if tx.vin().trim().is_empty() {
            return Err(ValidationError::Malformed("vin must not be empty".into()));
        }
        if !tx.timestamp().is_finite() {
            return Err(ValidationError::Malformed("timestamp must be a finite number".into()));
        }

        match tx {
            Transaction::RegisterVehicle { owner, .. } => {
                if owner.trim().is_empty() {
                    return Err(ValidationError::Malformed("owner must not be empty".into()));
                }
            }
            Transaction::TransferOwnership { from, to, .. } => {
                if from.trim().is_empty() || to.trim().is_empty() {
                    return Err(ValidationError::Malformed(
                        "from and to owners must not be empty".into(),
                    ));
                }
            }
            Transaction::OdometerUpdate { mileage, .. } => {
                if !mileage.is_finite() || *mileage < 0.0 {
                    return Err(ValidationError::Malformed(
                        "mileage must be a non-negative number".into(),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Full validation of `tx` against the VIN's current state.
    ///
    /// `state` must be the projection of the same VIN taken immediately
    /// before the transaction is added to the pool.
    pub fn validate(&self, tx: &Transaction, state: &VinState) -> Result<()> {
        Self::validate_format(tx)?;

        match tx {
            Transaction::RegisterVehicle { vin, .. } => {
                if state.exists && self.registration_policy == RegistrationPolicy::Reject {
                    return Err(ValidationError::DuplicateRegistration { vin: vin.clone() });
                }
            }
            Transaction::TransferOwnership { vin, from, .. } => {
                if !state.exists {
                    return Err(ValidationError::UnknownVin { vin: vin.clone() });
                }
                if state.owner.as_deref() != Some(from.as_str()) {
                    return Err(ValidationError::OwnershipMismatch {
                        expected: state.owner.clone(),
                        got: from.clone(),
                    });
                }
            }
            Transaction::OdometerUpdate { vin, mileage, .. } => {
                if !state.exists {
                    return Err(ValidationError::UnknownVin { vin: vin.clone() });
                }
                if let Some(last) = state.last_mileage {
                    if *mileage < last {
                        return Err(ValidationError::MileageRegression {
                            last,
                            attempted: *mileage,
                        });
                    }
                }
            }
        }

        Ok(())
    }
}
