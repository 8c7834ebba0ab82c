//! Derived per-vehicle state.

use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};

/// Current state of a VIN, derived by replaying its history.
///
/// Never stored: rebuild it with [`VinState::replay`] whenever it is needed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VinState {
    /// Whether a registration has been observed.
    pub exists: bool,
    /// Current owner, `None` while unregistered.
    pub owner: Option<String>,
    /// Last recorded mileage, `None` while unregistered.
    pub last_mileage: Option<f64>,
}

impl VinState {
    /// State of a VIN with no history.
    pub fn absent() -> Self {
        Self::default()
    }

    /// Fold one transaction into the state.
    ///
    /// Registration always resets owner and mileage. Transfers and odometer
    /// updates are ignored until the VIN is registered. Nothing is rejected
    /// here; business rules live in the submission validator.
    pub fn apply(&mut self, tx: &Transaction) {
        match tx {
            Transaction::RegisterVehicle { owner, .. } => {
                self.exists = true;
                self.owner = Some(owner.clone());
                self.last_mileage = Some(0.0);
            }
            Transaction::TransferOwnership { to, .. } if self.exists => {
                self.owner = Some(to.clone());
            }
            Transaction::OdometerUpdate { mileage, .. } if self.exists => {
                self.last_mileage = Some(*mileage);
            }
            _ => {}
        }
    }

    /// Fold an ordered history, left to right, from the absent state.
    pub fn replay<'a, I>(history: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        history.into_iter().fold(Self::absent(), |mut state, tx| {
            state.apply(tx);
            state
        })
    }
}
