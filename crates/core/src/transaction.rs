//! Vehicle lifecycle transactions.

use crate::hash::{hash_canonical, Hash};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A vehicle lifecycle event recorded on the ledger.
///
/// On the wire this is a JSON object tagged by a `type` field
/// (`register_vehicle`, `transfer_ownership` or `odometer_update`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transaction {
    /// First appearance of a vehicle on the ledger.
    RegisterVehicle {
        vin: String,
        owner: String,
        /// Unix timestamp in seconds (fractional).
        timestamp: f64,
    },
    /// Hand-over of a vehicle from one owner to the next.
    TransferOwnership {
        vin: String,
        from: String,
        to: String,
        timestamp: f64,
    },
    /// A new odometer reading.
    OdometerUpdate {
        vin: String,
        mileage: f64,
        timestamp: f64,
    },
}

impl Transaction {
    /// Create a registration stamped with the current time.
    pub fn register(vin: impl Into<String>, owner: impl Into<String>) -> Self {
        Self::RegisterVehicle {
            vin: vin.into(),
            owner: owner.into(),
            timestamp: current_timestamp(),
        }
    }

    /// Create an ownership transfer stamped with the current time.
    pub fn transfer(vin: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::TransferOwnership {
            vin: vin.into(),
            from: from.into(),
            to: to.into(),
            timestamp: current_timestamp(),
        }
    }

    /// Create an odometer update stamped with the current time.
    pub fn odometer(vin: impl Into<String>, mileage: f64) -> Self {
        Self::OdometerUpdate {
            vin: vin.into(),
            mileage,
            timestamp: current_timestamp(),
        }
    }

    /// The VIN this transaction refers to.
    pub fn vin(&self) -> &str {
        match self {
            Self::RegisterVehicle { vin, .. }
            | Self::TransferOwnership { vin, .. }
            | Self::OdometerUpdate { vin, .. } => vin,
        }
    }

    pub fn timestamp(&self) -> f64 {
        match self {
            Self::RegisterVehicle { timestamp, .. }
            | Self::TransferOwnership { timestamp, .. }
            | Self::OdometerUpdate { timestamp, .. } => *timestamp,
        }
    }

    /// The wire tag of this transaction.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RegisterVehicle { .. } => "register_vehicle",
            Self::TransferOwnership { .. } => "transfer_ownership",
            Self::OdometerUpdate { .. } => "odometer_update",
        }
    }

    /// Check whether this transaction refers to the given VIN.
    pub fn is_for(&self, vin: &str) -> bool {
        self.vin() == vin
    }

    /// Content hash of the transaction's canonical encoding.
    pub fn hash(&self) -> Hash {
        hash_canonical(self)
    }
}

/// Get the current Unix timestamp in fractional seconds.
pub fn current_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_wire_format() {
        let tx = Transaction::RegisterVehicle {
            vin: "1HGCM82633A123456".into(),
            owner: "Alice".into(),
            timestamp: 1713050000.5,
        };

        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "register_vehicle",
                "vin": "1HGCM82633A123456",
                "owner": "Alice",
                "timestamp": 1713050000.5
            })
        );
    }

    #[test]
    fn test_transfer_from_wire() {
        let tx: Transaction = serde_json::from_value(json!({
            "type": "transfer_ownership",
            "vin": "VIN1",
            "from": "Alice",
            "to": "Bob",
            "timestamp": 1.0
        }))
        .unwrap();

        assert_eq!(tx.kind(), "transfer_ownership");
        assert_eq!(tx.vin(), "VIN1");
        assert!(matches!(tx, Transaction::TransferOwnership { ref to, .. } if to == "Bob"));
    }

    #[test]
    fn test_odometer_accepts_integer_mileage() {
        let tx: Transaction = serde_json::from_value(json!({
            "type": "odometer_update",
            "vin": "VIN1",
            "mileage": 15000,
            "timestamp": 2
        }))
        .unwrap();

        assert!(matches!(tx, Transaction::OdometerUpdate { mileage, .. } if mileage == 15000.0));
        assert_eq!(tx.timestamp(), 2.0);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result: Result<Transaction, _> = serde_json::from_value(json!({
            "type": "deregister_vehicle",
            "vin": "VIN1",
            "timestamp": 1.0
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_field_rejected() {
        let result: Result<Transaction, _> = serde_json::from_value(json!({
            "type": "register_vehicle",
            "vin": "VIN1",
            "timestamp": 1.0
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_constructors_stamp_time() {
        let tx = Transaction::odometer("VIN1", 10.0);
        assert!(tx.timestamp() > 0.0);
        assert!(tx.is_for("VIN1"));
        assert!(!tx.is_for("VIN2"));
    }

    #[test]
    fn test_transaction_hash_depends_on_content() {
        let a = Transaction::OdometerUpdate {
            vin: "VIN1".into(),
            mileage: 10.0,
            timestamp: 1.0,
        };
        let mut b = a.clone();
        assert_eq!(a.hash(), b.hash());

        if let Transaction::OdometerUpdate { mileage, .. } = &mut b {
            *mileage = 11.0;
        }
        assert_ne!(a.hash(), b.hash());
    }
}
