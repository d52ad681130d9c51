//! The asset record — the only entity in the simulation.
//!
//! Field order here IS the snapshot column order. Never reorder;
//! downstream consumers read columns by position as well as by name.

use crate::types::{AssetId, Timestamp};
use serde::{Deserialize, Serialize};

/// Location written into a record once it leaves active inventory.
pub const UNASSIGNED_LOCATION: &str = "unassigned";

/// Snapshot header, in serialization order.
pub const COLUMNS: [&str; 10] = [
    "id",
    "category",
    "manufacturer",
    "acquired_at",
    "location",
    "last_serviced_at",
    "next_service_due",
    "warranty_expires_at",
    "status",
    "disposed_at",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MotorCategory {
    AcMotor,
    DcMotor,
}

impl MotorCategory {
    pub const ALL: [MotorCategory; 2] = [Self::AcMotor, Self::DcMotor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AcMotor => "ac_motor",
            Self::DcMotor => "dc_motor",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    Available,
    InMaintenance,
    Disposed,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available     => "available",
            Self::InMaintenance => "in_maintenance",
            Self::Disposed      => "disposed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Disposed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetRecord {
    pub id:                  AssetId,
    pub category:            MotorCategory,
    pub manufacturer:        String,
    pub acquired_at:         Timestamp,
    pub location:            String,
    /// None until the first maintenance.
    pub last_serviced_at:    Option<Timestamp>,
    pub next_service_due:    Timestamp,
    pub warranty_expires_at: Timestamp,
    pub status:              AssetStatus,
    /// Set exactly once, on disposal.
    pub disposed_at:         Option<Timestamp>,
}

impl AssetRecord {
    pub fn is_disposed(&self) -> bool {
        self.status.is_terminal()
    }

    /// True while the asset sits in a warehouse aisle.
    pub fn is_in_warehouse(&self) -> bool {
        self.location.starts_with("Aisle")
    }

    pub(crate) fn dispose(&mut self, now: Timestamp) {
        self.status = AssetStatus::Disposed;
        self.location = UNASSIGNED_LOCATION.to_string();
        self.disposed_at = Some(now);
    }

    pub(crate) fn enter_maintenance(&mut self, now: Timestamp, next_due: Timestamp) {
        self.status = AssetStatus::InMaintenance;
        self.last_serviced_at = Some(now);
        self.next_service_due = next_due;
    }

    pub(crate) fn exit_maintenance(&mut self, next_due: Timestamp) {
        self.status = AssetStatus::Available;
        self.next_service_due = next_due;
    }
}
