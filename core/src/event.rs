//! Observable events emitted while a tick runs.
//!
//! The engine returns them from every tick and logs them at debug.
//! Variants are appended only — never removed or reordered.

use crate::{
    asset::MotorCategory,
    types::{AssetId, Tick},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine events ──────────────────────────────
    TickStarted {
        tick: Tick,
    },
    TickCompleted {
        tick: Tick,
        population: usize,
    },

    // ── Lifecycle events ───────────────────────────
    AssetAdmitted {
        tick: Tick,
        asset_id: AssetId,
        category: MotorCategory,
        manufacturer: String,
        location: String,
    },
    MaintenanceStarted {
        tick: Tick,
        asset_id: AssetId,
    },
    MaintenanceCompleted {
        tick: Tick,
        asset_id: AssetId,
    },
    AssetDisposed {
        tick: Tick,
        asset_id: AssetId,
    },

    // ── Export events ──────────────────────────────
    SnapshotExported {
        tick: Tick,
        path: PathBuf,
        rows: usize,
    },
    SnapshotSkipped {
        tick: Tick,
        reason: String,
    },
}

impl SimEvent {
    /// Stable name for the variant, used in logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::TickStarted { .. }          => "tick_started",
            Self::TickCompleted { .. }        => "tick_completed",
            Self::AssetAdmitted { .. }        => "asset_admitted",
            Self::MaintenanceStarted { .. }   => "maintenance_started",
            Self::MaintenanceCompleted { .. } => "maintenance_completed",
            Self::AssetDisposed { .. }        => "asset_disposed",
            Self::SnapshotExported { .. }     => "snapshot_exported",
            Self::SnapshotSkipped { .. }      => "snapshot_skipped",
        }
    }
}
