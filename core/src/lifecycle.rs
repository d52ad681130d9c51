//! Lifecycle engine — the asset state machine and admission policy.
//!
//! STATE MACHINE (evaluated once per record per tick):
//!   Available     -> weighted draw: Dispose | Maintain | Stay
//!   InMaintenance -> Available with maintenance_exit_probability
//!   Disposed      -> terminal, never touched again
//!
//! RULES:
//!   - Every probability comes from the TransitionTable in SimConfig.
//!   - Transition, admission and catalog draws use separate RNG streams.
//!   - The ceiling is enforced before an asset is created, never after.

use crate::{
    asset::{AssetRecord, AssetStatus, MotorCategory},
    config::{AvailableWeights, CatalogConfig, SimConfig, TransitionTable},
    event::SimEvent,
    rng::{RngBank, SimRng, StreamSlot},
    store::PopulationStore,
    types::{Tick, Timestamp},
};
use chrono::{Months, TimeDelta};

/// Outcome of the weighted draw for an `Available` asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailableOutcome {
    Dispose,
    Maintain,
    Stay,
}

impl AvailableOutcome {
    /// Map a uniform roll in [0, 1) onto the weighted outcomes.
    pub fn from_roll(weights: &AvailableWeights, roll: f64) -> Self {
        let scaled = roll * weights.total();
        if scaled < weights.dispose {
            Self::Dispose
        } else if scaled < weights.dispose + weights.maintain {
            Self::Maintain
        } else {
            Self::Stay
        }
    }
}

pub struct LifecycleEngine {
    transitions:           TransitionTable,
    catalog:               CatalogConfig,
    admission_probability: f64,
    transition_rng:        SimRng,
    admission_rng:         SimRng,
    catalog_rng:           SimRng,
}

impl LifecycleEngine {
    pub fn new(config: &SimConfig, bank: &RngBank) -> Self {
        Self {
            transitions:           config.transitions,
            catalog:               config.catalog.clone(),
            admission_probability: config.admission_probability,
            transition_rng:        bank.for_stream(StreamSlot::Transition),
            admission_rng:         bank.for_stream(StreamSlot::Admission),
            catalog_rng:           bank.for_stream(StreamSlot::Catalog),
        }
    }

    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    /// Mint a new `Available` asset acquired at `now`.
    pub fn create_asset(&mut self, now: Timestamp) -> AssetRecord {
        let rng = &mut self.catalog_rng;
        let id = uuid::Builder::from_random_bytes(rng.next_bytes_16())
            .into_uuid()
            .to_string();

        let category = rng
            .pick(&MotorCategory::ALL)
            .copied()
            .unwrap_or(MotorCategory::AcMotor);
        let manufacturer = rng
            .pick(&self.catalog.manufacturers)
            .cloned()
            .unwrap_or_default();
        let location = rng
            .pick(&self.catalog.aisles)
            .cloned()
            .unwrap_or_default();

        let service_days = rng.range_inclusive(
            self.catalog.service_window_min_days,
            self.catalog.service_window_max_days,
        );
        let warranty_years = rng.range_inclusive(
            u64::from(self.catalog.warranty_min_years),
            u64::from(self.catalog.warranty_max_years),
        ) as u32;

        AssetRecord {
            id,
            category,
            manufacturer,
            acquired_at: now,
            location,
            last_serviced_at: None,
            next_service_due: add_days(now, service_days),
            warranty_expires_at: add_years(now, warranty_years),
            status: AssetStatus::Available,
            disposed_at: None,
        }
    }

    /// Admit one asset with `admission_probability`, unless the store is full.
    pub fn admit(
        &mut self,
        store: &mut PopulationStore,
        tick: Tick,
        now: Timestamp,
    ) -> Option<SimEvent> {
        if store.is_full() {
            return None;
        }
        if !self.admission_rng.chance(self.admission_probability) {
            return None;
        }
        self.admit_now(store, tick, now)
    }

    /// Admit one asset without the admission draw. Still bounded by the ceiling.
    pub fn admit_now(
        &mut self,
        store: &mut PopulationStore,
        tick: Tick,
        now: Timestamp,
    ) -> Option<SimEvent> {
        if store.is_full() {
            return None;
        }
        let asset = self.create_asset(now);
        let event = SimEvent::AssetAdmitted {
            tick,
            asset_id:     asset.id.clone(),
            category:     asset.category,
            manufacturer: asset.manufacturer.clone(),
            location:     asset.location.clone(),
        };
        let (id, size_before) = (asset.id.clone(), store.size());
        if !store.add(asset) {
            return None;
        }
        log::info!(
            "tick={tick} lifecycle: admitted {id} ({}/{})",
            size_before + 1,
            store.ceiling()
        );
        Some(event)
    }

    /// Advance one record by exactly one step.
    pub fn step(&mut self, record: &mut AssetRecord, tick: Tick, now: Timestamp) -> Option<SimEvent> {
        match record.status {
            AssetStatus::Available => {
                let roll = self.transition_rng.next_f64();
                match AvailableOutcome::from_roll(&self.transitions.available, roll) {
                    AvailableOutcome::Dispose => {
                        record.dispose(now);
                        log::info!("tick={tick} lifecycle: disposed {}", record.id);
                        Some(SimEvent::AssetDisposed {
                            tick,
                            asset_id: record.id.clone(),
                        })
                    }
                    AvailableOutcome::Maintain => {
                        let due = add_days(now, self.catalog.service_interval_days);
                        record.enter_maintenance(now, due);
                        log::debug!("tick={tick} lifecycle: {} entered maintenance", record.id);
                        Some(SimEvent::MaintenanceStarted {
                            tick,
                            asset_id: record.id.clone(),
                        })
                    }
                    AvailableOutcome::Stay => None,
                }
            }
            AssetStatus::InMaintenance => {
                if !self
                    .transition_rng
                    .chance(self.transitions.maintenance_exit_probability)
                {
                    return None;
                }
                let days = self.transition_rng.range_inclusive(
                    self.catalog.service_window_min_days,
                    self.catalog.service_window_max_days,
                );
                record.exit_maintenance(add_days(now, days));
                log::debug!("tick={tick} lifecycle: {} back in service", record.id);
                Some(SimEvent::MaintenanceCompleted {
                    tick,
                    asset_id: record.id.clone(),
                })
            }
            AssetStatus::Disposed => None,
        }
    }

    /// Step every record in store order.
    pub fn step_all(
        &mut self,
        store: &mut PopulationStore,
        tick: Tick,
        now: Timestamp,
    ) -> Vec<SimEvent> {
        store
            .all_mut()
            .filter_map(|record| self.step(record, tick, now))
            .collect()
    }
}

/// Saturates at `t` itself if the offset leaves chrono's range.
/// Validated configs never get there.
fn add_days(t: Timestamp, days: u64) -> Timestamp {
    i64::try_from(days)
        .ok()
        .and_then(TimeDelta::try_days)
        .and_then(|offset| t.checked_add_signed(offset))
        .unwrap_or(t)
}

fn add_years(t: Timestamp, years: u32) -> Timestamp {
    t.checked_add_months(Months::new(years.saturating_mul(12)))
        .unwrap_or_else(|| add_days(t, u64::from(years) * 365))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_split_25_25_50() {
        let w = AvailableWeights::default();
        assert_eq!(AvailableOutcome::from_roll(&w, 0.0), AvailableOutcome::Dispose);
        assert_eq!(AvailableOutcome::from_roll(&w, 0.24), AvailableOutcome::Dispose);
        assert_eq!(AvailableOutcome::from_roll(&w, 0.25), AvailableOutcome::Maintain);
        assert_eq!(AvailableOutcome::from_roll(&w, 0.49), AvailableOutcome::Maintain);
        assert_eq!(AvailableOutcome::from_roll(&w, 0.50), AvailableOutcome::Stay);
        assert_eq!(AvailableOutcome::from_roll(&w, 0.99), AvailableOutcome::Stay);
    }

    #[test]
    fn date_offsets_saturate_instead_of_overflowing() {
        let near_end = Timestamp::MAX_UTC - TimeDelta::days(10);
        assert_eq!(add_days(near_end, 1_000_000_000), near_end);
        assert_eq!(add_days(near_end, u64::MAX), near_end);
        assert_eq!(add_years(near_end, u32::MAX), near_end);

        let t: Timestamp = "1970-01-01T00:00:00Z".parse().unwrap();
        assert_eq!(add_days(t, 1), t + TimeDelta::days(1));
        assert_eq!(add_years(t, 1).to_rfc3339(), "1971-01-01T00:00:00+00:00");
    }

    #[test]
    fn zero_weight_outcomes_are_never_drawn() {
        let only_stay = AvailableWeights { dispose: 0.0, maintain: 0.0, stay: 1.0 };
        let only_maintain = AvailableWeights { dispose: 0.0, maintain: 3.0, stay: 0.0 };
        for roll in [0.0, 0.3, 0.6, 0.999_999] {
            assert_eq!(AvailableOutcome::from_roll(&only_stay, roll), AvailableOutcome::Stay);
            assert_eq!(
                AvailableOutcome::from_roll(&only_maintain, roll),
                AvailableOutcome::Maintain
            );
        }
    }
}
