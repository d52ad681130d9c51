//! In-memory population store.
//!
//! RULE: Only the lifecycle engine mutates records.
//! Records are appended, never removed; the store only grows
//! until the ceiling is reached.

use crate::{
    asset::{AssetRecord, AssetStatus},
    types::AssetId,
};
use std::collections::HashSet;

pub struct PopulationStore {
    records: Vec<AssetRecord>,
    ids:     HashSet<AssetId>,
    ceiling: usize,
}

impl PopulationStore {
    pub fn new(ceiling: usize) -> Self {
        Self {
            records: Vec::with_capacity(ceiling.min(1024)),
            ids:     HashSet::new(),
            ceiling,
        }
    }

    /// Append a record. Returns false, leaving the store untouched,
    /// when the store is full or the id is already taken.
    /// Callers are expected to check `is_full()` first.
    pub fn add(&mut self, record: AssetRecord) -> bool {
        if self.is_full() {
            log::warn!(
                "store: rejected {}: population at ceiling {}",
                record.id,
                self.ceiling
            );
            return false;
        }
        if !self.ids.insert(record.id.clone()) {
            log::warn!("store: rejected {}: duplicate id", record.id);
            return false;
        }
        self.records.push(record);
        true
    }

    /// All records in insertion order. Cheap to call repeatedly.
    pub fn all(&self) -> impl Iterator<Item = &AssetRecord> + '_ {
        self.records.iter()
    }

    pub(crate) fn all_mut(&mut self) -> impl Iterator<Item = &mut AssetRecord> + '_ {
        self.records.iter_mut()
    }

    pub fn get(&self, id: &str) -> Option<&AssetRecord> {
        if !self.ids.contains(id) {
            return None;
        }
        self.records.iter().find(|r| r.id == id)
    }

    pub fn size(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.ceiling
    }

    pub fn status_counts(&self) -> StatusCounts {
        self.records.iter().fold(StatusCounts::default(), |mut acc, r| {
            match r.status {
                AssetStatus::Available     => acc.available += 1,
                AssetStatus::InMaintenance => acc.in_maintenance += 1,
                AssetStatus::Disposed      => acc.disposed += 1,
            }
            acc
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct StatusCounts {
    pub available:      usize,
    pub in_maintenance: usize,
    pub disposed:       usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.available + self.in_maintenance + self.disposed
    }
}
