//! Process-wide configuration, read once at startup.
//!
//! Precedence, lowest to highest: built-in defaults, an optional JSON
//! file, then `MOTOR_SIM_*` environment variables. The resolved config
//! is validated before the engine is built and never mutated afterwards.

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const ENV_OUTPUT_DIR: &str = "MOTOR_SIM_OUTPUT_DIR";
pub const ENV_TICK_INTERVAL_SECS: &str = "MOTOR_SIM_TICK_INTERVAL_SECS";
pub const ENV_MAX_POPULATION: &str = "MOTOR_SIM_MAX_POPULATION";
pub const ENV_ADMISSION_PROBABILITY: &str = "MOTOR_SIM_ADMISSION_PROBABILITY";
pub const ENV_MAINTENANCE_EXIT_PROBABILITY: &str = "MOTOR_SIM_MAINTENANCE_EXIT_PROBABILITY";
pub const ENV_INITIAL_POPULATION: &str = "MOTOR_SIM_INITIAL_POPULATION";
pub const ENV_SEED: &str = "MOTOR_SIM_SEED";
pub const ENV_FILE_PREFIX: &str = "MOTOR_SIM_FILE_PREFIX";
pub const ENV_TELEMETRY_TOPIC: &str = "MOTOR_SIM_TELEMETRY_TOPIC";

/// Upper bound for every day offset in the catalog (about a century).
pub const MAX_DAY_OFFSET: u64 = 36_500;
/// Upper bound for warranty lengths.
pub const MAX_WARRANTY_YEARS: u32 = 100;

/// Relative weights of the three outcomes drawn for an `Available` asset.
/// Only the ratio matters; the default 1:1:2 gives 25% dispose,
/// 25% maintain and 50% stay.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AvailableWeights {
    pub dispose:  f64,
    pub maintain: f64,
    pub stay:     f64,
}

impl Default for AvailableWeights {
    fn default() -> Self {
        Self { dispose: 1.0, maintain: 1.0, stay: 2.0 }
    }
}

impl AvailableWeights {
    pub fn total(&self) -> f64 {
        self.dispose + self.maintain + self.stay
    }
}

/// Per-state transition probabilities. `Disposed` has no entry: it is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransitionTable {
    pub available: AvailableWeights,
    /// Chance per tick that an asset in maintenance returns to service.
    pub maintenance_exit_probability: f64,
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self {
            available: AvailableWeights::default(),
            maintenance_exit_probability: 0.3,
        }
    }
}

/// Fixed catalogs and date windows used when minting new assets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    pub manufacturers: Vec<String>,
    /// Storage locations. Anything starting with `Aisle` counts as
    /// "in the warehouse" for downstream consumers.
    pub aisles: Vec<String>,
    /// Window for the first (and post-maintenance) service due date.
    pub service_window_min_days: u64,
    pub service_window_max_days: u64,
    /// Service due offset applied when an asset enters maintenance.
    pub service_interval_days: u64,
    pub warranty_min_years: u32,
    pub warranty_max_years: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            manufacturers: vec![
                "Siemens".into(),
                "ABB".into(),
                "WEG".into(),
                "Nidec".into(),
                "Bosch Rexroth".into(),
            ],
            aisles: vec![
                "Aisle1".into(),
                "Aisle2".into(),
                "Aisle3".into(),
                "Aisle4".into(),
            ],
            service_window_min_days: 90,
            service_window_max_days: 180,
            service_interval_days:   180,
            warranty_min_years:      2,
            warranty_max_years:      5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub output_dir:             PathBuf,
    pub tick_interval_secs:     u64,
    /// Population ceiling enforced by admission.
    pub max_population:         usize,
    pub admission_probability:  f64,
    /// Assets admitted unconditionally before the first tick.
    pub initial_population:     usize,
    /// Master seed. None = derive from the wall clock at startup.
    pub seed:                   Option<u64>,
    pub file_prefix:            String,
    pub telemetry_topic_prefix: String,
    pub transitions:            TransitionTable,
    pub catalog:                CatalogConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            output_dir:             PathBuf::from("./output/motors"),
            tick_interval_secs:     5,
            max_population:         50,
            admission_probability:  0.5,
            initial_population:     1,
            seed:                   None,
            file_prefix:            "motors".into(),
            telemetry_topic_prefix: "warehouse/motors".into(),
            transitions:            TransitionTable::default(),
            catalog:                CatalogConfig::default(),
        }
    }
}

impl SimConfig {
    /// Load a JSON config file. Missing fields fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SimError::config("config_file", format!("cannot read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            SimError::config("config_file", format!("cannot parse {}: {e}", path.display()))
        })
    }

    /// Defaults, then the optional file, then the process environment.
    pub fn resolve(config_file: Option<&Path>) -> SimResult<Self> {
        let base = match config_file {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        let config = base.with_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `MOTOR_SIM_*` overrides read through `lookup`.
    /// Tests pass a closure over a map instead of touching the environment.
    pub fn with_overrides<F>(mut self, lookup: F) -> SimResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(v) = parse_var(&lookup, ENV_TICK_INTERVAL_SECS)? {
            self.tick_interval_secs = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_MAX_POPULATION)? {
            self.max_population = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_ADMISSION_PROBABILITY)? {
            self.admission_probability = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_MAINTENANCE_EXIT_PROBABILITY)? {
            self.transitions.maintenance_exit_probability = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_INITIAL_POPULATION)? {
            self.initial_population = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_SEED)? {
            self.seed = Some(v);
        }
        if let Some(prefix) = lookup(ENV_FILE_PREFIX) {
            self.file_prefix = prefix;
        }
        if let Some(topic) = lookup(ENV_TELEMETRY_TOPIC) {
            self.telemetry_topic_prefix = topic;
        }
        Ok(self)
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(SimError::config("output_dir", "must not be empty"));
        }
        if self.tick_interval_secs == 0 {
            return Err(SimError::config("tick_interval_secs", "must be at least 1"));
        }
        if self.max_population == 0 {
            return Err(SimError::config("max_population", "must be at least 1"));
        }
        check_probability("admission_probability", self.admission_probability)?;
        check_probability(
            "maintenance_exit_probability",
            self.transitions.maintenance_exit_probability,
        )?;

        let w = &self.transitions.available;
        for (key, value) in [("dispose", w.dispose), ("maintain", w.maintain), ("stay", w.stay)] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::config(
                    format!("transitions.available.{key}"),
                    format!("weight must be a non-negative number, got {value}"),
                ));
            }
        }
        if w.total() <= 0.0 {
            return Err(SimError::config("transitions.available", "weights sum to zero"));
        }

        if self.file_prefix.is_empty() || self.file_prefix.contains(['/', '\\']) {
            return Err(SimError::config("file_prefix", "must be a non-empty file name fragment"));
        }

        let c = &self.catalog;
        if c.manufacturers.is_empty() {
            return Err(SimError::config("catalog.manufacturers", "must not be empty"));
        }
        if c.aisles.is_empty() {
            return Err(SimError::config("catalog.aisles", "must not be empty"));
        }
        for (key, days) in [
            ("catalog.service_window_min_days", c.service_window_min_days),
            ("catalog.service_window_max_days", c.service_window_max_days),
            ("catalog.service_interval_days", c.service_interval_days),
        ] {
            if days > MAX_DAY_OFFSET {
                return Err(SimError::config(
                    key,
                    format!("must be at most {MAX_DAY_OFFSET} days, got {days}"),
                ));
            }
        }
        if c.service_window_min_days > c.service_window_max_days {
            return Err(SimError::config(
                "catalog.service_window_min_days",
                "must not exceed service_window_max_days",
            ));
        }
        if c.warranty_min_years > c.warranty_max_years {
            return Err(SimError::config(
                "catalog.warranty_min_years",
                "must not exceed warranty_max_years",
            ));
        }
        if c.warranty_max_years > MAX_WARRANTY_YEARS {
            return Err(SimError::config(
                "catalog.warranty_max_years",
                format!("must be at most {MAX_WARRANTY_YEARS} years, got {}", c.warranty_max_years),
            ));
        }
        if self.initial_population == 0 && self.admission_probability < 1.0 {
            return Err(SimError::config(
                "initial_population",
                "must be at least 1 unless admission_probability is 1.0",
            ));
        }
        Ok(())
    }

    /// Config with hardcoded defaults for use in tests.
    /// Output goes to a path the caller is expected to override.
    pub fn default_test() -> Self {
        Self {
            output_dir:         PathBuf::from("./target/motor-sim-test"),
            tick_interval_secs: 1,
            max_population:     10,
            seed:               Some(42),
            ..Self::default()
        }
    }
}

fn check_probability(key: &str, p: f64) -> SimResult<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(SimError::config(key, format!("probability must be within [0, 1], got {p}")))
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> SimResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| SimError::config(key, format!("cannot parse '{raw}': {e}"))),
    }
}
