//! The simulation engine — one owned aggregate threaded through the loop.
//!
//! EXECUTION ORDER PER TICK (fixed, never reordered):
//!   1. Advance the clock
//!   2. Step every existing record (lifecycle)
//!   3. Possibly admit one new record (lifecycle)
//!   4. Export a snapshot of the whole population
//!   5. Publish a population summary to the telemetry sink
//!
//! RULES:
//!   - Everything inside a tick is synchronous; the exporter only
//!     reads the store after all mutation for the tick is done.
//!   - All randomness flows through the RngBank.
//!   - Export I/O failures abort the tick; they are never retried.

use crate::{
    clock::{SimClock, TickPacer},
    config::SimConfig,
    error::{SimError, SimResult},
    event::SimEvent,
    lifecycle::LifecycleEngine,
    rng::RngBank,
    snapshot::{SnapshotExporter, SnapshotReport},
    store::PopulationStore,
    telemetry::{TelemetryRecord, TelemetrySink},
    types::{Tick, Timestamp},
};
use std::path::Path;

/// Everything one tick produced.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub tick:     Tick,
    pub events:   Vec<SimEvent>,
    pub snapshot: Option<SnapshotReport>,
}

impl TickReport {
    pub fn admissions(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SimEvent::AssetAdmitted { .. }))
            .count()
    }
}

pub struct SimEngine {
    pub clock: SimClock,
    pub store: PopulationStore,
    config:    SimConfig,
    seed:      u64,
    lifecycle: LifecycleEngine,
    exporter:  SnapshotExporter,
    telemetry: Option<Box<dyn TelemetrySink>>,
}

impl SimEngine {
    /// Build an engine from a config. The config is validated here,
    /// so an engine never runs with out-of-range probabilities.
    pub fn new(config: SimConfig, seed: u64) -> SimResult<Self> {
        config.validate()?;
        let bank = RngBank::new(seed);
        Ok(Self {
            clock:     SimClock::new(),
            store:     PopulationStore::new(config.max_population),
            lifecycle: LifecycleEngine::new(&config, &bank),
            exporter:  SnapshotExporter::from_config(&config),
            telemetry: None,
            config,
            seed,
        })
    }

    /// Engine on the test config, writing snapshots into `output_dir`.
    pub fn build_test(output_dir: &Path, seed: u64) -> SimResult<Self> {
        let config = SimConfig {
            output_dir: output_dir.to_path_buf(),
            seed: Some(seed),
            ..SimConfig::default_test()
        };
        Self::new(config, seed)
    }

    pub fn with_telemetry(mut self, sink: Box<dyn TelemetrySink>) -> Self {
        self.telemetry = Some(sink);
        self
    }

    pub fn set_telemetry(&mut self, sink: Box<dyn TelemetrySink>) {
        self.telemetry = Some(sink);
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn exporter(&self) -> &SnapshotExporter {
        &self.exporter
    }

    /// Startup seeding: admit `initial_population` assets without the
    /// admission draw, so the first snapshot has rows. Bounded by the ceiling.
    pub fn seed_population(&mut self, now: Timestamp) -> Vec<SimEvent> {
        let tick = self.clock.current_tick;
        let wanted = self.config.initial_population.min(self.store.ceiling());
        let events: Vec<SimEvent> = (0..wanted)
            .filter_map(|_| self.lifecycle.admit_now(&mut self.store, tick, now))
            .collect();
        log::info!(
            "engine: seeded {} assets (ceiling {})",
            events.len(),
            self.store.ceiling()
        );
        events
    }

    /// Advance one tick. This is the core simulation step.
    pub fn tick(&mut self, now: Timestamp) -> SimResult<TickReport> {
        let tick = self.clock.advance(now);
        let mut events = vec![SimEvent::TickStarted { tick }];

        events.extend(self.lifecycle.step_all(&mut self.store, tick, now));
        events.extend(self.lifecycle.admit(&mut self.store, tick, now));

        let snapshot = match self.exporter.export(&self.store, tick, now) {
            Ok(report) => {
                events.push(SimEvent::SnapshotExported {
                    tick,
                    path: report.path.clone(),
                    rows: report.rows,
                });
                Some(report)
            }
            Err(SimError::EmptyPopulation) => {
                log::warn!("tick={tick} snapshot: skipped, population is empty");
                events.push(SimEvent::SnapshotSkipped {
                    tick,
                    reason: "population is empty".into(),
                });
                None
            }
            Err(e) => {
                log::error!("tick={tick} snapshot: {e}");
                return Err(e);
            }
        };

        self.publish_summary(tick);

        events.push(SimEvent::TickCompleted {
            tick,
            population: self.store.size(),
        });

        if log::log_enabled!(log::Level::Debug) {
            for event in &events {
                log::debug!("tick={tick} {} {}", event.type_name(), serde_json::to_string(event)?);
            }
        }

        Ok(TickReport { tick, events, snapshot })
    }

    /// Run the tick loop until `max_ticks` ticks have run (None = forever)
    /// or shutdown is requested. The in-flight tick always completes.
    /// Returns the number of ticks run.
    pub fn run(&mut self, pacer: &mut TickPacer, max_ticks: Option<u64>) -> SimResult<u64> {
        log::info!(
            "engine: starting seed={} interval={:?} ceiling={}",
            self.seed,
            pacer.interval(),
            self.store.ceiling()
        );
        let mut ran = 0u64;
        while !pacer.shutdown_requested() {
            self.tick(chrono::Utc::now())?;
            ran += 1;
            if max_ticks.is_some_and(|max| ran >= max) {
                break;
            }
            if !pacer.wait() {
                break;
            }
        }
        log::info!(
            "engine: stopped after {ran} ticks, population {}",
            self.store.size()
        );
        Ok(ran)
    }

    fn publish_summary(&mut self, tick: Tick) {
        let Some(sink) = self.telemetry.as_mut() else {
            return;
        };
        let counts = self.store.status_counts();
        let record: TelemetryRecord = [
            ("tick", tick.to_string()),
            ("size", self.store.size().to_string()),
            ("ceiling", self.store.ceiling().to_string()),
            ("available", counts.available.to_string()),
            ("in_maintenance", counts.in_maintenance.to_string()),
            ("disposed", counts.disposed.to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        let topic = format!("{}/population", self.config.telemetry_topic_prefix);
        sink.publish(&topic, &record);
    }
}
