//! Motor warehouse lifecycle simulator.
//!
//! A population of motors moves between `Available`, `InMaintenance`
//! and `Disposed` once per tick, new motors are admitted up to a
//! ceiling, and the whole population is written to a timestamped CSV
//! snapshot every tick.

pub mod asset;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod lifecycle;
pub mod rng;
pub mod snapshot;
pub mod store;
pub mod telemetry;
pub mod types;
