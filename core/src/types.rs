//! Shared primitive types used across the entire simulation.

use chrono::{DateTime, Utc};

/// A simulation tick. One tick = one pass of the generator loop.
pub type Tick = u64;

/// A stable, unique identifier for an asset in the population.
pub type AssetId = String;

/// Wall-clock instant attached to every tick.
pub type Timestamp = DateTime<Utc>;
