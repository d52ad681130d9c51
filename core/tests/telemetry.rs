//! The engine publishes one population summary per tick.

use chrono::{Duration, TimeZone, Utc};
use motor_sim_core::{
    engine::SimEngine,
    telemetry::{LogSink, RecordingSink, TelemetryRecord, TelemetrySink},
};
use std::sync::{Arc, Mutex};

#[test]
fn summary_is_published_every_tick() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(Mutex::new(RecordingSink::default()));
    let mut engine = SimEngine::build_test(dir.path(), 21)
        .unwrap()
        .with_telemetry(Box::new(sink.clone()));
    let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
    engine.seed_population(t0);

    for tick in 1..=5i64 {
        engine.tick(t0 + Duration::seconds(tick)).unwrap();
    }

    let guard = sink.lock().unwrap();
    let published = &guard.published;
    assert_eq!(published.len(), 5);
    for (i, (topic, record)) in published.iter().enumerate() {
        assert_eq!(topic, "warehouse/motors/population");
        assert_eq!(record["tick"], (i + 1).to_string());
        let parts: usize = ["available", "in_maintenance", "disposed"]
            .iter()
            .map(|k| record[*k].parse::<usize>().unwrap())
            .sum();
        assert_eq!(record["size"].parse::<usize>().unwrap(), parts);
    }

    let last = &published[4].1;
    assert_eq!(last["size"], engine.store.size().to_string());
}

#[test]
fn log_sink_accepts_any_flat_record() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut record = TelemetryRecord::new();
    record.insert("temperature".into(), "41.5".into());
    record.insert("motor".into(), "m-1".into());
    LogSink.publish("warehouse/motors/m-1", &record);
    LogSink.publish("warehouse/motors/empty", &TelemetryRecord::new());
}
