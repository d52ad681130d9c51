//! Telemetry sink — the only contract the core has with a publisher.
//!
//! RULE: publishing is best-effort. A sink never fails the tick and
//! never reports back; transport, topic layout and connection
//! lifecycle belong to the sink implementation.

use std::collections::BTreeMap;

/// A flat key/value reading. Ordered so published payloads are stable.
pub type TelemetryRecord = BTreeMap<String, String>;

pub trait TelemetrySink: Send {
    fn publish(&mut self, topic: &str, record: &TelemetryRecord);
}

/// Writes each record as a JSON line on the `telemetry` log target.
#[derive(Debug, Default)]
pub struct LogSink;

impl TelemetrySink for LogSink {
    fn publish(&mut self, topic: &str, record: &TelemetryRecord) {
        match serde_json::to_string(record) {
            Ok(payload) => log::info!(target: "telemetry", "{topic} {payload}"),
            Err(e) => log::warn!(target: "telemetry", "{topic}: dropped record: {e}"),
        }
    }
}

/// Keeps everything it is handed. Useful for tests and tooling.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub published: Vec<(String, TelemetryRecord)>,
}

impl TelemetrySink for RecordingSink {
    fn publish(&mut self, topic: &str, record: &TelemetryRecord) {
        self.published.push((topic.to_string(), record.clone()));
    }
}

/// Sink that hands records to a shared RecordingSink, so a test can
/// keep a handle while the engine owns the boxed sink.
impl TelemetrySink for std::sync::Arc<std::sync::Mutex<RecordingSink>> {
    fn publish(&mut self, topic: &str, record: &TelemetryRecord) {
        if let Ok(mut inner) = self.lock() {
            inner.publish(topic, record);
        }
    }
}
