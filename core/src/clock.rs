//! Simulation clock — owns tick state, pacing between ticks, and shutdown.

use crate::types::{Tick, Timestamp};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub current_tick: Tick,
    pub started_at:   Option<Timestamp>,
    pub last_tick_at: Option<Timestamp>,
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            current_tick: 0,
            started_at:   None,
            last_tick_at: None,
        }
    }

    /// Advance one tick stamped with `now`. Returns the new tick number.
    pub fn advance(&mut self, now: Timestamp) -> Tick {
        self.current_tick += 1;
        self.started_at.get_or_insert(now);
        self.last_tick_at = Some(now);
        self.current_tick
    }
}

impl Default for SimClock {
    fn default() -> Self { Self::new() }
}

/// Sleeps between ticks. Wakes early once shutdown is requested.
pub struct TickPacer {
    interval: Duration,
    rx:       Receiver<()>,
    stopped:  bool,
}

/// Cloneable trigger for a graceful stop. Triggering twice is harmless.
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: Sender<()>,
}

impl ShutdownHandle {
    pub fn trigger(&self) {
        // Receiver gone means the loop has already exited.
        let _ = self.tx.send(());
    }
}

impl TickPacer {
    pub fn new(interval: Duration) -> (Self, ShutdownHandle) {
        let (tx, rx) = mpsc::channel();
        let pacer = Self { interval, rx, stopped: false };
        (pacer, ShutdownHandle { tx })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Non-blocking check for a pending shutdown request.
    pub fn shutdown_requested(&mut self) -> bool {
        if !self.stopped && self.rx.try_recv().is_ok() {
            self.stopped = true;
        }
        self.stopped
    }

    /// Sleep for one interval. Returns false if shutdown was requested
    /// before or during the sleep.
    pub fn wait(&mut self) -> bool {
        if self.stopped {
            return false;
        }
        match self.rx.recv_timeout(self.interval) {
            Ok(()) => {
                self.stopped = true;
                false
            }
            Err(RecvTimeoutError::Timeout) => true,
            // Every handle dropped: nobody can stop us, keep pacing.
            Err(RecvTimeoutError::Disconnected) => {
                std::thread::sleep(self.interval);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn advance_counts_ticks_and_keeps_start_time() {
        let mut clock = SimClock::new();
        let t0 = chrono::Utc::now();
        let t1 = t0 + chrono::Duration::seconds(5);
        assert_eq!(clock.advance(t0), 1);
        assert_eq!(clock.advance(t1), 2);
        assert_eq!(clock.started_at, Some(t0));
        assert_eq!(clock.last_tick_at, Some(t1));
    }

    #[test]
    fn shutdown_interrupts_a_long_wait() {
        let (mut pacer, handle) = TickPacer::new(Duration::from_secs(30));
        let trigger = handle.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            trigger.trigger();
        });
        let started = Instant::now();
        assert!(!pacer.wait());
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(pacer.shutdown_requested());
        assert!(!pacer.wait());
    }

    #[test]
    fn wait_times_out_without_shutdown() {
        let (mut pacer, _handle) = TickPacer::new(Duration::from_millis(5));
        assert!(pacer.wait());
        assert!(!pacer.shutdown_requested());
    }
}
