//! Event Store Implementation

use crate::Reading;
use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Count and latest reading, taken under one lock
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSnapshot {
    pub count: usize,
    pub latest: Option<Reading>,
}

/// Append-only log of readings, kept for the lifetime of the process.
///
/// There is no eviction: the log grows by one entry per accepted reading.
/// At the sensor's reporting rate this is small, but a long-lived process
/// will eventually need retention here.
pub struct EventStore {
    log: Mutex<Vec<Reading>>,
}

impl EventStore {
    /// Create an empty store
    pub fn new() -> Self {
        info!("Creating in-memory event store");
        Self {
            log: Mutex::new(Vec::with_capacity(1024)),
        }
    }

    // A panic while holding the lock cannot leave a half-pushed Vec behind,
    // so a poisoned log is still consistent.
    fn lock(&self) -> MutexGuard<'_, Vec<Reading>> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a reading
    pub fn record(&self, reading: Reading) {
        let mut log = self.lock();
        log.push(reading);
        debug!("Recorded reading #{}", log.len());
    }

    /// Most recently recorded reading
    pub fn latest(&self) -> Option<Reading> {
        self.lock().last().cloned()
    }

    /// Number of readings recorded since start
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Count and latest reading as one consistent view
    pub fn snapshot(&self) -> StoreSnapshot {
        let log = self.lock();
        StoreSnapshot {
            count: log.len(),
            latest: log.last().cloned(),
        }
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MotorState;
    use std::sync::Arc;

    #[test]
    fn test_empty_store() {
        let store = EventStore::new();
        assert_eq!(store.count(), 0);
        assert!(store.latest().is_none());
        assert_eq!(
            store.snapshot(),
            StoreSnapshot {
                count: 0,
                latest: None
            }
        );
    }

    #[test]
    fn test_record_and_latest() {
        let store = EventStore::new();

        store.record(Reading::at(250.0, MotorState::Off, 1));
        store.record(Reading::at(150.0, MotorState::On, 2));
        store.record(Reading::at(140.0, MotorState::On, 3));

        assert_eq!(store.count(), 3);
        assert_eq!(store.latest(), Some(Reading::at(140.0, MotorState::On, 3)));
    }

    #[test]
    fn test_snapshot_json() {
        let store = EventStore::new();
        assert_eq!(
            serde_json::to_value(store.snapshot()).unwrap(),
            serde_json::json!({ "count": 0, "latest": null })
        );

        store.record(Reading::at(99.5, MotorState::On, 10));
        assert_eq!(
            serde_json::to_value(store.snapshot()).unwrap(),
            serde_json::json!({
                "count": 1,
                "latest": { "distance": 99.5, "motor": "ON", "ts": 10 }
            })
        );
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_all_kept() {
        let store = Arc::new(EventStore::new());

        let handles: Vec<_> = (0..8)
            .map(|task| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    for i in 0..50 {
                        store.record(Reading::at(i as f64, MotorState::Off, task * 100 + i));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.count(), 400);
    }
}
