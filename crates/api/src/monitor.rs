//! Drainage Monitor Service
//!
//! Owns the event store, the alert debouncer and the notifier. Recording a
//! reading and deciding whether to alert happen under the debouncer lock;
//! the delivery itself runs outside it against a reservation.

use alerting::{AlertConfig, AlertDebouncer, Reservation};
use metrics::counter;
use notifier::{Notifier, NotifierInfo, NotifyError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use storage::{EventStore, Reading, StoreSnapshot};
use tokio::time::{timeout, Instant};
use tracing::{error, info, warn};

/// Default bound on a single delivery attempt
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(30);

/// What happened to an ingested reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Stored; level not critical
    Recorded,
    /// Stored and an alert was delivered
    AlertDelivered,
    /// Stored; delivery failed or timed out
    AlertFailed,
    /// Stored; alert suppressed. `remaining` is `None` while another
    /// delivery is in flight.
    Suppressed { remaining: Option<Duration> },
}

fn lock(debouncer: &Mutex<AlertDebouncer>) -> MutexGuard<'_, AlertDebouncer> {
    debouncer.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Reservation tied to the debouncer it came from.
///
/// Released on drop, so a cancelled request cannot leave the debouncer
/// stuck in the delivering state.
struct PendingAlert<'a> {
    debouncer: &'a Mutex<AlertDebouncer>,
    reservation: Option<Reservation>,
}

impl PendingAlert<'_> {
    fn resolve(mut self, delivered: bool) {
        if let Some(reservation) = self.reservation.take() {
            let mut debouncer = lock(self.debouncer);
            if delivered {
                debouncer.commit(reservation);
            } else {
                debouncer.release(reservation);
            }
        }
    }
}

impl Drop for PendingAlert<'_> {
    fn drop(&mut self) {
        if let Some(reservation) = self.reservation.take() {
            warn!("Alert delivery abandoned before completion");
            lock(self.debouncer).release(reservation);
        }
    }
}

/// Process-wide monitor state
pub struct DrainageMonitor {
    config: AlertConfig,
    store: EventStore,
    debouncer: Mutex<AlertDebouncer>,
    notifier: Arc<dyn Notifier>,
    delivery_timeout: Duration,
}

impl DrainageMonitor {
    /// Create a monitor with an empty store and a ready debouncer
    pub fn new(config: AlertConfig, notifier: Arc<dyn Notifier>, delivery_timeout: Duration) -> Self {
        info!(
            "Email alerts configured for readings below {}cm",
            config.threshold_cm
        );
        Self {
            store: EventStore::new(),
            debouncer: Mutex::new(AlertDebouncer::new(config.clone())),
            config,
            notifier,
            delivery_timeout,
        }
    }

    /// Store a validated reading and alert if it is critical and due
    pub async fn ingest(&self, reading: Reading) -> IngestOutcome {
        let (distance, motor) = (reading.distance, reading.motor);

        let pending = {
            let mut debouncer = lock(&self.debouncer);
            info!(distance, motor = %motor, ts = reading.ts, "Received reading");
            self.store.record(reading);
            counter!("readings_ingested_total").increment(1);

            if !self.config.is_critical(distance) {
                return IngestOutcome::Recorded;
            }

            let now = Instant::now();
            match debouncer.try_reserve(now) {
                Some(reservation) => PendingAlert {
                    debouncer: &self.debouncer,
                    reservation: Some(reservation),
                },
                None => {
                    let remaining = debouncer.remaining(now);
                    match remaining {
                        Some(left) => info!(
                            "Alert cooldown active. Next alert possible in {} minutes",
                            (left.as_secs_f64() / 60.0).round()
                        ),
                        None => info!("Alert delivery already in progress"),
                    }
                    counter!("alerts_suppressed_total").increment(1);
                    return IngestOutcome::Suppressed { remaining };
                }
            }
        };

        warn!(distance, motor = %motor, "ALERT: distance below threshold");
        let delivered = match timeout(self.delivery_timeout, self.notifier.deliver(distance, motor)).await {
            Ok(delivered) => delivered,
            Err(_) => {
                error!("Alert delivery timed out after {:?}", self.delivery_timeout);
                false
            }
        };
        pending.resolve(delivered);

        if delivered {
            counter!("alerts_sent_total").increment(1);
            info!("Alert email sent successfully");
            IngestOutcome::AlertDelivered
        } else {
            counter!("alerts_failed_total").increment(1);
            IngestOutcome::AlertFailed
        }
    }

    /// Count and latest reading
    pub fn snapshot(&self) -> StoreSnapshot {
        self.store.snapshot()
    }

    /// Readings recorded since start
    pub fn count(&self) -> usize {
        self.store.count()
    }

    /// Most recent reading
    pub fn latest(&self) -> Option<Reading> {
        self.store.latest()
    }

    /// Health check of the notification transport
    pub async fn check_notifier(&self) -> Result<NotifierInfo, NotifyError> {
        self.notifier.check().await
    }
}
