//! Alert Debouncer Implementation

use crate::{ALERT_COOLDOWN_SECS, ALERT_THRESHOLD_CM};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Readings strictly below this distance (cm) are critical
    pub threshold_cm: f64,
    /// Cooldown after a successful delivery (seconds)
    pub cooldown_seconds: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            threshold_cm: ALERT_THRESHOLD_CM,
            cooldown_seconds: ALERT_COOLDOWN_SECS,
        }
    }
}

impl AlertConfig {
    /// Whether a reading at this distance qualifies for alert evaluation
    pub fn is_critical(&self, distance: f64) -> bool {
        distance < self.threshold_cm
    }

    /// Cooldown as a duration
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_seconds)
    }
}

/// Debouncer state at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertPhase {
    /// An alert may be sent
    Ready,
    /// A delivery succeeded less than one cooldown ago
    CooldownActive,
    /// A delivery attempt is reserved and not yet resolved
    Delivering,
}

/// Claim on the right to attempt one delivery.
///
/// Handed out by [`AlertDebouncer::try_reserve`] and consumed by exactly one
/// of [`AlertDebouncer::commit`] or [`AlertDebouncer::release`].
#[derive(Debug)]
#[must_use = "a reservation blocks further alerts until committed or released"]
pub struct Reservation {
    at: Instant,
}

impl Reservation {
    /// Instant the delivery decision was made
    pub fn decided_at(&self) -> Instant {
        self.at
    }
}

/// Cooldown policy for alert delivery.
///
/// The cooldown is armed only by a confirmed delivery, so a failed send
/// leaves the debouncer ready and the next critical reading retries.
/// Expiry is computed lazily from the last delivery time; there is no timer.
pub struct AlertDebouncer {
    config: AlertConfig,
    /// Decision instant of the last successful delivery
    last_alert: Option<Instant>,
    /// Outstanding reservation, if a delivery is in flight
    in_flight: Option<Instant>,
}

impl AlertDebouncer {
    /// Create a new debouncer
    pub fn new(config: AlertConfig) -> Self {
        info!("Creating alert debouncer with config: {:?}", config);
        Self {
            config,
            last_alert: None,
            in_flight: None,
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Current phase, evaluated at `now`
    pub fn phase(&self, now: Instant) -> AlertPhase {
        if self.in_flight.is_some() {
            return AlertPhase::Delivering;
        }
        match self.last_alert {
            Some(last) if now.saturating_duration_since(last) < self.config.cooldown() => {
                AlertPhase::CooldownActive
            }
            _ => AlertPhase::Ready,
        }
    }

    /// True iff no delivery has succeeded yet or the cooldown has elapsed
    pub fn should_alert(&self, now: Instant) -> bool {
        self.phase(now) == AlertPhase::Ready
    }

    /// Record a confirmed delivery, arming the cooldown from `now`
    pub fn mark_delivered(&mut self, now: Instant) {
        self.last_alert = Some(now);
        info!("Alert delivered, cooldown armed for {}s", self.config.cooldown_seconds);
    }

    /// Time left before the cooldown expires, if it is active
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let last = self.last_alert?;
        self.config
            .cooldown()
            .checked_sub(now.saturating_duration_since(last))
            .filter(|left| !left.is_zero())
    }

    /// Decide and reserve in one step.
    ///
    /// Returns `None` when an alert is not due. While the returned reservation
    /// is outstanding every further call returns `None`.
    pub fn try_reserve(&mut self, now: Instant) -> Option<Reservation> {
        if !self.should_alert(now) {
            debug!("Alert not due: {:?}", self.phase(now));
            return None;
        }
        self.in_flight = Some(now);
        Some(Reservation { at: now })
    }

    /// Delivery confirmed: arm the cooldown from the decision instant
    pub fn commit(&mut self, reservation: Reservation) {
        self.in_flight = None;
        self.mark_delivered(reservation.at);
    }

    /// Delivery failed: drop the reservation, leaving the last delivery untouched
    pub fn release(&mut self, reservation: Reservation) {
        self.in_flight = None;
        debug!(
            "Alert reservation from {:?} released without delivery",
            reservation.at
        );
    }
}

impl Default for AlertDebouncer {
    fn default() -> Self {
        Self::new(AlertConfig::default())
    }
}
