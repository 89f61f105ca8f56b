//! Alerting System
//!
//! Decides when a low water-level reading should produce an alert, and
//! suppresses repeats for a cooldown window after each confirmed delivery.

mod debouncer;

pub use debouncer::{AlertConfig, AlertDebouncer, AlertPhase, Reservation};

/// Distance (cm) below which the water level is critical
pub const ALERT_THRESHOLD_CM: f64 = 200.0;

/// Minimum interval between two successful alert deliveries (seconds)
pub const ALERT_COOLDOWN_SECS: u64 = 5 * 60;
