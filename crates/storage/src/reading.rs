//! Reading Record

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Pump motor state reported by the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotorState {
    #[serde(rename = "ON")]
    On,
    #[serde(rename = "OFF")]
    Off,
}

impl MotorState {
    /// Wire literal for this state
    pub fn as_str(&self) -> &'static str {
        match self {
            MotorState::On => "ON",
            MotorState::Off => "OFF",
        }
    }
}

impl fmt::Display for MotorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Motor state literal was neither `ON` nor `OFF`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid motor state: {0:?}")]
pub struct ParseMotorStateError(pub String);

impl FromStr for MotorState {
    type Err = ParseMotorStateError;

    // Case-sensitive: the sensor firmware only ever sends upper case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ON" => Ok(MotorState::On),
            "OFF" => Ok(MotorState::Off),
            other => Err(ParseMotorStateError(other.to_string())),
        }
    }
}

/// One accepted sensor sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Distance from sensor to water surface (cm)
    pub distance: f64,
    /// Motor state at sampling time
    pub motor: MotorState,
    /// Receive time (ms since Unix epoch)
    pub ts: i64,
}

impl Reading {
    /// Create a reading stamped with the current wall-clock time
    pub fn new(distance: f64, motor: MotorState) -> Self {
        Self::at(distance, motor, Utc::now().timestamp_millis())
    }

    /// Create a reading with an explicit timestamp
    pub fn at(distance: f64, motor: MotorState, ts: i64) -> Self {
        Self { distance, motor, ts }
    }
}
