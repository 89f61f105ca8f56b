//! Validation Error Types

use thiserror::Error;

/// Errors during payload validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Payload is not a JSON object
    #[error("Payload must be a JSON object")]
    NotAnObject,

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Field present with the wrong JSON type
    #[error("{field} must be a {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },

    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Motor state other than `ON` / `OFF`
    #[error("Invalid motor state: {0}")]
    InvalidMotorState(String),
}
