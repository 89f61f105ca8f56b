//! Payload Validator

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use storage::{MotorState, Reading};
use tracing::debug;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Accepted distance range (cm)
    pub distance_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            distance_range: (0.0, f64::MAX),
        }
    }
}

/// Validated payload, ready to be stamped into a [`Reading`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingInput {
    pub distance: f64,
    pub motor: MotorState,
}

impl ReadingInput {
    /// Stamp with the current time
    pub fn into_reading(self) -> Reading {
        Reading::new(self.distance, self.motor)
    }
}

/// Validator for `{ distance: number, motor: "ON" | "OFF" }` payloads
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate the distance field
    pub fn validate_distance(&self, value: Option<&Value>) -> Result<f64, ValidationError> {
        let distance = value
            .ok_or(ValidationError::MissingField("distance"))?
            .as_f64()
            .ok_or(ValidationError::InvalidType {
                field: "distance",
                expected: "number",
            })?;
        self.validate_range("distance", distance, self.config.distance_range)?;
        Ok(distance)
    }

    /// Validate the motor field
    pub fn validate_motor(&self, value: Option<&Value>) -> Result<MotorState, ValidationError> {
        let literal = value
            .ok_or(ValidationError::MissingField("motor"))?
            .as_str()
            .ok_or(ValidationError::InvalidType {
                field: "motor",
                expected: "string",
            })?;
        literal
            .parse()
            .map_err(|_| ValidationError::InvalidMotorState(literal.to_string()))
    }

    /// Validate a whole payload
    pub fn validate(&self, payload: &Value) -> Result<ReadingInput, ValidationError> {
        let fields = payload.as_object().ok_or(ValidationError::NotAnObject)?;

        let input = ReadingInput {
            distance: self.validate_distance(fields.get("distance"))?,
            motor: self.validate_motor(fields.get("motor"))?,
        };
        debug!("Payload accepted: {:?}", input);
        Ok(input)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_valid_payload() {
        let validator = Validator::default();
        let input = validator
            .validate(&json!({ "distance": 150, "motor": "ON" }))
            .unwrap();
        assert_eq!(input.distance, 150.0);
        assert_eq!(input.motor, MotorState::On);

        let input = validator
            .validate(&json!({ "distance": 0.5, "motor": "OFF" }))
            .unwrap();
        assert_eq!(input.motor, MotorState::Off);
    }

    #[test]
    fn test_extra_fields_ignored() {
        let validator = Validator::default();
        assert!(validator
            .validate(&json!({ "distance": 300, "motor": "OFF", "rssi": -70 }))
            .is_ok());
    }

    #[test]
    fn test_distance_must_be_number() {
        let validator = Validator::default();
        assert_eq!(
            validator.validate(&json!({ "distance": "far", "motor": "ON" })),
            Err(ValidationError::InvalidType {
                field: "distance",
                expected: "number"
            })
        );
        assert_eq!(
            validator.validate(&json!({ "distance": null, "motor": "ON" })),
            Err(ValidationError::InvalidType {
                field: "distance",
                expected: "number"
            })
        );
    }

    #[test]
    fn test_motor_literals() {
        let validator = Validator::default();
        assert_eq!(
            validator.validate(&json!({ "distance": 10, "motor": "MAYBE" })),
            Err(ValidationError::InvalidMotorState("MAYBE".to_string()))
        );
        assert_eq!(
            validator.validate(&json!({ "distance": 10, "motor": "on" })),
            Err(ValidationError::InvalidMotorState("on".to_string()))
        );
        assert_eq!(
            validator.validate(&json!({ "distance": 10, "motor": true })),
            Err(ValidationError::InvalidType {
                field: "motor",
                expected: "string"
            })
        );
    }

    #[test]
    fn test_missing_fields() {
        let validator = Validator::default();
        assert_eq!(
            validator.validate(&json!({})),
            Err(ValidationError::MissingField("distance"))
        );
        assert_eq!(
            validator.validate(&json!({ "distance": 10 })),
            Err(ValidationError::MissingField("motor"))
        );
    }

    #[test]
    fn test_not_an_object() {
        let validator = Validator::default();
        assert_eq!(
            validator.validate(&json!([150, "ON"])),
            Err(ValidationError::NotAnObject)
        );
        assert_eq!(
            validator.validate(&Value::Null),
            Err(ValidationError::NotAnObject)
        );
    }

    #[test]
    fn test_negative_distance_rejected() {
        let validator = Validator::default();
        assert!(matches!(
            validator.validate(&json!({ "distance": -1, "motor": "ON" })),
            Err(ValidationError::OutOfRange { field: "distance", .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_any_non_negative_distance_accepted(distance in 0.0f64..1.0e9, on in any::<bool>()) {
            let motor = if on { "ON" } else { "OFF" };
            let input = Validator::default()
                .validate(&json!({ "distance": distance, "motor": motor }))
                .unwrap();
            prop_assert_eq!(input.distance, distance);
        }
    }
}
