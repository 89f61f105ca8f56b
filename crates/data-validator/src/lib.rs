//! Payload Validation
//!
//! Checks the shape of inbound sensor payloads before anything is stored.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{ReadingInput, ValidationConfig, Validator};
