//! Storage Layer
//!
//! Append-only, in-memory log of the readings received from the drainage sensor.

mod event_store;
mod reading;

pub use event_store::{EventStore, StoreSnapshot};
pub use reading::{MotorState, ParseMotorStateError, Reading};
