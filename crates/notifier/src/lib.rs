//! Alert Notification
//!
//! The [`Notifier`] capability used by the monitor to send water-level alerts:
//! - [`EmailNotifier`] delivers over SMTP
//! - [`MockNotifier`] scripts outcomes for tests and dry runs

mod email;
mod message;
mod mock;

pub use email::{EmailConfig, EmailNotifier};
pub use message::AlertMessage;
pub use mock::{DeliveryCall, MockNotifier};

use async_trait::async_trait;
use serde::Serialize;
use storage::MotorState;
use thiserror::Error;

/// Notifier error types
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notifier not configured: {0}")]
    NotConfigured(String),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email build error: {0}")]
    Build(String),

    #[error("Mail server unreachable: {0}")]
    Unreachable(String),
}

/// Transport details reported by a successful health check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotifierInfo {
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

/// Delivers water-level alerts through an external channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Attempt to deliver an alert for this reading.
    ///
    /// Returns `true` only when the channel confirmed delivery. Failures are
    /// logged by the implementation and reported as `false`.
    async fn deliver(&self, distance: f64, motor: MotorState) -> bool;

    /// Verify the transport is configured and reachable
    async fn check(&self) -> Result<NotifierInfo, NotifyError>;
}
