//! Scripted notifier

use crate::{Notifier, NotifierInfo, NotifyError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use storage::MotorState;
use tracing::debug;

/// One recorded delivery attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryCall {
    pub distance: f64,
    pub motor: MotorState,
}

/// Notifier that records attempts and replays scripted outcomes.
///
/// Outcomes are consumed in order; once the script runs out every attempt
/// succeeds.
pub struct MockNotifier {
    outcomes: Mutex<VecDeque<bool>>,
    calls: Mutex<Vec<DeliveryCall>>,
    delay: Option<Duration>,
    healthy: bool,
}

impl MockNotifier {
    /// Notifier whose deliveries always succeed
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            delay: None,
            healthy: true,
        }
    }

    /// Script the outcomes of the next attempts
    pub fn with_outcomes(outcomes: impl IntoIterator<Item = bool>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            ..Self::new()
        }
    }

    /// Hold each attempt for `delay` before reporting
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make health checks fail
    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    /// Attempts made so far
    pub fn calls(&self) -> Vec<DeliveryCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of attempts made so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn deliver(&self, distance: f64, motor: MotorState) -> bool {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(DeliveryCall { distance, motor });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = self
            .outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(true);
        debug!("Mock delivery of {} cm / {}: {}", distance, motor, outcome);
        outcome
    }

    async fn check(&self) -> Result<NotifierInfo, NotifyError> {
        if !self.healthy {
            return Err(NotifyError::Unreachable("mock transport".to_string()));
        }
        Ok(NotifierInfo {
            service: "mock".to_string(),
            from: None,
            to: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_outcomes() {
        let notifier = MockNotifier::with_outcomes([false, true]);

        assert!(!notifier.deliver(150.0, MotorState::On).await);
        assert!(notifier.deliver(140.0, MotorState::Off).await);
        assert!(notifier.deliver(130.0, MotorState::On).await);

        assert_eq!(notifier.call_count(), 3);
        assert_eq!(
            notifier.calls()[1],
            DeliveryCall {
                distance: 140.0,
                motor: MotorState::Off
            }
        );
    }

    #[tokio::test]
    async fn test_health_check() {
        let info = MockNotifier::new().check().await.unwrap();
        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            serde_json::json!({ "service": "mock" })
        );

        assert!(MockNotifier::new().unhealthy().check().await.is_err());
    }
}
