//! Alert Message Formatting

use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use storage::MotorState;

/// Sender display name on alert emails
pub const SENDER_NAME: &str = "Smart Drainage System";

const SUBJECT: &str = "🚨 DRAINAGE ALERT: Water Level Critical";
const COLOR_CRITICAL: &str = "#e74c3c";
const COLOR_RUNNING: &str = "#27ae60";

/// Rendered alert, independent of the delivery channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl AlertMessage {
    /// Render an alert for a critical reading observed at `at`
    pub fn compose<Tz>(distance: f64, motor: MotorState, threshold_cm: f64, at: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let timestamp = at.format("%Y-%m-%d %H:%M:%S").to_string();
        let motor_color = match motor {
            MotorState::On => COLOR_RUNNING,
            MotorState::Off => COLOR_CRITICAL,
        };

        let text = format!(
            "DRAINAGE SYSTEM ALERT\n\
             Critical Water Level Detected\n\n\
             Distance Reading: {distance} cm\n\
             Motor Status: {motor}\n\
             Timestamp: {timestamp}\n\
             Alert Threshold: {threshold_cm} cm\n\n\
             Action Required: The water level has exceeded the safe threshold. \
             Please check the drainage system immediately.\n\n\
             This is an automated alert from your Smart Drainage Monitoring System\n"
        );

        let html = format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: {COLOR_CRITICAL}; text-align: center;">⚠️ DRAINAGE SYSTEM ALERT</h2>
  <div style="background-color: #f8f9fa; padding: 20px; border-radius: 8px; margin: 20px 0;">
    <h3 style="color: #333; margin-top: 0;">Critical Water Level Detected</h3>
    <p><strong>Distance Reading:</strong> <span style="color: {COLOR_CRITICAL}; font-size: 18px;">{distance} cm</span></p>
    <p><strong>Motor Status:</strong> <span style="color: {motor_color};">{motor}</span></p>
    <p><strong>Timestamp:</strong> {timestamp}</p>
    <p><strong>Alert Threshold:</strong> {threshold_cm} cm</p>
  </div>
  <div style="background-color: #fff3cd; padding: 15px; border-radius: 8px; border-left: 4px solid #ffc107;">
    <p style="margin: 0;"><strong>Action Required:</strong> The water level has exceeded the safe threshold. Please check the drainage system immediately.</p>
  </div>
  <hr style="margin: 30px 0; border: none; border-top: 1px solid #eee;">
  <p style="text-align: center; color: #6c757d; font-size: 12px;">
    This is an automated alert from your Smart Drainage Monitoring System
  </p>
</div>
"#
        );

        Self {
            subject: SUBJECT.to_string(),
            text,
            html,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 14, 30, 0).unwrap()
    }

    #[test]
    fn test_subject() {
        let message = AlertMessage::compose(150.0, MotorState::On, 200.0, &at());
        assert_eq!(message.subject, "🚨 DRAINAGE ALERT: Water Level Critical");
    }

    #[test]
    fn test_body_carries_reading() {
        let message = AlertMessage::compose(150.0, MotorState::Off, 200.0, &at());

        for body in [&message.text, &message.html] {
            assert!(body.contains("150 cm"));
            assert!(body.contains("OFF"));
            assert!(body.contains("2024-06-01 14:30:00"));
            assert!(body.contains("200 cm"));
        }
    }

    #[test]
    fn test_motor_color() {
        let running = AlertMessage::compose(120.5, MotorState::On, 200.0, &at());
        assert!(running.html.contains(r#"<span style="color: #27ae60;">ON</span>"#));
        assert!(running.html.contains("120.5 cm"));

        let stopped = AlertMessage::compose(120.5, MotorState::Off, 200.0, &at());
        assert!(stopped.html.contains(r#"<span style="color: #e74c3c;">OFF</span>"#));
    }
}
