//! Runtime Settings
//!
//! Loaded once at startup from the process environment (after `.env`).

use notifier::EmailConfig;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Server and notifier settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Listening port (`PORT`)
    pub port: u16,
    /// SMTP account and sender (`EMAIL_USER`)
    pub email_user: Option<String>,
    /// SMTP password (`EMAIL_PASS`)
    pub email_pass: Option<String>,
    /// Alert recipient (`ALERT_USER`)
    pub alert_user: Option<String>,
    /// Service label (`EMAIL_SERVICE`)
    pub email_service: String,
    /// SMTP relay host (`SMTP_HOST`)
    pub smtp_host: String,
    /// SMTP port (`SMTP_PORT`)
    pub smtp_port: u16,
    /// Bound on one delivery attempt (`NOTIFY_TIMEOUT_SECS`)
    pub notify_timeout_secs: u64,
}

impl Settings {
    /// Load from the process environment
    pub fn load() -> Result<Self, SettingsError> {
        Self::from_env(config::Environment::default())
    }

    fn from_env(env: config::Environment) -> Result<Self, SettingsError> {
        let settings = config::Config::builder()
            .set_default("port", 8000)?
            .set_default("email_service", "gmail")?
            .set_default("smtp_host", "smtp.gmail.com")?
            .set_default("smtp_port", 587)?
            .set_default("notify_timeout_secs", 30)?
            .add_source(env)
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Address to bind
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// Delivery timeout as a duration
    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout_secs)
    }

    /// SMTP settings for the email notifier
    pub fn email_config(&self) -> EmailConfig {
        EmailConfig {
            service: self.email_service.clone(),
            smtp_host: self.smtp_host.clone(),
            smtp_port: self.smtp_port,
            username: self.email_user.clone(),
            password: self.email_pass.clone(),
            recipient: self.alert_user.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::default().source(Some(map))
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_env(env(&[])).unwrap();
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.bind_addr(), "0.0.0.0:8000");
        assert_eq!(settings.smtp_host, "smtp.gmail.com");
        assert_eq!(settings.smtp_port, 587);
        assert_eq!(settings.notify_timeout(), Duration::from_secs(30));
        assert!(settings.email_user.is_none());
        assert!(settings.alert_user.is_none());
    }

    #[test]
    fn test_environment_overrides() {
        let settings = Settings::from_env(env(&[
            ("PORT", "9100"),
            ("EMAIL_USER", "drainage@example.com"),
            ("EMAIL_PASS", "secret"),
            ("ALERT_USER", "operator@example.com"),
            ("NOTIFY_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(settings.port, 9100);
        assert_eq!(settings.notify_timeout(), Duration::from_secs(5));

        let email = settings.email_config();
        assert_eq!(email.username.as_deref(), Some("drainage@example.com"));
        assert_eq!(email.password.as_deref(), Some("secret"));
        assert_eq!(email.recipient.as_deref(), Some("operator@example.com"));
        assert_eq!(email.service, "gmail");
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(Settings::from_env(env(&[("PORT", "not-a-port")])).is_err());
    }
}
