//! SMTP email delivery.
//!
//! [`EmailNotifier`] wraps the `lettre` async SMTP transport. The transport is
//! assembled once at construction; if credentials or the recipient are
//! missing or malformed the notifier stays usable but every delivery reports
//! failure and [`Notifier::check`] returns the reason.

use crate::message::{AlertMessage, SENDER_NAME};
use crate::{Notifier, NotifierInfo, NotifyError};
use alerting::ALERT_THRESHOLD_CM;
use async_trait::async_trait;
use chrono::Local;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use storage::MotorState;
use tracing::{error, info, warn};

/// SMTP configuration
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Service label reported by health checks
    pub service: String,
    /// SMTP relay host
    pub smtp_host: String,
    /// SMTP port (STARTTLS)
    pub smtp_port: u16,
    /// Account name, also used as the sender address
    pub username: Option<String>,
    pub password: Option<String>,
    /// Alert recipient
    pub recipient: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            service: "gmail".to_string(),
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            username: None,
            password: None,
            recipient: None,
        }
    }
}

struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

/// Sends alert emails via SMTP
pub struct EmailNotifier {
    config: EmailConfig,
    threshold_cm: f64,
    /// Ready transport, or why it could not be built
    mailer: Result<Mailer, String>,
}

fn required<'a>(value: &'a Option<String>, what: &str) -> Result<&'a str, NotifyError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| NotifyError::NotConfigured(format!("{what} is not set")))
}

impl EmailNotifier {
    /// Create a notifier; never fails, misconfiguration is reported later
    pub fn new(config: EmailConfig) -> Self {
        let mailer = Self::build_mailer(&config).map_err(|e| {
            warn!("Email notifier unavailable: {}", e);
            e.to_string()
        });
        Self {
            config,
            threshold_cm: ALERT_THRESHOLD_CM,
            mailer,
        }
    }

    fn build_mailer(config: &EmailConfig) -> Result<Mailer, NotifyError> {
        let user = required(&config.username, "sender account")?;
        let password = required(&config.password, "sender password")?;
        let recipient = required(&config.recipient, "alert recipient")?;

        let from = Mailbox::new(Some(SENDER_NAME.to_string()), user.parse()?);
        let to: Mailbox = recipient.parse()?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(Credentials::new(user.to_string(), password.to_string()))
            .build();

        Ok(Mailer {
            transport,
            from,
            to,
        })
    }

    fn mailer(&self) -> Result<&Mailer, NotifyError> {
        self.mailer
            .as_ref()
            .map_err(|reason| NotifyError::NotConfigured(reason.clone()))
    }

    /// Whether a transport could be assembled from the configuration
    pub fn is_configured(&self) -> bool {
        self.mailer.is_ok()
    }

    /// Send a rendered alert
    pub async fn send(&self, message: &AlertMessage) -> Result<(), NotifyError> {
        let mailer = self.mailer()?;

        let email = Message::builder()
            .from(mailer.from.clone())
            .to(mailer.to.clone())
            .subject(message.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                message.text.clone(),
                message.html.clone(),
            ))
            .map_err(|e| NotifyError::Build(e.to_string()))?;

        let response = mailer.transport.send(email).await?;
        info!(to = %mailer.to, code = %response.code(), "Alert email sent");
        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn deliver(&self, distance: f64, motor: MotorState) -> bool {
        let message = AlertMessage::compose(distance, motor, self.threshold_cm, &Local::now());
        match self.send(&message).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to send alert email: {}", e);
                false
            }
        }
    }

    async fn check(&self) -> Result<NotifierInfo, NotifyError> {
        let mailer = self.mailer()?;
        if !mailer.transport.test_connection().await? {
            return Err(NotifyError::Unreachable(format!(
                "{}:{}",
                self.config.smtp_host, self.config.smtp_port
            )));
        }
        Ok(NotifierInfo {
            service: self.config.service.clone(),
            from: self.config.username.clone(),
            to: self.config.recipient.clone(),
        })
    }
}
