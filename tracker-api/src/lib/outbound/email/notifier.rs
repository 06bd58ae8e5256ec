use async_trait::async_trait;
use lettre::address::AddressError;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::AsyncSmtpTransport;
use lettre::AsyncTransport;
use lettre::Message;
use lettre::Tokio1Executor;
use thiserror::Error;

use super::templates;
use super::templates::MailContent;
use crate::config::EmailConfig;
use crate::domain::user::ports::UserNotifier;

/// Error for SMTP delivery attempts
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Invalid mailbox: {0}")]
    Address(#[from] AddressError),

    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP transport failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

struct SmtpSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

/// Account notifications over SMTP.
///
/// Falls back to writing the mail to the log when SMTP is not configured or
/// delivery fails. Callers never observe a failure.
pub struct EmailNotifier {
    sender: Option<SmtpSender>,
    app_base_url: String,
}

impl EmailNotifier {
    /// Build the notifier from configuration.
    ///
    /// SMTP is used only when host, username and password are all set.
    /// A relay that cannot be set up is logged and treated as unconfigured.
    pub fn new(config: &EmailConfig) -> Self {
        let sender = match smtp_sender(config) {
            Ok(sender) => sender,
            Err(e) => {
                tracing::warn!(error = %e, "SMTP setup failed, mails will be logged");
                None
            }
        };

        if sender.is_none() {
            tracing::info!("SMTP not configured, mails will be logged");
        }

        Self {
            sender,
            app_base_url: config.app_base_url.clone(),
        }
    }

    /// Whether mails are handed to an SMTP relay.
    pub fn is_delivering(&self) -> bool {
        self.sender.is_some()
    }

    async fn deliver(&self, to: &str, mail: MailContent) {
        if let Some(sender) = &self.sender {
            match sender.send(to, &mail).await {
                Ok(()) => {
                    tracing::info!(to, subject = mail.subject, "Mail sent");
                    return;
                }
                Err(e) => tracing::warn!(to, error = %e, "Failed to send mail via SMTP"),
            }
        }

        tracing::info!(
            to,
            subject = mail.subject,
            body = %mail.body,
            "Mail not delivered, logged instead"
        );
    }
}

fn smtp_sender(config: &EmailConfig) -> Result<Option<SmtpSender>, DeliveryError> {
    let (Some(host), Some(username), Some(password)) = (
        config.smtp_host.as_deref().filter(|s| !s.is_empty()),
        config.smtp_username.as_deref().filter(|s| !s.is_empty()),
        config.smtp_password.as_deref().filter(|s| !s.is_empty()),
    ) else {
        return Ok(None);
    };

    let from = config
        .from_address
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(username)
        .parse::<Mailbox>()?;

    let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
        .port(config.smtp_port)
        .credentials(Credentials::new(username.to_string(), password.to_string()))
        .build();

    Ok(Some(SmtpSender { transport, from }))
}

impl SmtpSender {
    async fn send(&self, to: &str, mail: &MailContent) -> Result<(), DeliveryError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse::<Mailbox>()?)
            .subject(mail.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body.clone())?;

        self.transport.send(message).await?;
        Ok(())
    }
}

#[async_trait]
impl UserNotifier for EmailNotifier {
    async fn send_password_reset(&self, to: &str, name: &str, token: &str) {
        let mail = templates::password_reset(&self.app_base_url, name, token);
        self.deliver(to, mail).await;
    }

    async fn send_password_changed(&self, to: &str, name: &str) {
        self.deliver(to, templates::password_changed(name)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_smtp_logs_instead() {
        let notifier = EmailNotifier::new(&EmailConfig::default());
        assert!(!notifier.is_delivering());
    }

    #[test]
    fn test_partial_smtp_config_logs_instead() {
        let config = EmailConfig {
            smtp_host: Some("smtp.example.com".to_string()),
            smtp_username: Some("mailer@example.com".to_string()),
            smtp_password: None,
            ..EmailConfig::default()
        };
        assert!(!EmailNotifier::new(&config).is_delivering());
    }

    #[tokio::test]
    async fn test_full_smtp_config_builds_transport() {
        let config = EmailConfig {
            smtp_host: Some("smtp.example.com".to_string()),
            smtp_username: Some("mailer@example.com".to_string()),
            smtp_password: Some("secret".to_string()),
            ..EmailConfig::default()
        };
        assert!(EmailNotifier::new(&config).is_delivering());
    }

    #[tokio::test]
    async fn test_fallback_never_fails() {
        let notifier = EmailNotifier::new(&EmailConfig::default());

        notifier
            .send_password_reset("alice@example.com", "Alice", "token")
            .await;
        notifier
            .send_password_changed("alice@example.com", "Alice")
            .await;
    }
}
