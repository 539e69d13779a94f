//! Email Service
//!
//! SMTP delivery for volunteer, donation and contact notifications.

pub mod templates;

use anyhow::{Context, Result};
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

pub use templates::EmailContent;

use crate::config::Config;

/// Email service for sending notifications via SMTP.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: Mailbox,
    org_name: String,
}

impl EmailService {
    /// Create a new email service from server configuration.
    ///
    /// Requires SMTP to be fully configured (`config.has_smtp()` must be true).
    pub fn new(config: &Config) -> Result<Self> {
        let host = config.smtp_host.as_ref().context("SMTP_HOST is required")?;
        let username = config
            .smtp_username
            .as_ref()
            .context("SMTP_USERNAME is required")?;
        let password = config
            .smtp_password
            .as_ref()
            .context("SMTP_PASSWORD is required")?;
        let from = config.smtp_from.as_ref().context("SMTP_FROM is required")?;

        let from_address: Mailbox = from
            .parse()
            .context("SMTP_FROM is not a valid email address")?;

        let creds = Credentials::new(username.clone(), password.clone());

        let mailer = match config.smtp_tls.as_str() {
            "tls" => AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .context("Failed to create SMTP TLS transport")?
                .port(config.smtp_port)
                .credentials(creds)
                .build(),
            "none" => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                .port(config.smtp_port)
                .credentials(creds)
                .build(),
            // Default: STARTTLS
            _ => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .context("Failed to create SMTP STARTTLS transport")?
                .port(config.smtp_port)
                .credentials(creds)
                .build(),
        };

        Ok(Self {
            mailer,
            from_address,
            org_name: config.org_name.clone(),
        })
    }

    /// Organization name used in message bodies.
    pub fn org_name(&self) -> &str {
        &self.org_name
    }

    /// Test the SMTP connection by sending a NOOP command.
    pub async fn test_connection(&self) -> Result<()> {
        let ok = self
            .mailer
            .test_connection()
            .await
            .context("SMTP connection test failed")?;
        if !ok {
            anyhow::bail!("SMTP server did not respond positively to connection test");
        }
        Ok(())
    }

    fn build(&self, to_email: &str, content: EmailContent) -> Result<Message> {
        let to_mailbox: Mailbox = to_email
            .parse()
            .context("Invalid recipient email address")?;

        Message::builder()
            .from(self.from_address.clone())
            .to(to_mailbox)
            .subject(content.subject)
            .body(content.body)
            .context("Failed to build email message")
    }

    /// Send `content` to `to_email` and wait for the SMTP result.
    pub async fn send(&self, to_email: &str, content: EmailContent) -> Result<()> {
        let email = self.build(to_email, content)?;

        self.mailer
            .send(email)
            .await
            .context("Failed to send email via SMTP")?;

        info!(to = %to_email, "Email sent");
        Ok(())
    }

    /// Send without blocking the caller. Failures are logged only.
    pub fn send_in_background(&self, to_email: String, content: EmailContent) {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.send(&to_email, content).await {
                warn!(to = %to_email, error = %format!("{e:#}"), "Background email failed");
            }
        });
    }
}
