// ABOUTME: Outgoing email through SendGrid or a logging fallback
// ABOUTME: Renders the account activation message sent after registration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::config::MailConfig;
use crate::errors::{AppError, AppResult};

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Rendered email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// HTML body
    pub html_content: String,
}

/// Delivers rendered emails
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Send one message
    async fn send(&self, message: &EmailMessage) -> AppResult<()>;
}

/// Build the sender selected by configuration
///
/// # Errors
///
/// Returns `ConfigMissing` when mail is enabled without an API key or sender
pub fn from_config(config: &MailConfig) -> AppResult<Arc<dyn MailSender>> {
    if !config.enabled {
        return Ok(Arc::new(LogMailSender::default()));
    }
    let api_key = config
        .sendgrid_api_key
        .clone()
        .ok_or_else(|| AppError::config_missing("MAIL_SENDGRID_API_KEY"))?;
    let sender = config
        .sender_email
        .clone()
        .ok_or_else(|| AppError::config_missing("MAIL_SENDER_EMAIL"))?;
    Ok(Arc::new(SendgridMailSender::new(api_key, sender)?))
}

/// SendGrid v3 `mail/send`
pub struct SendgridMailSender {
    client: reqwest::Client,
    api_key: String,
    from_email: String,
}

impl SendgridMailSender {
    /// Create a sender with its own HTTP client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(api_key: String, from_email: String) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build mail client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            from_email,
        })
    }
}

#[async_trait]
impl MailSender for SendgridMailSender {
    async fn send(&self, message: &EmailMessage) -> AppResult<()> {
        let body = json!({
            "personalizations": [{ "to": [{ "email": message.to }] }],
            "from": { "email": self.from_email },
            "subject": message.subject,
            "content": [{ "type": "text/html", "value": message.html_content }],
        });

        let response = self
            .client
            .post(SENDGRID_SEND_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::external_service("SendGrid", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::external_service(
                "SendGrid",
                format!("mail/send returned {status}: {detail}"),
            ));
        }

        tracing::info!(to = %message.to, subject = %message.subject, "Email sent");
        Ok(())
    }
}

/// Logs messages instead of sending them and keeps them in an outbox
#[derive(Default)]
pub struct LogMailSender {
    outbox: Mutex<Vec<EmailMessage>>,
}

impl LogMailSender {
    /// Messages "sent" so far, oldest first
    #[must_use]
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.outbox
            .lock()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl MailSender for LogMailSender {
    async fn send(&self, message: &EmailMessage) -> AppResult<()> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "Mail delivery disabled, message logged only"
        );
        if let Ok(mut outbox) = self.outbox.lock() {
            outbox.push(message.clone());
        }
        Ok(())
    }
}

/// Activation email with a link carrying the activation token
#[must_use]
pub fn activation_email(
    app_name: &str,
    activation_url_base: &str,
    username: &str,
    email: &str,
    token: &str,
) -> EmailMessage {
    let link = format!("{activation_url_base}?token={token}");
    let app_name_html = escape_html(app_name);
    let html_content = format!(
        r#"<p>Hi {username},</p>
<p>Thanks for signing up for {app_name_html}. Confirm your email address to activate your account:</p>
<p><a href="{link}">Activate account</a></p>
<p>If you did not create an account you can ignore this message.</p>"#,
        username = escape_html(username),
        link = escape_html(&link),
    );

    EmailMessage {
        to: email.to_owned(),
        subject: format!("{app_name} - Activate Account"),
        html_content,
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_email_contents() {
        let message = activation_email(
            "Giftminder",
            "http://localhost:8080/api/v1/auth/activate",
            "<b>anna</b>",
            "anna@example.com",
            "tok123",
        );
        assert_eq!(message.to, "anna@example.com");
        assert_eq!(message.subject, "Giftminder - Activate Account");
        assert!(message
            .html_content
            .contains("http://localhost:8080/api/v1/auth/activate?token=tok123"));
        assert!(message.html_content.contains("&lt;b&gt;anna&lt;/b&gt;"));
    }

    #[tokio::test]
    async fn test_log_sender_records_outbox() {
        let sender = LogMailSender::default();
        let message = activation_email("App", "http://x/activate", "bob", "bob@example.com", "t");
        sender.send(&message).await.unwrap();
        assert_eq!(sender.sent(), vec![message]);
    }

    #[test]
    fn test_enabled_mail_requires_credentials() {
        let config = MailConfig {
            enabled: true,
            sendgrid_api_key: None,
            sender_email: Some("noreply@example.com".into()),
            activation_url_base: "http://x".into(),
        };
        assert!(from_config(&config).is_err());
    }
}
