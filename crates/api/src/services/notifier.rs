//! Notification collaborator. Strictly fire-and-forget: a failed email
//! must never fail or slow the operation that triggered it, so sends are
//! spawned onto the runtime and failures only logged.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one templated notification. Errors are reported to the caller
    /// only for logging; use [`spawn_notify`] from request paths.
    async fn notify(
        &self,
        recipient_email: &str,
        subject: &str,
        body: String,
    ) -> Result<(), String>;
}

/// Fire-and-forget wrapper: spawn the send and log the outcome.
pub fn spawn_notify(notifier: Arc<dyn Notifier>, recipient: String, subject: String, body: String) {
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(&recipient, &subject, body).await {
            tracing::warn!(recipient = %recipient, subject = %subject, error = %e, "Notification failed");
        } else {
            tracing::debug!(recipient = %recipient, subject = %subject, "Notification sent");
        }
    });
}

/// SMTP notifier configured from `SMTP_HOST`/`SMTP_USER`/`SMTP_PASSWORD`/
/// `SMTP_FROM`. When `SMTP_HOST` is unset the notifier is disabled and
/// sends become logged no-ops, which keeps local development quiet.
pub struct SmtpNotifier {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
}

impl SmtpNotifier {
    pub fn from_env() -> Self {
        let from = std::env::var("SMTP_FROM")
            .unwrap_or_else(|_| "no-reply@hrkey.local".into());

        let Ok(host) = std::env::var("SMTP_HOST") else {
            tracing::info!("SMTP_HOST not set, notifications disabled");
            return Self {
                transport: None,
                from,
            };
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
            .unwrap_or_else(|e| panic!("Invalid SMTP_HOST '{host}': {e}"));
        if let (Ok(user), Ok(password)) =
            (std::env::var("SMTP_USER"), std::env::var("SMTP_PASSWORD"))
        {
            builder = builder.credentials(Credentials::new(user, password));
        }

        Self {
            transport: Some(builder.build()),
            from,
        }
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(
        &self,
        recipient_email: &str,
        subject: &str,
        body: String,
    ) -> Result<(), String> {
        let Some(transport) = &self.transport else {
            tracing::debug!(recipient = recipient_email, subject, "Notifier disabled, dropping");
            return Ok(());
        };

        let message = Message::builder()
            .from(self.from.parse().map_err(|e| format!("bad from address: {e}"))?)
            .to(recipient_email
                .parse()
                .map_err(|e| format!("bad recipient address: {e}"))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| e.to_string())?;

        transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}
