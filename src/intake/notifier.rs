//! Email notifier over an authenticated SMTP relay.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use crate::intake::engine::Notify;
use crate::intake::error::IntakeError;

/// Fixed relay; implicit TLS on port 465.
pub const SMTP_RELAY: &str = "smtp.gmail.com";

/// Sends intake notifications through the SMTP relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Build a transport for the fixed relay, authenticated as `username`.
    /// The same address is used as the sender.
    pub fn new(username: &str, password: &str) -> Result<Self, IntakeError> {
        let from: Mailbox = username
            .parse()
            .map_err(|e| IntakeError::Mail(format!("invalid sender address '{username}': {e}")))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(SMTP_RELAY)
            .map_err(|e| IntakeError::Mail(format!("failed to build SMTP transport: {e}")))?
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Notify for SmtpNotifier {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        body_html: &str,
    ) -> Result<(), IntakeError> {
        let to: Mailbox = recipient
            .parse()
            .map_err(|e| IntakeError::Mail(format!("invalid recipient '{recipient}': {e}")))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body_html.to_string())
            .map_err(|e| IntakeError::Mail(format!("failed to build message: {e}")))?;

        debug!("Sending mail to {recipient} via {SMTP_RELAY}");
        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| IntakeError::Mail(e.to_string()))
    }
}
