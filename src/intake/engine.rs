//! Session flow controller: advances each conversation through
//! selection, phone, confirmation, and the final email send.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::intake::error::IntakeError;
use crate::intake::session::{FlowState, Session, SessionStore};

/// Callback token carried by the "Yes" button.
pub const CONFIRM_TOKEN: &str = "yes";
/// Callback token carried by the "No" button.
pub const REJECT_TOKEN: &str = "no";

pub const NAME_PROMPT: &str = "Please enter your full name.";
pub const MENU_PROMPT: &str = "Please choose a course:";
pub const PHONE_PROMPT: &str = "Please enter your phone number.";
pub const CHOOSE_NOTICE: &str = "Your details are already filled in. Please choose Yes or No.";
pub const SENT_REPLY: &str = "Email sent.";
pub const SEND_FAILED_REPLY: &str = "Could not send the email. Please try again later.";

pub const MAIL_SUBJECT: &str = "New intake submission";

/// An inline button: label shown to the user, token echoed back on press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub token: String,
}

impl Button {
    pub fn new(label: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            token: token.into(),
        }
    }
}

/// A parsed inline-button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonPress {
    Confirm,
    Reject,
    /// A menu option; carries the chosen label.
    Choice(String),
}

impl ButtonPress {
    /// Parse a raw callback token into a structured press.
    pub fn parse(data: &str) -> Self {
        match data {
            CONFIRM_TOKEN => Self::Confirm,
            REJECT_TOKEN => Self::Reject,
            label => Self::Choice(label.to_string()),
        }
    }
}

/// Outbound replies to the chat platform.
#[async_trait]
pub trait Outbox: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), IntakeError>;

    async fn send_buttons(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &[Button],
    ) -> Result<(), IntakeError>;
}

/// Outbound email side effect, awaited on confirmation.
#[async_trait]
pub trait Notify: Send + Sync {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        body_html: &str,
    ) -> Result<(), IntakeError>;
}

/// A selectable course label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    pub label: String,
}

/// Read-only source of menu options, fetched fresh on every display.
#[async_trait]
pub trait MenuSource: Send + Sync {
    async fn list_options(&self) -> Result<Vec<MenuOption>, IntakeError>;
}

/// The session flow controller.
///
/// With a [`MenuSource`] the entry prompt is a course keyboard and "No"
/// re-queries it; without one the entry prompt asks for a free-text name.
pub struct IntakeEngine {
    recipient: String,
    sessions: SessionStore,
    outbox: Arc<dyn Outbox>,
    notifier: Arc<dyn Notify>,
    menu: Option<Arc<dyn MenuSource>>,
}

impl IntakeEngine {
    pub fn new(
        recipient: String,
        outbox: Arc<dyn Outbox>,
        notifier: Arc<dyn Notify>,
        menu: Option<Arc<dyn MenuSource>>,
    ) -> Self {
        Self {
            recipient,
            sessions: SessionStore::new(),
            outbox,
            notifier,
            menu,
        }
    }

    /// Current session for a chat (empty if none). Used by tests and
    /// operator tooling; the flow itself goes through the handlers.
    pub async fn session(&self, chat_id: i64) -> Session {
        self.sessions.snapshot(chat_id).await
    }

    fn selection_label(&self) -> &'static str {
        if self.menu.is_some() { "Course" } else { "Name" }
    }

    /// `/start`: begin a fresh session and emit the entry prompt.
    pub async fn handle_start(&self, chat_id: i64) -> Result<(), IntakeError> {
        info!("Starting intake for chat {chat_id}");
        self.sessions.create(chat_id).await;
        self.send_entry_prompt(chat_id).await
    }

    /// A plain text message from the user.
    pub async fn handle_text(&self, chat_id: i64, text: &str) -> Result<(), IntakeError> {
        let session = self.sessions.snapshot(chat_id).await;
        match session.state() {
            FlowState::AwaitingSelection => {
                self.sessions.set_selection(chat_id, text).await;
                self.outbox.send_text(chat_id, PHONE_PROMPT).await
            }
            FlowState::AwaitingPhone => {
                self.sessions.set_phone(chat_id, text).await;
                let session = self.sessions.snapshot(chat_id).await;
                self.send_confirmation(chat_id, &session).await
            }
            FlowState::AwaitingConfirmation => {
                // No mutation: the user must pick Yes or No.
                self.outbox.send_text(chat_id, CHOOSE_NOTICE).await
            }
        }
    }

    /// An inline-button press.
    pub async fn handle_button(&self, chat_id: i64, press: ButtonPress) -> Result<(), IntakeError> {
        match press {
            ButtonPress::Choice(label) => self.handle_choice(chat_id, label).await,
            ButtonPress::Reject => {
                info!("Chat {chat_id} rejected the summary, restarting");
                self.sessions.reset(chat_id).await;
                self.send_entry_prompt(chat_id).await
            }
            ButtonPress::Confirm => self.handle_confirm(chat_id).await,
        }
    }

    async fn handle_choice(&self, chat_id: i64, label: String) -> Result<(), IntakeError> {
        let session = self.sessions.snapshot(chat_id).await;
        if session.state() != FlowState::AwaitingSelection {
            debug!("Ignoring stale option press in chat {chat_id}");
            return Ok(());
        }
        self.sessions.set_selection(chat_id, &label).await;
        self.outbox.send_text(chat_id, PHONE_PROMPT).await
    }

    async fn handle_confirm(&self, chat_id: i64) -> Result<(), IntakeError> {
        let session = self.sessions.snapshot(chat_id).await;
        if session.state() != FlowState::AwaitingConfirmation {
            debug!("Ignoring stale confirm press in chat {chat_id}");
            return Ok(());
        }

        let body = notification_body(self.selection_label(), &session.selection, &session.phone);
        match self.notifier.send(&self.recipient, MAIL_SUBJECT, &body).await {
            Ok(()) => {
                info!("📧 Intake email sent for chat {chat_id}");
                self.sessions.remove(chat_id).await;
                self.outbox.send_text(chat_id, SENT_REPLY).await
            }
            Err(e) => {
                // Session is kept as-is so another "Yes" retries the send.
                warn!("Failed to send intake email for chat {chat_id}: {e}");
                self.outbox.send_text(chat_id, SEND_FAILED_REPLY).await
            }
        }
    }

    /// Entry prompt: course keyboard in menu mode, name request otherwise.
    /// A failed menu fetch is logged and the prompt is skipped.
    async fn send_entry_prompt(&self, chat_id: i64) -> Result<(), IntakeError> {
        let Some(ref menu) = self.menu else {
            return self.outbox.send_text(chat_id, NAME_PROMPT).await;
        };

        let options = match menu.list_options().await {
            Ok(options) => options,
            Err(e) => {
                warn!("Failed to fetch course menu for chat {chat_id}: {e}");
                return Ok(());
            }
        };

        let buttons: Vec<Button> = options
            .into_iter()
            .map(|option| Button::new(option.label.clone(), option.label))
            .collect();
        self.outbox.send_buttons(chat_id, MENU_PROMPT, &buttons).await
    }

    async fn send_confirmation(&self, chat_id: i64, session: &Session) -> Result<(), IntakeError> {
        let text = format!(
            "{}: {}, phone: {}. Is everything correct?",
            self.selection_label(),
            session.selection,
            session.phone,
        );
        let buttons = [
            Button::new("Yes", CONFIRM_TOKEN),
            Button::new("No", REJECT_TOKEN),
        ];
        self.outbox.send_buttons(chat_id, &text, &buttons).await
    }
}

/// HTML body of the notification email. User input is entity-escaped.
pub fn notification_body(label: &str, selection: &str, phone: &str) -> String {
    format!(
        "{label}: {}, phone: {}.",
        html_escape(selection),
        html_escape(phone)
    )
}

fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_press_parse() {
        assert_eq!(ButtonPress::parse("yes"), ButtonPress::Confirm);
        assert_eq!(ButtonPress::parse("no"), ButtonPress::Reject);
        assert_eq!(
            ButtonPress::parse("Rust basics"),
            ButtonPress::Choice("Rust basics".to_string())
        );
    }

    #[test]
    fn test_notification_body_escapes_html() {
        let body = notification_body("Name", "Ivan <script>", "+1 & 2");
        assert_eq!(body, "Name: Ivan &lt;script&gt;, phone: +1 &amp; 2.");
    }
}
