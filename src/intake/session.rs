//! Per-conversation intake sessions.

use std::collections::HashMap;
use tokio::sync::Mutex;

/// Where a conversation currently stands in the intake flow.
///
/// Derived from field emptiness, so a session can never claim to await
/// confirmation while either field is blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    AwaitingSelection,
    AwaitingPhone,
    AwaitingConfirmation,
}

/// The two-field intake record for one conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Free-text name or chosen course label.
    pub selection: String,
    pub phone: String,
}

impl Session {
    pub fn state(&self) -> FlowState {
        if self.selection.is_empty() {
            FlowState::AwaitingSelection
        } else if self.phone.is_empty() {
            FlowState::AwaitingPhone
        } else {
            FlowState::AwaitingConfirmation
        }
    }
}

/// In-memory session store keyed by chat id.
///
/// Lifecycle: `create` on conversation start, `reset` on rejection,
/// `remove` on successful send. Nothing survives a restart.
pub struct SessionStore {
    sessions: Mutex<HashMap<i64, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Start a fresh, empty session for the chat.
    pub async fn create(&self, chat_id: i64) {
        self.sessions.lock().await.insert(chat_id, Session::default());
    }

    /// Reset both fields to empty, keeping the session alive.
    pub async fn reset(&self, chat_id: i64) {
        self.sessions.lock().await.insert(chat_id, Session::default());
    }

    /// Drop the session entirely. A later event sees a fresh empty one.
    pub async fn remove(&self, chat_id: i64) {
        self.sessions.lock().await.remove(&chat_id);
    }

    /// Current session for the chat, empty if none exists yet.
    pub async fn snapshot(&self, chat_id: i64) -> Session {
        self.sessions
            .lock()
            .await
            .get(&chat_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn set_selection(&self, chat_id: i64, selection: &str) {
        let mut sessions = self.sessions.lock().await;
        sessions.entry(chat_id).or_default().selection = selection.to_string();
    }

    pub async fn set_phone(&self, chat_id: i64, phone: &str) {
        let mut sessions = self.sessions.lock().await;
        sessions.entry(chat_id).or_default().phone = phone.to_string();
    }
}
