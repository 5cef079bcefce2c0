//! Tagged error variants for the intake flow.

use std::fmt;

/// Errors surfaced by the intake flow and its side effects.
///
/// `Gateway` propagates to the dispatch boundary where it is matched by
/// variant; `Mail` and `Menu` are recovered inside the engine (user notice
/// and silent skip respectively) and never cross it.
#[derive(Debug)]
pub enum IntakeError {
    /// Telegram rejected or never received an outbound request.
    Gateway(teloxide::RequestError),
    /// The SMTP relay refused or failed the send.
    Mail(String),
    /// The course table query failed.
    Menu(String),
}

impl fmt::Display for IntakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gateway(e) => write!(f, "telegram gateway error: {e}"),
            Self::Mail(msg) => write!(f, "mail transport error: {msg}"),
            Self::Menu(msg) => write!(f, "menu source error: {msg}"),
        }
    }
}

impl std::error::Error for IntakeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gateway(e) => Some(e),
            Self::Mail(_) | Self::Menu(_) => None,
        }
    }
}

impl From<teloxide::RequestError> for IntakeError {
    fn from(e: teloxide::RequestError) -> Self {
        Self::Gateway(e)
    }
}
