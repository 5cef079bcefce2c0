//! Intake module - collects a selection and phone number, confirms them,
//! and emails the result.

pub mod engine;
pub mod error;
pub mod menu;
pub mod notifier;
pub mod session;
pub mod telegram;


pub use engine::{ButtonPress, IntakeEngine, MenuSource, Notify, Outbox};
pub use error::IntakeError;
pub use menu::SqlMenuSource;
pub use notifier::SmtpNotifier;
pub use telegram::TelegramClient;
