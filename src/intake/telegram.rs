//! Telegram client using teloxide.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::intake::engine::{Button, Outbox, CONFIRM_TOKEN, REJECT_TOKEN};
use crate::intake::error::IntakeError;

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Outbox for TelegramClient {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), IntakeError> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .await
            .map(|_| ())
            .map_err(IntakeError::Gateway)
    }

    async fn send_buttons(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &[Button],
    ) -> Result<(), IntakeError> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .reply_markup(keyboard(buttons))
            .await
            .map(|_| ())
            .map_err(IntakeError::Gateway)
    }
}

/// Yes/No pairs share a row; anything else (course menus) gets one
/// button per row so long labels stay readable.
fn keyboard(buttons: &[Button]) -> InlineKeyboardMarkup {
    let to_button =
        |b: &Button| InlineKeyboardButton::callback(b.label.clone(), b.token.clone());

    let is_yes_no = buttons.len() == 2
        && buttons.iter().any(|b| b.token == CONFIRM_TOKEN)
        && buttons.iter().any(|b| b.token == REJECT_TOKEN);

    if is_yes_no {
        InlineKeyboardMarkup::new(vec![buttons.iter().map(to_button).collect::<Vec<_>>()])
    } else {
        InlineKeyboardMarkup::new(
            buttons
                .iter()
                .map(|b| vec![to_button(b)])
                .collect::<Vec<_>>(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yes_no_share_a_row() {
        let markup = keyboard(&[
            Button::new("Yes", CONFIRM_TOKEN),
            Button::new("No", REJECT_TOKEN),
        ]);
        assert_eq!(markup.inline_keyboard.len(), 1);
        assert_eq!(markup.inline_keyboard[0].len(), 2);
    }

    #[test]
    fn test_menu_options_get_one_row_each() {
        let markup = keyboard(&[
            Button::new("Rust basics", "Rust basics"),
            Button::new("Advanced Rust", "Advanced Rust"),
            Button::new("Async Rust", "Async Rust"),
        ]);
        assert_eq!(markup.inline_keyboard.len(), 3);
        assert!(markup.inline_keyboard.iter().all(|row| row.len() == 1));
    }
}
