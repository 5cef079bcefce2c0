mod config;
mod intake;

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use teloxide::utils::command::BotCommands;
use teloxide::RequestError;
use tracing::{debug, error, info, warn};
use tracing_subscriber::prelude::*;

use config::Config;
use intake::{
    ButtonPress, IntakeEngine, IntakeError, MenuSource, SmtpNotifier, SqlMenuSource,
    TelegramClient,
};

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
enum Command {
    #[command(description = "Launch bot")]
    Start,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    let bot = Bot::new(&config.bot_token);

    let notifier = match SmtpNotifier::new(&config.mail_user, &config.mail_password) {
        Ok(notifier) => notifier,
        Err(e) => {
            error!("Mail transport setup failed: {e}");
            std::process::exit(1);
        }
    };

    let menu: Option<Arc<dyn MenuSource>> = match config.database {
        Some(ref db) => {
            info!("Menu mode enabled (database {} on {})", db.database, db.host);
            Some(Arc::new(SqlMenuSource::connect(db)))
        }
        None => {
            info!("Free-text mode (no database configured)");
            None
        }
    };

    let engine = Arc::new(IntakeEngine::new(
        config.recipient.clone(),
        Arc::new(TelegramClient::new(bot.clone())),
        Arc::new(notifier),
        menu,
    ));

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register bot commands: {e}");
    }

    info!("🚀 Starting intake bot...");

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(Update::filter_message().endpoint(handle_message))
        .branch(Update::filter_callback_query().endpoint(handle_callback));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![engine])
        .default_handler(|update| async move {
            debug!("Unhandled update {}", update.id.0);
        })
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn handle_command(
    msg: Message,
    cmd: Command,
    engine: Arc<IntakeEngine>,
) -> ResponseResult<()> {
    match cmd {
        Command::Start => {
            let context = format!("/start in chat {}", msg.chat.id);
            report(&context, engine.handle_start(msg.chat.id.0).await);
        }
    }
    Ok(())
}

async fn handle_message(msg: Message, engine: Arc<IntakeEngine>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let context = format!("message {} in chat {}", msg.id.0, msg.chat.id);
    report(&context, engine.handle_text(msg.chat.id.0, text).await);
    Ok(())
}

async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    engine: Arc<IntakeEngine>,
) -> ResponseResult<()> {
    let chat_id = q.message.as_ref().map(|m| m.chat().id.0);

    // Clear the client-side spinner even when the press carries nothing usable.
    if let Err(e) = bot.answer_callback_query(q.id).await {
        debug!("Failed to answer callback query: {e}");
    }

    let (Some(chat_id), Some(data)) = (chat_id, q.data) else {
        return Ok(());
    };

    let context = format!("callback {data:?} in chat {chat_id}");
    report(&context, engine.handle_button(chat_id, ButtonPress::parse(&data)).await);
    Ok(())
}

/// Log a flow error together with the event that triggered it. Gateway
/// faults are matched by variant so API rejections and connectivity
/// failures read differently in the log.
fn report(context: &str, result: Result<(), IntakeError>) {
    match result {
        Ok(()) => {}
        Err(IntakeError::Gateway(RequestError::Api(e))) => {
            error!("Telegram rejected a request while handling {context}: {e}");
        }
        Err(IntakeError::Gateway(RequestError::Network(e))) => {
            error!("Could not contact Telegram while handling {context}: {e}");
        }
        Err(IntakeError::Gateway(e)) => {
            error!("Gateway error while handling {context}: {e}");
        }
        Err(e) => {
            error!("Error while handling {context}: {e}");
        }
    }
}
