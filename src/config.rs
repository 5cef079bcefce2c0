use std::fmt;

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A required environment variable is missing or empty.
    MissingVar(&'static str),
    /// Some but not all of the database variables are set.
    PartialDatabase(&'static str),
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVar(name) => {
                write!(f, "missing required environment variable {name}")
            }
            Self::PartialDatabase(name) => {
                write!(f, "database configuration is incomplete: {name} is not set")
            }
            Self::Validation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Connection settings for the course menu database.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

#[derive(Debug)]
pub struct Config {
    pub bot_token: String,
    /// SMTP account username (the sending address).
    pub mail_user: String,
    /// SMTP account password.
    pub mail_password: String,
    /// Destination address for intake notifications.
    pub recipient: String,
    /// When present the bot runs in menu mode and offers course
    /// buttons instead of asking for a free-text name.
    pub database: Option<DbConfig>,
}

const BOT_API_KEY: &str = "BOT_API_KEY";
const BOT_APP_USER: &str = "BOT_APP_USER";
const BOT_APP_PASS: &str = "BOT_APP_PASS";
const BOT_DOC_EMAIL: &str = "BOT_DOC_EMAIL";

const DB_HOST: &str = "DB_HOST";
const DB_USER: &str = "DB_USER";
const DB_PASS: &str = "DB_PASS";
const DB_NAME: &str = "DB_NAME";

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through a lookup function (env in production,
    /// a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| -> Result<String, ConfigError> {
            match lookup(name) {
                Some(v) if !v.trim().is_empty() => Ok(v),
                _ => Err(ConfigError::MissingVar(name)),
            }
        };

        let bot_token = require(BOT_API_KEY)?;
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let token_parts: Vec<&str> = bot_token.split(':').collect();
        if token_parts.len() != 2 || token_parts[0].parse::<u64>().is_err() || token_parts[1].is_empty() {
            return Err(ConfigError::Validation(
                "BOT_API_KEY appears invalid (expected format: 123456789:ABCdefGHI...)".into(),
            ));
        }

        let mail_user = require(BOT_APP_USER)?;
        let mail_password = require(BOT_APP_PASS)?;
        let recipient = require(BOT_DOC_EMAIL)?;
        if !recipient.contains('@') {
            return Err(ConfigError::Validation(format!(
                "BOT_DOC_EMAIL '{recipient}' does not look like an email address"
            )));
        }

        // The database group is all-or-nothing: one variable set without
        // the others is a deployment mistake, not free-text mode.
        let db_vars = [DB_HOST, DB_USER, DB_PASS, DB_NAME];
        let set_count = db_vars.iter().filter(|name| lookup(name).is_some()).count();
        let database = match set_count {
            0 => None,
            4 => Some(DbConfig {
                host: require(DB_HOST)?,
                user: require(DB_USER)?,
                password: require(DB_PASS)?,
                database: require(DB_NAME)?,
            }),
            _ => {
                let missing = db_vars
                    .iter()
                    .find(|name| lookup(name).is_none())
                    .copied()
                    .unwrap_or(DB_HOST);
                return Err(ConfigError::PartialDatabase(missing));
            }
        };

        Ok(Self {
            bot_token,
            mail_user,
            mail_password,
            recipient,
            database,
        })
    }
}
