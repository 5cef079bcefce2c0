//! Course menu backed by a MySQL table.

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use tracing::debug;

use crate::config::DbConfig;
use crate::intake::engine::{MenuOption, MenuSource};
use crate::intake::error::IntakeError;

/// Read-only menu source querying `SELECT name FROM courses`.
///
/// The pool connects lazily: a bad database is a runtime log line on the
/// first menu display, not a startup failure.
pub struct SqlMenuSource {
    pool: MySqlPool,
}

impl SqlMenuSource {
    pub fn connect(config: &DbConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        let pool = MySqlPoolOptions::new()
            .max_connections(5)
            .connect_lazy_with(options);

        Self { pool }
    }
}

#[async_trait]
impl MenuSource for SqlMenuSource {
    async fn list_options(&self) -> Result<Vec<MenuOption>, IntakeError> {
        let names: Vec<String> = sqlx::query_scalar("SELECT name FROM courses")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| IntakeError::Menu(e.to_string()))?;

        debug!("Fetched {} course names", names.len());
        Ok(names.into_iter().map(|label| MenuOption { label }).collect())
    }
}
