//! Configuration management

use anyhow::{Context, Result};

const DEFAULT_DATABASE: &str = "mydatabase";
const DEFAULT_COLLECTION: &str = "userdata";
const DEFAULT_SERVER_SELECTION_TIMEOUT_SECS: u64 = 10;

/// Bot configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token
    pub telegram_bot_token: String,

    /// MongoDB connection string (not needed with the in-memory store)
    pub mongo_uri: Option<String>,

    /// Database holding the record collection
    pub database_name: String,

    /// Collection of user records
    pub collection_name: String,

    /// How long the driver waits for a usable server
    pub server_selection_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let telegram_bot_token = non_empty("TELEGRAM_BOT_TOKEN")
            .or_else(|| non_empty("TELOXIDE_TOKEN"))
            .context("TELEGRAM_BOT_TOKEN must be set")?;

        let mongo_uri = non_empty("MONGO_URI");

        let database_name =
            non_empty("MONGO_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let collection_name =
            non_empty("MONGO_COLLECTION").unwrap_or_else(|| DEFAULT_COLLECTION.to_string());

        let server_selection_timeout_secs = match non_empty("MONGO_SERVER_SELECTION_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse()
                .with_context(|| format!("Invalid MONGO_SERVER_SELECTION_TIMEOUT_SECS: {}", v))?,
            None => DEFAULT_SERVER_SELECTION_TIMEOUT_SECS,
        };

        Ok(Self {
            telegram_bot_token,
            mongo_uri,
            database_name,
            collection_name,
            server_selection_timeout_secs,
        })
    }

    /// Fail unless a MongoDB connection string is configured
    pub fn require_mongo_uri(&self) -> Result<&str> {
        self.mongo_uri
            .as_deref()
            .context("MONGO_URI must be set (or run with --in-memory)")
    }
}
