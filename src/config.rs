use anyhow::Context;

use crate::expiry::{ExpiryPolicy, DEFAULT_WARN_DAYS};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    /// Days before expiration at which a lot counts as near expiry.
    pub expiry_warn_days: i64,
    /// Remote chatbot endpoint; local keyword rules answer when unset.
    pub chat_service_url: Option<String>,
    pub chat_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let expiry_warn_days: i64 = std::env::var("EXPIRY_WARN_DAYS")
            .unwrap_or_else(|_| DEFAULT_WARN_DAYS.to_string())
            .parse()
            .context("EXPIRY_WARN_DAYS must be a valid number")?;
        anyhow::ensure!(expiry_warn_days >= 0, "EXPIRY_WARN_DAYS must be >= 0");

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8081".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DB_MAX_CONNECTIONS must be a valid number")?,
            expiry_warn_days,
            chat_service_url: std::env::var("CHAT_SERVICE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            chat_timeout_secs: std::env::var("CHAT_TIMEOUT_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("CHAT_TIMEOUT_SECS must be a valid number")?,
        })
    }

    pub fn expiry_policy(&self) -> ExpiryPolicy {
        ExpiryPolicy::new(self.expiry_warn_days)
    }
}
