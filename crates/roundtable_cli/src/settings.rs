//! Operator settings read from `ROUNDTABLE_*` environment variables.

use anyhow::{anyhow, Context, Result};
use config::{Config, Environment};
use roundtable_core::{default_log_level, SessionConfig};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize)]
pub struct Settings {
    pub database_path: PathBuf,
    pub log_dir: Option<String>,
    pub log_level: String,
    pub access_token_secret: Option<String>,
    pub refresh_token_secret: Option<String>,
    pub production: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Config::builder()
            .set_default("database_path", "roundtable.db")?
            .set_default("log_level", default_log_level())?
            .set_default("production", false)?
            .add_source(Environment::with_prefix("ROUNDTABLE").try_parsing(true))
            .build()
            .context("failed to read ROUNDTABLE_* settings")?
            .try_deserialize()
            .context("invalid ROUNDTABLE_* settings")
    }

    /// Session secrets are only needed by commands that touch sessions.
    pub fn session_config(&self) -> Result<SessionConfig> {
        let access = self
            .access_token_secret
            .clone()
            .ok_or_else(|| anyhow!("ROUNDTABLE_ACCESS_TOKEN_SECRET is not set"))?;
        let refresh = self
            .refresh_token_secret
            .clone()
            .ok_or_else(|| anyhow!("ROUNDTABLE_REFRESH_TOKEN_SECRET is not set"))?;
        let config = SessionConfig::new(access, refresh, self.production);
        config.validate().context("invalid session secrets")?;
        Ok(config)
    }
}
