//! Server configuration
//!
//! Defaults, overridden by an optional `config` file, overridden by `BLOG_*`
//! environment variables (e.g. `BLOG_SERVER__BIND_ADDRESS`).

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub bind_address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Path of the SQLite database file; the in-memory store when unset
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        let settings: Settings = config::Config::builder()
            .set_default("server.bind_address", "0.0.0.0:8080")?
            .set_default("database.path", None::<String>)?
            .set_default("auth.jwt_secret", DEFAULT_JWT_SECRET)?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("BLOG").separator("__"))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Failed to parse configuration")?;

        if settings.auth.jwt_secret == DEFAULT_JWT_SECRET {
            warn!("BLOG_AUTH__JWT_SECRET not set, using default (insecure for production)");
        }

        Ok(settings)
    }
}
