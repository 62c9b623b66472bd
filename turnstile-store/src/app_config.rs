use std::env;

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub checkin: CheckinConfig,
    pub migration: MigrationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CheckinConfig {
    /// Public base URL baked into scan URLs on tickets.
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MigrationConfig {
    /// Connection string for the legacy store the one-shot migration reads.
    pub legacy_database_url: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file, not checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of TURNSTILE)
            // Eg.. `TURNSTILE__SERVER__PORT=9090` would set `server.port`
            .add_source(config::Environment::with_prefix("TURNSTILE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
