use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;
use skyops_core::SchedulingRules;
use skyops_shared::Masked;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub scheduling: SchedulingRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: Masked<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 { 5 }

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    /// Shared secret required for create, update and delete. Empty disables
    /// editing altogether.
    #[serde(default)]
    pub edit_secret: Masked<String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Optional per-environment overrides
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `SKYOPS_AUTH__EDIT_SECRET=...`
            .add_source(config::Environment::with_prefix("SKYOPS").separator("__"));

        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, config::ConfigError> {
        let config: Config = builder.build()?.try_deserialize()?;
        config
            .scheduling
            .validate()
            .map_err(|e| config::ConfigError::Message(format!("scheduling: {}", e)))?;
        Ok(config)
    }
}
