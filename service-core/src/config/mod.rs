use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

/// Settings shared by every service in the family. Service-specific
/// configuration wraps this with `#[serde(flatten)]`.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

impl Config {
    /// Layered load: an optional `settings` file, overridden by
    /// `SERVICE__`-prefixed environment variables (e.g. `SERVICE__PORT`).
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(config::Environment::with_prefix("SERVICE").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
