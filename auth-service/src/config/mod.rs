use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub mongodb: MongoConfig,
    pub token: TokenConfig,
    pub security: SecurityConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

/// Token issuance parameters. Constructed once at startup and handed by
/// reference to the codec and the authentication service.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub private_key_path: String,
    pub public_key_path: String,
    pub issuer: String,
    pub audience: String,
    pub access_token_validity_secs: i64,
    pub refresh_token_validity_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub login_attempts: u32,
    pub login_window_seconds: u64,
    pub signup_attempts: u32,
    pub signup_window_seconds: u64,
    pub global_ip_limit: u32,
    pub global_ip_window_seconds: u64,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = AuthConfig {
            common: common_config,
            environment,
            service_name: get_env("SERVICE_NAME", Some("auth-service"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", None, is_prod)?,
                database: get_env("MONGODB_DATABASE", None, is_prod)?,
            },
            token: TokenConfig {
                private_key_path: get_env("AUTH_PRIVATE_KEY_PATH", None, is_prod)?,
                public_key_path: get_env("AUTH_PUBLIC_KEY_PATH", None, is_prod)?,
                issuer: get_env("TOKEN_ISSUER", None, is_prod)?,
                audience: get_env("TOKEN_AUDIENCE", None, is_prod)?,
                access_token_validity_secs: parse_i64(get_env(
                    "ACCESS_TOKEN_VALIDITY_SEC",
                    Some("3600"),
                    is_prod,
                )?)?,
                refresh_token_validity_secs: parse_i64(get_env(
                    "REFRESH_TOKEN_VALIDITY_SEC",
                    Some("604800"),
                    is_prod,
                )?)?,
            },
            security: SecurityConfig {
                allowed_origins: get_env(
                    "ALLOWED_ORIGINS",
                    Some("http://localhost:3000"),
                    is_prod,
                )?
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            },
            rate_limit: RateLimitConfig {
                login_attempts: get_env("RATE_LIMIT_LOGIN_ATTEMPTS", Some("5"), is_prod)?
                    .parse()
                    .unwrap_or(5),
                login_window_seconds: get_env(
                    "RATE_LIMIT_LOGIN_WINDOW_SECONDS",
                    Some("900"),
                    is_prod,
                )?
                .parse()
                .unwrap_or(900),
                signup_attempts: get_env("RATE_LIMIT_SIGNUP_ATTEMPTS", Some("3"), is_prod)?
                    .parse()
                    .unwrap_or(3),
                signup_window_seconds: get_env(
                    "RATE_LIMIT_SIGNUP_WINDOW_SECONDS",
                    Some("3600"),
                    is_prod,
                )?
                .parse()
                .unwrap_or(3600),
                global_ip_limit: get_env("RATE_LIMIT_GLOBAL_IP_LIMIT", Some("100"), is_prod)?
                    .parse()
                    .unwrap_or(100),
                global_ip_window_seconds: get_env(
                    "RATE_LIMIT_GLOBAL_IP_WINDOW_SECONDS",
                    Some("60"),
                    is_prod,
                )?
                .parse()
                .unwrap_or(60),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.common.port == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PORT must be greater than 0"
            )));
        }

        if self.token.access_token_validity_secs <= 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "ACCESS_TOKEN_VALIDITY_SEC must be positive"
            )));
        }

        if self.token.refresh_token_validity_secs <= self.token.access_token_validity_secs {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "REFRESH_TOKEN_VALIDITY_SEC must exceed the access token validity"
            )));
        }

        if self.token.issuer.is_empty() || self.token.audience.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "TOKEN_ISSUER and TOKEN_AUDIENCE must be set"
            )));
        }

        if self.environment == Environment::Prod
            && self.security.allowed_origins.iter().any(|o| o == "*")
        {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "Wildcard CORS origin not allowed in production"
            )));
        }

        // A zero window cannot form a limiter quota
        if self.rate_limit.login_window_seconds == 0
            || self.rate_limit.signup_window_seconds == 0
            || self.rate_limit.global_ip_window_seconds == 0
        {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "Rate limit windows must be positive"
            )));
        }

        Ok(())
    }
}

fn parse_i64(value: String) -> Result<i64, AppError> {
    value
        .parse()
        .map_err(|e: std::num::ParseIntError| AppError::ConfigError(anyhow::anyhow!(e.to_string())))
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}
