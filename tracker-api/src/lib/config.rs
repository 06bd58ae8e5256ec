use std::env;
use std::time::Duration;

use config::builder::ConfigBuilder as Layers;
use config::builder::DefaultState;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::domain::user::service::RateLimits;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
    pub rate_limit: RateLimitConfig,
    pub email: EmailConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    /// Bound on acquiring a pooled connection, fixed at setup.
    pub connect_timeout_secs: u64,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    /// Argon2 time cost.
    pub cost: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    pub login_max_attempts: usize,
    pub login_window_secs: u64,
    pub reset_max_requests: usize,
    pub reset_window_secs: u64,
    pub cleanup_interval_secs: u64,
}

impl RateLimitConfig {
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl From<&RateLimitConfig> for RateLimits {
    fn from(config: &RateLimitConfig) -> Self {
        Self {
            login_max_attempts: config.login_max_attempts,
            login_window: Duration::from_secs(config.login_window_secs),
            reset_max_requests: config.reset_max_requests,
            reset_window: Duration::from_secs(config.reset_window_secs),
        }
    }
}

/// Outbound mail settings. Delivery is attempted only when host, username
/// and password are all present; otherwise mails go to the log.
#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    /// Sender address; the SMTP username is used when absent.
    pub from_address: Option<String>,
    /// Base of the links embedded in password reset mails.
    #[serde(default = "default_app_base_url")]
    pub app_base_url: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_username: None,
            smtp_password: None,
            from_address: None,
            app_base_url: default_app_base_url(),
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}

fn default_app_base_url() -> String {
    "http://localhost:8080".to_string()
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let files = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false));

        Self::with_environment(files)
    }

    /// Finish `files` with the environment layer on top and deserialize.
    ///
    /// Variables use `__` between section and key:
    /// `RATE_LIMIT__LOGIN_MAX_ATTEMPTS=10` overrides `rate_limit.login_max_attempts`.
    fn with_environment(files: Layers<DefaultState>) -> Result<Self, ConfigError> {
        files
            .add_source(Environment::default().separator("__"))
            .build()?
            .try_deserialize()
    }
}
