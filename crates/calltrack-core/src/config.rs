//! Configuration management for calltrack

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use validator::Validate;

/// Longest leaderboard window, in days, the server accepts
pub const MAX_WINDOW_DAYS: u32 = 365;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Backend-as-a-service connection
    #[serde(default)]
    pub remote: RemoteConfig,

    /// API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Leaderboard configuration
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,

    /// Security settings page configuration
    #[serde(default)]
    pub security: SecurityConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Backend-as-a-service connection settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RemoteConfig {
    /// Project URL, e.g. `https://project.example.co`
    #[serde(default = "default_remote_url")]
    #[validate(url)]
    pub base_url: String,

    /// Public (anonymous) API key sent with every request
    #[serde(default)]
    pub anon_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    #[validate(range(min = 1, max = 300))]
    pub request_timeout: u64,
}

/// API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Enable CORS
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,

    /// CORS allowed origins
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

/// Leaderboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    /// Trailing window, in days, of calls counted towards the ranking
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

/// Security settings page configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Rows per page for devices and login history
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Digits in a one-time code
    #[serde(default = "default_otp_digits")]
    pub otp_digits: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or text)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8080
}

fn default_remote_url() -> String {
    "http://localhost:54321".to_string()
}

const fn default_request_timeout() -> u64 {
    30
}

const fn default_enable_cors() -> bool {
    true
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

const fn default_window_days() -> u32 {
    30
}

const fn default_page_size() -> u32 {
    20
}

const fn default_otp_digits() -> usize {
    6
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_remote_url(),
            anon_key: String::new(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enable_cors: default_enable_cors(),
            cors_origins: default_cors_origins(),
        }
    }
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            otp_digits: default_otp_digits(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from an optional `config` file and the environment
    ///
    /// Environment variables use the `CALLTRACK` prefix with `__` between
    /// sections, e.g. `CALLTRACK__REMOTE__BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded, parsed or validated.
    pub fn load() -> crate::Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("CALLTRACK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        if let Err(err) = config.validate() {
            warn!("Rejected configuration: {}", err);
            return Err(err);
        }

        debug!(
            "Loaded configuration for {}:{} against {}",
            config.server.host, config.server.port, config.remote.base_url
        );
        Ok(config)
    }

    /// Check the values the services cannot work without
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first offending field.
    pub fn validate(&self) -> crate::Result<()> {
        if self.server.port == 0 {
            return Err(crate::Error::Configuration {
                message: "server.port must be non-zero".to_string(),
            });
        }

        self.remote
            .validate()
            .map_err(|e| crate::Error::Configuration {
                message: format!("remote: {e}"),
            })?;

        if !(1..=MAX_WINDOW_DAYS).contains(&self.leaderboard.window_days) {
            return Err(crate::Error::Configuration {
                message: format!("leaderboard.window_days must be between 1 and {MAX_WINDOW_DAYS}"),
            });
        }

        if self.security.page_size == 0 {
            return Err(crate::Error::Configuration {
                message: "security.page_size must be non-zero".to_string(),
            });
        }

        if self.security.otp_digits == 0 {
            return Err(crate::Error::Configuration {
                message: "security.otp_digits must be non-zero".to_string(),
            });
        }

        Ok(())
    }
}
