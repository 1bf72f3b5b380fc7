//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. `.env` file (if present, exported into the process environment)
//! 3. Configuration files (config/default.toml, config/local.toml)
//! 4. Environment variables (override)

use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub github: GitHubOAuthConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8000)
    pub port: u16,
    /// Public base URL (e.g., "https://octogate.example.com")
    pub app_url: String,
    /// Directory served under /static
    pub static_dir: String,
}

impl ServerConfig {
    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.app_url.trim_end_matches('/')
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx connection string (e.g., "sqlite://octogate.db?mode=rwc")
    pub url: String,
}

/// Session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign the OAuth state cookie (32+ bytes)
    pub session_key: String,
}

/// GitHub OAuth configuration
///
/// Missing or blank credentials leave the provider unregistered; the
/// login and callback routes then fail with a server error.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubOAuthConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    #[serde(default = "default_github_authorize_url")]
    pub authorize_url: String,
    #[serde(default = "default_github_token_url")]
    pub token_url: String,
    #[serde(default = "default_github_userinfo_url")]
    pub userinfo_url: String,
    #[serde(default = "default_github_scope")]
    pub scope: String,
}

impl Default for GitHubOAuthConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            authorize_url: default_github_authorize_url(),
            token_url: default_github_token_url(),
            userinfo_url: default_github_userinfo_url(),
            scope: default_github_scope(),
        }
    }
}

impl GitHubOAuthConfig {
    /// Client credentials, if both are present and non-blank
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let id = self.client_id.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
        let secret = self
            .client_secret
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())?;
        Some((id, secret))
    }
}

fn default_github_authorize_url() -> String {
    "https://github.com/login/oauth/authorize".to_string()
}

fn default_github_token_url() -> String {
    "https://github.com/login/oauth/access_token".to_string()
}

fn default_github_userinfo_url() -> String {
    "https://api.github.com/user".to_string()
}

fn default_github_scope() -> String {
    "user:email".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl LoggingConfig {
    /// Default `EnvFilter` directives when `RUST_LOG` is unset
    pub fn filter_directives(&self) -> String {
        format!("octogate={},tower_http=debug", self.level.trim().to_lowercase())
    }

    pub fn is_json(&self) -> bool {
        self.format.trim().eq_ignore_ascii_case("json")
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. `.env` (if exists)
    /// 3. config/default.toml (if exists)
    /// 4. config/local.toml (if exists)
    /// 5. Environment variables (OCTOGATE__*)
    ///
    /// # Errors
    /// Returns error if a required setting is missing or invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
            Err(error) if error.not_found() => {}
            Err(error) => {
                return Err(crate::error::AppError::Config(format!(
                    "failed to read .env file: {error}"
                )));
            }
        }

        let config = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.static_dir", "static")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("OCTOGATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        const MIN_SESSION_KEY_BYTES: usize = 32;

        if self.auth.session_key.len() < MIN_SESSION_KEY_BYTES {
            return Err(crate::error::AppError::Config(format!(
                "auth.session_key must be at least {} bytes",
                MIN_SESSION_KEY_BYTES
            )));
        }

        let app_url = url::Url::parse(&self.server.app_url).map_err(|e| {
            crate::error::AppError::Config(format!("server.app_url is not a valid URL: {e}"))
        })?;
        if !matches!(app_url.scheme(), "http" | "https") {
            return Err(crate::error::AppError::Config(
                "server.app_url must use http or https".to_string(),
            ));
        }

        let level = self.logging.level.trim().to_lowercase();
        if !matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
            return Err(crate::error::AppError::Config(format!(
                "logging.level must be one of trace, debug, info, warn, error (got {:?})",
                self.logging.level
            )));
        }
        if !matches!(self.logging.format.trim().to_lowercase().as_str(), "pretty" | "json") {
            return Err(crate::error::AppError::Config(format!(
                "logging.format must be \"pretty\" or \"json\" (got {:?})",
                self.logging.format
            )));
        }

        if self.database.url.trim().is_empty() {
            return Err(crate::error::AppError::Config(
                "database.url must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
