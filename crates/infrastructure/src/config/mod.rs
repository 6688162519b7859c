//! Application configuration
//!
//! Split into focused sub-modules by domain:
//! - `server`: HTTP server settings
//! - `database`: SQLite database settings
//! - `google`: Google OAuth client and Calendar API settings
//! - `security`: API key authentication

mod database;
mod google;
mod security;
mod server;

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

pub use database::DatabaseConfig;
pub use google::GoogleCalendarAppConfig;
pub use security::{ApiKeyEntry, SecurityConfig};
pub use server::{LogFormat, ServerConfig};

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Application environment (development or production)
///
/// Controls security validation strictness and error detail exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment - relaxed security warnings
    #[default]
    Development,
    /// Production environment - strict security validation
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!(
                "Invalid environment: {s}. Use 'development' or 'production'"
            )),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment
    #[serde(default)]
    pub environment: Environment,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// SQLite database settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Google Calendar sync settings
    #[serde(default)]
    pub google_calendar: GoogleCalendarAppConfig,

    /// Security settings
    #[serde(default)]
    pub security: SecurityConfig,
}

impl AppConfig {
    /// Load configuration from `config.toml` and `TASKSYNC_*` environment variables
    ///
    /// Nested keys use a double underscore so that field names may contain
    /// single underscores, e.g. `TASKSYNC_GOOGLE_CALENDAR__CLIENT_ID`.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // Start with defaults
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("database.path", "tasksync.db")?
            .set_default("google_calendar.calendar_id", "primary")?
            // Load from file if exists
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables (e.g., TASKSYNC_SERVER__PORT)
            .add_source(
                config::Environment::with_prefix("TASKSYNC")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Whether this is a production deployment
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Log configuration problems that do not prevent startup
    ///
    /// Returns the number of warnings emitted.
    pub fn warn_on_insecure_settings(&self) -> usize {
        let mut warnings = 0;

        let plaintext = self.security.count_plaintext_keys();
        if plaintext > 0 {
            warn!(
                count = plaintext,
                "API keys must be Argon2 hashes; plaintext entries will never match"
            );
            warnings += 1;
        }

        if self.is_production() && !self.security.has_api_keys() {
            warn!("No API keys configured in production, every request runs as the default user");
            warnings += 1;
        }

        if !self.google_calendar.is_configured() {
            warn!("Google Calendar client is not configured, calendar sync is disabled");
            warnings += 1;
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_default_is_development() {
        let env = Environment::default();
        assert_eq!(env, Environment::Development);
    }

    #[test]
    fn environment_display() {
        assert_eq!(format!("{}", Environment::Development), "development");
        assert_eq!(format!("{}", Environment::Production), "production");
    }

    #[test]
    fn environment_from_str() {
        assert_eq!(
            "dev".parse::<Environment>().unwrap(),
            Environment::Development
        );
        assert_eq!(
            "PRODUCTION".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn app_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.path, "tasksync.db");
        assert_eq!(config.google_calendar.calendar_id, "primary");
        assert!(!config.google_calendar.is_configured());
        assert!(!config.is_production());
    }

    #[test]
    fn app_config_deserializes_from_toml_sections() {
        let source = r#"
            environment = "production"

            [server]
            port = 8080

            [google_calendar]
            client_id = "client"
            client_secret = "secret"
            redirect_uri = "http://localhost:8080/v1/calendar/callback"

            [[security.api_keys]]
            hash = "$argon2id$v=19$m=19456,t=2,p=1$abc$def"
            user_id = "550e8400-e29b-41d4-a716-446655440000"
        "#;

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert!(config.is_production());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.google_calendar.is_configured());
        assert_eq!(config.security.api_keys.len(), 1);
    }

    #[test]
    fn serialized_config_never_contains_client_secret() {
        let mut config = AppConfig::default();
        config.google_calendar.client_secret = Some("top-secret".to_string().into());

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("top-secret"));
        assert!(!json.contains("client_secret"));
    }

    #[test]
    fn insecure_settings_are_counted() {
        let mut config = AppConfig {
            environment: Environment::Production,
            ..AppConfig::default()
        };
        config.security.api_keys.push(ApiKeyEntry {
            hash: "plaintext".to_string(),
            user_id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
        });

        // plaintext key + unconfigured Google client
        assert_eq!(config.warn_on_insecure_settings(), 2);
    }
}
