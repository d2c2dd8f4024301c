//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `rentalhub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Real-time channel settings.
    pub realtime: RealtimeConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Allowed CORS origins: `*` or a comma-separated list.
    pub cors_origin: String,
    /// Externally reachable URL, only used in the startup log line.
    pub public_url: Option<String>,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
    /// Upper bound of pooled connections.
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection.
    pub acquire_timeout_secs: u64,
    /// Seconds an unused connection stays open.
    pub idle_timeout_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Real-time fan-out configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    /// Events buffered per property channel before slow subscribers lag.
    pub channel_capacity: usize,
}

impl Config {
    /// Load configuration from `rentalhub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("rentalhub.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("RENTALHUB_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("RENTALHUB_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("RENTALHUB_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("RENTALHUB_CORS_ORIGIN") {
            self.server.cors_origin = val;
        }
        if let Some(val) = var("RENTALHUB_PUBLIC_URL") {
            self.server.public_url = Some(val);
        }
        if let Some(val) = var("RENTALHUB_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("RENTALHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "database.max_connections must be non-zero".to_string(),
            ));
        }
        if self.realtime.channel_capacity == 0 {
            return Err(ConfigError::Validation(
                "realtime.channel_capacity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// The URL announced at startup.
    #[must_use]
    pub fn public_url(&self) -> String {
        self.server
            .public_url
            .clone()
            .unwrap_or_else(|| format!("http://{}", self.bind_addr()))
    }

    /// Storage adapter settings derived from the `[database]` section.
    #[must_use]
    pub fn storage(&self) -> rentalhub_adapter_storage_sqlite_sqlx::Config {
        rentalhub_adapter_storage_sqlite_sqlx::Config {
            database_url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            acquire_timeout: Duration::from_secs(self.database.acquire_timeout_secs),
            idle_timeout: Duration::from_secs(self.database.idle_timeout_secs),
            ..rentalhub_adapter_storage_sqlite_sqlx::Config::default()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origin: "*".to_string(),
            public_url: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:rentalhub.db?mode=rwc".to_string(),
            max_connections: 5,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "rentalhubd=info,rentalhub=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn with_env(pairs: &[(&str, &str)]) -> Config {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).cloned());
        config
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.cors_origin, "*");
        assert_eq!(config.database.url, "sqlite:rentalhub.db?mode=rwc");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.acquire_timeout_secs, 30);
        assert_eq!(config.database.idle_timeout_secs, 10);
        assert_eq!(config.realtime.channel_capacity, 64);
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090
            cors_origin = 'https://app.example'
            public_url = 'https://rent.example'

            [database]
            url = 'sqlite:test.db'
            max_connections = 2
            acquire_timeout_secs = 1
            idle_timeout_secs = 3

            [logging]
            filter = 'debug'

            [realtime]
            channel_capacity = 8
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.cors_origin, "https://app.example");
        assert_eq!(config.public_url(), "https://rent.example");
        assert_eq!(config.database.url, "sqlite:test.db");
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.realtime.channel_capacity, 8);

        let storage = config.storage();
        assert_eq!(storage.max_connections, 2);
        assert_eq!(storage.acquire_timeout, Duration::from_secs(1));
        assert_eq!(storage.idle_timeout, Duration::from_secs(3));
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_empty_pool_and_zero_capacity() {
        let mut config = Config::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.realtime.channel_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_accept_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn should_format_bind_addr_and_default_public_url() {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 9090;
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
        assert_eq!(config.public_url(), "http://127.0.0.1:9090");
    }

    #[test]
    fn should_apply_env_overrides() {
        let config = with_env(&[
            ("RENTALHUB_BIND", "127.0.0.1:4000"),
            ("RENTALHUB_DATABASE_URL", "sqlite::memory:"),
            ("RENTALHUB_CORS_ORIGIN", "https://a.example,https://b.example"),
            ("RENTALHUB_PUBLIC_URL", "https://rent.example"),
        ]);
        assert_eq!(config.bind_addr(), "127.0.0.1:4000");
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.server.cors_origin, "https://a.example,https://b.example");
        assert_eq!(config.public_url(), "https://rent.example");
    }

    #[test]
    fn should_prefer_rust_log_over_rentalhub_log() {
        let config = with_env(&[("RENTALHUB_LOG", "warn"), ("RUST_LOG", "trace")]);
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_ignore_unparsable_port_override() {
        let config = with_env(&[("RENTALHUB_PORT", "not-a-port")]);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
