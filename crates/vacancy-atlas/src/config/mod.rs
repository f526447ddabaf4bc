use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub census: CensusConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            census: CensusConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

pub const DEFAULT_ACS_URL: &str = "https://api.census.gov/data/2022/acs/acs5";
pub const DEFAULT_TIGER_URL: &str =
    "https://tigerweb.geo.census.gov/arcgis/rest/services/TIGERweb";

/// Endpoints and table variables for the census statistics and boundary services.
#[derive(Debug, Clone)]
pub struct CensusConfig {
    pub acs_url: String,
    pub tiger_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    /// ACS variable holding the total housing unit count.
    pub total_variable: String,
    /// ACS variable holding the vacant housing unit count.
    pub vacant_variable: String,
}

impl Default for CensusConfig {
    fn default() -> Self {
        Self {
            acs_url: DEFAULT_ACS_URL.to_string(),
            tiger_url: DEFAULT_TIGER_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
            total_variable: "B25002_001E".to_string(),
            vacant_variable: "B25002_003E".to_string(),
        }
    }
}

impl CensusConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let timeout = match env::var("CENSUS_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::InvalidTimeout)?,
            Err(_) => defaults.timeout,
        };

        let api_key = env::var("CENSUS_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        Ok(Self {
            acs_url: env::var("CENSUS_ACS_URL").unwrap_or(defaults.acs_url),
            tiger_url: env::var("CENSUS_TIGER_URL").unwrap_or(defaults.tiger_url),
            api_key,
            timeout,
            total_variable: env::var("CENSUS_TOTAL_VARIABLE").unwrap_or(defaults.total_variable),
            vacant_variable: env::var("CENSUS_VACANT_VARIABLE")
                .unwrap_or(defaults.vacant_variable),
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "CENSUS_TIMEOUT_SECS must be a positive number of seconds")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidTimeout => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "CENSUS_ACS_URL",
            "CENSUS_TIGER_URL",
            "CENSUS_API_KEY",
            "CENSUS_TIMEOUT_SECS",
            "CENSUS_TOTAL_VARIABLE",
            "CENSUS_VACANT_VARIABLE",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.census.acs_url, DEFAULT_ACS_URL);
        assert_eq!(config.census.total_variable, "B25002_001E");
        assert_eq!(config.census.vacant_variable, "B25002_003E");
        assert_eq!(config.census.timeout, Duration::from_secs(30));
        assert!(config.census.api_key.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn census_overrides_are_applied() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CENSUS_API_KEY", "  secret  ");
        env::set_var("CENSUS_TIMEOUT_SECS", "5");
        env::set_var("APP_ENV", "ci");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Test);
        assert_eq!(config.census.api_key.as_deref(), Some("secret"));
        assert_eq!(config.census.timeout, Duration::from_secs(5));
        reset_env();
    }

    #[test]
    fn rejects_zero_timeout() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CENSUS_TIMEOUT_SECS", "0");
        let error = AppConfig::load().expect_err("zero timeout rejected");
        assert!(matches!(error, ConfigError::InvalidTimeout));
        reset_env();
    }
}
