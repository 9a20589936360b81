//! Server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use mynotes_core::DEFAULT_MAX_ATTEMPTS;

/// Default minimum time between two note writes by one account.
pub const DEFAULT_ACTION_SPACING: Duration = Duration::from_secs(5 * 60);

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server port to listen on.
    pub port: u16,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// CORS allowed origins (comma-separated or "*" for all).
    pub cors_allowed_origins: String,
    /// Minimum time between two note writes by one account.
    pub action_spacing: Duration,
    /// Compare-and-swap attempts per id allocation.
    pub allocator_max_attempts: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            log_level: "info".to_string(),
            cors_allowed_origins: "*".to_string(),
            action_spacing: DEFAULT_ACTION_SPACING,
            allocator_max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `PORT`: Server port (default: 3000)
    /// - `LOG_LEVEL`: Logging level (default: "info")
    /// - `CORS_ALLOWED_ORIGINS`: Allowed CORS origins (default: "*")
    /// - `ACTION_SPACING_SECS`: Seconds between note writes (default: 300)
    /// - `ALLOCATOR_MAX_ATTEMPTS`: Id allocation retries (default: 16)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = parse_var(&lookup, "PORT")?.unwrap_or(defaults.port);
        let log_level = lookup("LOG_LEVEL").unwrap_or(defaults.log_level);
        let cors_allowed_origins =
            lookup("CORS_ALLOWED_ORIGINS").unwrap_or(defaults.cors_allowed_origins);
        let action_spacing = parse_var::<u64, _>(&lookup, "ACTION_SPACING_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.action_spacing);
        let allocator_max_attempts = parse_var::<u32, _>(&lookup, "ALLOCATOR_MAX_ATTEMPTS")?
            .unwrap_or(defaults.allocator_max_attempts);

        if allocator_max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                name: "ALLOCATOR_MAX_ATTEMPTS".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            port,
            log_level,
            cors_allowed_origins,
            action_spacing,
            allocator_max_attempts,
        })
    }

    /// Get the socket address for the server.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|raw| {
            raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                name: name.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = ServerConfig::from_lookup(lookup_in(&[])).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.cors_allowed_origins, "*");
        assert_eq!(config.action_spacing, Duration::from_secs(300));
        assert_eq!(config.allocator_max_attempts, 16);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup_in(&[
            ("PORT", "8080"),
            ("ACTION_SPACING_SECS", "0"),
            ("ALLOCATOR_MAX_ATTEMPTS", "4"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.action_spacing, Duration::ZERO);
        assert_eq!(config.allocator_max_attempts, 4);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = ServerConfig::from_lookup(lookup_in(&[("ACTION_SPACING_SECS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("ACTION_SPACING_SECS"));

        assert!(ServerConfig::from_lookup(lookup_in(&[("ALLOCATOR_MAX_ATTEMPTS", "0")])).is_err());
        assert!(ServerConfig::from_lookup(lookup_in(&[("PORT", "99999")])).is_err());
    }
}
