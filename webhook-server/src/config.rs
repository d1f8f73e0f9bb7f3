//! Configuration module for environment variable parsing.
//!
//! Everything the server needs is read once at startup into an immutable
//! [`Config`], which is then shared read-only with every request handler.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

/// Default listening port, matching the port the platform dashboard was set up against.
pub const DEFAULT_PORT: u16 = 5000;

/// Default upper bound on webhook request bodies (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Default per-request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared secret typed into the platform dashboard as the "Verify Token".
    /// `None` means no token is configured and every handshake is rejected.
    pub verify_token: Option<String>,

    /// Port for the web server to listen on
    pub port: u16,

    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,

    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            verify_token: None,
            port: DEFAULT_PORT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// `from_env` is a thin wrapper over this; tests pass a map instead of
    /// mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        Config {
            verify_token: lookup("VERIFY_TOKEN").filter(|t| !t.trim().is_empty()),

            port: parse_or("PORT", lookup("PORT"), defaults.port),

            max_body_bytes: parse_or(
                "MAX_BODY_BYTES",
                lookup("MAX_BODY_BYTES"),
                defaults.max_body_bytes,
            ),

            request_timeout_ms: parse_or(
                "REQUEST_TIMEOUT_MS",
                lookup("REQUEST_TIMEOUT_MS"),
                defaults.request_timeout_ms,
            ),
        }
    }

    /// Per-request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Parse an optional raw value, falling back to `default` when it is absent or invalid.
fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr,
{
    let Some(raw) = raw else {
        return default;
    };

    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.verify_token, None);
        assert_eq!(config.port, 5000);
        assert_eq!(config.max_body_bytes, 1024 * 1024);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_values_from_lookup() {
        let config = config_from(&[
            ("VERIFY_TOKEN", "ardanai"),
            ("PORT", "8080"),
            ("MAX_BODY_BYTES", "2048"),
            ("REQUEST_TIMEOUT_MS", " 250 "),
        ]);
        assert_eq!(config.verify_token.as_deref(), Some("ardanai"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_body_bytes, 2048);
        assert_eq!(config.request_timeout_ms, 250);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[("PORT", "not-a-port"), ("MAX_BODY_BYTES", "-1")]);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    fn test_blank_verify_token_is_unset() {
        let config = config_from(&[("VERIFY_TOKEN", "   ")]);
        assert!(config.verify_token.is_none());
    }

    #[test]
    fn test_from_env_reads_process_environment() {
        // Only asserts on a value no other test touches.
        env::remove_var("REQUEST_TIMEOUT_MS");
        let config = Config::from_env();
        assert_eq!(config.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
    }
}
