//! Environment-driven server configuration.

use std::net::SocketAddr;

use thiserror::Error;

/// Bind address when `MATHSPROUT_ADDR` is not set. Localhost only.
pub const DEFAULT_ADDR: &str = "127.0.0.1:7310";

/// Environment variable naming the listen address.
pub const ADDR_VAR: &str = "MATHSPROUT_ADDR";
/// Environment variable naming the `SQLite` database URL. When absent the
/// server runs against in-memory storage.
pub const DB_VAR: &str = "MATHSPROUT_DB";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid {ADDR_VAR} value {value:?}: expected host:port")]
    InvalidAddr { value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: Option<String>,
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidAddr` when the address does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_addr = lookup(ADDR_VAR).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = raw_addr
            .parse()
            .map_err(|_| ConfigError::InvalidAddr { value: raw_addr })?;
        Ok(Self {
            addr,
            database_url: lookup(DB_VAR),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_localhost_and_in_memory() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.addr, DEFAULT_ADDR.parse().unwrap());
        assert!(config.database_url.is_none());
    }

    #[test]
    fn reads_both_variables() {
        let config = Config::from_lookup(|name| match name {
            ADDR_VAR => Some("0.0.0.0:9000".to_string()),
            DB_VAR => Some("sqlite://mathsprout.db".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.database_url.as_deref(), Some("sqlite://mathsprout.db"));
    }

    #[test]
    fn rejects_a_malformed_address() {
        let err = Config::from_lookup(|name| {
            (name == ADDR_VAR).then(|| "not-an-address".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAddr { .. }));
    }
}
