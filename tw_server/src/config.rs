//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    str::FromStr,
    time::Duration,
};

use twentyone::{messages::NAME_LEN, server::TableConfig};

/// Any interface, ephemeral port.
pub const DEFAULT_BIND: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0);

/// Values given on the command line. Each one wins over its environment
/// variable.
#[derive(Debug, Default)]
pub struct Overrides {
    pub bind: Option<SocketAddr>,
    pub name: Option<String>,
    pub broadcast: Option<SocketAddr>,
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP listen address. Port 0 picks an ephemeral port, which the
    /// offer then advertises.
    pub bind: SocketAddr,
    pub table: TableConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but can't be parsed, or the
    /// result fails [`ServerConfig::validate`].
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        Self::from_lookup(overrides, |key| std::env::var(key).ok())
    }

    fn from_lookup<F>(overrides: Overrides, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = TableConfig::default();

        let bind = match overrides.bind {
            Some(bind) => bind,
            None => parse_env_or(&lookup, "TW_BIND", DEFAULT_BIND)?,
        };
        let name = overrides
            .name
            .or_else(|| lookup("TW_SERVER_NAME"))
            .unwrap_or(defaults.name);
        let broadcast = match overrides.broadcast {
            Some(broadcast) => broadcast,
            None => parse_env_or(&lookup, "TW_BROADCAST", defaults.broadcast)?,
        };

        let default_interval_ms = defaults.offer_interval.as_millis() as u64;
        let offer_interval_ms =
            parse_env_or(&lookup, "TW_OFFER_INTERVAL_MS", default_interval_ms)?;
        let default_timeout_secs = defaults.read_timeout.map_or(0, |t| t.as_secs());
        let read_timeout_secs =
            parse_env_or(&lookup, "TW_READ_TIMEOUT_SECS", default_timeout_secs)?;

        let config = Self {
            bind,
            table: TableConfig {
                name,
                broadcast,
                offer_interval: Duration::from_millis(offer_interval_ms),
                // 0 disables the timeout.
                read_timeout: (read_timeout_secs > 0)
                    .then(|| Duration::from_secs(read_timeout_secs)),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    ///
    /// # Errors
    ///
    /// Returns error if the name is empty or doesn't fit the offer, or the
    /// offer interval is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table.name.is_empty() {
            return Err(ConfigError::Invalid {
                var: "TW_SERVER_NAME".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }
        if self.table.name.len() > NAME_LEN {
            return Err(ConfigError::Invalid {
                var: "TW_SERVER_NAME".to_string(),
                reason: format!("Must be at most {NAME_LEN} bytes"),
            });
        }
        if self.table.offer_interval.is_zero() {
            return Err(ConfigError::Invalid {
                var: "TW_OFFER_INTERVAL_MS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse an environment variable with default fallback. A set
/// but unparsable variable is an error, not a silent default.
fn parse_env_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("Can't parse {value:?}"),
        }),
        None => Ok(default),
    }
}
