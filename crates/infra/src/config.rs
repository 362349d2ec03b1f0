//! Environment-driven configuration.
//!
//! | variable | default |
//! |---|---|
//! | `CATALOG_BIND_ADDR` | `0.0.0.0:8080` |
//! | `USE_PERSISTENT_STORES` | `false` |
//! | `DATABASE_URL` | required when persistent |
//! | `CATALOG_VARIANT_WARN_THRESHOLD` | `50` |
//! | `CATALOG_VARIANT_FLAG_THRESHOLD` | `100` |
//! | `CATALOG_MAX_VARIANTS` | `1000` |
//! | `CATALOG_PIVOT_DRIFT` | `unassigned` (`unassigned` or `exclude`) |
//!
//! The three variant thresholds must satisfy `warn <= flag <= max`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use thiserror::Error;

use catalog_products::{DriftPolicy, VariantLimits};

pub const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value '{value}' for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Where records are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    InMemory,
    Postgres { database_url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub bind_addr: SocketAddr,
    pub persistence: Persistence,
    pub variant_limits: VariantLimits,
    pub drift_policy: DriftPolicy,
}

impl CatalogConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (environment, test map, ...).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_addr = parse_or(
            "CATALOG_BIND_ADDR",
            get("CATALOG_BIND_ADDR"),
            DEFAULT_BIND_ADDR,
        )?;

        let persistent = match get("USE_PERSISTENT_STORES").as_deref() {
            None => false,
            Some(raw) => parse_flag("USE_PERSISTENT_STORES", raw)?,
        };
        let persistence = if persistent {
            let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
            Persistence::Postgres { database_url }
        } else {
            Persistence::InMemory
        };

        let defaults = VariantLimits::default();
        let variant_limits = VariantLimits {
            warn_above: parse_or(
                "CATALOG_VARIANT_WARN_THRESHOLD",
                get("CATALOG_VARIANT_WARN_THRESHOLD"),
                defaults.warn_above,
            )?,
            flag_above: parse_or(
                "CATALOG_VARIANT_FLAG_THRESHOLD",
                get("CATALOG_VARIANT_FLAG_THRESHOLD"),
                defaults.flag_above,
            )?,
            max: parse_or(
                "CATALOG_MAX_VARIANTS",
                get("CATALOG_MAX_VARIANTS"),
                defaults.max,
            )?,
        };
        if variant_limits.warn_above > variant_limits.flag_above {
            return Err(ConfigError::Invalid {
                key: "CATALOG_VARIANT_WARN_THRESHOLD",
                value: variant_limits.warn_above.to_string(),
            });
        }
        if variant_limits.flag_above > variant_limits.max {
            return Err(ConfigError::Invalid {
                key: "CATALOG_VARIANT_FLAG_THRESHOLD",
                value: variant_limits.flag_above.to_string(),
            });
        }

        let drift_policy = match get("CATALOG_PIVOT_DRIFT") {
            None => DriftPolicy::default(),
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "unassigned" => DriftPolicy::Unassigned,
                "exclude" => DriftPolicy::Exclude,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "CATALOG_PIVOT_DRIFT",
                        value: raw,
                    });
                }
            },
        };

        Ok(Self {
            bind_addr,
            persistence,
            variant_limits,
            drift_policy,
        })
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
{
    match raw {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
        }),
    }
}
