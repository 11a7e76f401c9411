//! Store configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                 | Default              |
//! |--------------------------|----------------------|
//! | `DUKA_DATABASE_PATH`     | `./duka.db`          |
//! | `DUKA_STORE_LAT`         | `-1.2864`            |
//! | `DUKA_STORE_LNG`         | `36.8172`            |
//! | `DUKA_FREE_RADIUS_KM`    | `0.70`               |
//! | `DUKA_BASE_FEE`          | `4000`               |
//! | `DUKA_PER_KM_FEE`        | `1000`               |
//! | `DUKA_FEE_ROUNDING_STEP` | `1000`               |
//! | `DUKA_OTP_TTL_SECS`      | `300`                |
//! | `REDIS_URL`              | unset (SQLite store) |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use duka_core::validation::validate_coordinate;
use duka_core::{Coordinate, DeliveryFeeConfig};
use serde::{Deserialize, Serialize};

/// Runtime configuration for one store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Where deliveries start from
    pub store_location: Coordinate,

    /// Distance-based delivery pricing
    pub delivery: DeliveryFeeConfig,

    /// Lifetime of a phone verification code
    pub otp_ttl: Duration,

    /// Redis connection string (optional; selects the Redis OTP store)
    pub redis_url: Option<String>,
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn load_from<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = DeliveryFeeConfig::default();

        let latitude: f64 = parse_or(&lookup, "DUKA_STORE_LAT", -1.2864)?;
        let longitude: f64 = parse_or(&lookup, "DUKA_STORE_LNG", 36.8172)?;
        validate_coordinate(latitude, longitude)
            .map_err(|_| ConfigError::InvalidValue("DUKA_STORE_LAT/DUKA_STORE_LNG".to_string()))?;

        let delivery = DeliveryFeeConfig {
            free_radius_km: parse_or(&lookup, "DUKA_FREE_RADIUS_KM", defaults.free_radius_km)?,
            base_fee: parse_or(&lookup, "DUKA_BASE_FEE", defaults.base_fee)?,
            per_km_fee: parse_or(&lookup, "DUKA_PER_KM_FEE", defaults.per_km_fee)?,
            rounding_step: parse_or(&lookup, "DUKA_FEE_ROUNDING_STEP", defaults.rounding_step)?,
        };

        if !(delivery.free_radius_km >= 0.0) {
            return Err(ConfigError::InvalidValue("DUKA_FREE_RADIUS_KM".to_string()));
        }
        if delivery.base_fee < 0 {
            return Err(ConfigError::InvalidValue("DUKA_BASE_FEE".to_string()));
        }
        if delivery.per_km_fee < 0 {
            return Err(ConfigError::InvalidValue("DUKA_PER_KM_FEE".to_string()));
        }
        if delivery.rounding_step <= 0 {
            return Err(ConfigError::InvalidValue("DUKA_FEE_ROUNDING_STEP".to_string()));
        }

        let otp_ttl_secs: u64 = parse_or(&lookup, "DUKA_OTP_TTL_SECS", 300)?;
        if otp_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue("DUKA_OTP_TTL_SECS".to_string()));
        }

        Ok(StoreConfig {
            database_path: lookup("DUKA_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./duka.db")),
            store_location: Coordinate::new(latitude, longitude),
            delivery,
            otp_ttl: Duration::from_secs(otp_ttl_secs),
            redis_url: lookup("REDIS_URL").filter(|url| !url.trim().is_empty()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<StoreConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StoreConfig::load_from(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.database_path, PathBuf::from("./duka.db"));
        assert_eq!(config.delivery, DeliveryFeeConfig::default());
        assert_eq!(config.otp_ttl, Duration::from_secs(300));
        assert!(config.redis_url.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DUKA_DATABASE_PATH", "/data/shop.db"),
            ("DUKA_STORE_LAT", "-4.0435"),
            ("DUKA_STORE_LNG", "39.6682"),
            ("DUKA_FREE_RADIUS_KM", "1.5"),
            ("DUKA_BASE_FEE", "5000"),
            ("DUKA_FEE_ROUNDING_STEP", "500"),
            ("REDIS_URL", "redis://127.0.0.1/"),
        ])
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/data/shop.db"));
        assert_eq!(config.store_location, Coordinate::new(-4.0435, 39.6682));
        assert_eq!(config.delivery.free_radius_km, 1.5);
        assert_eq!(config.delivery.base_fee, 5_000);
        assert_eq!(config.delivery.per_km_fee, 1_000);
        assert_eq!(config.delivery.rounding_step, 500);
        assert_eq!(config.redis_url.as_deref(), Some("redis://127.0.0.1/"));
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("DUKA_BASE_FEE", "forty")]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for DUKA_BASE_FEE");

        assert!(load(&[("DUKA_STORE_LAT", "123.0")]).is_err());
        assert!(load(&[("DUKA_FEE_ROUNDING_STEP", "0")]).is_err());
        assert!(load(&[("DUKA_FREE_RADIUS_KM", "-1")]).is_err());
        assert!(load(&[("DUKA_OTP_TTL_SECS", "0")]).is_err());
    }

    #[test]
    fn test_blank_redis_url_is_unset() {
        let config = load(&[("REDIS_URL", "  ")]).unwrap();
        assert!(config.redis_url.is_none());
    }
}
