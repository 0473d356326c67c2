//! Environment-driven configuration.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file by the binary (dotenvy).

use std::env;
use std::str::FromStr;

use crate::error::{AppError, Result};

pub const DEFAULT_CURRENCY: &str = "CLP";
pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;
pub const DEFAULT_GRID_CACHE_CAPACITY: u64 = 366;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 15 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// ISO currency code attached to every price in responses
    pub currency: String,
    /// Max cached quotes
    pub cache_capacity: u64,
    /// Max cached rate grids, one per date
    pub grid_cache_capacity: u64,
    pub cache_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            grid_cache_capacity: DEFAULT_GRID_CACHE_CAPACITY,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl Config {
    /// Read `PRICING_CURRENCY`, `PRICE_CACHE_CAPACITY`, `PRICE_GRID_CACHE_CAPACITY`
    /// and `PRICE_CACHE_TTL_SECS`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let currency = match lookup("PRICING_CURRENCY") {
            Some(raw) if raw.trim().len() == 3 => raw.trim().to_uppercase(),
            Some(raw) => {
                return Err(AppError::Config(format!(
                    "PRICING_CURRENCY must be a 3-letter code, got '{}'",
                    raw
                )))
            }
            None => defaults.currency,
        };

        Ok(Self {
            currency,
            cache_capacity: parse_var(&lookup, "PRICE_CACHE_CAPACITY", defaults.cache_capacity)?,
            grid_cache_capacity: parse_var(
                &lookup,
                "PRICE_GRID_CACHE_CAPACITY",
                defaults.grid_cache_capacity,
            )?,
            cache_ttl_secs: parse_var(&lookup, "PRICE_CACHE_TTL_SECS", defaults.cache_ttl_secs)?,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} has invalid value '{}'", key, raw))),
        None => Ok(default),
    }
}
