//! In-memory caching using moka
//!
//! Computed quotes and rate grids are cached until the next change to the
//! curve or the tariff rules, which invalidates everything at once.

use chrono::NaiveDate;
use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::Config;
use crate::pricing::engine::{PriceBreakdown, PriceGrid};
use crate::pricing::models::MealPlan;

/// Key of a cached quote
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuoteKey {
    pub date: NaiveDate,
    pub room_type: String,
    pub meal_plan: MealPlan,
    pub services: Vec<String>,
}

/// Cache of computed prices
#[derive(Clone)]
pub struct PriceCache {
    /// Quotes ((date, room type, meal plan, services) -> breakdown)
    pub quotes: Cache<QuoteKey, Arc<PriceBreakdown>>,
    /// Rate grids (date -> grid)
    pub grids: Cache<NaiveDate, Arc<PriceGrid>>,
}

impl PriceCache {
    /// Create a new cache instance with the given capacities and TTL
    pub fn new(quote_capacity: u64, grid_capacity: u64, time_to_live: Duration) -> Self {
        Self {
            quotes: Cache::builder()
                .max_capacity(quote_capacity)
                .time_to_live(time_to_live)
                .build(),

            grids: Cache::builder()
                .max_capacity(grid_capacity)
                .time_to_live(time_to_live)
                .build(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.cache_capacity,
            config.grid_cache_capacity,
            Duration::from_secs(config.cache_ttl_secs),
        )
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            quotes_size: self.quotes.entry_count(),
            grids_size: self.grids.entry_count(),
        }
    }

    /// Invalidate all caches
    pub fn invalidate_all(&self) {
        self.quotes.invalidate_all();
        self.grids.invalidate_all();
        info!("Price caches invalidated");
    }

    /// Generate cache key for a quote
    pub fn quote_key(
        date: NaiveDate,
        room_type: &str,
        meal_plan: MealPlan,
        services: &[String],
    ) -> QuoteKey {
        QuoteKey {
            date,
            room_type: room_type.to_string(),
            meal_plan,
            services: services.to_vec(),
        }
    }
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub quotes_size: u64,
    pub grids_size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_key_includes_services_order() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let a = PriceCache::quote_key(
            date,
            "doble",
            MealPlan::Base,
            &["agency".to_string(), "late_checkout".to_string()],
        );
        let b = PriceCache::quote_key(
            date,
            "doble",
            MealPlan::Base,
            &["late_checkout".to_string(), "agency".to_string()],
        );
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_grid_capacity_follows_config() {
        let config = Config {
            grid_cache_capacity: 2,
            ..Config::default()
        };
        let cache = PriceCache::from_config(&config);
        assert_eq!(cache.grids.policy().max_capacity(), Some(2));
        assert_eq!(cache.quotes.policy().max_capacity(), Some(config.cache_capacity));
    }
}
