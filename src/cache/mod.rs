use crate::models::{Coordinates, GeneratedRoute, RoutePreferences};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

mod memory;

pub use memory::MemoryCacheService;

/// Response-level cache for generated circuit routes.
#[async_trait]
pub trait RouteCache: Send + Sync {
    async fn get_cached_routes(&self, key: &str) -> Option<Vec<GeneratedRoute>>;
    async fn cache_routes(&self, key: &str, routes: &[GeneratedRoute]);
    async fn get_stats(&self) -> CacheStats;
    fn backend_name(&self) -> &'static str;
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

/// Generate a cache key for circuit route requests.
/// Key includes: coordinates (3 decimal precision, ~100m), distance
/// (0.5km buckets), tolerance override, strategy, and preference flags.
pub fn circuit_route_cache_key(
    start: &Coordinates,
    distance_km: f64,
    distance_tolerance: Option<f64>,
    preferences: &RoutePreferences,
) -> String {
    let mut hasher = DefaultHasher::new();

    let lat = (start.lat * 1000.0).round() as i64;
    let lng = (start.lng * 1000.0).round() as i64;
    let distance_bucket = (distance_km * 2.0).round() as i64;

    lat.hash(&mut hasher);
    lng.hash(&mut hasher);
    distance_bucket.hash(&mut hasher);
    // A tolerance override changes which candidates survive, so it must
    // separate cache entries.
    distance_tolerance.map(f64::to_bits).hash(&mut hasher);
    preferences.strategy.to_string().hash(&mut hasher);
    preferences.prefer_trails.hash(&mut hasher);
    preferences.max_alternatives.hash(&mut hasher);

    format!("route:circuit:{:x}", hasher.finish())
}
