use crate::cache::{CacheStats, RouteCache};
use crate::models::GeneratedRoute;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-memory cache backed by moka with TTL and bounded capacity.
/// All methods are `&self` — no locking needed.
pub struct MemoryCacheService {
    routes: Cache<String, Arc<Vec<GeneratedRoute>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryCacheService {
    pub fn new(route_ttl_seconds: u64, max_capacity: u64) -> Self {
        let routes = Cache::builder()
            .time_to_live(Duration::from_secs(route_ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        MemoryCacheService {
            routes,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl RouteCache for MemoryCacheService {
    async fn get_cached_routes(&self, key: &str) -> Option<Vec<GeneratedRoute>> {
        match self.routes.get(key).await {
            Some(arc_routes) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Memory cache hit for route: {}", key);
                Some((*arc_routes).clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Memory cache miss for route: {}", key);
                None
            }
        }
    }

    async fn cache_routes(&self, key: &str, routes: &[GeneratedRoute]) {
        let arc_routes = Arc::new(routes.to_vec());
        self.routes.insert(key.to_string(), arc_routes).await;
        tracing::debug!("Memory cached {} routes: {}", routes.len(), key);
    }

    async fn get_stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let hit_rate = if hits + misses > 0 {
            (hits as f64 / (hits + misses) as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            hits,
            misses,
            hit_rate,
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CircuitQuality, Difficulty};
    use uuid::Uuid;

    fn make_test_route(distance_km: f64) -> GeneratedRoute {
        GeneratedRoute {
            id: Uuid::new_v4(),
            name: "Clockwise Square".to_string(),
            distance_km,
            duration_minutes: 30,
            encoded_polyline: String::new(),
            waypoints: Vec::new(),
            difficulty: Difficulty::Easy,
            elevation_gain_m: 12.0,
            elevation_loss_m: 12.0,
            max_gradient_percent: 2.0,
            max_gradient_degrees: 1.1,
            turn_instructions: Vec::new(),
            circuit_quality: CircuitQuality {
                backtrack_ratio: 0.1,
                angular_spread_degrees: 300.0,
                loop_quality: None,
            },
            score: 0.85,
        }
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let cache = MemoryCacheService::new(60, 10);
        assert!(cache.get_cached_routes("k").await.is_none());

        cache.cache_routes("k", &[make_test_route(5.0)]).await;
        let cached = cache
            .get_cached_routes("k")
            .await
            .expect("route should be cached after insert");
        assert_eq!(cached.len(), 1);
        assert!((cached[0].distance_km - 5.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_stats_track_hits_and_misses() {
        let cache = MemoryCacheService::new(60, 10);
        cache.get_cached_routes("missing").await;
        cache.cache_routes("k", &[make_test_route(5.0)]).await;
        cache.get_cached_routes("k").await;

        let stats = cache.get_stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate - 50.0).abs() < 1e-9);
    }
}
