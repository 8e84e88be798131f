//! Shared path assessment: every synthesis strategy funnels its routing
//! responses through here before gating and ranking.

use super::circuit_metrics::CircuitMetrics;
use super::elevation_profile;
use super::terrain::TerrainAnalysis;
use crate::models::{Coordinates, Difficulty, ElevationProfile};
use crate::services::elevation::ElevationService;
use crate::services::routing::RoutingResult;

/// Everything measured about one realized path.
#[derive(Debug, Clone)]
pub struct PathAssessment {
    pub path: Vec<Coordinates>,
    pub metrics: CircuitMetrics,
    pub terrain: TerrainAnalysis,
    pub elevation: ElevationProfile,
    pub difficulty: Difficulty,
}

/// Decode and measure a routing response.
///
/// Returns `None` for structurally unusable responses (malformed or empty
/// geometry) — the candidate is dropped, nothing throws. An elevation
/// lookup failure is absorbed with a zeroed profile: elevation enriches a
/// route but never decides whether it exists.
pub async fn assess_path(
    elevation_service: &dyn ElevationService,
    start: &Coordinates,
    routing: &RoutingResult,
) -> Option<PathAssessment> {
    let path = routing.decode_path();
    if path.len() < 2 {
        tracing::debug!(
            polyline_len = routing.encoded_polyline.len(),
            "Rejecting response with unusable geometry"
        );
        return None;
    }

    let metrics = CircuitMetrics::compute(start, &path);
    let terrain = TerrainAnalysis::compute(&path, &routing.road_class_spans);

    let elevation = match elevation_profile::compute_profile(elevation_service, &path).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Elevation lookup failed, continuing with empty profile"
            );
            ElevationProfile::default()
        }
    };

    let difficulty = Difficulty::classify(
        metrics.backtrack_ratio,
        terrain.has_highways,
        elevation.gain_m,
    );

    Some(PathAssessment {
        path,
        metrics,
        terrain,
        elevation,
        difficulty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, Result};
    use crate::models::polyline;
    use async_trait::async_trait;

    struct FlatElevation;

    #[async_trait]
    impl ElevationService for FlatElevation {
        async fn elevations(&self, points: &[Coordinates]) -> Result<Vec<f64>> {
            Ok(vec![10.0; points.len()])
        }
    }

    struct BrokenElevation;

    #[async_trait]
    impl ElevationService for BrokenElevation {
        async fn elevations(&self, _points: &[Coordinates]) -> Result<Vec<f64>> {
            Err(AppError::ElevationApi("synthetic outage".to_string()))
        }
    }

    fn loop_routing(start: &Coordinates) -> RoutingResult {
        let path: Vec<Coordinates> = (0..=60)
            .map(|i| {
                let angle = std::f64::consts::TAU * (i as f64) / 60.0;
                Coordinates::new(
                    start.lat + 0.01 * angle.cos(),
                    start.lng + 0.01 * angle.sin(),
                )
                .unwrap()
            })
            .collect();
        RoutingResult {
            distance_meters: 5000.0,
            duration_seconds: 3600.0,
            encoded_polyline: polyline::encode(&path),
            turn_instructions: vec![],
            road_class_spans: vec![],
        }
    }

    #[tokio::test]
    async fn test_assess_good_loop() {
        let start = Coordinates::new(51.5007, -0.1246).unwrap();
        let assessment = assess_path(&FlatElevation, &start, &loop_routing(&start))
            .await
            .expect("loop should assess");

        assert!(assessment.metrics.is_genuine_circuit(180.0, 0.35));
        assert_eq!(assessment.difficulty, Difficulty::Easy);
        assert_eq!(assessment.elevation.gain_m, 0.0);
    }

    #[tokio::test]
    async fn test_empty_polyline_rejected_without_error() {
        let start = Coordinates::new(51.5007, -0.1246).unwrap();
        let routing = RoutingResult {
            distance_meters: 5000.0,
            duration_seconds: 3600.0,
            encoded_polyline: String::new(),
            turn_instructions: vec![],
            road_class_spans: vec![],
        };
        assert!(assess_path(&FlatElevation, &start, &routing).await.is_none());
    }

    #[tokio::test]
    async fn test_elevation_failure_is_absorbed() {
        let start = Coordinates::new(51.5007, -0.1246).unwrap();
        let assessment = assess_path(&BrokenElevation, &start, &loop_routing(&start))
            .await
            .expect("route should survive elevation outage");
        assert_eq!(assessment.elevation.gain_m, 0.0);
        assert_eq!(assessment.elevation.max_gradient_percent, 0.0);
    }
}
