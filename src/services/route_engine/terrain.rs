//! Road-class composition analysis from the routing service's per-span
//! way-type annotations.

use crate::constants::HIGHWAY_FRACTION_THRESHOLD;
use crate::models::Coordinates;
use crate::services::routing::{RoadClass, RoadClassSpan};
use serde::{Deserialize, Serialize};

/// Distance-weighted road-class composition of a path.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TerrainAnalysis {
    pub highway_fraction: f64,
    pub trail_fraction: f64,
    pub path_fraction: f64,
    /// `trail + path - 2*highway`, clamped to [0, 1].
    pub terrain_score: f64,
    /// More than 10% of the route runs along major roads.
    pub has_highways: bool,
}

impl TerrainAnalysis {
    /// Classify a path from its road-class spans. Spans never returned by
    /// the service leave the path classified as street (non-highway) by
    /// default, which is the defaulting rule for missing annotations.
    pub fn compute(path: &[Coordinates], spans: &[RoadClassSpan]) -> Self {
        if path.len() < 2 {
            return TerrainAnalysis::default();
        }

        // Cumulative distance along the path, indexed per point.
        let mut cumulative = Vec::with_capacity(path.len());
        let mut total = 0.0;
        cumulative.push(0.0);
        for w in path.windows(2) {
            total += w[0].distance_to(&w[1]);
            cumulative.push(total);
        }
        if total <= 0.0 {
            return TerrainAnalysis::default();
        }

        let mut highway_km = 0.0;
        let mut trail_km = 0.0;
        let mut path_km = 0.0;

        for span in spans {
            let start = span.start_index.min(path.len() - 1);
            let end = span.end_index.min(path.len() - 1);
            if end <= start {
                continue;
            }
            let length = cumulative[end] - cumulative[start];
            match span.class {
                RoadClass::Highway => highway_km += length,
                RoadClass::Trail => trail_km += length,
                RoadClass::Path => path_km += length,
                RoadClass::Street | RoadClass::Other => {}
            }
        }

        let highway_fraction = (highway_km / total).clamp(0.0, 1.0);
        let trail_fraction = (trail_km / total).clamp(0.0, 1.0);
        let path_fraction = (path_km / total).clamp(0.0, 1.0);

        TerrainAnalysis {
            highway_fraction,
            trail_fraction,
            path_fraction,
            terrain_score: (trail_fraction + path_fraction - 2.0 * highway_fraction)
                .clamp(0.0, 1.0),
            has_highways: highway_fraction > HIGHWAY_FRACTION_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_path(n: usize) -> Vec<Coordinates> {
        (0..n)
            .map(|i| Coordinates::new(51.5 + i as f64 * 0.001, -0.12).unwrap())
            .collect()
    }

    fn span(start: usize, end: usize, class: RoadClass) -> RoadClassSpan {
        RoadClassSpan {
            start_index: start,
            end_index: end,
            class,
        }
    }

    #[test]
    fn test_all_trail_scores_high() {
        let path = straight_path(11);
        let analysis = TerrainAnalysis::compute(&path, &[span(0, 10, RoadClass::Trail)]);
        assert!((analysis.trail_fraction - 1.0).abs() < 1e-9);
        assert!((analysis.terrain_score - 1.0).abs() < 1e-9);
        assert!(!analysis.has_highways);
    }

    #[test]
    fn test_highway_heavy_scores_zero() {
        let path = straight_path(11);
        let analysis = TerrainAnalysis::compute(
            &path,
            &[
                span(0, 6, RoadClass::Highway),
                span(6, 10, RoadClass::Path),
            ],
        );
        assert!(analysis.has_highways);
        // 0.4 path - 2 * 0.6 highway clamps to zero.
        assert_eq!(analysis.terrain_score, 0.0);
    }

    #[test]
    fn test_missing_annotations_default_to_street() {
        let path = straight_path(11);
        let analysis = TerrainAnalysis::compute(&path, &[]);
        assert_eq!(analysis.highway_fraction, 0.0);
        assert_eq!(analysis.terrain_score, 0.0);
        assert!(!analysis.has_highways);
    }

    #[test]
    fn test_small_highway_fraction_not_flagged() {
        let path = straight_path(21);
        let analysis = TerrainAnalysis::compute(
            &path,
            &[
                span(0, 1, RoadClass::Highway),
                span(1, 20, RoadClass::Street),
            ],
        );
        assert!(analysis.highway_fraction < HIGHWAY_FRACTION_THRESHOLD);
        assert!(!analysis.has_highways);
    }

    #[test]
    fn test_span_indexes_clamped_to_path() {
        let path = straight_path(5);
        let analysis = TerrainAnalysis::compute(&path, &[span(0, 500, RoadClass::Trail)]);
        assert!((analysis.trail_fraction - 1.0).abs() < 1e-9);
    }
}
