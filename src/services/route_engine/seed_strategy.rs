//! Seed-sampling synthesis: let the routing service invent round trips and
//! keep only the ones shaped like genuine circuits.

use super::circuit_metrics::edge_hashes;
use super::validator::{assess_path, PathAssessment};
use crate::config::RouteEngineConfig;
use crate::constants::*;
use crate::models::{Candidate, CandidateOrigin, Coordinates, RoutePreferences};
use crate::services::elevation::ElevationService;
use crate::services::popularity::{popularity_or_neutral, PopularitySource};
use crate::services::routing::RoutingService;
use futures::stream::{self, StreamExt};
use rand::{rngs::StdRng, RngExt, SeedableRng};
use std::sync::Arc;

pub struct SeedSamplingStrategy {
    routing: Arc<dyn RoutingService>,
    elevation: Arc<dyn ElevationService>,
    popularity: Arc<dyn PopularitySource>,
    config: RouteEngineConfig,
}

impl SeedSamplingStrategy {
    pub fn new(
        routing: Arc<dyn RoutingService>,
        elevation: Arc<dyn ElevationService>,
        popularity: Arc<dyn PopularitySource>,
        config: RouteEngineConfig,
    ) -> Self {
        Self {
            routing,
            elevation,
            popularity,
            config,
        }
    }

    /// Sample round trips under distinct seeds, bounded fan-out. A failed
    /// seed is simply dropped; the rest proceed.
    pub async fn generate(
        &self,
        start: &Coordinates,
        target_distance_km: f64,
        preferences: &RoutePreferences,
        request_seed: u64,
    ) -> Vec<Candidate> {
        let mut rng = StdRng::seed_from_u64(request_seed);
        let seeds: Vec<u64> = (0..self.config.seed_sample_count)
            .map(|_| rng.random_range(0..100_000))
            .collect();

        tracing::info!(
            seeds = seeds.len(),
            target_km = %format!("{:.1}", target_distance_km),
            "Sampling {} round-trip seeds for {:.1}km target",
            seeds.len(), target_distance_km
        );

        stream::iter(seeds)
            .map(|seed| self.evaluate_seed(start, target_distance_km, preferences, seed))
            .buffer_unordered(self.config.max_concurrent_requests)
            .filter_map(|candidate| async move { candidate })
            .collect()
            .await
    }

    async fn evaluate_seed(
        &self,
        start: &Coordinates,
        target_distance_km: f64,
        preferences: &RoutePreferences,
        seed: u64,
    ) -> Option<Candidate> {
        let routing = match self
            .routing
            .round_trip(start, target_distance_km * 1000.0, seed)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!(seed = seed, error = %e, "Seed {} dropped: routing failed", seed);
                return None;
            }
        };

        // The service is asked for the target length but not trusted on it.
        let relative_error =
            (routing.distance_km() - target_distance_km).abs() / target_distance_km;
        if relative_error > self.config.calibration_fail_tolerance {
            tracing::debug!(
                seed = seed,
                realized_km = %format!("{:.2}", routing.distance_km()),
                "Seed {} rejected: {:.2}km too far from target",
                seed, routing.distance_km()
            );
            return None;
        }

        let mut assessment = assess_path(self.elevation.as_ref(), start, &routing).await?;

        // Loop quality measures how close the service's own endpoint came to
        // the start; measured before closure is enforced below.
        let nominal_end = *assessment.path.last()?;
        let loop_quality = (1.0
            - start.distance_to(&nominal_end) / LOOP_QUALITY_ZERO_DISTANCE_KM)
            .max(0.0);

        // Returned circuits always start and end exactly at the start point.
        enforce_closure(&mut assessment.path, start);

        if let Some(reason) = self.rejection_reason(&assessment, loop_quality, preferences) {
            tracing::debug!(seed = seed, reason = %reason, "Seed {} rejected: {}", seed, reason);
            return None;
        }

        let popularity = match self
            .popularity
            .edge_popularity(&edge_hashes(&assessment.path))
            .await
        {
            Ok(looked_up) => popularity_or_neutral(looked_up),
            Err(e) => {
                tracing::warn!(error = %e, "Popularity lookup failed, using neutral default");
                NEUTRAL_POPULARITY
            }
        };

        let score = rank_seed_candidate(
            &assessment,
            loop_quality,
            popularity,
            preferences.prefer_trails,
        );

        Some(Candidate {
            origin: CandidateOrigin::Seed { seed },
            waypoints: vec![*start],
            path: assessment.path,
            backtrack_ratio: assessment.metrics.backtrack_ratio,
            angular_spread_degrees: assessment.metrics.angular_spread_degrees,
            dead_end_count: assessment.metrics.dead_end_count,
            circuit_score: assessment.metrics.circuit_score,
            terrain_score: assessment.terrain.terrain_score,
            has_highways: assessment.terrain.has_highways,
            elevation: assessment.elevation,
            difficulty: assessment.difficulty,
            loop_quality: Some(loop_quality),
            score,
            routing,
        })
    }

    fn rejection_reason(
        &self,
        assessment: &PathAssessment,
        loop_quality: f64,
        preferences: &RoutePreferences,
    ) -> Option<&'static str> {
        if loop_quality < self.config.min_loop_quality {
            return Some("poor loop closure");
        }
        if assessment.metrics.backtrack_ratio > self.config.seed_max_backtrack_ratio {
            return Some("excessive backtracking");
        }
        if !assessment.metrics.is_genuine_circuit(
            self.config.min_angular_spread_deg,
            self.config.seed_max_backtrack_ratio,
        ) {
            return Some("not a genuine circuit");
        }
        if preferences.prefer_trails
            && assessment.terrain.terrain_score < self.config.min_terrain_score
        {
            return Some("too little trail for trail preference");
        }
        None
    }
}

/// Overwrite the path's endpoints with the true start so start == end holds
/// exactly for every returned seed route.
fn enforce_closure(path: &mut [Coordinates], start: &Coordinates) {
    if let Some(first) = path.first_mut() {
        *first = *start;
    }
    if let Some(last) = path.last_mut() {
        *last = *start;
    }
}

/// Weighted blend of circuit quality, historical popularity, loop closure,
/// and (inverted) backtracking; terrain folded in when trails are preferred.
fn rank_seed_candidate(
    assessment: &PathAssessment,
    loop_quality: f64,
    popularity: f64,
    prefer_trails: bool,
) -> f64 {
    let base = SEED_RANK_WEIGHT_QUALITY * assessment.metrics.circuit_score
        + SEED_RANK_WEIGHT_POPULARITY * popularity
        + SEED_RANK_WEIGHT_LOOP * loop_quality
        + SEED_RANK_WEIGHT_BACKTRACK * (1.0 - assessment.metrics.backtrack_ratio.min(1.0));

    if prefer_trails {
        base * (1.0 - SEED_RANK_TERRAIN_BLEND)
            + assessment.terrain.terrain_score * SEED_RANK_TERRAIN_BLEND
    } else {
        base
    }
}
