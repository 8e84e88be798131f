//! Circuit route synthesis engine.
//!
//! Three candidate strategies (template-and-calibrate, router round trips,
//! language-model waypoints) feed one shared scoring path, then a greedy
//! diversity pass picks the returned alternatives. The engine never talks
//! HTTP itself; every external concern enters through an injected trait.

pub mod calibration;
pub mod circuit_metrics;
pub mod diversity;
pub mod elevation_profile;
pub mod llm_strategy;
pub mod seed_strategy;
pub mod templates;
pub mod terrain;
pub mod validator;

use crate::config::RouteEngineConfig;
use crate::error::{AppError, Result};
use crate::models::polyline;
use crate::models::{
    Candidate, CandidateOrigin, CircuitQuality, Coordinates, GeneratedRoute, RoutePreferences,
    Strategy,
};
use crate::services::elevation::ElevationService;
use crate::services::llm::LlmService;
use crate::services::places::PlacesService;
use crate::services::popularity::PopularitySource;
use crate::services::routing::RoutingService;
use calibration::Calibrator;
use futures::stream::{self, StreamExt};
use llm_strategy::LlmWaypointStrategy;
use seed_strategy::SeedSamplingStrategy;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use uuid::Uuid;
use validator::assess_path;

pub struct RouteEngine {
    routing: Arc<dyn RoutingService>,
    elevation: Arc<dyn ElevationService>,
    places: Arc<dyn PlacesService>,
    popularity: Arc<dyn PopularitySource>,
    llm: Option<Arc<dyn LlmService>>,
    config: RouteEngineConfig,
}

impl RouteEngine {
    pub fn new(
        routing: Arc<dyn RoutingService>,
        elevation: Arc<dyn ElevationService>,
        places: Arc<dyn PlacesService>,
        popularity: Arc<dyn PopularitySource>,
        llm: Option<Arc<dyn LlmService>>,
        config: RouteEngineConfig,
    ) -> Self {
        Self {
            routing,
            elevation,
            places,
            popularity,
            llm,
            config,
        }
    }

    /// Generate up to `max_alternatives` closed-loop routes from `start`.
    ///
    /// Individual candidate failures (routing errors, calibration misses,
    /// degenerate geometry) are absorbed; the only hard failure is ending up
    /// with zero acceptable candidates.
    pub async fn generate_circuit(
        &self,
        start: &Coordinates,
        target_distance_km: f64,
        distance_tolerance: Option<f64>,
        preferences: &RoutePreferences,
    ) -> Result<Vec<GeneratedRoute>> {
        let config = self.request_config(distance_tolerance);
        let seed = request_seed(start, target_distance_km);

        tracing::info!(
            strategy = %preferences.strategy,
            target_km = target_distance_km,
            seed = seed,
            "Generating circuit routes via {} strategy for {:.1}km",
            preferences.strategy,
            target_distance_km
        );

        let candidates = match preferences.strategy {
            Strategy::Templates => {
                self.template_candidates(start, target_distance_km, preferences, seed, &config)
                    .await
            }
            Strategy::Seeds => {
                SeedSamplingStrategy::new(
                    Arc::clone(&self.routing),
                    Arc::clone(&self.elevation),
                    Arc::clone(&self.popularity),
                    config.clone(),
                )
                .generate(start, target_distance_km, preferences, seed)
                .await
            }
            Strategy::Llm => match &self.llm {
                Some(llm) => {
                    LlmWaypointStrategy::new(
                        Arc::clone(&self.routing),
                        Arc::clone(&self.elevation),
                        Arc::clone(&self.places),
                        Arc::clone(llm),
                        config.clone(),
                    )
                    .generate(start, target_distance_km, preferences)
                    .await
                }
                None => {
                    return Err(AppError::InvalidRequest(
                        "llm strategy requested but no language model is configured".to_string(),
                    ))
                }
            },
        };

        if candidates.is_empty() {
            return Err(AppError::NoCandidates(format!(
                "no acceptable circuit of ~{:.1}km found near ({:.4}, {:.4})",
                target_distance_km, start.lat, start.lng
            )));
        }

        let max_routes = config
            .max_alternatives
            .min(preferences.max_alternatives as usize);
        let selected = diversity::select_diverse(candidates, max_routes, config.max_overlap_ratio);
        if selected.is_empty() {
            return Err(AppError::NoCandidates(
                "all candidates were eliminated by the diversity pass".to_string(),
            ));
        }

        tracing::info!(
            selected = selected.len(),
            "Returning {} diverse circuit routes",
            selected.len()
        );
        Ok(selected.into_iter().map(promote).collect())
    }

    async fn template_candidates(
        &self,
        start: &Coordinates,
        target_distance_km: f64,
        preferences: &RoutePreferences,
        seed: u64,
        config: &RouteEngineConfig,
    ) -> Vec<Candidate> {
        let sampled = templates::sample_templates(seed, config.template_sample_size);
        let base_radius = templates::base_radius_km(target_distance_km);
        tracing::debug!(
            sampled = sampled.len(),
            base_radius_km = %format!("{:.2}", base_radius),
            "Calibrating {} template shapes",
            sampled.len()
        );

        stream::iter(sampled)
            .map(|template| {
                self.evaluate_template(start, target_distance_km, base_radius, preferences, config, template)
            })
            .buffer_unordered(config.max_concurrent_requests)
            .filter_map(|candidate| async move { candidate })
            .collect()
            .await
    }

    async fn evaluate_template(
        &self,
        start: &Coordinates,
        target_distance_km: f64,
        base_radius_km: f64,
        preferences: &RoutePreferences,
        config: &RouteEngineConfig,
        template: templates::Template,
    ) -> Option<Candidate> {
        let base_waypoints = templates::template_waypoints(start, base_radius_km, &template);

        let calibrated = match Calibrator::new(self.routing.as_ref(), config)
            .calibrate(start, &base_waypoints, target_distance_km)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!(
                    template = template.name,
                    error = %e,
                    "Template '{}' skipped: calibration failed",
                    template.name
                );
                return None;
            }
        };

        let assessment = assess_path(self.elevation.as_ref(), start, &calibrated.routing).await?;
        if !assessment
            .metrics
            .is_genuine_circuit(config.min_angular_spread_deg, config.max_backtrack_ratio)
        {
            tracing::debug!(
                template = template.name,
                backtrack = %format!("{:.2}", assessment.metrics.backtrack_ratio),
                spread = %format!("{:.0}", assessment.metrics.angular_spread_degrees),
                "Template '{}' rejected: not a genuine circuit",
                template.name
            );
            return None;
        }
        if preferences.prefer_trails && assessment.terrain.terrain_score < config.min_terrain_score
        {
            tracing::debug!(
                template = template.name,
                terrain = %format!("{:.2}", assessment.terrain.terrain_score),
                "Template '{}' rejected: terrain below trail preference",
                template.name
            );
            return None;
        }

        let score = assessment.metrics.circuit_score;
        Some(Candidate {
            origin: CandidateOrigin::Template {
                name: template.name,
            },
            waypoints: calibrated.waypoints,
            path: assessment.path,
            backtrack_ratio: assessment.metrics.backtrack_ratio,
            angular_spread_degrees: assessment.metrics.angular_spread_degrees,
            dead_end_count: assessment.metrics.dead_end_count,
            circuit_score: assessment.metrics.circuit_score,
            terrain_score: assessment.terrain.terrain_score,
            has_highways: assessment.terrain.has_highways,
            elevation: assessment.elevation,
            difficulty: assessment.difficulty,
            loop_quality: None,
            score,
            routing: calibrated.routing,
        })
    }

    /// Per-request engine config: an explicit distance tolerance tightens
    /// (or loosens) the calibration acceptance window for this request only.
    fn request_config(&self, distance_tolerance: Option<f64>) -> RouteEngineConfig {
        let mut config = self.config.clone();
        if let Some(tolerance) = distance_tolerance {
            config.calibration_accept_tolerance = tolerance;
            config.calibration_fail_tolerance =
                config.calibration_fail_tolerance.max(tolerance);
        }
        config
    }
}

/// Deterministic per-request seed: identical requests sample identical
/// templates and round-trip seeds.
fn request_seed(start: &Coordinates, target_distance_km: f64) -> u64 {
    let mut hasher = DefaultHasher::new();
    start.round(5).lat.to_bits().hash(&mut hasher);
    start.round(5).lng.to_bits().hash(&mut hasher);
    ((target_distance_km * 100.0) as u64).hash(&mut hasher);
    hasher.finish()
}

/// Turn an accepted candidate into the API-facing route record.
fn promote(candidate: Candidate) -> GeneratedRoute {
    GeneratedRoute {
        id: Uuid::new_v4(),
        name: candidate.origin.name(),
        distance_km: candidate.routing.distance_km(),
        duration_minutes: candidate.routing.duration_minutes(),
        encoded_polyline: polyline::encode(&candidate.path),
        waypoints: candidate.waypoints,
        difficulty: candidate.difficulty,
        elevation_gain_m: candidate.elevation.gain_m,
        elevation_loss_m: candidate.elevation.loss_m,
        max_gradient_percent: candidate.elevation.max_gradient_percent,
        max_gradient_degrees: candidate.elevation.max_gradient_degrees,
        turn_instructions: candidate.routing.turn_instructions,
        circuit_quality: CircuitQuality {
            backtrack_ratio: candidate.backtrack_ratio,
            angular_spread_degrees: candidate.angular_spread_degrees,
            loop_quality: candidate.loop_quality,
        },
        score: candidate.score,
    }
}
