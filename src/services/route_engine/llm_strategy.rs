//! Language-model assisted synthesis: nearby features become a prompt, the
//! model proposes waypoint circuits, and every proposal is re-validated by
//! the same scorer as the template strategy. The model is a suggestion
//! source, never a validator.

use super::templates;
use super::validator::assess_path;
use crate::config::RouteEngineConfig;
use crate::models::{Candidate, CandidateOrigin, Coordinates, RoutePreferences};
use crate::services::elevation::ElevationService;
use crate::services::llm::LlmService;
use crate::services::places::{PlaceFeature, PlacesService};
use crate::services::routing::RoutingService;
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use std::sync::Arc;

/// Feature categories offered to the model as scenery anchors.
const FEATURE_CATEGORIES: &[&str] = &["park", "water", "monument", "viewpoint"];
/// Fallback shape when the model's reply cannot be used.
const FALLBACK_TEMPLATE: &str = "Clockwise Square";
/// Cap on proposals taken from one completion.
const MAX_PROPOSALS: usize = 5;

/// The reply shape the model is asked for. Parsed defensively: anything
/// missing or malformed downgrades to the geometric fallback.
#[derive(Debug, Deserialize)]
struct LlmRoutePlan {
    #[serde(default)]
    routes: Vec<LlmRouteProposal>,
}

#[derive(Debug, Deserialize)]
struct LlmRouteProposal {
    name: String,
    #[serde(default)]
    waypoints: Vec<LlmWaypoint>,
    #[serde(default)]
    #[allow(dead_code)]
    reasoning: String,
    #[serde(default)]
    #[allow(dead_code)]
    circuit_type: String,
}

#[derive(Debug, Deserialize)]
struct LlmWaypoint {
    lat: f64,
    lng: f64,
}

/// A named waypoint set ready for routing.
#[derive(Debug, Clone)]
struct WaypointProposal {
    name: String,
    waypoints: Vec<Coordinates>,
}

pub struct LlmWaypointStrategy {
    routing: Arc<dyn RoutingService>,
    elevation: Arc<dyn ElevationService>,
    places: Arc<dyn PlacesService>,
    llm: Arc<dyn LlmService>,
    config: RouteEngineConfig,
}

impl LlmWaypointStrategy {
    pub fn new(
        routing: Arc<dyn RoutingService>,
        elevation: Arc<dyn ElevationService>,
        places: Arc<dyn PlacesService>,
        llm: Arc<dyn LlmService>,
        config: RouteEngineConfig,
    ) -> Self {
        Self {
            routing,
            elevation,
            places,
            llm,
            config,
        }
    }

    pub async fn generate(
        &self,
        start: &Coordinates,
        target_distance_km: f64,
        preferences: &RoutePreferences,
    ) -> Vec<Candidate> {
        let proposals = self.propose_waypoints(start, target_distance_km).await;
        tracing::info!(
            proposals = proposals.len(),
            "Evaluating {} language-model waypoint proposals",
            proposals.len()
        );

        stream::iter(proposals)
            .map(|proposal| self.evaluate_proposal(start, target_distance_km, preferences, proposal))
            .buffer_unordered(self.config.max_concurrent_requests)
            .filter_map(|candidate| async move { candidate })
            .collect()
            .await
    }

    /// Ask the model for circuits, falling back to a fixed geometric pattern
    /// on any service or parse failure. A bad completion never escalates.
    async fn propose_waypoints(
        &self,
        start: &Coordinates,
        target_distance_km: f64,
    ) -> Vec<WaypointProposal> {
        let features = match self
            .places
            .find_features(start, target_distance_km * 500.0, FEATURE_CATEGORIES)
            .await
        {
            Ok(features) => features,
            Err(e) => {
                tracing::warn!(error = %e, "Feature discovery failed, prompting without features");
                Vec::new()
            }
        };

        let prompt = build_prompt(start, target_distance_km, &features);

        let completion = match self.llm.complete(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Language model call failed, using geometric fallback");
                return self.fallback_proposal(start, target_distance_km);
            }
        };

        let proposals = parse_proposals(&completion);
        if proposals.is_empty() {
            tracing::warn!(
                completion_len = completion.len(),
                "Language model reply unusable, using geometric fallback"
            );
            return self.fallback_proposal(start, target_distance_km);
        }
        proposals
    }

    fn fallback_proposal(
        &self,
        start: &Coordinates,
        target_distance_km: f64,
    ) -> Vec<WaypointProposal> {
        templates::catalog()
            .iter()
            .filter(|t| t.name == FALLBACK_TEMPLATE)
            .map(|template| WaypointProposal {
                name: template.name.to_string(),
                waypoints: templates::template_waypoints(
                    start,
                    templates::base_radius_km(target_distance_km),
                    template,
                ),
            })
            .collect()
    }

    async fn evaluate_proposal(
        &self,
        start: &Coordinates,
        target_distance_km: f64,
        preferences: &RoutePreferences,
        proposal: WaypointProposal,
    ) -> Option<Candidate> {
        let mut route_request = Vec::with_capacity(proposal.waypoints.len() + 2);
        route_request.push(*start);
        route_request.extend_from_slice(&proposal.waypoints);
        route_request.push(*start);

        let routing = match self.routing.directions(&route_request, false).await {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!(
                    name = %proposal.name,
                    error = %e,
                    "Proposal '{}' dropped: routing failed",
                    proposal.name
                );
                return None;
            }
        };

        // Proposals are taken at face value geometrically, but an
        // off-distance route is still an off-distance route.
        let relative_error =
            (routing.distance_km() - target_distance_km).abs() / target_distance_km;
        if relative_error > self.config.calibration_fail_tolerance {
            tracing::debug!(
                name = %proposal.name,
                realized_km = %format!("{:.2}", routing.distance_km()),
                "Proposal '{}' dropped: {:.2}km too far from target",
                proposal.name, routing.distance_km()
            );
            return None;
        }

        let assessment = assess_path(self.elevation.as_ref(), start, &routing).await?;
        if !assessment.metrics.is_genuine_circuit(
            self.config.min_angular_spread_deg,
            self.config.max_backtrack_ratio,
        ) {
            tracing::debug!(
                name = %proposal.name,
                "Proposal '{}' dropped: not a genuine circuit",
                proposal.name
            );
            return None;
        }
        if preferences.prefer_trails
            && assessment.terrain.terrain_score < self.config.min_terrain_score
        {
            tracing::debug!(
                name = %proposal.name,
                terrain = %format!("{:.2}", assessment.terrain.terrain_score),
                "Proposal '{}' dropped: terrain below trail preference",
                proposal.name
            );
            return None;
        }

        let score = assessment.metrics.circuit_score;
        Some(Candidate {
            origin: CandidateOrigin::Llm {
                name: proposal.name,
            },
            waypoints: proposal.waypoints,
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
            routing,
        })
    }
}

fn build_prompt(
    start: &Coordinates,
    target_distance_km: f64,
    features: &[PlaceFeature],
) -> String {
    let mut prompt = format!(
        "Propose up to {} circular running routes starting and ending at \
         ({:.5}, {:.5}), each close to {:.1} km long. Routes must be loops, \
         not out-and-back paths.\n",
        MAX_PROPOSALS, start.lat, start.lng, target_distance_km
    );

    if !features.is_empty() {
        prompt.push_str("Nearby features worth passing:\n");
        for feature in features.iter().take(15) {
            prompt.push_str(&format!(
                "- {} ({}) at ({:.5}, {:.5})\n",
                feature.name, feature.category, feature.coordinates.lat, feature.coordinates.lng
            ));
        }
    }

    prompt.push_str(
        "Reply with JSON only: {\"routes\": [{\"name\": string, \
         \"waypoints\": [{\"lat\": number, \"lng\": number}], \
         \"reasoning\": string, \"circuit_type\": string}]}",
    );
    prompt
}

/// Parse the model's reply. Invalid JSON, missing fields, or out-of-range
/// coordinates all yield an empty list rather than an error.
fn parse_proposals(completion: &str) -> Vec<WaypointProposal> {
    let plan: LlmRoutePlan = match serde_json::from_str(completion) {
        Ok(plan) => plan,
        Err(e) => {
            tracing::debug!(error = %e, "Failed to parse language model JSON");
            return Vec::new();
        }
    };

    plan.routes
        .into_iter()
        .take(MAX_PROPOSALS)
        .filter_map(|proposal| {
            let waypoints: Vec<Coordinates> = proposal
                .waypoints
                .iter()
                .map(|w| Coordinates::new(w.lat, w.lng))
                .collect::<Result<_, _>>()
                .ok()?;
            if waypoints.len() < 2 {
                return None;
            }
            Some(WaypointProposal {
                name: proposal.name,
                waypoints,
            })
        })
        .collect()
}
