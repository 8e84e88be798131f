use crate::error::{AppError, Result};
use crate::models::{polyline, Coordinates};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const ORS_DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org/v2/directions";
const WALKING_PROFILE: &str = "foot-walking";

/// Road classification as reported per path segment by the routing service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RoadClass {
    /// Motorway / trunk / primary roads.
    Highway,
    /// Regular streets and minor roads.
    Street,
    /// Unpaved tracks and trails.
    Trail,
    /// Footways, paths, and cycleways.
    Path,
    /// Anything unrecognized. Treated as non-highway.
    Other,
}

impl RoadClass {
    /// Map the routing service's numeric way-type codes to a class.
    /// Unknown codes default to `Other` rather than failing the parse.
    fn from_waytype_code(code: u32) -> Self {
        match code {
            1 => RoadClass::Highway,
            2 | 3 => RoadClass::Street,
            5 => RoadClass::Trail,
            4 | 6 | 7 => RoadClass::Path,
            _ => RoadClass::Other,
        }
    }
}

/// A run of consecutive path points sharing one road class. Indexes are into
/// the decoded polyline.
#[derive(Debug, Clone, Copy)]
pub struct RoadClassSpan {
    pub start_index: usize,
    pub end_index: usize,
    pub class: RoadClass,
}

/// Typed result of one routing request. Only the polyline and distance are
/// load-bearing for validation; instructions and class spans enrich output.
#[derive(Debug, Clone)]
pub struct RoutingResult {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub encoded_polyline: String,
    pub turn_instructions: Vec<String>,
    pub road_class_spans: Vec<RoadClassSpan>,
}

impl RoutingResult {
    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }

    pub fn duration_minutes(&self) -> u32 {
        (self.duration_seconds / 60.0).round() as u32
    }

    /// Decode the realized path. Empty on malformed geometry.
    pub fn decode_path(&self) -> Vec<Coordinates> {
        polyline::decode(&self.encoded_polyline)
    }
}

/// Abstraction over the external road-routing service, injected into the
/// engine so the whole core can run against fakes.
#[async_trait]
pub trait RoutingService: Send + Sync {
    /// Route a walking round trip from the first waypoint through the rest
    /// and back. `optimize` lets the service reorder intermediate waypoints.
    async fn directions(
        &self,
        waypoints: &[Coordinates],
        optimize: bool,
    ) -> Result<RoutingResult>;

    /// Ask the service itself to synthesize a round trip of roughly
    /// `target_distance_meters` from `start`, varied by `seed`.
    async fn round_trip(
        &self,
        start: &Coordinates,
        target_distance_meters: f64,
        seed: u64,
    ) -> Result<RoutingResult>;
}

/// HTTP client for an openrouteservice-compatible directions API.
#[derive(Clone)]
pub struct OrsClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OrsClient {
    pub fn new(api_key: String) -> Self {
        OrsClient {
            client: Client::new(),
            api_key,
            base_url: ORS_DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        OrsClient {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    async fn post_directions(&self, body: serde_json::Value) -> Result<RoutingResult> {
        let url = format!("{}/{}", self.base_url, WALKING_PROFILE);

        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::RoutingApi(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(
                status = %status,
                "Routing API HTTP error {}: {}",
                status, error_text
            );
            return Err(AppError::RoutingApi(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let parsed: OrsDirectionsResponse = response
            .json()
            .await
            .map_err(|e| AppError::RoutingApi(format!("Failed to parse response: {}", e)))?;

        let route = parsed
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| AppError::RoutingApi("No routes found".to_string()))?;

        let turn_instructions = route
            .segments
            .iter()
            .flat_map(|segment| segment.steps.iter().map(|step| step.instruction.clone()))
            .collect();

        let road_class_spans = route
            .extras
            .and_then(|extras| extras.waytypes)
            .map(|waytypes| {
                waytypes
                    .values
                    .into_iter()
                    .map(|[start, end, code]| RoadClassSpan {
                        start_index: start as usize,
                        end_index: end as usize,
                        class: RoadClass::from_waytype_code(code),
                    })
                    .collect()
            })
            .unwrap_or_default();

        tracing::debug!(
            distance_km = %format!("{:.2}", route.summary.distance / 1000.0),
            duration_min = %format!("{:.0}", route.summary.duration / 60.0),
            "Routing response: {:.2}km, {:.0}min",
            route.summary.distance / 1000.0, route.summary.duration / 60.0
        );

        Ok(RoutingResult {
            distance_meters: route.summary.distance,
            duration_seconds: route.summary.duration,
            encoded_polyline: route.geometry,
            turn_instructions,
            road_class_spans,
        })
    }
}

#[async_trait]
impl RoutingService for OrsClient {
    async fn directions(
        &self,
        waypoints: &[Coordinates],
        optimize: bool,
    ) -> Result<RoutingResult> {
        if waypoints.len() < 2 {
            return Err(AppError::InvalidRequest(
                "At least 2 waypoints required".to_string(),
            ));
        }
        if waypoints.len() > 25 {
            return Err(AppError::InvalidRequest(
                "Maximum 25 waypoints allowed".to_string(),
            ));
        }

        let coordinates: Vec<[f64; 2]> = waypoints.iter().map(|c| [c.lng, c.lat]).collect();
        tracing::debug!(
            waypoints = waypoints.len(),
            optimize = optimize,
            "Routing API directions request with {} waypoints",
            waypoints.len()
        );

        self.post_directions(serde_json::json!({
            "coordinates": coordinates,
            "instructions": true,
            "extra_info": ["waytype"],
            "optimize_waypoints": optimize,
        }))
        .await
    }

    async fn round_trip(
        &self,
        start: &Coordinates,
        target_distance_meters: f64,
        seed: u64,
    ) -> Result<RoutingResult> {
        tracing::debug!(
            seed = seed,
            target_m = target_distance_meters,
            "Routing API round-trip request (seed {})",
            seed
        );

        self.post_directions(serde_json::json!({
            "coordinates": [[start.lng, start.lat]],
            "instructions": true,
            "extra_info": ["waytype"],
            "options": {
                "round_trip": {
                    "length": target_distance_meters,
                    "seed": seed,
                }
            },
        }))
        .await
    }
}

// Routing API response types

#[derive(Debug, Deserialize)]
struct OrsDirectionsResponse {
    routes: Vec<OrsRoute>,
}

#[derive(Debug, Deserialize)]
struct OrsRoute {
    summary: OrsSummary,
    /// Encoded polyline, precision 5.
    geometry: String,
    #[serde(default)]
    segments: Vec<OrsSegment>,
    extras: Option<OrsExtras>,
}

#[derive(Debug, Deserialize)]
struct OrsSummary {
    distance: f64, // meters
    duration: f64, // seconds
}

#[derive(Debug, Deserialize)]
struct OrsSegment {
    #[serde(default)]
    steps: Vec<OrsStep>,
}

#[derive(Debug, Deserialize)]
struct OrsStep {
    instruction: String,
}

#[derive(Debug, Deserialize)]
struct OrsExtras {
    waytypes: Option<OrsExtraValues>,
}

#[derive(Debug, Deserialize)]
struct OrsExtraValues {
    /// [start_index, end_index, code] triples over the decoded geometry.
    values: Vec<[u32; 3]>,
}
