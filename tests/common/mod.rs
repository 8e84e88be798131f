use async_trait::async_trait;
use circuitroute::config::RouteEngineConfig;
use circuitroute::error::{AppError, Result};
use circuitroute::models::{polyline, Coordinates};
use circuitroute::services::elevation::ElevationService;
use circuitroute::services::llm::LlmService;
use circuitroute::services::places::{PlaceFeature, PlacesService};
use circuitroute::services::popularity::{PopularitySource, StaticPopularitySource};
use circuitroute::services::route_engine::RouteEngine;
use circuitroute::services::routing::{RoadClass, RoadClassSpan, RoutingResult, RoutingService};
use std::sync::Arc;

/// Westminster, the usual test start point.
#[allow(dead_code)]
pub fn westminster() -> Coordinates {
    Coordinates::new(51.5007, -0.1246).unwrap()
}

/// Routing fake that walks the requested waypoint tour along straight
/// segments, densified so the realized path has road-like resolution.
/// Realized distance is the tour perimeter times `road_factor`.
pub struct FakeRouting {
    pub road_factor: f64,
    pub road_class: RoadClass,
    /// Kilometres between the round-trip path's nominal end and the start.
    pub round_trip_end_offset_km: f64,
    /// Realized round-trip length as a multiple of the requested length.
    pub round_trip_length_factor: f64,
}

impl FakeRouting {
    #[allow(dead_code)]
    pub fn new(road_factor: f64) -> Self {
        FakeRouting {
            road_factor,
            road_class: RoadClass::Path,
            round_trip_end_offset_km: 0.05,
            round_trip_length_factor: 1.0,
        }
    }

    #[allow(dead_code)]
    pub fn with_road_class(road_factor: f64, road_class: RoadClass) -> Self {
        FakeRouting {
            road_factor,
            road_class,
            round_trip_end_offset_km: 0.05,
            round_trip_length_factor: 1.0,
        }
    }

    #[allow(dead_code)]
    pub fn with_sloppy_round_trips(road_factor: f64, end_offset_km: f64) -> Self {
        FakeRouting {
            road_factor,
            road_class: RoadClass::Path,
            round_trip_end_offset_km: end_offset_km,
            round_trip_length_factor: 1.0,
        }
    }

    /// Round trips come back as clean circuits but at a multiple of the
    /// requested length, like a router that hit the wrong road network.
    #[allow(dead_code)]
    pub fn with_overlong_round_trips(road_factor: f64, length_factor: f64) -> Self {
        FakeRouting {
            road_factor,
            road_class: RoadClass::Path,
            round_trip_end_offset_km: 0.05,
            round_trip_length_factor: length_factor,
        }
    }

    fn result_for_path(&self, path: Vec<Coordinates>, distance_km: f64) -> RoutingResult {
        let span_end = path.len().saturating_sub(1);
        RoutingResult {
            distance_meters: distance_km * 1000.0,
            duration_seconds: distance_km * 720.0,
            encoded_polyline: polyline::encode(&path),
            turn_instructions: vec!["Continue straight".to_string()],
            road_class_spans: vec![RoadClassSpan {
                start_index: 0,
                end_index: span_end,
                class: self.road_class,
            }],
        }
    }
}

#[async_trait]
impl RoutingService for FakeRouting {
    async fn directions(
        &self,
        waypoints: &[Coordinates],
        _optimize: bool,
    ) -> Result<RoutingResult> {
        let perimeter_km: f64 = waypoints.windows(2).map(|w| w[0].distance_to(&w[1])).sum();
        Ok(self.result_for_path(
            densify(waypoints, 12),
            perimeter_km * self.road_factor,
        ))
    }

    async fn round_trip(
        &self,
        start: &Coordinates,
        target_distance_meters: f64,
        seed: u64,
    ) -> Result<RoutingResult> {
        let realized_km = target_distance_meters / 1000.0 * self.round_trip_length_factor;
        let radius_km = realized_km / std::f64::consts::TAU;
        // Circle through the start; the end drifts off by the configured
        // offset, like a real road network's round trips do.
        let center = start.project((seed % 360) as f64, radius_km);
        let back = center.bearing_to(start);
        let mut path: Vec<Coordinates> = (0..36)
            .map(|i| center.project(back + i as f64 * 10.0, radius_km))
            .collect();
        path.push(start.project(45.0, self.round_trip_end_offset_km));

        Ok(self.result_for_path(path, realized_km))
    }
}

/// Routing fake whose every call fails, as in a total upstream outage.
pub struct DownRouting;

#[async_trait]
impl RoutingService for DownRouting {
    async fn directions(&self, _: &[Coordinates], _: bool) -> Result<RoutingResult> {
        Err(AppError::RoutingApi("upstream unavailable".to_string()))
    }

    async fn round_trip(&self, _: &Coordinates, _: f64, _: u64) -> Result<RoutingResult> {
        Err(AppError::RoutingApi("upstream unavailable".to_string()))
    }
}

/// Routing fake that reports a plausible distance but an empty geometry.
pub struct EmptyGeometryRouting;

#[async_trait]
impl RoutingService for EmptyGeometryRouting {
    async fn directions(
        &self,
        waypoints: &[Coordinates],
        _optimize: bool,
    ) -> Result<RoutingResult> {
        let perimeter_km: f64 = waypoints.windows(2).map(|w| w[0].distance_to(&w[1])).sum();
        Ok(RoutingResult {
            distance_meters: perimeter_km * 1000.0,
            duration_seconds: perimeter_km * 720.0,
            encoded_polyline: String::new(),
            turn_instructions: vec![],
            road_class_spans: vec![],
        })
    }

    async fn round_trip(
        &self,
        _start: &Coordinates,
        target_distance_meters: f64,
        _seed: u64,
    ) -> Result<RoutingResult> {
        Ok(RoutingResult {
            distance_meters: target_distance_meters,
            duration_seconds: target_distance_meters * 0.72,
            encoded_polyline: String::new(),
            turn_instructions: vec![],
            road_class_spans: vec![],
        })
    }
}

/// Elevation fake: perfectly flat terrain.
pub struct FlatElevation;

#[async_trait]
impl ElevationService for FlatElevation {
    async fn elevations(&self, points: &[Coordinates]) -> Result<Vec<f64>> {
        Ok(vec![0.0; points.len()])
    }
}

/// Places fake returning a fixed feature list.
pub struct FixedPlaces {
    pub features: Vec<PlaceFeature>,
}

impl FixedPlaces {
    #[allow(dead_code)]
    pub fn empty() -> Self {
        FixedPlaces { features: vec![] }
    }
}

#[async_trait]
impl PlacesService for FixedPlaces {
    async fn find_features(
        &self,
        _center: &Coordinates,
        _radius_meters: f64,
        _categories: &[&str],
    ) -> Result<Vec<PlaceFeature>> {
        Ok(self.features.clone())
    }
}

/// Language-model fake that always replies with the same text.
pub struct ParrotLlm {
    pub reply: String,
}

impl ParrotLlm {
    #[allow(dead_code)]
    pub fn new(reply: &str) -> Self {
        ParrotLlm {
            reply: reply.to_string(),
        }
    }
}

#[async_trait]
impl LlmService for ParrotLlm {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Ok(self.reply.clone())
    }
}

/// Insert `per_leg` interpolated points along each waypoint leg.
fn densify(waypoints: &[Coordinates], per_leg: usize) -> Vec<Coordinates> {
    let mut path = Vec::new();
    for w in waypoints.windows(2) {
        for step in 0..per_leg {
            let t = step as f64 / per_leg as f64;
            path.push(
                Coordinates::new(
                    w[0].lat + (w[1].lat - w[0].lat) * t,
                    w[0].lng + (w[1].lng - w[0].lng) * t,
                )
                .unwrap(),
            );
        }
    }
    if let Some(last) = waypoints.last() {
        path.push(*last);
    }
    path
}

/// Build an engine over the given routing fake with the rest defaulted.
#[allow(dead_code)]
pub fn engine_with_routing(routing: Arc<dyn RoutingService>) -> RouteEngine {
    RouteEngine::new(
        routing,
        Arc::new(FlatElevation),
        Arc::new(FixedPlaces::empty()),
        Arc::new(StaticPopularitySource::empty()),
        None,
        RouteEngineConfig::default(),
    )
}

/// Build an engine with a language model attached.
#[allow(dead_code)]
pub fn engine_with_llm(routing: Arc<dyn RoutingService>, llm: Arc<dyn LlmService>) -> RouteEngine {
    RouteEngine::new(
        routing,
        Arc::new(FlatElevation),
        Arc::new(FixedPlaces::empty()),
        Arc::new(StaticPopularitySource::empty()),
        Some(llm),
        RouteEngineConfig::default(),
    )
}
