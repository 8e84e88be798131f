use circuitroute::error::AppError;
use circuitroute::models::{polyline, RoutePreferences, Strategy};
use circuitroute::services::route_engine::circuit_metrics::{overlap_edge_set, overlap_ratio};
use circuitroute::services::routing::RoadClass;
use std::sync::Arc;

mod common;

fn preferences(strategy: Strategy) -> RoutePreferences {
    RoutePreferences {
        prefer_trails: false,
        max_alternatives: 3,
        strategy,
    }
}

#[tokio::test]
async fn test_template_strategy_generates_circuits() {
    let start = common::westminster();
    let engine = common::engine_with_routing(Arc::new(common::FakeRouting::new(1.2)));

    let routes = engine
        .generate_circuit(&start, 5.0, None, &preferences(Strategy::Templates))
        .await
        .expect("template generation should succeed");

    assert!(!routes.is_empty() && routes.len() <= 3);
    for route in &routes {
        assert!(
            (4.25..=5.75).contains(&route.distance_km),
            "route '{}' is {:.2}km, outside tolerance of the 5km target",
            route.name,
            route.distance_km
        );
        assert!(
            route.circuit_quality.angular_spread_degrees >= 180.0,
            "route '{}' has spread {:.0}",
            route.name,
            route.circuit_quality.angular_spread_degrees
        );
        assert!(route.circuit_quality.backtrack_ratio <= 0.35);

        // Closed loop: the realized path starts and ends at the start point.
        let path = polyline::decode(&route.encoded_polyline);
        assert!(!path.is_empty());
        assert!(start.distance_to(&path[0]) < 0.005);
        assert!(start.distance_to(path.last().unwrap()) < 0.005);
    }

    // Alternatives are distinct by name.
    let mut names: Vec<&str> = routes.iter().map(|r| r.name.as_str()).collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), routes.len(), "route names should be unique");
}

#[tokio::test]
async fn test_returned_alternatives_have_bounded_overlap() {
    let start = common::westminster();
    let engine = common::engine_with_routing(Arc::new(common::FakeRouting::new(1.2)));

    let routes = engine
        .generate_circuit(&start, 5.0, None, &preferences(Strategy::Templates))
        .await
        .expect("template generation should succeed");

    let edge_sets: Vec<_> = routes
        .iter()
        .map(|r| overlap_edge_set(&polyline::decode(&r.encoded_polyline)))
        .collect();
    for i in 0..edge_sets.len() {
        for j in (i + 1)..edge_sets.len() {
            let overlap = overlap_ratio(&edge_sets[i], &edge_sets[j]);
            assert!(
                overlap <= 0.4 + 1e-9,
                "routes '{}' and '{}' overlap {:.2}",
                routes[i].name,
                routes[j].name,
                overlap
            );
        }
    }
}

#[tokio::test]
async fn test_total_routing_outage_yields_no_candidates() {
    let start = common::westminster();
    let engine = common::engine_with_routing(Arc::new(common::DownRouting));

    let result = engine
        .generate_circuit(&start, 5.0, None, &preferences(Strategy::Templates))
        .await;
    assert!(
        matches!(result, Err(AppError::NoCandidates(_))),
        "an upstream outage should surface as NoCandidates, got {:?}",
        result.err()
    );
}

#[tokio::test]
async fn test_empty_geometry_is_rejected_without_panicking() {
    let start = common::westminster();
    let engine = common::engine_with_routing(Arc::new(common::EmptyGeometryRouting));

    let result = engine
        .generate_circuit(&start, 5.0, None, &preferences(Strategy::Templates))
        .await;
    assert!(matches!(result, Err(AppError::NoCandidates(_))));
}

#[tokio::test]
async fn test_seed_strategy_returns_closed_round_trips() {
    let start = common::westminster();
    let engine = common::engine_with_routing(Arc::new(common::FakeRouting::new(1.2)));

    let routes = engine
        .generate_circuit(&start, 5.0, None, &preferences(Strategy::Seeds))
        .await
        .expect("seed generation should succeed");

    assert!(!routes.is_empty() && routes.len() <= 3);
    for route in &routes {
        let loop_quality = route
            .circuit_quality
            .loop_quality
            .expect("seed routes carry a loop quality");
        assert!(loop_quality >= 0.7, "loop quality {:.2}", loop_quality);
        assert!(route.circuit_quality.backtrack_ratio <= 0.3);
        assert!(route.name.starts_with("Round Trip #"));

        let path = polyline::decode(&route.encoded_polyline);
        assert!(start.distance_to(&path[0]) < 0.005);
        assert!(start.distance_to(path.last().unwrap()) < 0.005);
    }
}

#[tokio::test]
async fn test_sloppy_round_trips_are_rejected() {
    let start = common::westminster();
    // Round trips whose nominal end is 400m from the start: loop quality
    // 0.2, well under the acceptance bar.
    let engine = common::engine_with_routing(Arc::new(common::FakeRouting::with_sloppy_round_trips(
        1.2, 0.4,
    )));

    let result = engine
        .generate_circuit(&start, 5.0, None, &preferences(Strategy::Seeds))
        .await;
    assert!(matches!(result, Err(AppError::NoCandidates(_))));
}

#[tokio::test]
async fn test_overlong_round_trips_are_rejected() {
    let start = common::westminster();
    // Clean circuits at twice the requested length: relative error 1.0,
    // far outside the acceptance window.
    let engine = common::engine_with_routing(Arc::new(
        common::FakeRouting::with_overlong_round_trips(1.2, 2.0),
    ));

    let result = engine
        .generate_circuit(&start, 5.0, None, &preferences(Strategy::Seeds))
        .await;
    assert!(
        matches!(result, Err(AppError::NoCandidates(_))),
        "round trips far off the requested distance should not be returned, got {:?}",
        result.map(|routes| routes
            .iter()
            .map(|r| (r.name.clone(), r.distance_km))
            .collect::<Vec<_>>())
    );
}

#[tokio::test]
async fn test_trail_preference_rejects_highway_routes() {
    let start = common::westminster();
    let engine = common::engine_with_routing(Arc::new(common::FakeRouting::with_road_class(
        1.2,
        RoadClass::Highway,
    )));

    let mut prefs = preferences(Strategy::Templates);
    prefs.prefer_trails = true;
    let result = engine.generate_circuit(&start, 5.0, None, &prefs).await;
    assert!(
        matches!(result, Err(AppError::NoCandidates(_))),
        "all-highway routes should not satisfy a trail preference"
    );
}

#[tokio::test]
async fn test_llm_strategy_falls_back_on_invalid_json() {
    let start = common::westminster();
    // Road factor chosen so the fallback square's tour lands near 5km.
    let engine = common::engine_with_llm(
        Arc::new(common::FakeRouting::new(0.64)),
        Arc::new(common::ParrotLlm::new("sorry, I cannot do that")),
    );

    let routes = engine
        .generate_circuit(&start, 5.0, None, &preferences(Strategy::Llm))
        .await
        .expect("an unusable completion should fall back, not fail");

    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].name, "Clockwise Square");
    assert!((3.75..=6.25).contains(&routes[0].distance_km));
}

#[tokio::test]
async fn test_llm_strategy_routes_proposed_waypoints() {
    let start = common::westminster();
    // A square around Westminster, roughly 1.25km out per corner.
    let completion = r#"{
        "routes": [{
            "name": "Riverside Ring",
            "waypoints": [
                {"lat": 51.51194, "lng": -0.1246},
                {"lat": 51.5007, "lng": -0.10656},
                {"lat": 51.48946, "lng": -0.1246},
                {"lat": 51.5007, "lng": -0.14264}
            ],
            "reasoning": "Loops the river bends",
            "circuit_type": "loop"
        }]
    }"#;
    let engine = common::engine_with_llm(
        Arc::new(common::FakeRouting::new(0.64)),
        Arc::new(common::ParrotLlm::new(completion)),
    );

    let routes = engine
        .generate_circuit(&start, 5.0, None, &preferences(Strategy::Llm))
        .await
        .expect("a valid proposal should be routed");

    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].name, "Riverside Ring");
    assert!(routes[0].circuit_quality.angular_spread_degrees >= 180.0);
}

#[tokio::test]
async fn test_llm_proposals_honor_trail_preference() {
    let start = common::westminster();
    let completion = r#"{
        "routes": [{
            "name": "Riverside Ring",
            "waypoints": [
                {"lat": 51.51194, "lng": -0.1246},
                {"lat": 51.5007, "lng": -0.10656},
                {"lat": 51.48946, "lng": -0.1246},
                {"lat": 51.5007, "lng": -0.14264}
            ],
            "reasoning": "Loops the river bends",
            "circuit_type": "loop"
        }]
    }"#;
    // Every leg comes back as highway, so nothing satisfies the preference.
    let engine = common::engine_with_llm(
        Arc::new(common::FakeRouting::with_road_class(
            0.64,
            RoadClass::Highway,
        )),
        Arc::new(common::ParrotLlm::new(completion)),
    );

    let mut prefs = preferences(Strategy::Llm);
    prefs.prefer_trails = true;
    let result = engine.generate_circuit(&start, 5.0, None, &prefs).await;
    assert!(
        matches!(result, Err(AppError::NoCandidates(_))),
        "all-highway proposals should not satisfy a trail preference"
    );
}

#[tokio::test]
async fn test_llm_strategy_requires_a_configured_model() {
    let start = common::westminster();
    let engine = common::engine_with_routing(Arc::new(common::FakeRouting::new(1.2)));

    let result = engine
        .generate_circuit(&start, 5.0, None, &preferences(Strategy::Llm))
        .await;
    assert!(matches!(result, Err(AppError::InvalidRequest(_))));
}

#[tokio::test]
async fn test_identical_requests_are_deterministic() {
    let start = common::westminster();
    let engine = common::engine_with_routing(Arc::new(common::FakeRouting::new(1.2)));

    let first = engine
        .generate_circuit(&start, 5.0, None, &preferences(Strategy::Templates))
        .await
        .expect("generation should succeed");
    let second = engine
        .generate_circuit(&start, 5.0, None, &preferences(Strategy::Templates))
        .await
        .expect("generation should succeed");

    let mut first_names: Vec<String> = first.iter().map(|r| r.name.clone()).collect();
    let mut second_names: Vec<String> = second.iter().map(|r| r.name.clone()).collect();
    first_names.sort();
    second_names.sort();
    assert_eq!(
        first_names, second_names,
        "the same request should sample the same templates"
    );
}
