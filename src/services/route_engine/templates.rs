//! Hand-curated catalog of geometric circuit shapes.
//!
//! Each template is a sequence of (bearing, radius-multiplier) waypoint
//! specs relative to the start point and a base radius of a quarter of the
//! target distance. Calibration later scales the whole shape uniformly
//! until the routed distance matches the target.

use crate::constants::BASE_RADIUS_DIVISOR;
use crate::models::Coordinates;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::sync::OnceLock;

/// One waypoint spec: bearing in degrees clockwise from north, and a
/// multiplier applied to the base radius.
#[derive(Debug, Clone, Copy)]
pub struct WaypointSpec {
    pub bearing_deg: f64,
    pub radius_multiplier: f64,
}

#[derive(Debug, Clone)]
pub struct Template {
    pub name: &'static str,
    pub specs: Vec<WaypointSpec>,
}

fn spec(bearing_deg: f64, radius_multiplier: f64) -> WaypointSpec {
    WaypointSpec {
        bearing_deg,
        radius_multiplier,
    }
}

/// Evenly spaced specs around the compass, starting at `start_bearing` and
/// stepping clockwise (negative step for counter-clockwise).
fn polygon(start_bearing: f64, sides: usize, step_deg: f64, radius: f64) -> Vec<WaypointSpec> {
    (0..sides)
        .map(|i| spec(start_bearing + step_deg * i as f64, radius))
        .collect()
}

fn build_catalog() -> Vec<Template> {
    let mut catalog = Vec::with_capacity(32);

    // Triangular loops opening toward each compass octant.
    for (name, bearing) in [
        ("North Loop", 0.0),
        ("Northeast Loop", 45.0),
        ("East Loop", 90.0),
        ("Southeast Loop", 135.0),
        ("South Loop", 180.0),
        ("Southwest Loop", 225.0),
        ("West Loop", 270.0),
        ("Northwest Loop", 315.0),
    ] {
        catalog.push(Template {
            name,
            specs: vec![
                spec(bearing - 40.0, 1.0),
                spec(bearing, 1.2),
                spec(bearing + 40.0, 1.0),
            ],
        });
    }

    catalog.push(Template {
        name: "Clockwise Square",
        specs: polygon(0.0, 4, 90.0, 1.0),
    });
    catalog.push(Template {
        name: "Counter-Clockwise Square",
        specs: polygon(0.0, 4, -90.0, 1.0),
    });
    catalog.push(Template {
        name: "Tilted Square",
        specs: polygon(45.0, 4, 90.0, 1.0),
    });
    catalog.push(Template {
        name: "Wide Square",
        specs: polygon(0.0, 4, 90.0, 1.4),
    });

    catalog.push(Template {
        name: "Pentagon",
        specs: polygon(0.0, 5, 72.0, 1.0),
    });
    catalog.push(Template {
        name: "Wide Pentagon",
        specs: polygon(36.0, 5, 72.0, 1.3),
    });
    catalog.push(Template {
        name: "Hexagon",
        specs: polygon(0.0, 6, 60.0, 1.0),
    });
    catalog.push(Template {
        name: "Wide Hexagon",
        specs: polygon(30.0, 6, 60.0, 1.3),
    });
    catalog.push(Template {
        name: "Octagon",
        specs: polygon(0.0, 8, 45.0, 1.0),
    });
    catalog.push(Template {
        name: "Wide Octagon",
        specs: polygon(22.5, 8, 45.0, 1.25),
    });

    // Diagonals: long thrust out, offset return leg.
    catalog.push(Template {
        name: "Northeast Diagonal",
        specs: vec![spec(45.0, 1.5), spec(135.0, 0.8)],
    });
    catalog.push(Template {
        name: "Northwest Diagonal",
        specs: vec![spec(315.0, 1.5), spec(225.0, 0.8)],
    });
    catalog.push(Template {
        name: "Southeast Diagonal",
        specs: vec![spec(135.0, 1.5), spec(45.0, 0.8)],
    });
    catalog.push(Template {
        name: "Southwest Diagonal",
        specs: vec![spec(225.0, 1.5), spec(315.0, 0.8)],
    });

    // Figure-eights: two lobes on opposite sides of the start.
    catalog.push(Template {
        name: "North-South Figure Eight",
        specs: vec![
            spec(330.0, 0.9),
            spec(0.0, 1.1),
            spec(30.0, 0.9),
            spec(150.0, 0.9),
            spec(180.0, 1.1),
            spec(210.0, 0.9),
        ],
    });
    catalog.push(Template {
        name: "East-West Figure Eight",
        specs: vec![
            spec(60.0, 0.9),
            spec(90.0, 1.1),
            spec(120.0, 0.9),
            spec(240.0, 0.9),
            spec(270.0, 1.1),
            spec(300.0, 0.9),
        ],
    });

    // Asymmetric heavy loops: one lobe stretched well past the others.
    catalog.push(Template {
        name: "North-Heavy Loop",
        specs: vec![spec(300.0, 0.8), spec(0.0, 1.6), spec(60.0, 0.8)],
    });
    catalog.push(Template {
        name: "East-Heavy Loop",
        specs: vec![spec(30.0, 0.8), spec(90.0, 1.6), spec(150.0, 0.8)],
    });
    catalog.push(Template {
        name: "South-Heavy Loop",
        specs: vec![spec(120.0, 0.8), spec(180.0, 1.6), spec(240.0, 0.8)],
    });
    catalog.push(Template {
        name: "West-Heavy Loop",
        specs: vec![spec(210.0, 0.8), spec(270.0, 1.6), spec(330.0, 0.8)],
    });

    // Wide arcs sweeping half the compass.
    catalog.push(Template {
        name: "Northern Arc",
        specs: vec![
            spec(270.0, 1.0),
            spec(315.0, 1.2),
            spec(0.0, 1.3),
            spec(45.0, 1.2),
            spec(90.0, 1.0),
        ],
    });
    catalog.push(Template {
        name: "Southern Arc",
        specs: vec![
            spec(90.0, 1.0),
            spec(135.0, 1.2),
            spec(180.0, 1.3),
            spec(225.0, 1.2),
            spec(270.0, 1.0),
        ],
    });
    catalog.push(Template {
        name: "Eastern Arc",
        specs: vec![
            spec(0.0, 1.0),
            spec(45.0, 1.2),
            spec(90.0, 1.3),
            spec(135.0, 1.2),
            spec(180.0, 1.0),
        ],
    });
    catalog.push(Template {
        name: "Western Arc",
        specs: vec![
            spec(180.0, 1.0),
            spec(225.0, 1.2),
            spec(270.0, 1.3),
            spec(315.0, 1.2),
            spec(0.0, 1.0),
        ],
    });

    catalog
}

/// The static template catalog, built once at first use.
pub fn catalog() -> &'static [Template] {
    static CATALOG: OnceLock<Vec<Template>> = OnceLock::new();
    CATALOG.get_or_init(build_catalog)
}

/// Scale-1.0 radius for a target distance.
pub fn base_radius_km(target_distance_km: f64) -> f64 {
    target_distance_km / BASE_RADIUS_DIVISOR
}

/// Deterministically shuffle the catalog and take up to `sample_size`
/// entries. Bounds outbound routing calls while still exploring diverse
/// shapes; the same request samples the same templates.
pub fn sample_templates(seed: u64, sample_size: usize) -> Vec<Template> {
    let mut shuffled: Vec<Template> = catalog().to_vec();
    let mut rng = StdRng::seed_from_u64(seed);
    shuffled.shuffle(&mut rng);
    shuffled.truncate(sample_size.min(shuffled.len()));
    shuffled
}

/// Map each waypoint spec to a concrete coordinate by projecting from the
/// start. Deterministic given (start, base radius).
pub fn template_waypoints(
    start: &Coordinates,
    base_radius_km: f64,
    template: &Template,
) -> Vec<Coordinates> {
    template
        .specs
        .iter()
        .map(|s| start.project(s.bearing_deg, base_radius_km * s.radius_multiplier))
        .collect()
}
