pub mod candidate;
pub mod coordinates;
pub mod polyline;
pub mod route;

pub use candidate::{Candidate, CandidateOrigin};
pub use coordinates::Coordinates;
pub use route::{
    CircuitQuality, CircuitRouteRequest, Difficulty, ElevationProfile, GeneratedRoute,
    RoutePreferences, RouteResponse, Strategy,
};
