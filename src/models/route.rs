use crate::constants::*;
use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Which synthesis strategy to run for a request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Templates,
    Seeds,
    Llm,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Templates => write!(f, "templates"),
            Strategy::Seeds => write!(f, "seeds"),
            Strategy::Llm => write!(f, "llm"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "templates" | "template" => Ok(Strategy::Templates),
            "seeds" | "seed" => Ok(Strategy::Seeds),
            "llm" => Ok(Strategy::Llm),
            _ => Err(format!("Invalid strategy: '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePreferences {
    /// Prefer unpaved trails and paths over streets.
    #[serde(default)]
    pub prefer_trails: bool,
    #[serde(default = "default_max_alternatives")]
    pub max_alternatives: u32,
    #[serde(default)]
    pub strategy: Strategy,
}

fn default_max_alternatives() -> u32 {
    3
}

impl Default for RoutePreferences {
    fn default() -> Self {
        RoutePreferences {
            prefer_trails: false,
            max_alternatives: default_max_alternatives(),
            strategy: Strategy::default(),
        }
    }
}

/// Difficulty is an ordered-override ladder, not a weighted score: a route
/// starts easy and ratchets up, never back down.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Moderate,
    Hard,
}

impl Difficulty {
    pub fn classify(backtrack_ratio: f64, has_highways: bool, elevation_gain_m: f64) -> Self {
        let mut difficulty = if backtrack_ratio <= DIFFICULTY_EASY_MAX_BACKTRACK {
            Difficulty::Easy
        } else {
            Difficulty::Moderate
        };
        if has_highways || elevation_gain_m > DIFFICULTY_MODERATE_GAIN_M {
            difficulty = difficulty.max(Difficulty::Moderate);
        }
        if elevation_gain_m > DIFFICULTY_HARD_GAIN_M {
            difficulty = Difficulty::Hard;
        }
        difficulty
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Moderate => write!(f, "moderate"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

/// Circuit-shape measurements attached to a returned route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitQuality {
    pub backtrack_ratio: f64,
    pub angular_spread_degrees: f64,
    /// How close the routed path's nominal end was to the start before
    /// closure enforcement. Only set by the seed strategy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_quality: Option<f64>,
}

/// Elevation data derived from sampled points along the path.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ElevationProfile {
    pub gain_m: f64,
    pub loss_m: f64,
    pub max_gradient_percent: f64,
    pub max_gradient_degrees: f64,
}

/// A fully validated route as exposed to callers. Persistence, if any, is
/// the caller's responsibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedRoute {
    pub id: Uuid,
    pub name: String,
    pub distance_km: f64,
    pub duration_minutes: u32,
    pub encoded_polyline: String,
    pub waypoints: Vec<Coordinates>,
    pub difficulty: Difficulty,
    pub elevation_gain_m: f64,
    pub elevation_loss_m: f64,
    pub max_gradient_percent: f64,
    pub max_gradient_degrees: f64,
    pub turn_instructions: Vec<String>,
    pub circuit_quality: CircuitQuality,
    /// Composite ranking score, higher is better.
    pub score: f64,
}

// Request/Response types for API endpoints

#[derive(Debug, Deserialize)]
pub struct CircuitRouteRequest {
    pub start_point: Coordinates,
    pub distance_km: f64,
    /// Relative distance tolerance; defaults to the engine's configured
    /// calibration tolerances when absent.
    pub distance_tolerance: Option<f64>,
    #[serde(default)]
    pub preferences: RoutePreferences,
}

impl CircuitRouteRequest {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.5..=50.0).contains(&self.distance_km) {
            return Err("distance_km must be between 0.5 and 50".to_string());
        }
        if let Some(tolerance) = self.distance_tolerance {
            if !(0.0..=1.0).contains(&tolerance) {
                return Err("distance_tolerance must be a fraction between 0 and 1".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub routes: Vec<GeneratedRoute>,
}
