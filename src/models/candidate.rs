use crate::models::{Coordinates, Difficulty, ElevationProfile};
use crate::services::routing::RoutingResult;

/// Where a candidate came from. The diversity selector never returns two
/// routes with the same origin name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateOrigin {
    Template { name: &'static str },
    Seed { seed: u64 },
    Llm { name: String },
}

impl CandidateOrigin {
    pub fn name(&self) -> String {
        match self {
            CandidateOrigin::Template { name } => (*name).to_string(),
            CandidateOrigin::Seed { seed } => format!("Round Trip #{}", seed),
            CandidateOrigin::Llm { name } => name.clone(),
        }
    }
}

/// One fully evaluated route proposal. Built once per template/seed, scored,
/// and discarded with the request; immutable after construction.
///
/// Every score here is a function purely of this candidate's own geometry
/// and annotations, so concurrent evaluation order cannot affect ranking.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub origin: CandidateOrigin,
    pub waypoints: Vec<Coordinates>,
    pub routing: RoutingResult,
    pub path: Vec<Coordinates>,
    pub backtrack_ratio: f64,
    pub angular_spread_degrees: f64,
    pub dead_end_count: usize,
    pub circuit_score: f64,
    pub terrain_score: f64,
    pub has_highways: bool,
    pub elevation: ElevationProfile,
    pub difficulty: Difficulty,
    /// Seed strategy only: loop closure quality before snapping to start.
    pub loop_quality: Option<f64>,
    /// Final ranking score. Circuit score for template/llm candidates, the
    /// weighted blend for seed candidates.
    pub score: f64,
}
