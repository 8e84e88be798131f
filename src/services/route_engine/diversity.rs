//! Greedy diversity selection over scored candidates.

use super::circuit_metrics::{overlap_edge_set, overlap_ratio};
use crate::models::Candidate;
use std::collections::HashSet;

/// Pick up to `max_routes` candidates, best score first, rejecting any whose
/// origin name repeats an accepted one or whose path overlaps an accepted
/// route beyond `max_overlap_ratio`. The accepted set is therefore pairwise
/// distinct both by shape source and by shared ground.
pub fn select_diverse(
    mut candidates: Vec<Candidate>,
    max_routes: usize,
    max_overlap_ratio: f64,
) -> Vec<Candidate> {
    // Name tiebreak keeps selection independent of evaluation order.
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.origin.name().cmp(&b.origin.name()))
    });

    let mut accepted: Vec<Candidate> = Vec::with_capacity(max_routes);
    let mut accepted_edges = Vec::with_capacity(max_routes);
    let mut used_names: HashSet<String> = HashSet::new();

    for candidate in candidates {
        if accepted.len() >= max_routes {
            break;
        }

        let name = candidate.origin.name();
        if used_names.contains(&name) {
            tracing::debug!(name = %name, "Diversity: skipping repeated origin");
            continue;
        }

        let edges = overlap_edge_set(&candidate.path);
        let too_similar = accepted_edges
            .iter()
            .any(|existing| overlap_ratio(&edges, existing) > max_overlap_ratio);
        if too_similar {
            tracing::debug!(
                name = %name,
                score = %format!("{:.3}", candidate.score),
                "Diversity: skipping candidate overlapping an accepted route"
            );
            continue;
        }

        used_names.insert(name);
        accepted_edges.push(edges);
        accepted.push(candidate);
    }

    accepted
}
