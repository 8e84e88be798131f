//! Circuit-validity measurements over a realized path.
//!
//! Everything here is a pure function of one path's geometry, so candidate
//! scores are independent of evaluation order.

use crate::constants::*;
use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

/// Shape metrics for one realized path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CircuitMetrics {
    /// Fraction of directed grid edges whose exact reverse also occurs.
    pub backtrack_ratio: f64,
    /// Compass coverage of the path as seen from the start (degrees).
    pub angular_spread_degrees: f64,
    /// Near-180-degree turns along the path.
    pub dead_end_count: usize,
    /// Weighted blend of the three shape measures, in [0, 1].
    pub circuit_score: f64,
}

impl CircuitMetrics {
    pub fn compute(start: &Coordinates, path: &[Coordinates]) -> Self {
        let backtrack_ratio = backtrack_ratio(path);
        let angular_spread_degrees = angular_spread_degrees(start, path);
        let dead_end_count = dead_end_count(path);

        let circuit_score = SCORE_WEIGHT_BACKTRACK * (1.0 - backtrack_ratio.min(1.0))
            + SCORE_WEIGHT_ANGULAR * (angular_spread_degrees / 360.0).min(1.0)
            + SCORE_WEIGHT_DEAD_ENDS * (1.0 - dead_end_count as f64 * DEAD_END_PENALTY).max(0.0);

        CircuitMetrics {
            backtrack_ratio,
            angular_spread_degrees,
            dead_end_count,
            circuit_score,
        }
    }

    /// Whether the path is a genuine circuit rather than an out-and-back.
    pub fn is_genuine_circuit(&self, min_spread_deg: f64, max_backtrack: f64) -> bool {
        self.angular_spread_degrees >= min_spread_deg && self.backtrack_ratio <= max_backtrack
    }
}

type GridCell = (i64, i64);

fn grid_cell(point: &Coordinates, cell_size_deg: f64) -> GridCell {
    (
        (point.lat / cell_size_deg).floor() as i64,
        (point.lng / cell_size_deg).floor() as i64,
    )
}

/// Sequence of directed cell-to-cell edges, consecutive duplicates removed.
fn directed_edges(path: &[Coordinates], cell_size_deg: f64) -> Vec<(GridCell, GridCell)> {
    let mut cells: Vec<GridCell> = path.iter().map(|p| grid_cell(p, cell_size_deg)).collect();
    cells.dedup();
    cells.windows(2).map(|w| (w[0], w[1])).collect()
}

/// Fraction of directed edges whose exact reverse also appears in the path.
/// High ratio means the route retraces itself.
pub fn backtrack_ratio(path: &[Coordinates]) -> f64 {
    let edges = directed_edges(path, BACKTRACK_GRID_CELL_DEG);
    if edges.is_empty() {
        return 0.0;
    }

    let edge_set: HashSet<(GridCell, GridCell)> = edges.iter().copied().collect();
    let reversed = edges
        .iter()
        .filter(|(from, to)| edge_set.contains(&(*to, *from)))
        .count();

    reversed as f64 / edges.len() as f64
}

/// Compass-sector coverage: bearings from start to every path point are
/// bucketed into 30-degree sectors; coverage is `sectors_used * 30`.
pub fn angular_spread_degrees(start: &Coordinates, path: &[Coordinates]) -> f64 {
    let mut sectors: HashSet<u32> = HashSet::new();
    for point in path {
        // Points sitting on the start contribute no usable bearing.
        if start.distance_to(point) < 1e-4 {
            continue;
        }
        let bearing = start.bearing_to(point);
        sectors.insert((bearing / ANGULAR_SECTOR_DEG) as u32 % 12);
    }
    sectors.len() as f64 * ANGULAR_SECTOR_DEG
}

/// Count near-U-turns: interior points where the heading reverses to within
/// `DEAD_END_TOLERANCE_DEG` of 180 degrees.
pub fn dead_end_count(path: &[Coordinates]) -> usize {
    path.windows(3)
        .filter(|w| {
            let incoming = w[0].bearing_to(&w[1]);
            let outgoing = w[1].bearing_to(&w[2]);
            let mut turn = (outgoing - incoming).abs();
            if turn > 180.0 {
                turn = 360.0 - turn;
            }
            (180.0 - turn).abs() <= DEAD_END_TOLERANCE_DEG
        })
        .count()
}

/// Undirected grid-edge set at the overlap cell size, used for both
/// pairwise overlap and popularity keying.
pub fn overlap_edge_set(path: &[Coordinates]) -> HashSet<(GridCell, GridCell)> {
    directed_edges(path, OVERLAP_GRID_CELL_DEG)
        .into_iter()
        .map(normalize_edge)
        .collect()
}

fn normalize_edge((a, b): (GridCell, GridCell)) -> (GridCell, GridCell) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Shared-path ratio between two routes: `|intersection| / min(|A|, |B|)`.
pub fn overlap_ratio(
    a: &HashSet<(GridCell, GridCell)>,
    b: &HashSet<(GridCell, GridCell)>,
) -> f64 {
    let smaller = a.len().min(b.len());
    if smaller == 0 {
        return 0.0;
    }
    let shared = a.intersection(b).count();
    shared as f64 / smaller as f64
}

/// Stable 64-bit hashes of a path's undirected grid edges, the keys under
/// which historical usage is recorded.
pub fn edge_hashes(path: &[Coordinates]) -> Vec<u64> {
    overlap_edge_set(path)
        .into_iter()
        .map(|edge| {
            let mut hasher = DefaultHasher::new();
            edge.hash(&mut hasher);
            hasher.finish()
        })
        .collect()
}
