use crate::constants::NEUTRAL_POPULARITY;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Historical-usage lookup keyed by grid-edge hashes (the same hashing used
/// for overlap detection). Absence of data yields a neutral default, never
/// zero, so unknown areas are not punished in ranking.
#[async_trait]
pub trait PopularitySource: Send + Sync {
    /// Mean popularity in [0, 1] over the given edges, or `None` when no
    /// edge has recorded data.
    async fn edge_popularity(&self, edge_hashes: &[u64]) -> Result<Option<f64>>;
}

/// Resolve a popularity lookup to a usable score.
pub fn popularity_or_neutral(looked_up: Option<f64>) -> f64 {
    looked_up.unwrap_or(NEUTRAL_POPULARITY).clamp(0.0, 1.0)
}

/// In-memory popularity table. Production deployments back this with the
/// usage-analytics store; tests preload it directly.
#[derive(Debug, Default)]
pub struct StaticPopularitySource {
    edges: HashMap<u64, f64>,
}

impl StaticPopularitySource {
    pub fn new(edges: HashMap<u64, f64>) -> Self {
        StaticPopularitySource { edges }
    }

    /// A source with no data; every lookup resolves to the neutral default.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PopularitySource for StaticPopularitySource {
    async fn edge_popularity(&self, edge_hashes: &[u64]) -> Result<Option<f64>> {
        let mut sum = 0.0;
        let mut count = 0usize;
        for hash in edge_hashes {
            if let Some(score) = self.edges.get(hash) {
                sum += score;
                count += 1;
            }
        }
        if count == 0 {
            Ok(None)
        } else {
            Ok(Some(sum / count as f64))
        }
    }
}
