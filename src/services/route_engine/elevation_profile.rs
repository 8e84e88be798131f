//! Elevation gain/loss/gradient derivation from sampled path points.

use crate::constants::{ELEVATION_MAX_SAMPLES, GRADIENT_MIN_HORIZONTAL_M};
use crate::error::Result;
use crate::models::{Coordinates, ElevationProfile};
use crate::services::elevation::ElevationService;

/// Pick at most `max_samples` evenly spaced points along the path,
/// always keeping the first and last.
pub fn sample_points(path: &[Coordinates], max_samples: usize) -> Vec<Coordinates> {
    if path.len() <= max_samples || max_samples < 2 {
        return path.to_vec();
    }

    let last = path.len() - 1;
    (0..max_samples)
        .map(|i| path[i * last / (max_samples - 1)])
        .collect()
}

/// Query the elevation service over sampled points and derive the profile.
///
/// Accumulates positive deltas as gain and negative as loss; the steepest
/// gradient only considers adjacent samples more than a few meters apart
/// horizontally, so stacked duplicate points cannot produce absurd slopes.
pub async fn compute_profile(
    elevation_service: &dyn ElevationService,
    path: &[Coordinates],
) -> Result<ElevationProfile> {
    let samples = sample_points(path, ELEVATION_MAX_SAMPLES);
    if samples.len() < 2 {
        return Ok(ElevationProfile::default());
    }

    let elevations = elevation_service.elevations(&samples).await?;
    Ok(profile_from_samples(&samples, &elevations))
}

/// Pure derivation from aligned (point, elevation) samples.
pub fn profile_from_samples(samples: &[Coordinates], elevations: &[f64]) -> ElevationProfile {
    let mut profile = ElevationProfile::default();
    let mut max_gradient: f64 = 0.0;

    for i in 1..samples.len().min(elevations.len()) {
        let delta = elevations[i] - elevations[i - 1];
        if delta > 0.0 {
            profile.gain_m += delta;
        } else {
            profile.loss_m += -delta;
        }

        let horizontal_m = samples[i - 1].distance_to(&samples[i]) * 1000.0;
        if horizontal_m > GRADIENT_MIN_HORIZONTAL_M {
            max_gradient = max_gradient.max(delta.abs() / horizontal_m);
        }
    }

    profile.max_gradient_percent = max_gradient * 100.0;
    profile.max_gradient_degrees = max_gradient.atan().to_degrees();
    profile
}
