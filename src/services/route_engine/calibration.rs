//! Distance calibration: bisection over a uniform waypoint scale factor.
//!
//! Routed distance is monotonic in scale only in expectation (road snapping
//! adds noise), so the search is an explicit interval state machine that
//! tracks the best result seen and tolerates non-convergence.

use crate::config::RouteEngineConfig;
use crate::error::{AppError, Result};
use crate::models::Coordinates;
use crate::services::routing::{RoutingResult, RoutingService};

/// A calibrated route: the scale that produced it, the waypoints actually
/// routed through, and the realized routing result.
#[derive(Debug, Clone)]
pub struct CalibratedRoute {
    pub scale: f64,
    pub waypoints: Vec<Coordinates>,
    pub routing: RoutingResult,
    pub relative_error: f64,
}

pub struct Calibrator<'a> {
    routing: &'a dyn RoutingService,
    config: &'a RouteEngineConfig,
}

impl<'a> Calibrator<'a> {
    pub fn new(routing: &'a dyn RoutingService, config: &'a RouteEngineConfig) -> Self {
        Self { routing, config }
    }

    /// Find a scale factor for `base_waypoints` whose routed round-trip
    /// distance lands within tolerance of `target_distance_km`.
    ///
    /// A failed routing call is treated as "distance too large" (the upper
    /// bound shrinks) rather than aborting the whole calibration; a single
    /// flaky response costs one iteration, not the template.
    pub async fn calibrate(
        &self,
        start: &Coordinates,
        base_waypoints: &[Coordinates],
        target_distance_km: f64,
    ) -> Result<CalibratedRoute> {
        let mut min_scale = self.config.calibration_min_scale;
        let mut max_scale = self.config.calibration_max_scale;
        let mut best: Option<CalibratedRoute> = None;

        for iteration in 0..self.config.calibration_max_iterations {
            let scale = (min_scale + max_scale) / 2.0;
            let scaled: Vec<Coordinates> = base_waypoints
                .iter()
                .map(|wp| wp.scale_from(start, scale))
                .collect();

            let mut route_request = Vec::with_capacity(scaled.len() + 2);
            route_request.push(*start);
            route_request.extend_from_slice(&scaled);
            route_request.push(*start);

            let routing = match self.routing.directions(&route_request, true).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::debug!(
                        iteration = iteration + 1,
                        scale = %format!("{:.3}", scale),
                        error = %e,
                        "Calibration iteration {} failed, shrinking upper bound",
                        iteration + 1
                    );
                    max_scale = scale;
                    continue;
                }
            };

            let realized_km = routing.distance_km();
            let relative_error = (realized_km - target_distance_km).abs() / target_distance_km;

            tracing::debug!(
                iteration = iteration + 1,
                scale = %format!("{:.3}", scale),
                realized_km = %format!("{:.2}", realized_km),
                error_pct = %format!("{:.1}", relative_error * 100.0),
                "Calibration iteration {}: scale {:.3} -> {:.2}km ({:.1}% off)",
                iteration + 1, scale, realized_km, relative_error * 100.0
            );

            let candidate = CalibratedRoute {
                scale,
                waypoints: scaled,
                routing,
                relative_error,
            };

            if relative_error < self.config.calibration_accept_tolerance {
                return Ok(candidate);
            }

            if best
                .as_ref()
                .map(|b| candidate.relative_error < b.relative_error)
                .unwrap_or(true)
            {
                best = Some(candidate);
            }

            if realized_km < target_distance_km {
                min_scale = scale;
            } else {
                max_scale = scale;
            }
        }

        match best {
            Some(route) if route.relative_error < self.config.calibration_fail_tolerance => {
                tracing::debug!(
                    scale = %format!("{:.3}", route.scale),
                    error_pct = %format!("{:.1}", route.relative_error * 100.0),
                    "Calibration accepting best-seen result ({:.1}% off)",
                    route.relative_error * 100.0
                );
                Ok(route)
            }
            Some(route) => Err(AppError::Calibration(format!(
                "Best realized distance was {:.1}% off a {:.1}km target",
                route.relative_error * 100.0,
                target_distance_km
            ))),
            None => Err(AppError::Calibration(format!(
                "No routing response in {} iterations for a {:.1}km target",
                self.config.calibration_max_iterations, target_distance_km
            ))),
        }
    }
}
