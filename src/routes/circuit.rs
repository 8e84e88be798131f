use crate::cache;
use crate::error::{AppError, Result};
use crate::models::{CircuitRouteRequest, RouteResponse};
use crate::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;

/// POST /routes/circuit
/// Generate closed-loop routes that start and end at the same point
pub async fn create_circuit_route(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CircuitRouteRequest>,
) -> Result<Json<RouteResponse>> {
    request.validate().map_err(AppError::InvalidRequest)?;

    tracing::info!(
        lat = request.start_point.lat,
        lng = request.start_point.lng,
        distance_km = request.distance_km,
        strategy = %request.preferences.strategy,
        "Circuit route request: ({:.4}, {:.4}), {:.1}km, strategy={}",
        request.start_point.lat,
        request.start_point.lng,
        request.distance_km,
        request.preferences.strategy
    );

    let cache_key = cache::circuit_route_cache_key(
        &request.start_point,
        request.distance_km,
        request.distance_tolerance,
        &request.preferences,
    );

    if let Some(ref cache) = state.cache {
        if let Some(cached_routes) = cache.get_cached_routes(&cache_key).await {
            tracing::info!(
                "Cache hit for circuit route: {} routes returned",
                cached_routes.len()
            );
            return Ok(Json(RouteResponse {
                routes: cached_routes,
            }));
        }
    }

    let routes = state
        .engine
        .generate_circuit(
            &request.start_point,
            request.distance_km,
            request.distance_tolerance,
            &request.preferences,
        )
        .await?;

    if let Some(ref cache) = state.cache {
        cache.cache_routes(&cache_key, &routes).await;
    }

    Ok(Json(RouteResponse { routes }))
}
