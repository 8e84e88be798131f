pub mod circuit;
pub mod debug;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/routes/circuit", post(circuit::create_circuit_route))
        .route("/debug/health", get(debug::health_check))
        .with_state(state)
}
