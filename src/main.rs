use axum::Router;
use circuitroute::cache::{MemoryCacheService, RouteCache};
use circuitroute::config::Config;
use circuitroute::constants::DEFAULT_MEMORY_CACHE_MAX_ENTRIES;
use circuitroute::services::elevation::{ElevationService, OpenElevationClient};
use circuitroute::services::llm::{ChatCompletionClient, LlmService};
use circuitroute::services::places::{OverpassClient, PlacesService};
use circuitroute::services::popularity::{PopularitySource, StaticPopularitySource};
use circuitroute::services::route_engine::RouteEngine;
use circuitroute::services::routing::{OrsClient, RoutingService};
use circuitroute::AppState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "circuitroute=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;

    tracing::info!("Starting circuitroute API server");
    tracing::info!("Configuration loaded successfully");

    // External clients
    let routing: Arc<dyn RoutingService> = Arc::new(match config.routing_base_url {
        Some(ref base_url) => {
            OrsClient::with_base_url(config.routing_api_key.clone(), base_url.clone())
        }
        None => OrsClient::new(config.routing_api_key.clone()),
    });
    let elevation: Arc<dyn ElevationService> = Arc::new(match config.elevation_base_url {
        Some(ref base_url) => OpenElevationClient::with_base_url(base_url.clone()),
        None => OpenElevationClient::new(),
    });
    let places: Arc<dyn PlacesService> = Arc::new(OverpassClient::new());
    let popularity: Arc<dyn PopularitySource> = Arc::new(StaticPopularitySource::empty());
    let llm: Option<Arc<dyn LlmService>> = config
        .llm_api_key
        .as_ref()
        .map(|key| Arc::new(ChatCompletionClient::new(key.clone())) as Arc<dyn LlmService>);
    if llm.is_none() {
        tracing::info!("No language model key configured; llm strategy disabled");
    }

    let engine = RouteEngine::new(
        routing,
        elevation,
        places,
        popularity,
        llm,
        config.engine.clone(),
    );

    let cache: Arc<dyn RouteCache> = Arc::new(MemoryCacheService::new(
        config.route_cache_ttl,
        DEFAULT_MEMORY_CACHE_MAX_ENTRIES,
    ));

    // Create application state
    let state = Arc::new(AppState {
        engine,
        cache: Some(cache),
    });

    // Build router with CORS and tracing
    let app = Router::new()
        .nest("/api/v1", circuitroute::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
