//! API Routes
//!
//! Configures the Axum router with the admin endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, delete_handler, dependencies_handler, get_handler, health_handler,
    invalidate_domain_handler, invalidate_entity_handler, invalidate_key_handler,
    invalidate_pattern_handler, register_dependency_handler, set_handler, stats_handler,
    AppState,
};

/// Creates the admin router.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/cache", put(set_handler).delete(clear_handler))
        .route("/cache/:key", get(get_handler).delete(delete_handler))
        .route("/invalidate/key/:key", post(invalidate_key_handler))
        .route("/invalidate/pattern", post(invalidate_pattern_handler))
        .route("/invalidate/domain/:domain", post(invalidate_domain_handler))
        .route(
            "/invalidate/domain/:domain/:id",
            post(invalidate_entity_handler),
        )
        .route("/dependencies", post(register_dependency_handler))
        .route("/dependencies/:key", get(dependencies_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
