use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Preference profile
        .route(
            "/sessions/:session/preferences",
            get(handlers::get_preferences).delete(handlers::clear_preferences),
        )
        .route(
            "/sessions/:session/preferences/tags",
            post(handlers::add_tag).delete(handlers::clear_tags),
        )
        .route(
            "/sessions/:session/preferences/tags/:tag",
            delete(handlers::remove_tag),
        )
        .route(
            "/sessions/:session/preferences/items",
            post(handlers::add_item),
        )
        .route(
            "/sessions/:session/preferences/items/:item_id",
            delete(handlers::remove_item),
        )
        // Recommendations
        .route(
            "/sessions/:session/recommendations",
            get(handlers::get_recommendations),
        )
        .route(
            "/sessions/:session/recommendations/latest",
            get(handlers::get_latest_recommendations),
        )
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
