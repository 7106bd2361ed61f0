//! API Routes
//!
//! Configures the Axum router with the list, filter, cache and backend endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    add_handler, batch_handler, cache_clear_handler, cache_compatibility_get_handler,
    cache_compatibility_put_handler, cache_search_get_handler, cache_search_put_handler,
    cache_stats_handler, clear_handler, contains_handler, decode_handler, describe_handler,
    encode_handler, events_handler, export_handler, failure_handler, health_handler, import_handler,
    list_handler, merge_handler, recent_clear_handler, recent_list_handler,
    recent_record_handler, remove_handler, summary_handler, toggle_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// `:kind` is one of `comparison`, `favorites` or `compatibility`.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/lists/:kind",
            get(list_handler).post(add_handler).delete(clear_handler),
        )
        .route("/lists/:kind/:id", delete(remove_handler))
        .route("/lists/:kind/contains/:id", get(contains_handler))
        .route("/lists/:kind/toggle", post(toggle_handler))
        .route("/lists/:kind/batch", post(batch_handler))
        .route("/lists/:kind/summary", get(summary_handler))
        .route("/lists/:kind/export", get(export_handler))
        .route("/lists/:kind/events", get(events_handler))
        .route("/lists/:kind/import", post(import_handler))
        .route("/filters/encode", post(encode_handler))
        .route("/filters/decode", get(decode_handler))
        .route("/filters/merge", post(merge_handler))
        .route("/filters/describe", post(describe_handler))
        .route(
            "/filters/recent",
            get(recent_list_handler)
                .post(recent_record_handler)
                .delete(recent_clear_handler),
        )
        .route(
            "/cache/search",
            put(cache_search_put_handler).get(cache_search_get_handler),
        )
        .route(
            "/cache/compatibility",
            put(cache_compatibility_put_handler).get(cache_compatibility_get_handler),
        )
        .route("/cache/stats", get(cache_stats_handler))
        .route("/cache", delete(cache_clear_handler))
        .route("/backend/failure", post(failure_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
