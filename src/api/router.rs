use super::{AppState, handlers};
use axum::Router;
use axum::routing::{get, patch, post, put};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds and returns the full Axum router with all routes and shared state.
pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/sessions", post(handlers::create_session))
        .route(
            "/sessions/{id}",
            get(handlers::get_session).delete(handlers::close_session),
        )
        .route("/sessions/{id}/asset", put(handlers::select_asset))
        .route("/sessions/{id}/book", get(handlers::get_book))
        .route("/sessions/{id}/book/select", post(handlers::select_level))
        .route(
            "/sessions/{id}/draft",
            put(handlers::set_field).delete(handlers::cancel_draft),
        )
        .route("/sessions/{id}/form", patch(handlers::update_form))
        .route("/sessions/{id}/orders", post(handlers::submit_order))
        .route(
            "/sessions/{id}/submission/dismiss",
            post(handlers::dismiss_submission),
        )
        .route(
            "/sessions/{id}/trades",
            get(handlers::list_trades).delete(handlers::clear_trades),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
