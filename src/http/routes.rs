use super::handlers;
use super::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Largest accepted answer recording (about two minutes of 48kHz stereo WAV)
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .route("/questions", get(handlers::list_questions))
        // Session lifecycle
        .route("/sessions", post(handlers::create_session))
        .route(
            "/sessions/:session_id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        // Answers and navigation
        .route("/sessions/:session_id/answer", put(handlers::set_answer))
        .route(
            "/sessions/:session_id/voice",
            post(handlers::voice_answer).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/sessions/:session_id/next", post(handlers::next_question))
        .route(
            "/sessions/:session_id/previous",
            post(handlers::previous_question),
        )
        // Export
        .route("/sessions/:session_id/snapshot", get(handlers::get_snapshot))
        .route("/sessions/:session_id/report", get(handlers::export_report))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
