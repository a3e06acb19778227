pub mod comparison_handlers;
pub mod session_handlers;

use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;

use crate::models::{
    BaselineOperation, ComparisonMode, IterationResult, IterationStatus, ApiCallResult, KeyValueRow,
    RenderedHtml, RunView, SelectOptionView, SelectorView, SessionView, TestType, UiState, WorkflowView,
};
use crate::services::UserEvent;
use comparison_handlers::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        comparison_handlers::get_defaults,
        comparison_handlers::run_comparison,
        comparison_handlers::render_results,
        comparison_handlers::render_report,
        session_handlers::create_session,
        session_handlers::get_session,
        session_handlers::close_session,
        session_handlers::dispatch_event,
    ),
    components(schemas(
        UiState, KeyValueRow, TestType, ComparisonMode, BaselineOperation, UserEvent,
        IterationResult, IterationStatus, ApiCallResult, RenderedHtml, RunView,
        SessionView, WorkflowView, SelectorView, SelectOptionView,
    )),
    tags(
        (name = "Comparison", description = "Build and submit comparison runs"),
        (name = "Sessions", description = "Console sessions and the baseline workflow"),
        (name = "Rendering", description = "HTML rendering of iteration results")
    )
)]
pub struct ApiDoc;

/// The console API routes, without documentation or tracing layers.
pub fn api_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/console/api/defaults", get(comparison_handlers::get_defaults))
        .route("/console/api/render", post(comparison_handlers::render_results))
        .route("/console/api/report", post(comparison_handlers::render_report))
        .route("/console/api/sessions", post(session_handlers::create_session))
        .route(
            "/console/api/sessions/:session_id",
            get(session_handlers::get_session).delete(session_handlers::close_session),
        )
        .route("/console/api/sessions/:session_id/events", post(session_handlers::dispatch_event))
        .route("/console/api/sessions/:session_id/run", post(comparison_handlers::run_comparison))
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(cors)
}
