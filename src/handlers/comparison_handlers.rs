use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};
use crate::models::{AppResult, IterationResult, RenderedHtml, RunView, UiState};
use crate::services::{CompareServiceClient, ResultRenderer, SessionService};
use std::sync::Arc;
use tracing::info;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub client: Arc<CompareServiceClient>,
    pub sessions: Arc<SessionService>,
}

/// Form defaults prefilled from the comparison service's stored config
#[utoipa::path(
    get,
    path = "/console/api/defaults",
    responses(
        (status = 200, description = "Form defaults, blank when the service has none", body = UiState)
    ),
    tag = "Comparison"
)]
pub async fn get_defaults(State(state): State<AppState>) -> Json<UiState> {
    let ui = match state.client.fetch_defaults().await {
        Some(defaults) => UiState::from_defaults(&defaults),
        None => UiState::default(),
    };
    Json(ui)
}

/// Run a live comparison or baseline operation for a console session
#[utoipa::path(
    post,
    path = "/console/api/sessions/{session_id}/run",
    params(
        ("session_id" = String, Path, description = "Console session ID")
    ),
    request_body = UiState,
    responses(
        (status = 200, description = "Run finished; results or error message rendered", body = RunView),
        (status = 404, description = "Session not found"),
        (status = 409, description = "A run is already in progress for this session")
    ),
    tag = "Comparison"
)]
pub async fn run_comparison(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(ui): Json<UiState>,
) -> AppResult<Json<RunView>> {
    let (outcome, session) = state.sessions.run(&session_id, &ui).await?;
    info!(%session_id, ?outcome, "run finished");
    Ok(Json(RunView::from(&session.surface)))
}

/// Render iteration results as an HTML fragment
#[utoipa::path(
    post,
    path = "/console/api/render",
    request_body = Vec<IterationResult>,
    responses(
        (status = 200, description = "Rendered results fragment", body = RenderedHtml),
        (status = 400, description = "Invalid request")
    ),
    tag = "Rendering"
)]
pub async fn render_results(Json(results): Json<Vec<IterationResult>>) -> Json<RenderedHtml> {
    Json(RenderedHtml {
        html: ResultRenderer::render(&results),
    })
}

/// Render iteration results as a standalone HTML report
#[utoipa::path(
    post,
    path = "/console/api/report",
    request_body = Vec<IterationResult>,
    responses(
        (status = 200, description = "HTML report document", body = String, content_type = "text/html"),
        (status = 400, description = "Invalid request")
    ),
    tag = "Rendering"
)]
pub async fn render_report(Json(results): Json<Vec<IterationResult>>) -> Html<String> {
    Html(ResultRenderer::render_document(&results))
}
