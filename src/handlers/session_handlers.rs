use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use crate::handlers::comparison_handlers::AppState;
use crate::models::{AppResult, SessionView, WorkflowView};
use crate::services::UserEvent;

/// Open a console session in live mode
#[utoipa::path(
    post,
    path = "/console/api/sessions",
    responses(
        (status = 200, description = "Session created", body = SessionView)
    ),
    tag = "Sessions"
)]
pub async fn create_session(State(state): State<AppState>) -> Json<SessionView> {
    let session = state.sessions.create_session().await;
    Json(SessionView::from(&session))
}

/// Current workflow and run state of a session
#[utoipa::path(
    get,
    path = "/console/api/sessions/{session_id}",
    params(
        ("session_id" = String, Path, description = "Console session ID")
    ),
    responses(
        (status = 200, description = "Session state", body = SessionView),
        (status = 404, description = "Session not found")
    ),
    tag = "Sessions"
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<Json<SessionView>> {
    let session = state.sessions.snapshot(&session_id).await?;
    Ok(Json(SessionView::from(&session)))
}

/// Close a session and discard its state
#[utoipa::path(
    delete,
    path = "/console/api/sessions/{session_id}",
    params(
        ("session_id" = String, Path, description = "Console session ID")
    ),
    responses(
        (status = 204, description = "Session closed"),
        (status = 404, description = "Session not found")
    ),
    tag = "Sessions"
)]
pub async fn close_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<StatusCode> {
    state.sessions.close_session(&session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Apply a mode, operation or baseline selection change
#[utoipa::path(
    post,
    path = "/console/api/sessions/{session_id}/events",
    params(
        ("session_id" = String, Path, description = "Console session ID")
    ),
    request_body = UserEvent,
    responses(
        (status = 200, description = "Workflow state after any catalog lookups resolved", body = WorkflowView),
        (status = 400, description = "Invalid event"),
        (status = 404, description = "Session not found")
    ),
    tag = "Sessions"
)]
pub async fn dispatch_event(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(event): Json<UserEvent>,
) -> AppResult<Json<WorkflowView>> {
    let workflow = state.sessions.dispatch_event(&session_id, event).await?;
    Ok(Json(WorkflowView::from(&workflow)))
}
