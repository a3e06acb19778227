use crate::models::{AppError, AppResult, ConsoleSession, SessionStore, SharedSession, UiState};
use crate::services::{
    BaselineWorkflow, CompareServiceClient, ComparisonRunner, RunOutcome, UserEvent, WorkflowEffect,
    WorkflowEvent,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info};

/// Owns the console sessions and drives their workflows against the
/// comparison service.
pub struct SessionService {
    session_store: SessionStore,
    client: Arc<CompareServiceClient>,
    runner: ComparisonRunner,
    ttl: chrono::Duration,
}

impl SessionService {
    pub fn new(client: Arc<CompareServiceClient>, ttl: chrono::Duration) -> Self {
        Self {
            session_store: Arc::new(RwLock::new(HashMap::new())),
            runner: ComparisonRunner::new(client.clone()),
            client,
            ttl,
        }
    }

    pub async fn create_session(&self) -> ConsoleSession {
        self.cleanup_expired_sessions().await;

        let session = ConsoleSession::new(self.ttl);
        let snapshot = session.clone();
        {
            let mut sessions = self.session_store.write().await;
            sessions.insert(session.id.clone(), Arc::new(Mutex::new(session)));
        }

        info!(session_id = %snapshot.id, "console session created");
        snapshot
    }

    pub async fn get_session(&self, session_id: &str) -> AppResult<SharedSession> {
        let sessions = self.session_store.read().await;
        sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| AppError::SessionNotFound(session_id.to_string()))
    }

    pub async fn snapshot(&self, session_id: &str) -> AppResult<ConsoleSession> {
        let session = self.get_session(session_id).await?;
        let session = session.lock().await;
        Ok(session.clone())
    }

    pub async fn close_session(&self, session_id: &str) -> AppResult<()> {
        let mut sessions = self.session_store.write().await;
        sessions
            .remove(session_id)
            .map(|_| ())
            .ok_or_else(|| AppError::SessionNotFound(session_id.to_string()))
    }

    pub async fn cleanup_expired_sessions(&self) {
        let mut sessions = self.session_store.write().await;
        let mut expired = Vec::new();
        for (id, session) in sessions.iter() {
            if let Ok(session) = session.try_lock() {
                if session.is_expired() {
                    expired.push(id.clone());
                }
            }
        }
        for id in expired {
            sessions.remove(&id);
            debug!(session_id = %id, "expired console session removed");
        }
    }

    /// Applies a user event, then performs the catalog fetches it asked for.
    ///
    /// The session is not held while fetching; completions are fed back as
    /// stamped events so a superseded response cannot overwrite a newer one.
    pub async fn dispatch_event(&self, session_id: &str, event: UserEvent) -> AppResult<BaselineWorkflow> {
        let session = self.get_session(session_id).await?;
        let mut pending = self.apply(&session, event.into()).await;

        while let Some(effect) = pending.pop() {
            let completion = self.perform(effect).await;
            pending.extend(self.apply(&session, completion).await);
        }

        let session = session.lock().await;
        Ok(session.workflow.clone())
    }

    /// Runs a comparison for the session.
    ///
    /// The session is locked only to enter the loading state and to store the
    /// outcome; while the request is in flight it stays readable and keeps
    /// accepting workflow events. The remote half runs in its own task so a
    /// dropped caller cannot leave the session stuck in the loading state.
    pub async fn run(&self, session_id: &str, ui: &UiState) -> AppResult<(RunOutcome, ConsoleSession)> {
        let shared = self.get_session(session_id).await?;

        let request = {
            let mut session = shared.lock().await;
            if session.surface.is_running() {
                return Err(AppError::RunInProgress);
            }

            let ConsoleSession { workflow, surface, .. } = &mut *session;
            match ComparisonRunner::begin(ui, workflow, surface) {
                Ok(request) => request,
                Err(outcome) => return Ok((outcome, session.clone())),
            }
        };

        let runner = self.runner.clone();
        let task_session = shared.clone();
        let task = tokio::spawn(async move {
            let result = runner.submit(&request).await;
            let mut session = task_session.lock().await;
            let idle_label = session.workflow.button_label();
            let outcome = ComparisonRunner::finish(&mut session.surface, idle_label, result);
            (outcome, session.clone())
        });

        match task.await {
            Ok(finished) => Ok(finished),
            Err(e) => {
                error!(error = %e, %session_id, "comparison task aborted");
                let mut session = shared.lock().await;
                let idle_label = session.workflow.button_label();
                let outcome = ComparisonRunner::finish(
                    &mut session.surface,
                    idle_label,
                    Err(AppError::InternalError(e.to_string())),
                );
                Ok((outcome, session.clone()))
            }
        }
    }

    async fn apply(&self, session: &SharedSession, event: WorkflowEvent) -> Vec<WorkflowEffect> {
        let mut session = session.lock().await;
        let (workflow, effects) = session.workflow.clone().transition(event);
        session.workflow = workflow;
        session.sync_idle_label();
        effects
    }

    async fn perform(&self, effect: WorkflowEffect) -> WorkflowEvent {
        match effect {
            WorkflowEffect::FetchServices { request_id } => WorkflowEvent::ServicesLoaded {
                request_id,
                result: self.client.list_services().await.map_err(|e| e.to_string()),
            },
            WorkflowEffect::FetchDates { request_id, service } => WorkflowEvent::DatesLoaded {
                request_id,
                result: self.client.list_dates(&service).await.map_err(|e| e.to_string()),
            },
            WorkflowEffect::FetchRuns {
                request_id,
                service,
                date,
            } => WorkflowEvent::RunsLoaded {
                request_id,
                result: self.client.list_runs(&service, &date).await.map_err(|e| e.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BaselineOperation, ComparisonMode, ResultsArea, RunControl};
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::timeout;
    use tokio_test::{assert_err, assert_ok};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(server: &MockServer) -> SessionService {
        let client = Arc::new(CompareServiceClient::new(&server.uri()).unwrap());
        SessionService::new(client, chrono::Duration::minutes(30))
    }

    async fn mount_catalog(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/baselines/services"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(["Orders", "Billing"])))
            .expect(1)
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/baselines/dates/Orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(["2024-01-01", "2024-01-02"])))
            .expect(1)
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/baselines/runs/Orders/2024-01-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "runId": "run-1", "description": "nightly", "totalIterations": 3 }
            ])))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let mock_server = MockServer::start().await;
        let sessions = service(&mock_server);

        let session = sessions.create_session().await;
        assert_ok!(sessions.snapshot(&session.id).await);
        assert_ok!(sessions.close_session(&session.id).await);
        assert_err!(sessions.snapshot(&session.id).await);
    }

    #[tokio::test]
    async fn test_service_then_date_fetches_runs_once() {
        let mock_server = MockServer::start().await;
        mount_catalog(&mock_server).await;
        let sessions = service(&mock_server);
        let id = sessions.create_session().await.id;

        sessions
            .dispatch_event(&id, UserEvent::ModeChanged { mode: ComparisonMode::Baseline })
            .await
            .unwrap();
        sessions
            .dispatch_event(&id, UserEvent::OperationChanged { operation: BaselineOperation::Compare })
            .await
            .unwrap();
        let workflow = sessions
            .dispatch_event(&id, UserEvent::ServiceSelected { service: Some("Orders".to_string()) })
            .await
            .unwrap();
        assert!(workflow.dates().is_enabled());
        assert!(!workflow.runs().is_enabled());

        let workflow = sessions
            .dispatch_event(&id, UserEvent::DateSelected { date: Some("2024-01-01".to_string()) })
            .await
            .unwrap();

        assert!(workflow.runs().is_enabled());
        assert_eq!(workflow.runs().options().len(), 1);
        assert_eq!(workflow.runs().options()[0].label, "run-1 - nightly (3 iterations)");

        let snapshot = sessions.snapshot(&id).await.unwrap();
        assert_eq!(snapshot.surface.control.label, "Compare with Baseline");
    }

    #[tokio::test]
    async fn test_catalog_failure_leaves_placeholder() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/baselines/services"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        let sessions = service(&mock_server);
        let id = sessions.create_session().await.id;

        let workflow = sessions
            .dispatch_event(&id, UserEvent::ModeChanged { mode: ComparisonMode::Baseline })
            .await
            .unwrap();

        assert!(workflow.services().options().is_empty());
        assert!(!workflow.services().is_enabled());
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let mock_server = MockServer::start().await;
        let sessions = service(&mock_server);

        let result = sessions
            .dispatch_event("missing", UserEvent::DateSelected { date: None })
            .await;
        assert!(matches!(result, Err(AppError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn test_run_updates_session_surface() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/compare"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        let sessions = service(&mock_server);
        let id = sessions.create_session().await.id;

        let ui = UiState {
            url1: "http://a".to_string(),
            ..Default::default()
        };
        let (outcome, session) = sessions.run(&id, &ui).await.unwrap();

        assert!(matches!(outcome, RunOutcome::Failed(_)));
        assert!(session.surface.control.enabled);
        assert!(session.surface.results.to_html().contains("error-msg"));
    }

    #[tokio::test]
    async fn test_session_stays_responsive_while_run_in_flight() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/compare"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{ "status": "MATCH", "operationName": "op" }]))
                    .set_delay(Duration::from_millis(800)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
        let sessions = Arc::new(service(&mock_server));
        let id = sessions.create_session().await.id;

        let ui = UiState {
            url1: "http://a".to_string(),
            ..Default::default()
        };
        let in_flight = {
            let sessions = sessions.clone();
            let id = id.clone();
            let ui = ui.clone();
            tokio::spawn(async move { sessions.run(&id, &ui).await })
        };

        let running = timeout(Duration::from_millis(500), async {
            loop {
                let snapshot = sessions.snapshot(&id).await.unwrap();
                if snapshot.surface.is_running() {
                    break snapshot;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
        assert_eq!(running.surface.control.label, "Running...");
        assert_eq!(running.surface.results, ResultsArea::Processing);

        let second = sessions.run(&id, &ui).await;
        assert!(matches!(second, Err(AppError::RunInProgress)));

        let workflow = timeout(
            Duration::from_millis(300),
            sessions.dispatch_event(&id, UserEvent::ModeChanged { mode: ComparisonMode::Baseline }),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(workflow.mode(), ComparisonMode::Baseline);

        let (outcome, session) = in_flight.await.unwrap().unwrap();
        assert_eq!(outcome, RunOutcome::Rendered { iterations: 1 });
        assert_eq!(session.surface.control, RunControl::idle("Capture Baseline"));
    }
}
