use std::sync::Arc;
use tracing::{error, info};

use crate::models::{
    AppResult, ComparisonRequest, IterationResult, ResultsArea, RunControl, RunSurface, UiState, RUNNING_LABEL,
};
use crate::services::{BaselineWorkflow, CompareServiceClient, ConfigBuilder, ResultRenderer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A local precondition failed; nothing was sent.
    Prompted(String),
    Failed(String),
    Rendered { iterations: usize },
}

/// Drives one run in three steps so the caller can release the surface while
/// the request is in flight: [`begin`](Self::begin) enters the loading state,
/// [`submit`](Self::submit) talks to the service, [`finish`](Self::finish)
/// stores the results and restores the idle control.
#[derive(Clone)]
pub struct ComparisonRunner {
    client: Arc<CompareServiceClient>,
}

impl ComparisonRunner {
    pub fn new(client: Arc<CompareServiceClient>) -> Self {
        Self { client }
    }

    /// Builds the request for the current form and workflow state without
    /// sending it. Validation failures are returned as `ValidationError`.
    pub fn prepare(ui: &UiState, workflow: &BaselineWorkflow) -> AppResult<ComparisonRequest> {
        let request = ConfigBuilder::build(ui);
        ConfigBuilder::validate(&request)?;

        match workflow.assemble_directive(ui)? {
            Some(directive) => Ok(request.with_baseline(directive)),
            None => Ok(request),
        }
    }

    /// Validates, then puts `surface` into the loading state.
    ///
    /// A failed precondition leaves the surface idle with the prompt set and
    /// comes back as `Err(RunOutcome::Prompted)`.
    pub fn begin(
        ui: &UiState,
        workflow: &BaselineWorkflow,
        surface: &mut RunSurface,
    ) -> Result<ComparisonRequest, RunOutcome> {
        surface.prompt = None;

        let request = Self::prepare(ui, workflow).map_err(|e| {
            let message = e.to_string();
            info!(%message, "run aborted by validation");
            surface.prompt = Some(message.clone());
            RunOutcome::Prompted(message)
        })?;

        surface.control = RunControl {
            enabled: false,
            label: RUNNING_LABEL.to_string(),
        };
        surface.results = ResultsArea::Processing;
        info!(
            mode = ?request.comparison_mode,
            operation = ?request.baseline.as_ref().map(|b| b.operation()),
            "submitting comparison"
        );
        Ok(request)
    }

    pub async fn submit(&self, request: &ComparisonRequest) -> AppResult<Vec<IterationResult>> {
        self.client.submit_comparison(request).await
    }

    /// Replaces the loading placeholder and re-enables the control.
    pub fn finish(
        surface: &mut RunSurface,
        idle_label: &str,
        result: AppResult<Vec<IterationResult>>,
    ) -> RunOutcome {
        surface.control = RunControl::idle(idle_label);

        match result {
            Ok(results) => {
                let iterations = results.len();
                surface.results = ResultsArea::Rendered(ResultRenderer::render(&results));
                info!(iterations, "comparison completed");
                RunOutcome::Rendered { iterations }
            }
            Err(e) => {
                let message = e.to_string();
                error!(%message, "comparison failed");
                surface.results = ResultsArea::Failed(message.clone());
                RunOutcome::Failed(message)
            }
        }
    }

    /// One user-triggered run against a surface the caller owns throughout.
    pub async fn run(&self, ui: &UiState, workflow: &BaselineWorkflow, surface: &mut RunSurface) -> RunOutcome {
        let request = match Self::begin(ui, workflow, surface) {
            Ok(request) => request,
            Err(outcome) => return outcome,
        };

        let result = self.submit(&request).await;
        Self::finish(surface, workflow.button_label(), result)
    }
}
