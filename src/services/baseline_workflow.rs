//! Baseline mode state machine.
//!
//! The workflow is driven by [`WorkflowEvent`]s and answers each one with the
//! catalog fetches it needs ([`WorkflowEffect`]). Fetch completions come back
//! as `*Loaded` events stamped with the request id of the effect that caused
//! them; a completion for anything other than the request a selector is
//! currently awaiting is dropped.

use serde::Deserialize;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::models::{
    AppError, AppResult, BaselineDirective, BaselineOperation, CaptureDirective, ComparisonMode,
    CompareDirective, RunInfo, UiState,
};

pub const SERVICE_PLACEHOLDER: &str = "-- Select Service --";
pub const DATE_PLACEHOLDER: &str = "-- Select Date --";
pub const RUN_PLACEHOLDER: &str = "-- Select Run --";
pub const NO_DESCRIPTION: &str = "No description";

pub const RUN_COMPARISON_LABEL: &str = "Run Comparison";
pub const CAPTURE_BASELINE_LABEL: &str = "Capture Baseline";
pub const COMPARE_BASELINE_LABEL: &str = "Compare with Baseline";

pub const DUAL_ENDPOINT_LABEL: &str = "Endpoint 1 URL";
pub const SINGLE_ENDPOINT_LABEL: &str = "API Endpoint URL";

pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    fn plain(value: &str) -> Self {
        Self {
            value: value.to_string(),
            label: value.to_string(),
        }
    }
}

/// A dropdown in the service/date/run cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    placeholder: &'static str,
    options: Vec<SelectOption>,
    selected: Option<String>,
    enabled: bool,
    awaiting: Option<RequestId>,
}

impl Selector {
    fn new(placeholder: &'static str) -> Self {
        Self {
            placeholder,
            options: Vec::new(),
            selected: None,
            enabled: false,
            awaiting: None,
        }
    }

    fn reset(&mut self) {
        self.options.clear();
        self.selected = None;
        self.enabled = false;
        self.awaiting = None;
    }

    fn await_response(&mut self, request_id: RequestId) {
        self.reset();
        self.awaiting = Some(request_id);
    }

    fn accepts(&self, request_id: RequestId) -> bool {
        self.awaiting == Some(request_id)
    }

    fn populate(&mut self, options: Vec<SelectOption>) {
        self.options = options;
        self.selected = None;
        self.enabled = true;
        self.awaiting = None;
    }

    fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|option| option.value == value)
    }

    pub fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_loading(&self) -> bool {
        self.awaiting.is_some()
    }
}

/// Interaction events the console front end can send.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UserEvent {
    ModeChanged {
        mode: ComparisonMode,
    },
    OperationChanged {
        operation: BaselineOperation,
    },
    ServiceSelected {
        #[serde(default)]
        service: Option<String>,
    },
    DateSelected {
        #[serde(default)]
        date: Option<String>,
    },
    RunSelected {
        #[serde(default, rename = "runId")]
        run_id: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    User(UserEvent),
    ServicesLoaded {
        request_id: RequestId,
        result: Result<Vec<String>, String>,
    },
    DatesLoaded {
        request_id: RequestId,
        result: Result<Vec<String>, String>,
    },
    RunsLoaded {
        request_id: RequestId,
        result: Result<Vec<RunInfo>, String>,
    },
}

impl From<UserEvent> for WorkflowEvent {
    fn from(event: UserEvent) -> Self {
        WorkflowEvent::User(event)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEffect {
    FetchServices {
        request_id: RequestId,
    },
    FetchDates {
        request_id: RequestId,
        service: String,
    },
    FetchRuns {
        request_id: RequestId,
        service: String,
        date: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineWorkflow {
    mode: ComparisonMode,
    operation: BaselineOperation,
    services: Selector,
    dates: Selector,
    runs: Selector,
    services_loaded: bool,
    next_request_id: RequestId,
}

impl Default for BaselineWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl BaselineWorkflow {
    pub fn new() -> Self {
        Self {
            mode: ComparisonMode::Live,
            operation: BaselineOperation::Capture,
            services: Selector::new(SERVICE_PLACEHOLDER),
            dates: Selector::new(DATE_PLACEHOLDER),
            runs: Selector::new(RUN_PLACEHOLDER),
            services_loaded: false,
            next_request_id: 1,
        }
    }

    pub fn mode(&self) -> ComparisonMode {
        self.mode
    }

    pub fn operation(&self) -> BaselineOperation {
        self.operation
    }

    pub fn services(&self) -> &Selector {
        &self.services
    }

    pub fn dates(&self) -> &Selector {
        &self.dates
    }

    pub fn runs(&self) -> &Selector {
        &self.runs
    }

    pub fn button_label(&self) -> &'static str {
        match (self.mode, self.operation) {
            (ComparisonMode::Live, _) => RUN_COMPARISON_LABEL,
            (ComparisonMode::Baseline, BaselineOperation::Capture) => CAPTURE_BASELINE_LABEL,
            (ComparisonMode::Baseline, BaselineOperation::Compare) => COMPARE_BASELINE_LABEL,
        }
    }

    pub fn primary_url_label(&self) -> &'static str {
        match self.mode {
            ComparisonMode::Live => DUAL_ENDPOINT_LABEL,
            ComparisonMode::Baseline => SINGLE_ENDPOINT_LABEL,
        }
    }

    pub fn shows_second_endpoint(&self) -> bool {
        self.mode == ComparisonMode::Live
    }

    fn in_compare(&self) -> bool {
        self.mode == ComparisonMode::Baseline && self.operation == BaselineOperation::Compare
    }

    fn issue_request_id(&mut self) -> RequestId {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    fn discard_baseline_state(&mut self) {
        self.operation = BaselineOperation::Capture;
        self.services.reset();
        self.dates.reset();
        self.runs.reset();
        self.services_loaded = false;
    }

    fn fetch_services(&mut self) -> WorkflowEffect {
        let request_id = self.issue_request_id();
        self.services.await_response(request_id);
        self.dates.reset();
        self.runs.reset();
        WorkflowEffect::FetchServices { request_id }
    }

    /// Applies one event, returning the next state and the fetches it requires.
    pub fn transition(mut self, event: WorkflowEvent) -> (Self, Vec<WorkflowEffect>) {
        let mut effects = Vec::new();

        match event {
            WorkflowEvent::User(UserEvent::ModeChanged { mode }) => match (self.mode, mode) {
                (ComparisonMode::Live, ComparisonMode::Baseline) => {
                    self.discard_baseline_state();
                    self.mode = ComparisonMode::Baseline;
                    effects.push(self.fetch_services());
                }
                (ComparisonMode::Baseline, ComparisonMode::Live) => {
                    self.discard_baseline_state();
                    self.mode = ComparisonMode::Live;
                }
                _ => debug!(?mode, "comparison mode unchanged"),
            },
            WorkflowEvent::User(UserEvent::OperationChanged { operation }) => {
                if self.mode != ComparisonMode::Baseline {
                    debug!(?operation, "ignoring baseline operation change in live mode");
                } else {
                    self.operation = operation;
                    if operation == BaselineOperation::Compare
                        && !self.services_loaded
                        && !self.services.is_loading()
                    {
                        effects.push(self.fetch_services());
                    }
                }
            }
            WorkflowEvent::User(UserEvent::ServiceSelected { service }) => {
                if !self.in_compare() {
                    debug!("ignoring service selection outside baseline compare");
                } else {
                    match non_blank(service) {
                        Some(service) if self.services.has_option(&service) => {
                            let request_id = self.issue_request_id();
                            self.services.selected = Some(service.clone());
                            self.dates.await_response(request_id);
                            self.runs.reset();
                            effects.push(WorkflowEffect::FetchDates { request_id, service });
                        }
                        Some(service) => debug!(%service, "ignoring unknown baseline service"),
                        None => {
                            self.services.selected = None;
                            self.dates.reset();
                            self.runs.reset();
                        }
                    }
                }
            }
            WorkflowEvent::User(UserEvent::DateSelected { date }) => {
                let service = self.services.selected.clone();
                match (self.in_compare(), service, non_blank(date)) {
                    (false, _, _) => debug!("ignoring date selection outside baseline compare"),
                    (true, Some(service), Some(date)) if self.dates.has_option(&date) => {
                        let request_id = self.issue_request_id();
                        self.dates.selected = Some(date.clone());
                        self.runs.await_response(request_id);
                        effects.push(WorkflowEffect::FetchRuns {
                            request_id,
                            service,
                            date,
                        });
                    }
                    (true, _, Some(date)) => debug!(%date, "ignoring date without a matching service"),
                    (true, _, None) => {
                        self.dates.selected = None;
                        self.runs.reset();
                    }
                }
            }
            WorkflowEvent::User(UserEvent::RunSelected { run_id }) => {
                if !self.in_compare() {
                    debug!("ignoring run selection outside baseline compare");
                } else {
                    match non_blank(run_id) {
                        Some(run_id) if self.runs.has_option(&run_id) => {
                            self.runs.selected = Some(run_id);
                        }
                        Some(run_id) => debug!(%run_id, "ignoring unknown baseline run"),
                        None => self.runs.selected = None,
                    }
                }
            }
            WorkflowEvent::ServicesLoaded { request_id, result } => {
                if !self.services.accepts(request_id) {
                    debug!(request_id, "discarding stale service catalog response");
                } else {
                    match result {
                        Ok(services) => {
                            let options = services.iter().map(|name| SelectOption::plain(name)).collect();
                            self.services.populate(options);
                            self.services_loaded = true;
                        }
                        Err(message) => {
                            warn!(%message, "failed to load baseline services");
                            self.services.reset();
                        }
                    }
                }
            }
            WorkflowEvent::DatesLoaded { request_id, result } => {
                if !self.dates.accepts(request_id) {
                    debug!(request_id, "discarding stale baseline dates response");
                } else {
                    match result {
                        Ok(dates) => {
                            let options = dates.iter().map(|date| SelectOption::plain(date)).collect();
                            self.dates.populate(options);
                        }
                        Err(message) => {
                            warn!(%message, "failed to load baseline dates");
                            self.dates.reset();
                        }
                    }
                }
            }
            WorkflowEvent::RunsLoaded { request_id, result } => {
                if !self.runs.accepts(request_id) {
                    debug!(request_id, "discarding stale baseline runs response");
                } else {
                    match result {
                        Ok(runs) => {
                            let options = runs
                                .iter()
                                .map(|run| SelectOption {
                                    value: run.run_id.clone(),
                                    label: run_option_label(run),
                                })
                                .collect();
                            self.runs.populate(options);
                        }
                        Err(message) => {
                            warn!(%message, "failed to load baseline runs");
                            self.runs.reset();
                        }
                    }
                }
            }
        }

        (self, effects)
    }

    /// Builds the baseline directive for a run, or `None` in live mode.
    pub fn assemble_directive(&self, ui: &UiState) -> AppResult<Option<BaselineDirective>> {
        match (self.mode, self.operation) {
            (ComparisonMode::Live, _) => Ok(None),
            (ComparisonMode::Baseline, BaselineOperation::Capture) => {
                let service_name = ui.baseline_service_name.trim();
                if service_name.is_empty() {
                    return Err(AppError::ValidationError(
                        "Please enter a service name for baseline capture".to_string(),
                    ));
                }

                Ok(Some(BaselineDirective::Capture(CaptureDirective {
                    service_name: service_name.to_string(),
                    description: ui.baseline_description.trim().to_string(),
                    tags: parse_tags(&ui.baseline_tags),
                })))
            }
            (ComparisonMode::Baseline, BaselineOperation::Compare) => {
                match (self.services.selected(), self.dates.selected(), self.runs.selected()) {
                    (Some(service), Some(date), Some(run_id)) => {
                        Ok(Some(BaselineDirective::Compare(CompareDirective {
                            service_name: service.to_string(),
                            compare_date: date.to_string(),
                            compare_run_id: run_id.to_string(),
                        })))
                    }
                    _ => Err(AppError::ValidationError(
                        "Please select service, date, and run for baseline comparison".to_string(),
                    )),
                }
            }
        }
    }
}

pub fn run_option_label(run: &RunInfo) -> String {
    let description = run
        .description
        .as_deref()
        .filter(|description| !description.is_empty())
        .unwrap_or(NO_DESCRIPTION);
    format!("{} - {} ({} iterations)", run.run_id, description, run.total_iterations)
}

/// Splits a comma separated tag field; a blank field yields no tags.
fn parse_tags(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|tag| tag.trim().to_string()).collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
