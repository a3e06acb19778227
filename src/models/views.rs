use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{BaselineOperation, ComparisonMode, ConsoleSession, RunSurface};
use crate::services::{BaselineWorkflow, Selector};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectOptionView {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectorView {
    pub placeholder: String,
    pub options: Vec<SelectOptionView>,
    pub selected: Option<String>,
    pub enabled: bool,
    pub loading: bool,
}

impl From<&Selector> for SelectorView {
    fn from(selector: &Selector) -> Self {
        Self {
            placeholder: selector.placeholder().to_string(),
            options: selector
                .options()
                .iter()
                .map(|option| SelectOptionView {
                    value: option.value.clone(),
                    label: option.label.clone(),
                })
                .collect(),
            selected: selector.selected().map(str::to_string),
            enabled: selector.is_enabled(),
            loading: selector.is_loading(),
        }
    }
}

/// What the front end needs to lay out the mode and baseline controls.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowView {
    pub mode: ComparisonMode,
    pub operation: BaselineOperation,
    pub button_label: String,
    pub url1_label: String,
    pub show_url2: bool,
    pub services: SelectorView,
    pub dates: SelectorView,
    pub runs: SelectorView,
}

impl From<&BaselineWorkflow> for WorkflowView {
    fn from(workflow: &BaselineWorkflow) -> Self {
        Self {
            mode: workflow.mode(),
            operation: workflow.operation(),
            button_label: workflow.button_label().to_string(),
            url1_label: workflow.primary_url_label().to_string(),
            show_url2: workflow.shows_second_endpoint(),
            services: workflow.services().into(),
            dates: workflow.dates().into(),
            runs: workflow.runs().into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunView {
    pub enabled: bool,
    pub label: String,
    pub prompt: Option<String>,
    pub results_html: String,
}

impl From<&RunSurface> for RunView {
    fn from(surface: &RunSurface) -> Self {
        Self {
            enabled: surface.control.enabled,
            label: surface.control.label.clone(),
            prompt: surface.prompt.clone(),
            results_html: surface.results.to_html(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub expires_at: String,
    pub workflow: WorkflowView,
    pub run: RunView,
}

impl From<&ConsoleSession> for SessionView {
    fn from(session: &ConsoleSession) -> Self {
        Self {
            session_id: session.id.clone(),
            expires_at: session.expires_at.to_rfc3339(),
            workflow: (&session.workflow).into(),
            run: (&session.surface).into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RenderedHtml {
    pub html: String,
}
