use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::services::BaselineWorkflow;
use crate::utils::escape_html;

pub const RUNNING_LABEL: &str = "Running...";

/// The action button's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunControl {
    pub enabled: bool,
    pub label: String,
}

impl RunControl {
    pub fn idle(label: &str) -> Self {
        Self {
            enabled: true,
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsArea {
    Empty,
    Processing,
    Failed(String),
    Rendered(String),
}

impl ResultsArea {
    pub fn to_html(&self) -> String {
        match self {
            ResultsArea::Empty => String::new(),
            ResultsArea::Processing => {
                "<div class=\"empty-state\"><p>Processing...</p></div>".to_string()
            }
            ResultsArea::Failed(message) => format!(
                "<div class=\"error-msg\">Error executing comparison: {}</div>",
                escape_html(message)
            ),
            ResultsArea::Rendered(html) => html.clone(),
        }
    }
}

/// Everything a run touches: the run control, the results area and the last
/// validation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSurface {
    pub control: RunControl,
    pub results: ResultsArea,
    pub prompt: Option<String>,
}

impl RunSurface {
    pub fn new(idle_label: &str) -> Self {
        Self {
            control: RunControl::idle(idle_label),
            results: ResultsArea::Empty,
            prompt: None,
        }
    }

    pub fn is_running(&self) -> bool {
        !self.control.enabled
    }
}

#[derive(Debug, Clone)]
pub struct ConsoleSession {
    pub id: String,
    pub workflow: BaselineWorkflow,
    pub surface: RunSurface,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

pub type SharedSession = Arc<Mutex<ConsoleSession>>;
pub type SessionStore = Arc<RwLock<HashMap<String, SharedSession>>>;

impl ConsoleSession {
    pub fn new(ttl: chrono::Duration) -> Self {
        let now = Utc::now();
        let workflow = BaselineWorkflow::new();
        let surface = RunSurface::new(workflow.button_label());
        Self {
            id: Uuid::new_v4().to_string(),
            workflow,
            surface,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Keeps the idle button label in step with the workflow.
    pub fn sync_idle_label(&mut self) {
        if !self.surface.is_running() {
            self.surface.control.label = self.workflow.button_label().to_string();
        }
    }
}
