use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum IterationStatus {
    Match,
    Mismatch,
    Error,
}

impl IterationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IterationStatus::Match => "MATCH",
            IterationStatus::Mismatch => "MISMATCH",
            IterationStatus::Error => "ERROR",
        }
    }
}

/// One executed iteration as reported by the comparison service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IterationResult {
    pub status: IterationStatus,
    #[serde(default)]
    pub operation_name: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub iteration_tokens: Option<Map<String, Value>>,
    #[serde(default)]
    pub api1: Option<ApiCallResult>,
    #[serde(default)]
    pub api2: Option<ApiCallResult>,
    #[serde(default)]
    pub differences: Option<Vec<String>>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub baseline_service_name: Option<String>,
    #[serde(default)]
    pub baseline_date: Option<String>,
    #[serde(default)]
    pub baseline_run_id: Option<String>,
    #[serde(default)]
    pub baseline_description: Option<String>,
    #[serde(default)]
    pub baseline_tags: Option<Vec<String>>,
    #[serde(default)]
    pub baseline_capture_timestamp: Option<String>,
    #[serde(default)]
    pub baseline_path: Option<String>,
}

impl IterationResult {
    pub fn new(status: IterationStatus, operation_name: impl Into<String>) -> Self {
        Self {
            status,
            operation_name: operation_name.into(),
            timestamp: None,
            iteration_tokens: None,
            api1: None,
            api2: None,
            differences: None,
            error_message: None,
            baseline_service_name: None,
            baseline_date: None,
            baseline_run_id: None,
            baseline_description: None,
            baseline_tags: None,
            baseline_capture_timestamp: None,
            baseline_path: None,
        }
    }

    /// Combined duration of both endpoint calls; missing calls count as zero.
    pub fn total_duration(&self) -> u64 {
        let api1 = self.api1.as_ref().map(|call| call.duration).unwrap_or(0);
        let api2 = self.api2.as_ref().map(|call| call.duration).unwrap_or(0);
        api1 + api2
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiCallResult {
    #[serde(default)]
    #[schema(value_type = Object)]
    pub request_payload: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub response_payload: Option<Value>,
    #[serde(default)]
    pub duration: u64,
}

/// A captured baseline run as listed by `/api/baselines/runs/{service}/{date}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunInfo {
    pub run_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub total_iterations: u64,
}
