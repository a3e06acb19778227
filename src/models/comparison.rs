use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestType {
    #[default]
    Rest,
    Soap,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComparisonMode {
    #[default]
    Live,
    Baseline,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum BaselineOperation {
    #[default]
    Capture,
    Compare,
}

/// Structured request submitted to the remote `/api/compare` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRequest {
    pub test_type: TestType,
    pub max_iterations: u32,
    pub iteration_controller: String,
    /// Token name to substitution values, in row order.
    pub tokens: IndexMap<String, Vec<String>>,
    #[serde(default)]
    pub comparison_mode: ComparisonMode,
    pub rest: EndpointPair,
    pub soap: EndpointPair,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<BaselineDirective>,
}

impl ComparisonRequest {
    /// Attaches a baseline directive, forcing baseline mode.
    pub fn with_baseline(mut self, directive: BaselineDirective) -> Self {
        self.comparison_mode = ComparisonMode::Baseline;
        self.baseline = Some(directive);
        self
    }

    pub fn primary_url(&self) -> &str {
        self.rest
            .api1
            .as_ref()
            .map(|api| api.base_url.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointPair {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api1: Option<EndpointConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api2: Option<EndpointConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub authentication: Option<Authentication>,
    #[serde(default)]
    pub operations: Vec<OperationConfig>,
}

/// Credentials are passed through untouched; `token_url` is never set by the console.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authentication {
    pub token_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    #[serde(default)]
    pub payload_template_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "UPPERCASE")]
pub enum BaselineDirective {
    Capture(CaptureDirective),
    Compare(CompareDirective),
}

impl BaselineDirective {
    pub fn operation(&self) -> BaselineOperation {
        match self {
            BaselineDirective::Capture(_) => BaselineOperation::Capture,
            BaselineDirective::Compare(_) => BaselineOperation::Compare,
        }
    }

    pub fn service_name(&self) -> &str {
        match self {
            BaselineDirective::Capture(capture) => &capture.service_name,
            BaselineDirective::Compare(compare) => &compare.service_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureDirective {
    pub service_name: String,
    pub description: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareDirective {
    pub service_name: String,
    pub compare_date: String,
    pub compare_run_id: String,
}

/// Prefill data served by the remote `/api/config` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDefaults {
    #[serde(default)]
    pub test_type: Option<TestType>,
    #[serde(default)]
    pub iteration_controller: Option<String>,
    #[serde(default)]
    pub max_iterations: Option<i64>,
    #[serde(default)]
    pub tokens: Option<IndexMap<String, serde_json::Value>>,
    #[serde(default, alias = "restApis")]
    pub rest: Option<EndpointPair>,
    #[serde(default, alias = "soapApis")]
    pub soap: Option<EndpointPair>,
}

impl RemoteDefaults {
    pub fn active_endpoints(&self) -> Option<&EndpointPair> {
        match self.test_type {
            Some(TestType::Soap) => self.soap.as_ref(),
            _ => self.rest.as_ref(),
        }
    }
}
