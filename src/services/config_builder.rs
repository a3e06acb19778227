use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{
    AppResult, Authentication, ComparisonMode, ComparisonRequest, EndpointConfig, EndpointPair,
    KeyValueRow, OperationConfig, RemoteDefaults, UiState,
};
use crate::utils::require_field;

pub const DEFAULT_MAX_ITERATIONS: u32 = 100;
pub const DEFAULT_OPERATION_NAME: &str = "web-operation";
pub const DEFAULT_METHOD: &str = "POST";
pub const SUPPORTED_METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];

/// Turns a form snapshot into a [`ComparisonRequest`].
pub struct ConfigBuilder;

impl ConfigBuilder {
    pub fn build(ui: &UiState) -> ComparisonRequest {
        let authentication = Authentication {
            token_url: None,
            client_id: non_empty(&ui.client_id),
            client_secret: non_empty(&ui.client_secret),
        };

        let operation = OperationConfig {
            name: or_default(&ui.operation_name, DEFAULT_OPERATION_NAME),
            methods: vec![or_default(&ui.method, DEFAULT_METHOD)],
            headers: collect_headers(&ui.headers),
            payload_template_path: non_empty(&ui.payload_template),
        };

        let endpoint = |base_url: &str| EndpointConfig {
            base_url: base_url.to_string(),
            authentication: Some(authentication.clone()),
            operations: vec![operation.clone()],
        };

        let endpoints = EndpointPair {
            api1: Some(endpoint(&ui.url1)),
            api2: Some(endpoint(&ui.url2)),
        };

        ComparisonRequest {
            test_type: ui.test_type,
            max_iterations: parse_max_iterations(&ui.max_iterations),
            iteration_controller: ui.iteration_controller.clone(),
            tokens: collect_tokens(&ui.tokens),
            comparison_mode: ComparisonMode::Live,
            rest: endpoints.clone(),
            soap: endpoints,
            baseline: None,
        }
    }

    /// The only precondition checked locally: the first endpoint URL must not be empty.
    pub fn validate(config: &ComparisonRequest) -> AppResult<()> {
        require_field(config.primary_url(), "URL 1 is required")
    }
}

impl UiState {
    /// Prefills a blank form from the comparison service's stored config.
    pub fn from_defaults(defaults: &RemoteDefaults) -> Self {
        let mut ui = UiState::default();

        if let Some(test_type) = defaults.test_type {
            ui.test_type = test_type;
        }
        if let Some(controller) = &defaults.iteration_controller {
            ui.iteration_controller = controller.clone();
        }
        if let Some(max) = defaults.max_iterations.filter(|max| *max > 0) {
            ui.max_iterations = max.to_string();
        }

        if let Some(EndpointPair {
            api1: Some(api1),
            api2: Some(api2),
        }) = defaults.active_endpoints()
        {
            ui.url1 = api1.base_url.clone();
            ui.url2 = api2.base_url.clone();

            if let Some(auth) = &api1.authentication {
                ui.client_id = auth.client_id.clone().unwrap_or_default();
                ui.client_secret = auth.client_secret.clone().unwrap_or_default();
            }

            if let Some(operation) = api1.operations.first() {
                ui.operation_name = operation.name.clone();
                ui.payload_template = operation.payload_template_path.clone().unwrap_or_default();
                match operation.methods.first() {
                    Some(method) if SUPPORTED_METHODS.contains(&method.as_str()) => {
                        ui.method = method.clone();
                    }
                    Some(method) => warn!(%method, "ignoring unsupported default method"),
                    None => {}
                }
                ui.headers = operation
                    .headers
                    .iter()
                    .map(|(key, value)| KeyValueRow::new(key.clone(), value.clone()))
                    .collect();
            }
        }

        if let Some(tokens) = &defaults.tokens {
            for (name, values) in tokens {
                match values {
                    Value::Array(values) => {
                        let joined = values.iter().map(token_text).collect::<Vec<_>>().join("; ");
                        ui.tokens.push(KeyValueRow::new(name.clone(), joined));
                    }
                    _ => debug!(token = %name, "skipping non-list default token"),
                }
            }
        }

        ui
    }
}

/// Header rows to a name/value map; blank names are dropped and later rows win.
pub fn collect_headers(rows: &[KeyValueRow]) -> IndexMap<String, String> {
    let mut headers = IndexMap::new();
    for row in rows {
        let key = row.key.trim();
        if !key.is_empty() {
            headers.insert(key.to_string(), row.value.trim().to_string());
        }
    }
    headers
}

/// Token rows to a name/values map. Values stay strings.
pub fn collect_tokens(rows: &[KeyValueRow]) -> IndexMap<String, Vec<String>> {
    let mut tokens = IndexMap::new();
    for row in rows {
        let key = row.key.trim();
        if key.is_empty() {
            continue;
        }

        let values = parse_token_values(&row.value);
        if !values.is_empty() {
            tokens.insert(key.to_string(), values);
        }
    }
    tokens
}

/// Splits a `;` separated value list. A trailing separator does not add an
/// empty entry; inner empty entries are kept.
pub fn parse_token_values(raw: &str) -> Vec<String> {
    let mut values: Vec<String> = raw.split(';').map(|value| value.trim().to_string()).collect();
    if values.last().is_some_and(|last| last.is_empty()) {
        values.pop();
    }
    values
}

/// Reads the leading digits of the field, after an optional `+`. Zero, blank
/// or non-numeric input falls back to the default; values past `u32::MAX`
/// saturate.
pub fn parse_max_iterations(raw: &str) -> u32 {
    let trimmed = raw.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let digits = &unsigned[..end];

    if digits.is_empty() {
        return DEFAULT_MAX_ITERATIONS;
    }
    match digits.parse::<u32>() {
        Ok(0) => DEFAULT_MAX_ITERATIONS,
        Ok(max) => max,
        Err(_) => u32::MAX,
    }
}

fn token_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn or_default(value: &str, default: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}
