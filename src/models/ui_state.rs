use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::TestType;

/// One row of the headers or tokens table, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct KeyValueRow {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl KeyValueRow {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Snapshot of the form fields the console reads when building a request.
///
/// Scalar fields hold raw field text; defaults are applied by the config
/// builder, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct UiState {
    pub test_type: TestType,
    pub operation_name: String,
    pub method: String,
    pub url1: String,
    pub url2: String,
    pub payload_template: String,
    pub iteration_controller: String,
    pub max_iterations: String,
    pub client_id: String,
    pub client_secret: String,
    pub headers: Vec<KeyValueRow>,
    pub tokens: Vec<KeyValueRow>,
    pub baseline_service_name: String,
    pub baseline_description: String,
    pub baseline_tags: String,
}
