use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::Role;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Stato dell'API
    pub status: String,
    /// Versione dell'API
    pub version: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub role: Role,
    pub user_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UsersResponse {
    #[schema(value_type = Vec<Object>)]
    pub users: Vec<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(value_type = Object)]
    pub user: Value,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ModelsResponse {
    #[schema(value_type = Vec<Object>)]
    pub models: Vec<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ModelResponse {
    #[schema(value_type = Object)]
    pub model: Value,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct McpOverviewResponse {
    #[schema(value_type = Vec<Object>)]
    pub servers: Vec<Value>,
    #[schema(value_type = Vec<Object>)]
    pub tools: Vec<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct McpServerResponse {
    #[schema(value_type = Object)]
    pub server: Value,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GuardrailsResponse {
    #[schema(value_type = Vec<Object>)]
    pub guardrails: Vec<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct KeysResponse {
    #[schema(value_type = Object)]
    pub keys: Value,
}

/// Chiave appena generata: mostrata in chiaro una sola volta
#[derive(Debug, Serialize, ToSchema)]
pub struct KeyCreatedResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub key: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub alias: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub token: Option<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UsageResponse {
    pub spend: f64,
    pub max_budget: Option<f64>,
    #[schema(value_type = Option<String>)]
    pub team_id: Value,
    #[schema(value_type = Vec<String>)]
    pub models: Value,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LogsResponse {
    #[schema(value_type = Vec<Object>)]
    pub logs: Vec<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    #[schema(value_type = Object)]
    pub result: Value,
}

/// Modello del listino pubblico (costi per milione di token)
#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
pub struct PublicModel {
    pub name: String,
    pub provider: String,
    pub input_cost_1m: f64,
    pub output_cost_1m: f64,
    pub desc: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PublicModelsResponse {
    pub models: Vec<PublicModel>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
}
