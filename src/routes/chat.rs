//! Playground: prova una chiave dell'utente contro `/v1/chat/completions`

use axum::{
    extract::{rejection::JsonRejection, State},
    http::Method,
    routing::post,
    Extension, Json, Router,
};
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::{ChatRequest, ChatResponse, CurrentSession, ErrorResponse};
use crate::routes::json_body;
use crate::services::litellm::FetchOptions;
use crate::services::LiteLlmClient;

#[derive(Clone)]
pub struct ChatState {
    pub litellm: LiteLlmClient,
}

pub fn router(litellm: LiteLlmClient) -> Router {
    let state = ChatState { litellm };
    Router::new()
        .route("/api/chat", post(chat_completion))
        .with_state(state)
}

/// Chat completion firmata con la chiave indicata, non con la master key.
/// Gli errori di LiteLLM mantengono il loro status HTTP.
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Risposta del modello", body = ChatResponse),
        (status = 400, description = "Campo mancante", body = ErrorResponse),
        (status = 401, description = "Non autenticato o chiave rifiutata", body = ErrorResponse),
    ),
    security(("portal_session" = [])),
    tag = "Playground"
)]
pub async fn chat_completion(
    State(state): State<ChatState>,
    Extension(current): Extension<CurrentSession>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    current.require_user()?;
    let request = json_body(payload)?;

    let api_key = request
        .api_key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| AppError::BadRequest("API Key is required to test".to_string()))?;
    let model = request
        .model
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::BadRequest("Model is required".to_string()))?;
    let messages = request
        .messages
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::BadRequest("Messages are required".to_string()))?;

    let options = FetchOptions::json(
        Method::POST,
        json!({ "model": model, "messages": messages }),
    )
    .bearer(&api_key)?;

    let result = state
        .litellm
        .fetch("/v1/chat/completions", options)
        .await
        .map_err(AppError::mirror_upstream)?;

    Ok(Json(ChatResponse { result }))
}
