//! Log delle richieste: l'admin vede tutto, l'utente solo le proprie

use std::collections::HashMap;

use axum::{extract::State, routing::get, Extension, Json, Router};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::models::litellm::{email_map, log_entries, log_start_time, user_list};
use crate::models::{CurrentSession, ErrorResponse, LogsResponse, Session};
use crate::services::LiteLlmClient;

#[derive(Clone)]
pub struct LogsState {
    pub litellm: LiteLlmClient,
}

pub fn router(litellm: LiteLlmClient) -> Router {
    let state = LogsState { litellm };
    Router::new()
        .route("/api/logs", get(list_logs))
        .with_state(state)
}

/// Log di spesa, dal più recente
#[utoipa::path(
    get,
    path = "/api/logs",
    responses(
        (status = 200, description = "Log ordinati per data decrescente", body = LogsResponse),
        (status = 401, description = "Non autenticato", body = ErrorResponse),
    ),
    security(("portal_session" = [])),
    tag = "Consumi"
)]
pub async fn list_logs(
    State(state): State<LogsState>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<LogsResponse>> {
    let session = current.require_user()?;

    // la lista utenti serve solo all'admin per le email
    let users = async {
        if session.is_admin() {
            Some(state.litellm.get("/user/list").await)
        } else {
            None
        }
    };
    let (logs, users) = tokio::join!(state.litellm.get("/spend/logs"), users);
    let logs = logs?;

    let emails = match users {
        Some(Ok(payload)) => email_map(&user_list(&payload)),
        Some(Err(e)) => {
            tracing::warn!("Email utenti non disponibili per i log: {}", e);
            HashMap::new()
        }
        None => HashMap::new(),
    };

    Ok(Json(LogsResponse {
        logs: scope_logs(log_entries(logs), session, &emails),
    }))
}

/// Filtra per utente, aggiunge `user_email` e ordina dal più recente.
/// Le voci senza data valida finiscono in coda.
pub fn scope_logs(
    entries: Vec<Map<String, Value>>,
    session: &Session,
    emails: &HashMap<String, String>,
) -> Vec<Value> {
    let mut entries: Vec<Map<String, Value>> = entries
        .into_iter()
        .filter(|entry| session.is_admin() || owned_by(entry, &session.user_id))
        .map(|mut entry| {
            let email = ["user", "api_key_user_id"]
                .iter()
                .filter_map(|field| entry.get(*field).and_then(Value::as_str))
                .find_map(|id| emails.get(id))
                .map(|email| Value::String(email.clone()))
                .unwrap_or(Value::Null);
            entry.insert("user_email".to_string(), email);
            entry
        })
        .collect();

    entries.sort_by_cached_key(|entry| std::cmp::Reverse(log_start_time(entry)));

    entries.into_iter().map(Value::Object).collect()
}

fn owned_by(entry: &Map<String, Value>, user_id: &str) -> bool {
    ["api_key_user_id", "user"]
        .iter()
        .any(|field| entry.get(*field).and_then(Value::as_str) == Some(user_id))
}
