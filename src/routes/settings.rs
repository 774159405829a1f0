//! Impostazioni di branding: lettura pubblica (serve alla pagina di login), scrittura admin

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Extension, Json, Router,
};
use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::models::{CurrentSession, ErrorResponse};
use crate::routes::json_body;
use crate::services::SettingsStore;

/// Stato condiviso per le routes delle impostazioni
#[derive(Clone)]
pub struct SettingsState {
    pub store: SettingsStore,
}

pub fn router(store: SettingsStore) -> Router {
    let state = SettingsState { store };

    Router::new()
        .route("/api/settings", get(get_settings).put(update_settings))
        .with_state(state)
}

/// Impostazioni correnti (default se il file manca)
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    responses(
        (status = 200, description = "Impostazioni correnti"),
    )
)]
pub async fn get_settings(State(state): State<SettingsState>) -> Json<Map<String, Value>> {
    Json(state.store.read().await)
}

/// Merge superficiale dei campi inviati con quelli salvati
#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Settings",
    responses(
        (status = 200, description = "Impostazioni aggiornate"),
        (status = 400, description = "Body non valido", body = ErrorResponse),
        (status = 401, description = "Non autenticato", body = ErrorResponse),
        (status = 403, description = "Solo admin", body = ErrorResponse),
    ),
    security(("portal_session" = []))
)]
pub async fn update_settings(
    State(state): State<SettingsState>,
    Extension(current): Extension<CurrentSession>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Map<String, Value>>> {
    current.require_admin()?;

    let Value::Object(updates) = json_body(payload)? else {
        return Err(AppError::BadRequest(
            "Settings must be a JSON object".to_string(),
        ));
    };

    let merged = state.store.update(updates).await?;

    Ok(Json(merged))
}
