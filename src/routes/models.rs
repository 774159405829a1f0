//! Catalogo modelli: quello del proxy per gli utenti, il listino per i visitatori

use axum::{extract::State, routing::get, Extension, Json, Router};

use crate::error::{AppError, Result};
use crate::models::litellm::{data_list, merge_pricing};
use crate::models::{CurrentSession, ErrorResponse, ModelsResponse, PublicModelsResponse};
use crate::services::{LiteLlmClient, ModelCatalog};

#[derive(Clone)]
pub struct ModelsState {
    pub litellm: LiteLlmClient,
    pub catalog: ModelCatalog,
}

pub fn router(litellm: LiteLlmClient, catalog: ModelCatalog) -> Router {
    let state = ModelsState { litellm, catalog };
    Router::new()
        .route("/api/models", get(list_models))
        .route("/api/models/public", get(public_models))
        .with_state(state)
}

/// Modelli disponibili con prezzo per token
#[utoipa::path(
    get,
    path = "/api/models",
    responses(
        (status = 200, description = "Modelli con prezzi", body = ModelsResponse),
        (status = 401, description = "Non autenticato", body = ErrorResponse),
    ),
    security(("portal_session" = [])),
    tag = "Modelli"
)]
pub async fn list_models(
    State(state): State<ModelsState>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<ModelsResponse>> {
    current.require_user()?;

    let (models, infos) = tokio::join!(
        state.litellm.get("/v1/models"),
        state.litellm.get("/v1/model/info"),
    );
    let models = data_list(&models?);
    let infos = data_list(&infos?);

    Ok(Json(ModelsResponse {
        models: merge_pricing(models, &infos),
    }))
}

/// Listino pubblico letto dalla configurazione di LiteLLM
#[utoipa::path(
    get,
    path = "/api/models/public",
    responses(
        (status = 200, description = "Listino prezzi per milione di token", body = PublicModelsResponse),
        (status = 500, description = "Configurazione non leggibile", body = ErrorResponse),
    ),
    tag = "Modelli"
)]
pub async fn public_models(State(state): State<ModelsState>) -> Result<Json<PublicModelsResponse>> {
    let models = state.catalog.load().await.map_err(|e| {
        tracing::error!("Listino modelli non disponibile: {}", e);
        AppError::Internal("Failed to load model pricing".to_string())
    })?;

    Ok(Json(PublicModelsResponse { models }))
}
