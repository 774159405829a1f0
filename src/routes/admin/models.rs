use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde_json::json;

use super::AdminState;
use crate::error::Result;
use crate::models::litellm::data_list;
use crate::models::{
    CreateModelRequest, CurrentSession, DeleteModelRequest, ErrorResponse, ModelResponse,
    ModelsResponse, SuccessResponse,
};
use crate::routes::json_body;

/// Deployment configurati nel proxy (`/model/info`)
#[utoipa::path(
    get,
    path = "/api/admin/models",
    operation_id = "list_admin_models",
    responses(
        (status = 200, description = "Lista modelli", body = ModelsResponse),
        (status = 401, description = "Non autenticato", body = ErrorResponse),
        (status = 403, description = "Solo admin", body = ErrorResponse),
    ),
    security(("portal_session" = [])),
    tag = "Admin"
)]
pub async fn list_models(
    State(state): State<AdminState>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<ModelsResponse>> {
    current.require_admin()?;

    let payload = state.litellm.get("/model/info").await?;

    Ok(Json(ModelsResponse {
        models: data_list(&payload),
    }))
}

/// Aggiunge un deployment
#[utoipa::path(
    post,
    path = "/api/admin/models",
    request_body = CreateModelRequest,
    responses(
        (status = 200, description = "Modello creato", body = ModelResponse),
        (status = 401, description = "Non autenticato", body = ErrorResponse),
        (status = 403, description = "Solo admin", body = ErrorResponse),
    ),
    security(("portal_session" = [])),
    tag = "Admin"
)]
pub async fn create_model(
    State(state): State<AdminState>,
    Extension(current): Extension<CurrentSession>,
    payload: std::result::Result<Json<CreateModelRequest>, JsonRejection>,
) -> Result<Json<ModelResponse>> {
    current.require_admin()?;
    let request = json_body(payload)?;

    let model = state.litellm.post("/model/new", request.to_body()).await?;
    tracing::info!("Modello aggiunto: {:?}", request.model_name);

    Ok(Json(ModelResponse { model }))
}

/// Rimuove un deployment
#[utoipa::path(
    delete,
    path = "/api/admin/models",
    request_body = DeleteModelRequest,
    responses(
        (status = 200, description = "Modello eliminato", body = SuccessResponse),
        (status = 401, description = "Non autenticato", body = ErrorResponse),
        (status = 403, description = "Solo admin", body = ErrorResponse),
    ),
    security(("portal_session" = [])),
    tag = "Admin"
)]
pub async fn delete_model(
    State(state): State<AdminState>,
    Extension(current): Extension<CurrentSession>,
    payload: std::result::Result<Json<DeleteModelRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>> {
    current.require_admin()?;
    let request = json_body(payload)?;

    state
        .litellm
        .post("/model/delete", json!({ "id": request.id }))
        .await?;

    Ok(Json(SuccessResponse::ok()))
}
