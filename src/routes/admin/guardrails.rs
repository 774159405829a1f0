use axum::{extract::State, Extension, Json};

use super::AdminState;
use crate::error::Result;
use crate::models::litellm::guardrail_list;
use crate::models::{CurrentSession, ErrorResponse, GuardrailsResponse};

/// Guardrail configurati nel proxy (sola lettura)
#[utoipa::path(
    get,
    path = "/api/admin/guardrails",
    responses(
        (status = 200, description = "Lista guardrail", body = GuardrailsResponse),
        (status = 401, description = "Non autenticato", body = ErrorResponse),
        (status = 403, description = "Solo admin", body = ErrorResponse),
    ),
    security(("portal_session" = [])),
    tag = "Admin"
)]
pub async fn list_guardrails(
    State(state): State<AdminState>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<GuardrailsResponse>> {
    current.require_admin()?;

    let payload = state.litellm.get("/guardrails/list").await?;

    Ok(Json(GuardrailsResponse {
        guardrails: guardrail_list(&payload),
    }))
}
