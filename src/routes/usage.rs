use axum::{extract::State, routing::get, Extension, Json, Router};

use crate::error::Result;
use crate::models::litellm::UserInfo;
use crate::models::{CurrentSession, ErrorResponse, UsageResponse};
use crate::services::LiteLlmClient;

#[derive(Clone)]
pub struct UsageState {
    pub litellm: LiteLlmClient,
}

pub fn router(litellm: LiteLlmClient) -> Router {
    let state = UsageState { litellm };
    Router::new()
        .route("/api/usage", get(get_usage))
        .with_state(state)
}

/// Spesa e budget dell'utente in sessione
#[utoipa::path(
    get,
    path = "/api/usage",
    responses(
        (status = 200, description = "Riepilogo consumi", body = UsageResponse),
        (status = 401, description = "Non autenticato", body = ErrorResponse),
    ),
    security(("portal_session" = [])),
    tag = "Consumi"
)]
pub async fn get_usage(
    State(state): State<UsageState>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<UsageResponse>> {
    let session = current.require_user()?;

    let payload = state.litellm.user_info(&session.user_id).await?;
    let info = UserInfo::from_upstream(&payload);

    Ok(Json(UsageResponse {
        spend: info.spend,
        max_budget: info.max_budget,
        team_id: info.team_id,
        models: info.models,
    }))
}
