use axum::{
    extract::{rejection::JsonRejection, State},
    routing::put,
    Extension, Json, Router,
};
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::{CurrentSession, ErrorResponse, PasswordChangeRequest, UserResponse};
use crate::routes::json_body;
use crate::services::LiteLlmClient;

#[derive(Clone)]
pub struct UserState {
    pub litellm: LiteLlmClient,
}

pub fn router(litellm: LiteLlmClient) -> Router {
    let state = UserState { litellm };
    Router::new()
        .route("/api/user/password", put(change_password))
        .with_state(state)
}

/// Cambia la password dell'utente in sessione
#[utoipa::path(
    put,
    path = "/api/user/password",
    request_body = PasswordChangeRequest,
    responses(
        (status = 200, description = "Password aggiornata", body = UserResponse),
        (status = 400, description = "Password mancante", body = ErrorResponse),
        (status = 401, description = "Non autenticato", body = ErrorResponse),
    ),
    security(("portal_session" = [])),
    tag = "Utente"
)]
pub async fn change_password(
    State(state): State<UserState>,
    Extension(current): Extension<CurrentSession>,
    payload: std::result::Result<Json<PasswordChangeRequest>, JsonRejection>,
) -> Result<Json<UserResponse>> {
    let session = current.require_user()?;
    let request = json_body(payload)?;

    let password = request
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::BadRequest("Password is required".to_string()))?;

    let user = state
        .litellm
        .post(
            "/user/update",
            json!({ "user_id": session.user_id, "password": password }),
        )
        .await?;
    tracing::info!("Password aggiornata per {}", session.user_id);

    Ok(Json(UserResponse { user }))
}

#[cfg(test)]
mod tests {
    use crate::models::Session;
    use crate::test_support::{app, request, send, session_cookie, MockResponse, MockUpstream};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_password_change() {
        let mock = MockUpstream::start()
            .await
            .route("/user/update", MockResponse::json(200, json!({"user_id": "alice"})));
        let dir = tempfile::tempdir().unwrap();
        let app = app(&mock.config(dir.path()));
        let cookie = session_cookie(&Session::user("alice"));

        let empty = send(
            &app,
            request("PUT", "/api/user/password", Some(&cookie), Some(json!({"password": ""}))),
        )
        .await;
        assert_eq!(empty.status, StatusCode::BAD_REQUEST);
        assert_eq!(empty.body["error"], "Password is required");
        assert_eq!(mock.hits(), 0);

        let changed = send(
            &app,
            request("PUT", "/api/user/password", Some(&cookie), Some(json!({"password": "n3w"}))),
        )
        .await;
        assert_eq!(changed.body, json!({"user": {"user_id": "alice"}}));
        assert_eq!(
            mock.requests()[0].json(),
            json!({"user_id": "alice", "password": "n3w"})
        );
    }
}
