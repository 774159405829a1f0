//! Chiavi API dell'utente corrente

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Extension, Json, Router,
};
use serde_json::json;

use crate::error::Result;
use crate::models::litellm::UserInfo;
use crate::models::{
    CreateKeyRequest, CurrentSession, DeleteKeyRequest, ErrorResponse, KeyCreatedResponse,
    KeysResponse, SuccessResponse,
};
use crate::routes::json_body;
use crate::services::LiteLlmClient;

#[derive(Clone)]
pub struct KeysState {
    pub litellm: LiteLlmClient,
}

pub fn router(litellm: LiteLlmClient) -> Router {
    let state = KeysState { litellm };
    Router::new()
        .route(
            "/api/keys",
            get(list_keys).post(create_key).delete(delete_key),
        )
        .with_state(state)
}

/// Chiavi dell'utente in sessione
#[utoipa::path(
    get,
    path = "/api/keys",
    responses(
        (status = 200, description = "Chiavi dell'utente", body = KeysResponse),
        (status = 401, description = "Non autenticato", body = ErrorResponse),
    ),
    security(("portal_session" = [])),
    tag = "Chiavi"
)]
pub async fn list_keys(
    State(state): State<KeysState>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<KeysResponse>> {
    let session = current.require_user()?;

    let payload = state.litellm.user_info(&session.user_id).await?;

    Ok(Json(KeysResponse {
        keys: UserInfo::from_upstream(&payload).keys,
    }))
}

/// Genera una chiave intestata all'utente in sessione
#[utoipa::path(
    post,
    path = "/api/keys",
    request_body = CreateKeyRequest,
    responses(
        (status = 200, description = "Chiave generata", body = KeyCreatedResponse),
        (status = 401, description = "Non autenticato", body = ErrorResponse),
    ),
    security(("portal_session" = [])),
    tag = "Chiavi"
)]
pub async fn create_key(
    State(state): State<KeysState>,
    Extension(current): Extension<CurrentSession>,
    payload: std::result::Result<Json<CreateKeyRequest>, JsonRejection>,
) -> Result<Json<KeyCreatedResponse>> {
    let session = current.require_user()?;
    let request = json_body(payload)?;

    let data = state
        .litellm
        .post(
            "/key/generate",
            json!({ "user_id": session.user_id, "key_alias": request.name }),
        )
        .await?;
    tracing::info!("Chiave generata per {}", session.user_id);

    Ok(Json(KeyCreatedResponse {
        key: data.get("key").cloned(),
        alias: data.get("key_alias").cloned(),
        token: data.get("token").cloned(),
    }))
}

/// Elimina una chiave.
///
/// La proprietà della chiave non viene verificata: LiteLLM accetta la
/// richiesta perché firmata con la master key.
#[utoipa::path(
    delete,
    path = "/api/keys",
    request_body = DeleteKeyRequest,
    responses(
        (status = 200, description = "Chiave eliminata", body = SuccessResponse),
        (status = 401, description = "Non autenticato", body = ErrorResponse),
    ),
    security(("portal_session" = [])),
    tag = "Chiavi"
)]
pub async fn delete_key(
    State(state): State<KeysState>,
    Extension(current): Extension<CurrentSession>,
    payload: std::result::Result<Json<DeleteKeyRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>> {
    let session = current.require_user()?;
    let request = json_body(payload)?;

    state
        .litellm
        .post("/key/delete", json!({ "keys": [request.key] }))
        .await?;
    tracing::info!("Chiave eliminata da {}", session.user_id);

    Ok(Json(SuccessResponse::ok()))
}

#[cfg(test)]
mod tests {
    use crate::models::Session;
    use crate::test_support::{app, request, send, session_cookie, MockResponse, MockUpstream};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_keys_require_session() {
        let mock = MockUpstream::start().await;
        let dir = tempfile::tempdir().unwrap();
        let app = app(&mock.config(dir.path()));

        let response = send(&app, request("GET", "/api/keys", None, None)).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(mock.hits(), 0);
    }

    #[tokio::test]
    async fn test_list_keys_for_session_user() {
        let mock = MockUpstream::start().await.route(
            "/user/info",
            MockResponse::json(
                200,
                json!({"user_id": "alice", "user_info": {}, "keys": [{"token": "t1"}]}),
            ),
        );
        let dir = tempfile::tempdir().unwrap();
        let app = app(&mock.config(dir.path()));
        let cookie = session_cookie(&Session::user("alice"));

        let response = send(&app, request("GET", "/api/keys", Some(&cookie), None)).await;
        assert_eq!(response.body, json!({"keys": [{"token": "t1"}]}));
        assert_eq!(mock.requests()[0].query.as_deref(), Some("user_id=alice"));
    }

    #[tokio::test]
    async fn test_create_key_uses_session_user() {
        let mock = MockUpstream::start().await.route(
            "/key/generate",
            MockResponse::json(
                200,
                json!({"key": "sk-new", "key_alias": "laptop", "token": "tok", "expires": null}),
            ),
        );
        let dir = tempfile::tempdir().unwrap();
        let app = app(&mock.config(dir.path()));
        let cookie = session_cookie(&Session::user("alice"));

        let response = send(
            &app,
            request("POST", "/api/keys", Some(&cookie), Some(json!({"name": "laptop"}))),
        )
        .await;
        assert_eq!(
            response.body,
            json!({"key": "sk-new", "alias": "laptop", "token": "tok"})
        );
        assert_eq!(
            mock.requests()[0].json(),
            json!({"user_id": "alice", "key_alias": "laptop"})
        );
    }

    #[tokio::test]
    async fn test_delete_key() {
        let mock = MockUpstream::start()
            .await
            .route("/key/delete", MockResponse::json(200, json!({"deleted_keys": ["sk-1"]})));
        let dir = tempfile::tempdir().unwrap();
        let app = app(&mock.config(dir.path()));
        let cookie = session_cookie(&Session::user("alice"));

        let response = send(
            &app,
            request("DELETE", "/api/keys", Some(&cookie), Some(json!({"key": "sk-1"}))),
        )
        .await;
        assert_eq!(response.body, json!({"success": true}));
        assert_eq!(mock.requests()[0].json(), json!({"keys": ["sk-1"]}));
    }
}
