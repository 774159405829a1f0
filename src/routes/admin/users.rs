use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde_json::json;

use super::AdminState;
use crate::error::Result;
use crate::models::litellm::user_list;
use crate::models::{
    CurrentSession, DeleteUserRequest, ErrorResponse, SuccessResponse, UserForm, UserResponse,
    UsersResponse,
};
use crate::routes::json_body;

/// Lista tutti gli utenti LiteLLM
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "Lista utenti", body = UsersResponse),
        (status = 401, description = "Non autenticato", body = ErrorResponse),
        (status = 403, description = "Solo admin", body = ErrorResponse),
    ),
    security(("portal_session" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AdminState>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<UsersResponse>> {
    current.require_admin()?;

    let payload = state.litellm.get("/user/list").await?;

    Ok(Json(UsersResponse {
        users: user_list(&payload),
    }))
}

/// Crea un utente a partire dal form del pannello
#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = UserForm,
    responses(
        (status = 200, description = "Utente creato", body = UserResponse),
        (status = 401, description = "Non autenticato", body = ErrorResponse),
        (status = 403, description = "Solo admin", body = ErrorResponse),
    ),
    security(("portal_session" = [])),
    tag = "Admin"
)]
pub async fn create_user(
    State(state): State<AdminState>,
    Extension(current): Extension<CurrentSession>,
    payload: std::result::Result<Json<UserForm>, JsonRejection>,
) -> Result<Json<UserResponse>> {
    current.require_admin()?;
    let form = json_body(payload)?;

    let user = state.litellm.post("/user/new", form.to_create_body()).await?;
    tracing::info!("Utente creato: {:?}", user.get("user_id"));

    Ok(Json(UserResponse { user }))
}

/// Modifica parziale: vengono inoltrati solo i campi presenti
#[utoipa::path(
    put,
    path = "/api/admin/users/action",
    request_body = UserForm,
    responses(
        (status = 200, description = "Utente aggiornato", body = UserResponse),
        (status = 401, description = "Non autenticato", body = ErrorResponse),
        (status = 403, description = "Solo admin", body = ErrorResponse),
    ),
    security(("portal_session" = [])),
    tag = "Admin"
)]
pub async fn update_user(
    State(state): State<AdminState>,
    Extension(current): Extension<CurrentSession>,
    payload: std::result::Result<Json<UserForm>, JsonRejection>,
) -> Result<Json<UserResponse>> {
    current.require_admin()?;
    let form = json_body(payload)?;

    let user = state
        .litellm
        .post("/user/update", form.to_update_body())
        .await?;

    Ok(Json(UserResponse { user }))
}

/// Elimina un utente
#[utoipa::path(
    delete,
    path = "/api/admin/users/action",
    request_body = DeleteUserRequest,
    responses(
        (status = 200, description = "Utente eliminato", body = SuccessResponse),
        (status = 401, description = "Non autenticato", body = ErrorResponse),
        (status = 403, description = "Solo admin", body = ErrorResponse),
    ),
    security(("portal_session" = [])),
    tag = "Admin"
)]
pub async fn delete_user(
    State(state): State<AdminState>,
    Extension(current): Extension<CurrentSession>,
    payload: std::result::Result<Json<DeleteUserRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>> {
    current.require_admin()?;
    let request = json_body(payload)?;

    state
        .litellm
        .post("/user/delete", json!({ "user_ids": [request.user_id] }))
        .await?;
    tracing::info!("Utente eliminato: {}", request.user_id);

    Ok(Json(SuccessResponse::ok()))
}

#[cfg(test)]
mod tests {
    use crate::models::Session;
    use crate::test_support::{app, request, send, session_cookie, MockResponse, MockUpstream};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_admin_routes_reject_before_upstream() {
        let mock = MockUpstream::start().await;
        let dir = tempfile::tempdir().unwrap();
        let app = app(&mock.config(dir.path()));
        let user = session_cookie(&Session::user("alice"));

        let anonymous = send(&app, request("GET", "/api/admin/users", None, None)).await;
        assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
        assert_eq!(anonymous.body["error"], "Unauthorized");

        let forbidden = send(&app, request("GET", "/api/admin/users", Some(&user), None)).await;
        assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
        assert_eq!(forbidden.body["error"], "Unauthorized");

        // il body non valido non anticipa il gate
        let mut malformed = request("POST", "/api/admin/users", Some(&user), None);
        malformed.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            "application/json".parse().unwrap(),
        );
        let malformed = send(&app, malformed).await;
        assert_eq!(malformed.status, StatusCode::FORBIDDEN);

        assert_eq!(mock.hits(), 0);
    }

    #[tokio::test]
    async fn test_create_user_normalizes_form() {
        let mock = MockUpstream::start().await.route(
            "/user/new",
            MockResponse::json(200, json!({"user_id": "bob", "key": null})),
        );
        let dir = tempfile::tempdir().unwrap();
        let app = app(&mock.config(dir.path()));
        let admin = session_cookie(&Session::admin());

        let response = send(
            &app,
            request(
                "POST",
                "/api/admin/users",
                Some(&admin),
                Some(json!({
                    "user_id": "bob",
                    "max_budget": "12.5",
                    "password": "pw",
                    "email": "",
                    "models": "gpt-4o, claude ,",
                    "tpm_limit": "1000",
                    "rpm_limit": ""
                })),
            ),
        )
        .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["user"]["user_id"], "bob");

        let sent = mock.requests()[0].json();
        assert_eq!(sent["user_id"], "bob");
        assert_eq!(sent["max_budget"], 12.5);
        assert_eq!(sent["user_email"], serde_json::Value::Null);
        assert_eq!(sent["models"], json!(["gpt-4o", "claude"]));
        assert_eq!(sent["tpm_limit"], 1000);
        assert!(sent.get("rpm_limit").is_none());
        assert_eq!(sent["auto_create_key"], false);
        assert_eq!(sent["metadata"]["ui_password"], "pw");
        assert_eq!(
            mock.requests()[0].header("authorization").as_deref(),
            Some("Bearer sk-master")
        );
    }

    #[tokio::test]
    async fn test_delete_user_wraps_id() {
        let mock = MockUpstream::start()
            .await
            .route("/user/delete", MockResponse::json(200, json!({"deleted": 1})));
        let dir = tempfile::tempdir().unwrap();
        let app = app(&mock.config(dir.path()));
        let admin = session_cookie(&Session::admin());

        let response = send(
            &app,
            request(
                "DELETE",
                "/api/admin/users/action",
                Some(&admin),
                Some(json!({"user_id": "bob"})),
            ),
        )
        .await;
        assert_eq!(response.body, json!({"success": true}));

        let sent = &mock.requests()[0];
        assert_eq!(sent.method, "POST");
        assert_eq!(sent.json(), json!({"user_ids": ["bob"]}));
    }

    #[tokio::test]
    async fn test_upstream_error_is_500_with_message() {
        let mock = MockUpstream::start().await.route(
            "/user/list",
            MockResponse::json(500, json!({"error": {"message": "boom"}})),
        );
        let dir = tempfile::tempdir().unwrap();
        let app = app(&mock.config(dir.path()));
        let admin = session_cookie(&Session::admin());

        let response = send(&app, request("GET", "/api/admin/users", Some(&admin), None)).await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body["error"], "boom");
    }
}
