//! Login, logout e sessione corrente

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, Uri},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::error::Result;
use crate::middleware::session::{destroy_cookie, is_secure_request, SessionCodec};
use crate::models::{
    CurrentSession, ErrorResponse, LoginRequest, LoginResponse, SessionResponse, SuccessResponse,
};
use crate::routes::json_body;
use crate::services::Authenticator;

/// State per le route di autenticazione
#[derive(Clone)]
pub struct AuthRouteState {
    pub authenticator: Authenticator,
    pub codec: SessionCodec,
}

pub fn router(authenticator: Authenticator, codec: SessionCodec) -> Router {
    let state = AuthRouteState {
        authenticator,
        codec,
    };
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/session", get(current_session))
        .with_state(state)
}

/// Login con credenziali admin o utente LiteLLM
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login riuscito, cookie impostato", body = LoginResponse),
        (status = 401, description = "Utente inesistente o credenziali errate", body = ErrorResponse),
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AuthRouteState>,
    headers: HeaderMap,
    uri: Uri,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let credentials = json_body(payload)?;

    let session = state
        .authenticator
        .authenticate(&credentials.username, &credentials.password)
        .await?;

    let cookie = state
        .codec
        .create_cookie(&session, is_secure_request(&headers, &uri));

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            success: true,
            role: session.role,
        }),
    ))
}

/// Logout: cancella il cookie (il token non viene revocato lato server)
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Cookie cancellato", body = SuccessResponse),
    ),
    tag = "Auth"
)]
pub async fn logout() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, destroy_cookie())],
        Json(SuccessResponse::ok()),
    )
}

/// Ruolo e utente della sessione corrente
#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Sessione corrente", body = SessionResponse),
        (status = 401, description = "Non autenticato", body = ErrorResponse),
    ),
    security(("portal_session" = [])),
    tag = "Auth"
)]
pub async fn current_session(
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<SessionResponse>> {
    let session = current.require_user()?;

    Ok(Json(SessionResponse {
        role: session.role,
        user_id: session.user_id.clone(),
    }))
}
