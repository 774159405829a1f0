pub mod admin;
pub mod auth;
pub mod chat;
pub mod health;
pub mod keys;
pub mod logs;
pub mod models;
pub mod settings;
pub mod usage;
pub mod user;

use axum::{extract::rejection::JsonRejection, middleware, Json, Router};

use crate::error::{AppError, Result};
use crate::middleware::auth::session_auth;
use crate::middleware::session::SessionCodec;
use crate::services::{Authenticator, LiteLlmClient, ModelCatalog, SettingsStore};

pub fn create_router(
    litellm: LiteLlmClient,
    authenticator: Authenticator,
    codec: SessionCodec,
    settings: SettingsStore,
    catalog: ModelCatalog,
) -> Router {
    Router::new()
        .merge(health::router())
        .merge(auth::router(authenticator, codec.clone()))
        .merge(admin::router(litellm.clone()))
        .merge(keys::router(litellm.clone()))
        .merge(usage::router(litellm.clone()))
        .merge(logs::router(litellm.clone()))
        .merge(chat::router(litellm.clone()))
        .merge(user::router(litellm.clone()))
        .merge(models::router(litellm, catalog))
        .merge(settings::router(settings))
        .layer(middleware::from_fn_with_state(codec, session_auth))
}

/// Il body viene estratto come `Result` così il gate di sessione precede
/// sempre la validazione del JSON
pub(crate) fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}
