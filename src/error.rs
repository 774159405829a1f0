use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::authenticator::AuthError;
use crate::services::litellm::UpstreamError;
use crate::services::settings::SettingsError;

/// Messaggio restituito dal gate di sessione, sia per 401 che per 403
pub const UNAUTHORIZED: &str = "Unauthorized";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Errore LiteLLM da girare al client con lo stesso status
    #[error("{1}")]
    UpstreamStatus(StatusCode, String),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("{0}")]
    RateLimited(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn unauthorized() -> Self {
        AppError::Unauthorized(UNAUTHORIZED.to_string())
    }

    pub fn forbidden() -> Self {
        AppError::Forbidden(UNAUTHORIZED.to_string())
    }

    /// Come `From<UpstreamError>`, ma conserva lo status HTTP restituito da LiteLLM
    pub fn mirror_upstream(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Status { status, message } => AppError::UpstreamStatus(status, message),
            other => AppError::Upstream(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::UpstreamStatus(status, _) => *status,
            AppError::Settings(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("Richiesta fallita ({}): {}", status.as_u16(), self);
        }

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
