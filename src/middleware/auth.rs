use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::{AppError, Result};
use crate::middleware::session::SessionCodec;
use crate::models::{CurrentSession, Session};

/// Middleware che decodifica il cookie di sessione.
///
/// Non rifiuta mai la richiesta: inserisce [`CurrentSession`] come extension
/// (vuota se il cookie manca o non è valido) e lascia il controllo agli handler.
pub async fn session_auth(
    State(codec): State<SessionCodec>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = codec.read(request.headers());

    if let Some(session) = &session {
        tracing::debug!("Sessione {} ({})", session.user_id, session.role);
    }

    request.extensions_mut().insert(CurrentSession(session));

    next.run(request).await
}

impl CurrentSession {
    /// Qualunque sessione valida, altrimenti 401
    pub fn require_user(&self) -> Result<&Session> {
        self.0.as_ref().ok_or_else(AppError::unauthorized)
    }

    /// Sessione admin: 401 senza sessione, 403 con ruolo diverso
    pub fn require_admin(&self) -> Result<&Session> {
        let session = self.require_user()?;
        if !session.is_admin() {
            return Err(AppError::forbidden());
        }
        Ok(session)
    }
}
