//! Verifica delle credenziali di login.
//!
//! L'admin è una coppia statica da env; gli altri utenti devono esistere in
//! LiteLLM, che però non gestisce password per la UI: la password viene
//! confrontata con una catena di fallback ereditata dalle versioni precedenti
//! della dashboard (password universale, `password`, `metadata.ui_password`,
//! `user_email`).

use thiserror::Error;

use crate::config::Config;
use crate::models::litellm::UserInfo;
use crate::models::Session;
use crate::services::litellm::LiteLlmClient;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("User does not exist")]
    UserNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,
}

#[derive(Clone)]
pub struct Authenticator {
    litellm: LiteLlmClient,
    admin_username: String,
    admin_password: String,
    fallback_password: Option<String>,
}

impl Authenticator {
    pub fn new(config: &Config, litellm: LiteLlmClient) -> Self {
        Self {
            litellm,
            admin_username: config.admin_username.clone(),
            admin_password: config.admin_password.clone(),
            fallback_password: Some(config.fallback_password.clone()).filter(|p| !p.is_empty()),
        }
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        if username == self.admin_username && password == self.admin_password {
            tracing::info!("Login admin");
            return Ok(Session::admin());
        }

        if username.is_empty() {
            return Err(AuthError::UserNotFound);
        }

        let payload = self.litellm.user_info(username).await.map_err(|e| {
            tracing::warn!("Lookup utente {} fallito: {}", username, e);
            AuthError::UserNotFound
        })?;

        let info = UserInfo::from_upstream(&payload);
        let user_id = info.user_id.clone().ok_or(AuthError::UserNotFound)?;

        if !check_password(&info, password, self.fallback_password.as_deref()) {
            tracing::warn!("Password errata per {}", user_id);
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!("Login utente {}", user_id);
        Ok(Session::user(user_id))
    }
}

/// Vince la prima corrispondenza; i valori salvati vuoti non valgono mai
pub fn check_password(info: &UserInfo, password: &str, fallback: Option<&str>) -> bool {
    if fallback.is_some_and(|f| !f.is_empty() && f == password) {
        return true;
    }

    info.stored_passwords()
        .any(|stored| !stored.is_empty() && stored == password)
}
