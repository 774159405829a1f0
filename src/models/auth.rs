//! Authentication-related models

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Ruoli della dashboard
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
        }
    }
}

/// Contenuto del cookie `portal_session`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub role: Role,
    pub user_id: String,
}

impl Session {
    pub fn admin() -> Self {
        Self {
            role: Role::Admin,
            user_id: "admin".to_string(),
        }
    }

    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            user_id: user_id.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Sessione della richiesta corrente, inserita come extension dal middleware.
/// `None` = richiesta anonima.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession(pub Option<Session>);

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub role: Role,
}
