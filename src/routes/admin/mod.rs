//! Pannello admin: utenti, modelli, server MCP e guardrail di LiteLLM.
//!
//! Tutti gli handler passano dal gate admin prima di qualunque chiamata upstream.

pub mod guardrails;
pub mod mcp;
pub mod models;
pub mod users;

use axum::{
    routing::{get, put},
    Router,
};

use crate::services::LiteLlmClient;

#[derive(Clone)]
pub struct AdminState {
    pub litellm: LiteLlmClient,
}

pub fn router(litellm: LiteLlmClient) -> Router {
    let state = AdminState { litellm };
    Router::new()
        // Utenti
        .route(
            "/api/admin/users",
            get(users::list_users).post(users::create_user),
        )
        .route(
            "/api/admin/users/action",
            put(users::update_user).delete(users::delete_user),
        )
        // Modelli
        .route(
            "/api/admin/models",
            get(models::list_models)
                .post(models::create_model)
                .delete(models::delete_model),
        )
        // MCP
        .route(
            "/api/admin/mcp",
            get(mcp::mcp_overview)
                .post(mcp::create_mcp_server)
                .put(mcp::update_mcp_server)
                .delete(mcp::delete_mcp_server),
        )
        .route("/api/admin/guardrails", get(guardrails::list_guardrails))
        .with_state(state)
}
