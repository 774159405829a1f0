use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde_json::Value;

use super::AdminState;
use crate::error::Result;
use crate::models::litellm::{mcp_servers, mcp_tools};
use crate::models::{
    CurrentSession, DeleteMcpServerRequest, ErrorResponse, McpOverviewResponse, McpServerResponse,
    SuccessResponse,
};
use crate::routes::json_body;

/// Server e tool MCP. Dopo il gate non fallisce mai: ogni lista degrada a `[]`.
#[utoipa::path(
    get,
    path = "/api/admin/mcp",
    responses(
        (status = 200, description = "Server e tool MCP", body = McpOverviewResponse),
        (status = 401, description = "Non autenticato", body = ErrorResponse),
        (status = 403, description = "Solo admin", body = ErrorResponse),
    ),
    security(("portal_session" = [])),
    tag = "Admin"
)]
pub async fn mcp_overview(
    State(state): State<AdminState>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<McpOverviewResponse>> {
    current.require_admin()?;

    let (servers, tools) = tokio::join!(
        state.litellm.get("/v1/mcp/server"),
        state.litellm.get("/mcp/tools/list"),
    );

    let servers = match servers {
        Ok(payload) => mcp_servers(&payload),
        Err(e) => {
            tracing::warn!("Server MCP non disponibili: {}", e);
            Vec::new()
        }
    };
    let tools = match tools {
        Ok(payload) => mcp_tools(&payload),
        Err(e) => {
            tracing::warn!("Tool MCP non disponibili: {}", e);
            Vec::new()
        }
    };

    Ok(Json(McpOverviewResponse { servers, tools }))
}

/// Registra un server MCP (body inoltrato così com'è)
#[utoipa::path(
    post,
    path = "/api/admin/mcp",
    responses(
        (status = 200, description = "Server creato", body = McpServerResponse),
        (status = 401, description = "Non autenticato", body = ErrorResponse),
        (status = 403, description = "Solo admin", body = ErrorResponse),
    ),
    security(("portal_session" = [])),
    tag = "Admin"
)]
pub async fn create_mcp_server(
    State(state): State<AdminState>,
    Extension(current): Extension<CurrentSession>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<McpServerResponse>> {
    current.require_admin()?;
    let body = json_body(payload)?;

    let server = state.litellm.post("/v1/mcp/server", body).await?;

    Ok(Json(McpServerResponse { server }))
}

/// Aggiorna un server MCP
#[utoipa::path(
    put,
    path = "/api/admin/mcp",
    responses(
        (status = 200, description = "Server aggiornato", body = McpServerResponse),
        (status = 401, description = "Non autenticato", body = ErrorResponse),
        (status = 403, description = "Solo admin", body = ErrorResponse),
    ),
    security(("portal_session" = [])),
    tag = "Admin"
)]
pub async fn update_mcp_server(
    State(state): State<AdminState>,
    Extension(current): Extension<CurrentSession>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<McpServerResponse>> {
    current.require_admin()?;
    let body = json_body(payload)?;

    let server = state.litellm.put("/v1/mcp/server", body).await?;

    Ok(Json(McpServerResponse { server }))
}

/// Rimuove un server MCP
#[utoipa::path(
    delete,
    path = "/api/admin/mcp",
    request_body = DeleteMcpServerRequest,
    responses(
        (status = 200, description = "Server eliminato", body = SuccessResponse),
        (status = 401, description = "Non autenticato", body = ErrorResponse),
        (status = 403, description = "Solo admin", body = ErrorResponse),
    ),
    security(("portal_session" = [])),
    tag = "Admin"
)]
pub async fn delete_mcp_server(
    State(state): State<AdminState>,
    Extension(current): Extension<CurrentSession>,
    payload: std::result::Result<Json<DeleteMcpServerRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>> {
    current.require_admin()?;
    let request = json_body(payload)?;

    let endpoint = format!(
        "/v1/mcp/server/{}",
        urlencoding::encode(&request.server_id)
    );
    state.litellm.delete(&endpoint).await?;
    tracing::info!("Server MCP eliminato: {}", request.server_id);

    Ok(Json(SuccessResponse::ok()))
}
