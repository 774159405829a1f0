use std::net::SocketAddr;

use axum::{
    http::{header, HeaderValue, Method},
    middleware, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use litedash::config::Config;
use litedash::middleware::rate_limit;
use litedash::middleware::session::{SessionCodec, SESSION_COOKIE};
use litedash::models::*;
use litedash::routes;
use litedash::services::{Authenticator, LiteLlmClient, ModelCatalog, SettingsStore};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LiteDash API",
        version = "0.1.0",
        description = "Backend della dashboard di amministrazione per un proxy LiteLLM",
        license(name = "MIT"),
    ),
    paths(
        litedash::routes::health::health_check,
        litedash::routes::auth::login,
        litedash::routes::auth::logout,
        litedash::routes::auth::current_session,
        litedash::routes::admin::users::list_users,
        litedash::routes::admin::users::create_user,
        litedash::routes::admin::users::update_user,
        litedash::routes::admin::users::delete_user,
        litedash::routes::admin::models::list_models,
        litedash::routes::admin::models::create_model,
        litedash::routes::admin::models::delete_model,
        litedash::routes::admin::mcp::mcp_overview,
        litedash::routes::admin::mcp::create_mcp_server,
        litedash::routes::admin::mcp::update_mcp_server,
        litedash::routes::admin::mcp::delete_mcp_server,
        litedash::routes::admin::guardrails::list_guardrails,
        litedash::routes::keys::list_keys,
        litedash::routes::keys::create_key,
        litedash::routes::keys::delete_key,
        litedash::routes::usage::get_usage,
        litedash::routes::logs::list_logs,
        litedash::routes::chat::chat_completion,
        litedash::routes::models::list_models,
        litedash::routes::models::public_models,
        litedash::routes::settings::get_settings,
        litedash::routes::settings::update_settings,
        litedash::routes::user::change_password,
    ),
    components(schemas(
        Role,
        Session,
        LoginRequest,
        LoginResponse,
        SessionResponse,
        HealthResponse,
        SuccessResponse,
        ErrorResponse,
        UserForm,
        DeleteUserRequest,
        UsersResponse,
        UserResponse,
        CreateModelRequest,
        DeleteModelRequest,
        ModelsResponse,
        ModelResponse,
        DeleteMcpServerRequest,
        McpOverviewResponse,
        McpServerResponse,
        GuardrailsResponse,
        CreateKeyRequest,
        DeleteKeyRequest,
        KeysResponse,
        KeyCreatedResponse,
        UsageResponse,
        LogsResponse,
        ChatRequest,
        ChatResponse,
        PublicModel,
        PublicModelsResponse,
        PasswordChangeRequest,
    )),
    tags(
        (name = "Sistema", description = "Health check"),
        (name = "Auth", description = "Login e sessione via cookie"),
        (name = "Admin", description = "Gestione utenti, modelli, MCP e guardrail"),
        (name = "Chiavi", description = "Chiavi API dell'utente"),
        (name = "Consumi", description = "Spesa e log delle richieste"),
        (name = "Modelli", description = "Catalogo e listino modelli"),
        (name = "Playground", description = "Prova di una chiave"),
        (name = "Settings", description = "Branding e valuta"),
        (name = "Utente", description = "Profilo utente"),
    ),
    servers(
        (url = "http://localhost:3000", description = "Server locale"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "portal_session",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Cookie(
                        utoipa::openapi::security::ApiKeyValue::new(SESSION_COOKIE),
                    ),
                ),
            );
        }
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origin = config
        .frontend_url
        .as_deref()
        .and_then(|url| match url.parse::<HeaderValue>() {
            Ok(origin) => Some(origin),
            Err(e) => {
                tracing::warn!("LITEDASH_FRONTEND_URL non valido ({}): {}", url, e);
                None
            }
        });

    match origin {
        // il cookie di sessione richiede un'origine esplicita
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    }
}

#[tokio::main]
async fn main() {
    // Carica variabili da .env
    dotenvy::dotenv().ok();

    // Inizializza logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "litedash=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Carica configurazione
    let config = Config::from_env();

    let codec = match &config.session_secret {
        Some(secret) => SessionCodec::new(secret),
        None => {
            tracing::warn!("LITEDASH_SESSION_SECRET non impostato: segreto casuale, le sessioni non sopravvivono al riavvio");
            SessionCodec::random()
        }
    };

    if config.admin_password.is_empty() {
        tracing::warn!("LITELLM_UI_PASSWORD non impostata: login admin con password vuota");
    }
    if config.fallback_password_enabled() {
        tracing::warn!("Password universale attiva per tutti gli utenti LiteLLM (LITEDASH_FALLBACK_PASSWORD)");
    }
    if config.litellm_master_key.is_empty() {
        tracing::warn!("LITELLM_MASTER_KEY non impostata: le chiamate a LiteLLM verranno rifiutate");
    }

    let litellm = LiteLlmClient::new(&config);
    let authenticator = Authenticator::new(&config, litellm.clone());
    let settings = SettingsStore::new(&config.settings_path);
    let catalog = ModelCatalog::new(&config.litellm_config_path);

    // API routes con middleware di sessione
    let mut api_routes = routes::create_router(litellm, authenticator, codec, settings, catalog);

    match rate_limit::create_rate_limiter(config.rate_limit_per_minute) {
        Some(rate_limiter) => {
            api_routes = api_routes.layer(middleware::from_fn(move |req, next| {
                let limiter = rate_limiter.clone();
                async move { rate_limit::rate_limit_middleware(limiter, req, next).await }
            }));
        }
        None => tracing::info!("Rate limit disabilitato"),
    }

    // Costruisci router completo con Swagger
    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_routes)
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes()))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config));

    // Avvia server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Indirizzo non valido");

    tracing::info!("========================================");
    tracing::info!("  LiteDash API v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("========================================");
    tracing::info!("Server: http://{}", addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui/", addr);
    tracing::info!("LiteLLM: {}", config.litellm_url);
    tracing::info!("----------------------------------------");
    tracing::info!("Endpoints Pubblici:");
    tracing::info!("  GET  /api/health             - Health check");
    tracing::info!("  POST /api/auth/login         - Login");
    tracing::info!("  POST /api/auth/logout        - Logout");
    tracing::info!("  GET  /api/settings           - Branding");
    tracing::info!("  GET  /api/models/public      - Listino prezzi");
    tracing::info!("----------------------------------------");
    tracing::info!("Endpoints Utente:");
    tracing::info!("  GET  /api/auth/session       - Sessione corrente");
    tracing::info!("  GET  /api/keys               - Lista chiavi");
    tracing::info!("  POST /api/keys               - Genera chiave");
    tracing::info!("  DEL  /api/keys               - Elimina chiave");
    tracing::info!("  GET  /api/usage              - Spesa e budget");
    tracing::info!("  GET  /api/logs               - Log richieste");
    tracing::info!("  POST /api/chat               - Playground");
    tracing::info!("  GET  /api/models             - Modelli e prezzi");
    tracing::info!("  PUT  /api/user/password      - Cambia password");
    tracing::info!("----------------------------------------");
    tracing::info!("Endpoints Admin:");
    tracing::info!("  GET  /api/admin/users        - Lista utenti");
    tracing::info!("  POST /api/admin/users        - Crea utente");
    tracing::info!("  PUT  /api/admin/users/action - Modifica utente");
    tracing::info!("  DEL  /api/admin/users/action - Elimina utente");
    tracing::info!("  *    /api/admin/models       - Gestione modelli");
    tracing::info!("  *    /api/admin/mcp          - Gestione server MCP");
    tracing::info!("  GET  /api/admin/guardrails   - Guardrail");
    tracing::info!("  PUT  /api/settings           - Modifica branding");
    tracing::info!("----------------------------------------");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
