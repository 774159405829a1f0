//! Finto server LiteLLM per i test: registra ogni richiesta ricevuta.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap, Response, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::config::Config;
use crate::middleware::session::{SessionCodec, SESSION_COOKIE};
use crate::models::Session;
use crate::routes::create_router;
use crate::services::{Authenticator, LiteLlmClient, ModelCatalog, SettingsStore};

#[derive(Clone, Debug)]
pub struct MockResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl MockResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/html",
            body: body.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

#[derive(Default)]
struct MockState {
    routes: HashMap<String, MockResponse>,
    requests: Vec<RecordedRequest>,
}

#[derive(Clone)]
pub struct MockUpstream {
    pub url: String,
    state: Arc<Mutex<MockState>>,
}

impl MockUpstream {
    /// Avvia il server su una porta libera di 127.0.0.1
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(MockState::default()));
        let app = Router::new().fallback(record).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            state,
        }
    }

    /// Registra la risposta per un path (query string esclusa)
    pub fn route(self, path: &str, response: MockResponse) -> Self {
        self.state
            .lock()
            .unwrap()
            .routes
            .insert(path.to_string(), response);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn hits(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    /// Configurazione che punta a questo server, con file locali dentro `dir`
    pub fn config(&self, dir: &Path) -> Config {
        Config {
            litellm_url: self.url.clone(),
            litellm_master_key: "sk-master".to_string(),
            admin_password: "secret".to_string(),
            session_secret: Some("test-secret".to_string()),
            settings_path: dir.join("config").join("settings.json"),
            litellm_config_path: dir.join("litellm-config.yaml"),
            ..Config::default()
        }
    }
}

async fn record(State(state): State<Arc<Mutex<MockState>>>, request: Request) -> Response<Body> {
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, usize::MAX).await.unwrap_or_default();

    let recorded = RecordedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        headers: parts.headers.clone(),
        body: String::from_utf8_lossy(&body).to_string(),
    };

    let response = {
        let mut state = state.lock().unwrap();
        let response = state.routes.get(&recorded.path).cloned();
        state.requests.push(recorded);
        response
    };

    let response = response.unwrap_or_else(|| {
        MockResponse::json(404, json!({"error": {"message": "route not mocked"}}))
    });

    Response::builder()
        .status(StatusCode::from_u16(response.status).unwrap())
        .header(header::CONTENT_TYPE, response.content_type)
        .body(Body::from(response.body))
        .unwrap()
}

/// Router completo, cablato come in `main` ma senza i layer esterni
pub fn app(config: &Config) -> Router {
    let litellm = LiteLlmClient::new(config);
    let codec = SessionCodec::new(config.session_secret.clone().unwrap_or_default());
    create_router(
        litellm.clone(),
        Authenticator::new(config, litellm),
        codec,
        SettingsStore::new(&config.settings_path),
        ModelCatalog::new(&config.litellm_config_path),
    )
}

/// Header `Cookie` firmato con lo stesso segreto di [`MockUpstream::config`]
pub fn session_cookie(session: &Session) -> String {
    format!(
        "{}={}",
        SESSION_COOKIE,
        SessionCodec::new("test-secret").encode(session)
    )
}

pub fn request(method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let body = match body {
        Some(body) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).unwrap()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn set_cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

pub async fn send(app: &Router, request: Request) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    TestResponse {
        status,
        headers,
        body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
    }
}
