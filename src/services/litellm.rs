//! Client verso l'API REST di LiteLLM.
//!
//! Ogni route privilegiata passa da [`LiteLlmClient::fetch`]: qui si inietta la
//! master key, si normalizzano gli errori e si decodifica il JSON di risposta.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::config::Config;

/// Lunghezza massima dell'estratto di una risposta non JSON
const SNIPPET_MAX_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error("LiteLLM returned a non-JSON response (HTTP {status}): {snippet}")]
    InvalidResponse { status: StatusCode, snippet: String },

    #[error("Unable to reach LiteLLM: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid request header: {0}")]
    InvalidHeader(String),
}

/// Descrittore della richiesta, equivalente a method + headers + body
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

impl FetchOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn json(method: Method, body: Value) -> Self {
        Self {
            method,
            body: Some(body),
            ..Self::default()
        }
    }

    /// Usa una chiave dell'utente al posto della master key
    pub fn bearer(mut self, key: &str) -> Result<Self, UpstreamError> {
        let value = HeaderValue::from_str(&format!("Bearer {}", key))
            .map_err(|e| UpstreamError::InvalidHeader(e.to_string()))?;
        self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }
}

#[derive(Clone)]
pub struct LiteLlmClient {
    http: reqwest::Client,
    base_url: String,
    master_key: String,
}

impl LiteLlmClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.litellm_url.trim_end_matches('/').to_string(),
            master_key: config.litellm_master_key.clone(),
        }
    }

    /// URL assoluto: base + endpoint con esattamente uno slash iniziale
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Esegue una singola richiesta verso LiteLLM (nessun retry, nessun timeout custom).
    ///
    /// `Authorization` e `Content-Type` vengono aggiunti solo se il chiamante
    /// non li ha già impostati.
    pub async fn fetch(&self, endpoint: &str, options: FetchOptions) -> Result<Value, UpstreamError> {
        let url = self.url_for(endpoint);
        let FetchOptions {
            method,
            mut headers,
            body,
        } = options;

        if !headers.contains_key(AUTHORIZATION) {
            let value = HeaderValue::from_str(&format!("Bearer {}", self.master_key))
                .map_err(|e| UpstreamError::InvalidHeader(e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        tracing::debug!("LiteLLM {} {}", method, url);

        let mut request = self.http.request(method.clone(), &url).headers(headers);
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!("LiteLLM {} {} non raggiungibile: {}", method, url, e);
            UpstreamError::Transport(e)
        })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = parse_upstream_error(&text, status.canonical_reason().unwrap_or(""));
            tracing::warn!("LiteLLM {} {} -> {}: {}", method, url, status.as_u16(), message);
            return Err(UpstreamError::Status { status, message });
        }

        decode_body(status, &text)
    }

    pub async fn get(&self, endpoint: &str) -> Result<Value, UpstreamError> {
        self.fetch(endpoint, FetchOptions::new(Method::GET)).await
    }

    pub async fn post(&self, endpoint: &str, body: Value) -> Result<Value, UpstreamError> {
        self.fetch(endpoint, FetchOptions::json(Method::POST, body)).await
    }

    pub async fn put(&self, endpoint: &str, body: Value) -> Result<Value, UpstreamError> {
        self.fetch(endpoint, FetchOptions::json(Method::PUT, body)).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<Value, UpstreamError> {
        self.fetch(endpoint, FetchOptions::new(Method::DELETE)).await
    }

    /// `GET /user/info?user_id=...`
    pub async fn user_info(&self, user_id: &str) -> Result<Value, UpstreamError> {
        self.get(&format!("/user/info?user_id={}", urlencoding::encode(user_id)))
            .await
    }
}

/// Estrae un messaggio leggibile dal body di una risposta di errore.
///
/// Ordine: `error.message`, `message`, poi lo status text HTTP.
pub fn parse_upstream_error(body: &str, status_text: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    let from_body = parsed.as_ref().and_then(|data| {
        non_empty_str(data.get("error").and_then(|e| e.get("message")))
            .or_else(|| non_empty_str(data.get("message")))
    });

    match from_body {
        Some(message) => message.to_string(),
        None => format!("LiteLLM API Error: {}", status_text),
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Decodifica il body di una risposta 2xx. Body vuoto = `null`.
fn decode_body(status: StatusCode, text: &str) -> Result<Value, UpstreamError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(text).map_err(|_| {
        let snippet = snippet(text);
        tracing::error!("LiteLLM ha risposto {} con contenuto non JSON: {}", status, snippet);
        UpstreamError::InvalidResponse { status, snippet }
    })
}

fn snippet(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= SNIPPET_MAX_CHARS {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(SNIPPET_MAX_CHARS).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockResponse, MockUpstream};
    use serde_json::json;

    fn client_for(mock: &MockUpstream) -> LiteLlmClient {
        let config = Config {
            litellm_url: mock.url.clone(),
            litellm_master_key: "sk-master".to_string(),
            ..Config::default()
        };
        LiteLlmClient::new(&config)
    }

    #[test]
    fn test_parse_error_prefers_nested_message() {
        let body = r#"{"error":{"message":"boom"},"message":"outer"}"#;
        assert_eq!(parse_upstream_error(body, "Internal Server Error"), "boom");
    }

    #[test]
    fn test_parse_error_falls_back_to_message() {
        let body = r#"{"message":"quota exceeded"}"#;
        assert_eq!(parse_upstream_error(body, "Bad Request"), "quota exceeded");

        // error come stringa non ha `message`
        let body = r#"{"error":"flat","message":"outer"}"#;
        assert_eq!(parse_upstream_error(body, "Bad Request"), "outer");
    }

    #[test]
    fn test_parse_error_falls_back_to_status_text() {
        assert_eq!(
            parse_upstream_error("<html>oops</html>", "Bad Gateway"),
            "LiteLLM API Error: Bad Gateway"
        );
        assert_eq!(
            parse_upstream_error(r#"{"error":{"message":""}}"#, "Not Found"),
            "LiteLLM API Error: Not Found"
        );
        assert_eq!(parse_upstream_error("", "Forbidden"), "LiteLLM API Error: Forbidden");
    }

    #[test]
    fn test_url_normalization() {
        let config = Config {
            litellm_url: "http://litellm:4000/".to_string(),
            ..Config::default()
        };
        let client = LiteLlmClient::new(&config);
        assert_eq!(client.url_for("/user/list"), "http://litellm:4000/user/list");
        assert_eq!(client.url_for("user/list"), "http://litellm:4000/user/list");
        assert_eq!(client.url_for("//user/list"), "http://litellm:4000/user/list");
    }

    #[test]
    fn test_snippet_is_truncated() {
        let long = "x".repeat(500);
        let s = snippet(&long);
        assert_eq!(s.len(), SNIPPET_MAX_CHARS + 3);
        assert!(s.ends_with("..."));
        assert_eq!(snippet("  short  "), "short");
    }

    #[tokio::test]
    async fn test_fetch_injects_default_headers() {
        let mock = MockUpstream::start()
            .await
            .route("/user/new", MockResponse::json(200, json!({"user_id": "bob"})));
        let client = client_for(&mock);

        let data = client
            .post("user/new", json!({"user_id": "bob"}))
            .await
            .unwrap();
        assert_eq!(data["user_id"], "bob");

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.method, "POST");
        assert_eq!(req.path, "/user/new");
        assert_eq!(req.header("authorization").as_deref(), Some("Bearer sk-master"));
        assert_eq!(req.header("content-type").as_deref(), Some("application/json"));
        assert_eq!(req.json(), json!({"user_id": "bob"}));
    }

    #[tokio::test]
    async fn test_fetch_preserves_caller_authorization() {
        let mock = MockUpstream::start()
            .await
            .route("/v1/chat/completions", MockResponse::json(200, json!({"id": "c1"})));
        let client = client_for(&mock);

        let options = FetchOptions::json(Method::POST, json!({"model": "gpt"}))
            .bearer("sk-user")
            .unwrap();
        client.fetch("/v1/chat/completions", options).await.unwrap();

        let req = &mock.requests()[0];
        assert_eq!(req.header("authorization").as_deref(), Some("Bearer sk-user"));
        assert_eq!(req.header("content-type").as_deref(), Some("application/json"));
    }

    #[tokio::test]
    async fn test_fetch_error_message_from_body() {
        let mock = MockUpstream::start().await.route(
            "/user/list",
            MockResponse::json(500, json!({"error": {"message": "boom"}})),
        );
        let client = client_for(&mock);

        let err = client.get("/user/list").await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(matches!(
            err,
            UpstreamError::Status { status, .. } if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
    }

    #[tokio::test]
    async fn test_fetch_error_with_html_body_uses_status_text() {
        let mock = MockUpstream::start()
            .await
            .route("/user/list", MockResponse::text(502, "<html>bad gateway</html>"));
        let client = client_for(&mock);

        let err = client.get("/user/list").await.unwrap_err();
        assert_eq!(err.to_string(), "LiteLLM API Error: Bad Gateway");
    }

    #[tokio::test]
    async fn test_fetch_non_json_success_is_catchable() {
        let mock = MockUpstream::start()
            .await
            .route("/model/info", MockResponse::text(200, "<html><body>login</body></html>"));
        let client = client_for(&mock);

        match client.get("/model/info").await {
            Err(UpstreamError::InvalidResponse { status, snippet }) => {
                assert_eq!(status, StatusCode::OK);
                assert!(snippet.contains("<html>"));
            }
            other => panic!("risultato inatteso: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_empty_success_body_is_null() {
        let mock = MockUpstream::start()
            .await
            .route("/v1/mcp/server/abc", MockResponse::text(200, ""));
        let client = client_for(&mock);

        let data = client.delete("/v1/mcp/server/abc").await.unwrap();
        assert!(data.is_null());
        assert_eq!(mock.requests()[0].method, "DELETE");
    }

    #[tokio::test]
    async fn test_user_info_encodes_user_id() {
        let mock = MockUpstream::start()
            .await
            .route("/user/info", MockResponse::json(200, json!({"user_id": "a b"})));
        let client = client_for(&mock);

        client.user_info("a b").await.unwrap();
        assert_eq!(mock.requests()[0].query.as_deref(), Some("user_id=a%20b"));
    }
}
