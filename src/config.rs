use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// URL base del proxy LiteLLM (senza slash finale)
    pub litellm_url: String,
    /// Master key usata per tutte le chiamate proxy
    pub litellm_master_key: String,
    pub admin_username: String,
    pub admin_password: String,
    /// Segreto HMAC per i cookie di sessione. Se assente viene generato all'avvio.
    pub session_secret: Option<String>,
    /// Password universale accettata per qualunque utente LiteLLM (vuota = disabilitata)
    pub fallback_password: String,
    pub settings_path: PathBuf,
    pub litellm_config_path: PathBuf,
    /// Origine del frontend per CORS con credenziali
    pub frontend_url: Option<String>,
    /// 0 disabilita il rate limiting
    pub rate_limit_per_minute: u32,
    pub max_body_kb: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            litellm_url: "http://localhost:4000".to_string(),
            litellm_master_key: String::new(),
            admin_username: "admin".to_string(),
            admin_password: String::new(),
            session_secret: None,
            fallback_password: "user123".to_string(),
            settings_path: PathBuf::from("config").join("settings.json"),
            litellm_config_path: PathBuf::from("litellm-config.yaml"),
            frontend_url: None,
            rate_limit_per_minute: 300,
            max_body_kb: 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("LITEDASH_HOST") {
            config.host = host;
        }

        if let Ok(port) = std::env::var("LITEDASH_PORT") {
            if let Ok(p) = port.parse() {
                config.port = p;
            }
        }

        if let Ok(url) = std::env::var("LITELLM_URL") {
            config.litellm_url = url.trim_end_matches('/').to_string();
        }

        if let Ok(key) = std::env::var("LITELLM_MASTER_KEY") {
            config.litellm_master_key = key;
        }

        if let Ok(username) = std::env::var("LITELLM_UI_USERNAME") {
            config.admin_username = username;
        }

        if let Ok(password) = std::env::var("LITELLM_UI_PASSWORD") {
            config.admin_password = password;
        }

        if let Ok(secret) = std::env::var("LITEDASH_SESSION_SECRET") {
            if !secret.is_empty() {
                config.session_secret = Some(secret);
            }
        }

        if let Ok(password) = std::env::var("LITEDASH_FALLBACK_PASSWORD") {
            config.fallback_password = password;
        }

        if let Ok(path) = std::env::var("LITEDASH_SETTINGS_PATH") {
            config.settings_path = PathBuf::from(path);
        }

        if let Ok(path) = std::env::var("LITEDASH_LITELLM_CONFIG") {
            config.litellm_config_path = PathBuf::from(path);
        }

        if let Ok(frontend_url) = std::env::var("LITEDASH_FRONTEND_URL") {
            if !frontend_url.is_empty() {
                config.frontend_url = Some(frontend_url);
            }
        }

        if let Ok(limit) = std::env::var("LITEDASH_RATE_LIMIT_PER_MINUTE") {
            if let Ok(l) = limit.parse() {
                config.rate_limit_per_minute = l;
            }
        }

        if let Ok(size) = std::env::var("LITEDASH_MAX_BODY_KB") {
            if let Ok(s) = size.parse() {
                config.max_body_kb = s;
            }
        }

        config
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_kb * 1024
    }

    pub fn fallback_password_enabled(&self) -> bool {
        !self.fallback_password.is_empty()
    }
}
