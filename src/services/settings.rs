//! Impostazioni di branding e valuta, salvate in un file JSON piatto.
//!
//! Nessun lock: con più scritture concorrenti vince l'ultima. Il file viene
//! modificato raramente e solo da admin.

use std::path::PathBuf;

use serde_json::{json, Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Unable to write settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unable to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub fn default_settings() -> Map<String, Value> {
    let defaults = json!({
        "appName": "LiteLLM Portal",
        "apiEndpoint": "",
        "logoUrl": "",
        "currency": "USD",
        "currencySymbol": "$",
        "currencyMultiplier": 1
    });
    match defaults {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Legge il file; se manca o non è un oggetto JSON valido restituisce i default
    pub async fn read(&self) -> Map<String, Value> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(_) => return default_settings(),
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            _ => {
                tracing::warn!(
                    "Impostazioni non valide in {}, uso i default",
                    self.path.display()
                );
                default_settings()
            }
        }
    }

    /// Merge superficiale: le chiavi aggiornate sovrascrivono, le altre restano
    pub async fn update(
        &self,
        updates: Map<String, Value>,
    ) -> Result<Map<String, Value>, SettingsError> {
        let mut merged = self.read().await;
        merged.extend(updates);
        self.write(&merged).await?;
        Ok(merged)
    }

    async fn write(&self, settings: &Map<String, Value>) -> Result<(), SettingsError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        let raw = serde_json::to_string_pretty(settings)?;
        tokio::fs::write(&self.path, raw).await?;
        tracing::info!("Impostazioni salvate in {}", self.path.display());
        Ok(())
    }
}
