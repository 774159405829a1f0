//! Listino pubblico dei modelli, letto dal file di configurazione di LiteLLM.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::models::PublicModel;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid LiteLLM config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Sottoinsieme di `litellm-config.yaml` usato per il listino
#[derive(Debug, Default, Deserialize)]
struct LiteLlmConfigFile {
    #[serde(default)]
    model_list: Vec<ModelListEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelListEntry {
    model_name: String,
    #[serde(default)]
    litellm_params: Option<LiteLlmParams>,
    #[serde(default)]
    model_info: Option<ModelInfo>,
}

#[derive(Debug, Default, Deserialize)]
struct LiteLlmParams {
    model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ModelInfo {
    input_cost_per_token: Option<f64>,
    output_cost_per_token: Option<f64>,
    description: Option<String>,
}

const TOKENS_PER_MILLION: f64 = 1_000_000.0;

#[derive(Debug, Clone)]
pub struct ModelCatalog {
    path: PathBuf,
}

impl ModelCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn load(&self) -> Result<Vec<PublicModel>, CatalogError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| CatalogError::Io {
                path: self.path.clone(),
                source,
            })?;
        parse_catalog(&raw)
    }
}

pub fn parse_catalog(raw: &str) -> Result<Vec<PublicModel>, CatalogError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    // un documento di soli commenti è YAML `null`
    let config: Option<LiteLlmConfigFile> = serde_yaml::from_str(raw)?;
    let config = config.unwrap_or_default();

    Ok(config.model_list.into_iter().map(public_model).collect())
}

fn public_model(entry: ModelListEntry) -> PublicModel {
    let provider = entry
        .litellm_params
        .and_then(|p| p.model)
        .and_then(|m| m.split('/').next().map(str::to_string))
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| "Custom".to_string());

    let info = entry.model_info.unwrap_or_default();

    PublicModel {
        provider,
        input_cost_1m: info.input_cost_per_token.unwrap_or(0.0) * TOKENS_PER_MILLION,
        output_cost_1m: info.output_cost_per_token.unwrap_or(0.0) * TOKENS_PER_MILLION,
        desc: info
            .description
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| format!("High-performance model: {}", entry.model_name)),
        name: entry.model_name,
    }
}
