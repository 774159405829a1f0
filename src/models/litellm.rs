//! Record normalizzati delle risposte LiteLLM.
//!
//! LiteLLM cambia forma dei payload tra versioni: ogni endpoint letto dalla
//! dashboard ha una sola funzione che decide "sotto quale campo sta il dato".

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{json, Map, Value};

use crate::utils::{array_field, as_array, first_truthy, lenient_f64, str_field, truthy};

/// `GET /user/info`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserInfo {
    pub user_id: Option<String>,
    pub password: Option<String>,
    /// `user_info.metadata.ui_password`
    pub ui_password: Option<String>,
    pub user_email: Option<String>,
    pub spend: f64,
    pub max_budget: Option<f64>,
    pub team_id: Value,
    pub models: Value,
    pub keys: Value,
}

impl UserInfo {
    pub fn from_upstream(payload: &Value) -> Self {
        let info = payload.get("user_info").cloned().unwrap_or(Value::Null);
        let metadata = info.get("metadata").cloned().unwrap_or(Value::Null);

        Self {
            user_id: str_field(payload, "user_id").map(str::to_string),
            password: str_field(&info, "password").map(str::to_string),
            ui_password: str_field(&metadata, "ui_password").map(str::to_string),
            user_email: str_field(&info, "user_email").map(str::to_string),
            spend: info.get("spend").and_then(lenient_f64).unwrap_or(0.0),
            // 0 equivale a "nessun budget"
            max_budget: info
                .get("max_budget")
                .and_then(lenient_f64)
                .filter(|b| *b != 0.0),
            team_id: truthy_or(info.get("team_id"), Value::Null),
            models: truthy_or(info.get("models"), json!([])),
            keys: first_truthy(&[payload.get("keys"), payload.get("models")])
                .cloned()
                .unwrap_or_else(|| json!([])),
        }
    }

    /// Password candidate nell'ordine di verifica (esclusa quella universale)
    pub fn stored_passwords(&self) -> impl Iterator<Item = &str> {
        [&self.password, &self.ui_password, &self.user_email]
            .into_iter()
            .filter_map(|p| p.as_deref())
    }
}

fn truthy_or(value: Option<&Value>, default: Value) -> Value {
    value.filter(|v| truthy(v)).cloned().unwrap_or(default)
}

/// `GET /user/list`
pub fn user_list(payload: &Value) -> Vec<Value> {
    array_field(payload, "users")
}

/// Mappa `user_id -> user_email` per arricchire i log
pub fn email_map(users: &[Value]) -> HashMap<String, String> {
    users
        .iter()
        .filter_map(|u| Some((str_field(u, "user_id")?, str_field(u, "user_email")?)))
        .map(|(id, email)| (id.to_string(), email.to_string()))
        .collect()
}

/// `GET /model/info`, `/v1/models`, `/v1/model/info`
pub fn data_list(payload: &Value) -> Vec<Value> {
    array_field(payload, "data")
}

/// `GET /guardrails/list`
pub fn guardrail_list(payload: &Value) -> Vec<Value> {
    array_field(payload, "guardrails")
}

/// `GET /v1/mcp/server`
pub fn mcp_servers(payload: &Value) -> Vec<Value> {
    as_array(payload)
}

/// `GET /mcp/tools/list`: `{tools: [...]}` oppure direttamente un array
pub fn mcp_tools(payload: &Value) -> Vec<Value> {
    match payload.get("tools") {
        Some(Value::Array(tools)) => tools.clone(),
        _ => as_array(payload),
    }
}

/// `GET /spend/logs`: array oppure `{logs: [...]}`. Le voci non oggetto vengono scartate.
pub fn log_entries(payload: Value) -> Vec<Map<String, Value>> {
    let entries = match payload {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("logs") {
            Some(Value::Array(entries)) => entries,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    entries
        .into_iter()
        .filter_map(|entry| match entry {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}

/// Istante di inizio di una voce di log (`startTime` o `start_time`)
pub fn log_start_time(entry: &Map<String, Value>) -> Option<DateTime<Utc>> {
    let raw = ["startTime", "start_time"]
        .iter()
        .filter_map(|key| entry.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())?;

    parse_timestamp(raw)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    // LiteLLM spesso omette il fuso orario
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Unisce a ogni modello di `/v1/models` i prezzi di `/v1/model/info`
pub fn merge_pricing(models: Vec<Value>, infos: &[Value]) -> Vec<Value> {
    models
        .into_iter()
        .map(|model| {
            let Value::Object(mut map) = model else {
                return model;
            };

            let info = map.get("id").and_then(|id| {
                infos
                    .iter()
                    .find(|i| i.get("model_name") == Some(id))
                    .and_then(|i| i.get("model_info"))
            });

            for field in ["input_cost_per_token", "output_cost_per_token"] {
                let cost = info
                    .and_then(|i| i.get(field))
                    .filter(|v| truthy(v))
                    .cloned()
                    .unwrap_or_else(|| json!(0));
                map.insert(field.to_string(), cost);
            }

            Value::Object(map)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_info_normalization() {
        let payload = json!({
            "user_id": "alice",
            "user_info": {
                "password": "native",
                "user_email": "alice@example.com",
                "metadata": {"ui_password": "meta"},
                "spend": 1.25,
                "max_budget": 0,
                "team_id": "team-1",
                "models": []
            },
            "keys": [{"token": "abc"}]
        });

        let info = UserInfo::from_upstream(&payload);
        assert_eq!(info.user_id.as_deref(), Some("alice"));
        assert_eq!(
            info.stored_passwords().collect::<Vec<_>>(),
            vec!["native", "meta", "alice@example.com"]
        );
        assert_eq!(info.spend, 1.25);
        assert_eq!(info.max_budget, None);
        assert_eq!(info.team_id, json!("team-1"));
        assert_eq!(info.models, json!([]));
        assert_eq!(info.keys, json!([{"token": "abc"}]));
    }

    #[test]
    fn test_user_info_missing_fields() {
        let info = UserInfo::from_upstream(&json!({"user_id": "alice", "user_info": {}}));
        assert_eq!(info.user_id.as_deref(), Some("alice"));
        assert_eq!(info.stored_passwords().count(), 0);
        assert_eq!(info.spend, 0.0);
        assert_eq!(info.team_id, Value::Null);
        assert_eq!(info.keys, json!([]));

        let empty = UserInfo::from_upstream(&json!({"user_id": ""}));
        assert_eq!(empty.user_id, None);
    }

    #[test]
    fn test_keys_fall_back_to_models() {
        let info = UserInfo::from_upstream(&json!({"user_id": "a", "models": ["gpt-4"]}));
        assert_eq!(info.keys, json!(["gpt-4"]));
    }

    #[test]
    fn test_email_map_skips_incomplete_users() {
        let users = vec![
            json!({"user_id": "a", "user_email": "a@x.io"}),
            json!({"user_id": "b"}),
            json!({"user_email": "c@x.io"}),
        ];
        let map = email_map(&users);
        assert_eq!(map.len(), 1);
        assert_eq!(map["a"], "a@x.io");
    }

    #[test]
    fn test_log_entries_shapes() {
        assert_eq!(log_entries(json!([{"a": 1}, 3])).len(), 1);
        assert_eq!(log_entries(json!({"logs": [{"a": 1}, {"b": 2}]})).len(), 2);
        assert!(log_entries(json!({"data": []})).is_empty());
        assert!(log_entries(Value::Null).is_empty());
    }

    #[test]
    fn test_log_start_time_formats() {
        let entry = |v: Value| v.as_object().cloned().unwrap();

        let a = log_start_time(&entry(json!({"startTime": "2024-05-01T10:00:00Z"})));
        let b = log_start_time(&entry(json!({"start_time": "2024-05-01T10:00:00.123456"})));
        let c = log_start_time(&entry(json!({"start_time": "2024-05-01 09:00:00"})));
        assert!(a.is_some() && b.is_some() && c.is_some());
        assert!(b > a);
        assert!(a > c);
        assert!(log_start_time(&entry(json!({"startTime": "yesterday"}))).is_none());
    }

    #[test]
    fn test_mcp_tools_shapes() {
        assert_eq!(mcp_tools(&json!({"tools": [{"name": "t"}]})).len(), 1);
        assert_eq!(mcp_tools(&json!([{"name": "t"}, {"name": "u"}])).len(), 2);
        assert!(mcp_tools(&json!({"other": 1})).is_empty());
    }

    #[test]
    fn test_merge_pricing() {
        let models = vec![json!({"id": "gpt-4"}), json!({"id": "local"})];
        let infos = vec![json!({
            "model_name": "gpt-4",
            "model_info": {"input_cost_per_token": 0.00003, "output_cost_per_token": 0.00006}
        })];

        let merged = merge_pricing(models, &infos);
        assert_eq!(merged[0]["input_cost_per_token"], json!(0.00003));
        assert_eq!(merged[0]["output_cost_per_token"], json!(0.00006));
        assert_eq!(merged[1]["input_cost_per_token"], json!(0));
        assert_eq!(merged[1]["id"], "local");
    }
}
