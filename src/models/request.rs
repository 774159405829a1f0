use serde::{Deserialize, Deserializer};
use serde_json::{json, Map, Value};
use utoipa::ToSchema;

use crate::utils::{lenient_f64, lenient_i64, parse_metadata, split_csv, truthy};

/// Distingue un campo assente (`None`) da un campo `null` (`Some(Value::Null)`)
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Form utente inviato dal pannello admin (creazione e modifica).
///
/// I campi arrivano come stringhe dai form HTML; `models` è una lista separata
/// da virgole, `metadata` una stringa JSON o testo libero.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UserForm {
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub user_id: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub max_budget: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub password: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Value>,
    /// Lista separata da virgole
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub models: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub tpm_limit: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub rpm_limit: Option<Value>,
    /// JSON oppure testo libero (salvato come `note`)
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub metadata: Option<Value>,
    /// Solo in modifica: ruolo LiteLLM (`user_role`)
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub role: Option<Value>,
}

impl UserForm {
    /// Body per `POST /user/new`
    pub fn to_create_body(&self) -> Value {
        let mut body = Map::new();

        if let Some(user_id) = &self.user_id {
            body.insert("user_id".into(), user_id.clone());
        }
        body.insert("max_budget".into(), float_or_null(self.max_budget.as_ref()));
        body.insert("user_email".into(), truthy_or_null(self.email.as_ref()));
        body.insert("password".into(), truthy_or_null(self.password.as_ref()));
        body.insert("auto_create_key".into(), json!(false));

        if let Some(models) = self.models.as_ref().filter(|v| truthy(v)) {
            body.insert("models".into(), Value::Array(split_csv(models)));
        }
        if is_truthy(self.tpm_limit.as_ref()) {
            body.insert("tpm_limit".into(), int_or_null(self.tpm_limit.as_ref()));
        }
        if is_truthy(self.rpm_limit.as_ref()) {
            body.insert("rpm_limit".into(), int_or_null(self.rpm_limit.as_ref()));
        }
        self.insert_metadata(&mut body);

        Value::Object(body)
    }

    /// Body per `POST /user/update`: solo i campi presenti nel form
    pub fn to_update_body(&self) -> Value {
        let mut body = Map::new();

        if let Some(user_id) = &self.user_id {
            body.insert("user_id".into(), user_id.clone());
        }
        if let Some(role) = self.role.as_ref().filter(|v| truthy(v)) {
            body.insert("user_role".into(), role.clone());
        }
        if self.max_budget.is_some() {
            body.insert("max_budget".into(), float_or_null(self.max_budget.as_ref()));
        }
        if let Some(password) = self.password.as_ref().filter(|v| truthy(v)) {
            body.insert("password".into(), password.clone());
        }
        if self.email.is_some() {
            body.insert("user_email".into(), truthy_or_null(self.email.as_ref()));
        }
        if let Some(models) = &self.models {
            body.insert("models".into(), Value::Array(split_csv(models)));
        }
        if self.tpm_limit.is_some() {
            body.insert("tpm_limit".into(), int_or_null(self.tpm_limit.as_ref()));
        }
        if self.rpm_limit.is_some() {
            body.insert("rpm_limit".into(), int_or_null(self.rpm_limit.as_ref()));
        }
        self.insert_metadata(&mut body);

        Value::Object(body)
    }

    /// La password scelta nel form viene copiata anche in `metadata.ui_password`
    fn insert_metadata(&self, body: &mut Map<String, Value>) {
        let mut meta = match self.metadata.as_ref().filter(|v| truthy(v)) {
            Some(raw) => parse_metadata(raw),
            None => Map::new(),
        };
        if let Some(password) = self.password.as_ref().filter(|v| truthy(v)) {
            meta.insert("ui_password".into(), password.clone());
        }
        if !meta.is_empty() {
            body.insert("metadata".into(), Value::Object(meta));
        }
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    value.map(truthy).unwrap_or(false)
}

fn truthy_or_null(value: Option<&Value>) -> Value {
    value.filter(|v| truthy(v)).cloned().unwrap_or(Value::Null)
}

fn float_or_null(value: Option<&Value>) -> Value {
    value
        .filter(|v| truthy(v))
        .and_then(lenient_f64)
        .map(Value::from)
        .unwrap_or(Value::Null)
}

fn int_or_null(value: Option<&Value>) -> Value {
    value
        .filter(|v| truthy(v))
        .and_then(lenient_i64)
        .map(Value::from)
        .unwrap_or(Value::Null)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteUserRequest {
    pub user_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateModelRequest {
    pub model_name: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub litellm_params: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub model_info: Option<Value>,
}

impl CreateModelRequest {
    /// Body per `POST /model/new`; `model_info` vuoto se non specificato
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        if let Some(name) = &self.model_name {
            body.insert("model_name".into(), json!(name));
        }
        if let Some(params) = &self.litellm_params {
            body.insert("litellm_params".into(), params.clone());
        }
        let model_info = self
            .model_info
            .clone()
            .filter(|v| truthy(v))
            .unwrap_or_else(|| json!({}));
        body.insert("model_info".into(), model_info);
        Value::Object(body)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteModelRequest {
    #[schema(value_type = String)]
    pub id: Value,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteMcpServerRequest {
    pub server_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateKeyRequest {
    /// Alias della chiave
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteKeyRequest {
    pub key: String,
}

/// Richiesta del playground: la chiamata usa la chiave dell'utente, non la master key
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Vec<Object>>)]
    pub messages: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PasswordChangeRequest {
    #[serde(default)]
    pub password: Option<String>,
}
