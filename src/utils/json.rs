//! Helper per leggere i payload JSON "permissivi" di LiteLLM e del frontend.
//!
//! Il frontend invia i campi dei form come stringhe, LiteLLM a volte come
//! numeri o `null`: qui si concentrano le conversioni.

use serde_json::{Map, Value};

/// Semantica truthy storica della dashboard: `null`, `false`, `0`, `""` sono falsy,
/// array e oggetti (anche vuoti) sono truthy.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Primo valore truthy tra i candidati
pub fn first_truthy<'a>(candidates: &[Option<&'a Value>]) -> Option<&'a Value> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|v| truthy(v))
}

/// Numero da JSON numerico o da stringa (`"12.5"`). Stringhe non numeriche = `None`.
pub fn lenient_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number(s.trim()).and_then(|s| s.parse().ok()),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

/// Intero da JSON numerico o da stringa; la parte decimale viene troncata
pub fn lenient_i64(value: &Value) -> Option<i64> {
    lenient_f64(value).map(|f| f.trunc() as i64)
}

/// Prefisso numerico di una stringa, come `parseFloat`: `"10abc"` -> `"10"`
fn leading_number(s: &str) -> Option<&str> {
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        match c {
            '0'..='9' => {
                seen_digit = true;
                end = i + 1;
            }
            '.' if !seen_dot => {
                seen_dot = true;
            }
            '-' | '+' if i == 0 => {}
            _ => break,
        }
    }
    if seen_digit {
        Some(&s[..end])
    } else {
        None
    }
}

/// Lista di modelli da stringa separata da virgole o da array JSON
pub fn split_csv(value: &Value) -> Vec<Value> {
    match value {
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(|m| Value::String(m.to_string()))
            .collect(),
        Value::Array(items) => items.iter().filter(|v| truthy(v)).cloned().collect(),
        _ => Vec::new(),
    }
}

/// Array contenuto in `value[field]`, altrimenti vuoto
pub fn array_field(value: &Value, field: &str) -> Vec<Value> {
    value
        .get(field)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Il body stesso se è un array, altrimenti vuoto
pub fn as_array(value: &Value) -> Vec<Value> {
    value.as_array().cloned().unwrap_or_default()
}

/// Stringa non vuota in `value[field]`
pub fn str_field<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
    value
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Metadata utente da form: oggetto JSON, stringa JSON di un oggetto, oppure
/// testo libero salvato come `{"note": ...}`
pub fn parse_metadata(value: &Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map.clone(),
        Value::String(raw) if !raw.is_empty() => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            _ => note(raw),
        },
        Value::Null => Map::new(),
        other if !truthy(other) => Map::new(),
        other => note(&other.to_string()),
    }
}

fn note(raw: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("note".to_string(), Value::String(raw.to_string()));
    map
}
