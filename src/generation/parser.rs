//! JSON extraction and shape validation for model replies

use super::GenerationError;
use crate::log_debug;
use crate::types::Mode;
use schemars::{JsonSchema, schema_for};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parse a model reply into `T`, rejecting anything that does not match its schema
///
/// Tries the text as-is first, then falls back to extracting the outermost JSON
/// object (models occasionally wrap replies in code fences).
pub fn parse_structured<T>(text: &str, mode: Mode) -> Result<T, GenerationError>
where
    T: DeserializeOwned + JsonSchema,
{
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::Empty);
    }

    let value: Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(e) => {
            log_debug!("Direct JSON parse failed: {}. Attempting extraction.", e);
            serde_json::from_str(&clean_json_from_llm(trimmed))
                .map_err(|e| GenerationError::Parse(e.to_string()))?
        }
    };

    if !value.is_object() {
        return Err(GenerationError::Shape {
            mode,
            reason: "expected a JSON object".to_string(),
        });
    }

    let missing = missing_required_fields::<T>(&value);
    if !missing.is_empty() {
        return Err(GenerationError::Shape {
            mode,
            reason: format!("missing required fields: {}", missing.join(", ")),
        });
    }

    serde_json::from_value(value).map_err(|e| GenerationError::Shape {
        mode,
        reason: e.to_string(),
    })
}

/// Top-level required fields of `T`'s schema that `value` lacks
fn missing_required_fields<T: JsonSchema>(value: &Value) -> Vec<String> {
    let schema = schema_for!(T);
    let schema_value = serde_json::to_value(&schema).unwrap_or(Value::Null);
    let Some(object) = value.as_object() else {
        return vec![];
    };

    schema_value
        .get("required")
        .and_then(Value::as_array)
        .map(|required| {
            required
                .iter()
                .filter_map(Value::as_str)
                .filter(|field| !object.contains_key(*field))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Strip code fences and surrounding prose from a JSON reply
pub fn clean_json_from_llm(json_str: &str) -> String {
    let trimmed = json_str
        .trim_start_matches(|c: char| c.is_whitespace() || !c.is_ascii())
        .trim_end_matches(|c: char| c.is_whitespace() || !c.is_ascii());

    let start = trimmed.find('{').unwrap_or(0);
    let end = trimmed.rfind('}').map_or(trimmed.len(), |i| i + 1);

    trimmed
        .get(start..end)
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}
