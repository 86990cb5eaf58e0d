//! Reading documents and values from disk.

use serde_json::Value;
use specmock_core::Document;
use std::path::Path;
use tracing::debug;

/// Parse a YAML or JSON file into a generic value.
pub fn read_value(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    parse_value(&content)
}

/// YAML is a superset of JSON, so one parser covers both.
pub fn parse_value(content: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;
    Ok(into_json(yaml))
}

/// Non-string mapping keys such as unquoted status codes become strings.
fn into_json(yaml: serde_yaml::Value) -> Value {
    match yaml {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::Array(items.into_iter().map(into_json).collect()),
        serde_yaml::Value::Mapping(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (mapping_key(key), into_json(value)))
                .collect(),
        ),
        serde_yaml::Value::Tagged(tagged) => into_json(tagged.value),
    }
}

fn mapping_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Load and build a document.
pub fn load_document(path: &Path) -> Result<Document, Box<dyn std::error::Error>> {
    let value = read_value(path)?;
    let document = Document::from_value(&value)?;
    debug!(path = %path.display(), paths = document.paths().len(), "Loaded document");
    Ok(document)
}

/// Split a `name=value` argument.
pub fn parse_pair(arg: &str) -> Result<(String, String), String> {
    arg.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("Expected name=value, got '{}'", arg))
}
