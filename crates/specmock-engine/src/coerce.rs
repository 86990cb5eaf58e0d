//! Conversion of raw parameter strings into typed JSON values.
//!
//! Values that do not parse are passed through as JSON strings so the
//! schema validator reports them as type mismatches.

use serde_json::{Number, Value};
use specmock_core::{CollectionFormat, Resolver, Result, SchemaNode};

/// Coerce the raw occurrences of one parameter according to its schema.
pub fn coerce_parameter(
    schema: &SchemaNode,
    raw: &[String],
    format: CollectionFormat,
    resolver: Resolver<'_>,
) -> Result<Value> {
    let schema = resolver.resolve(schema)?;

    if let SchemaNode::Array(arr) = schema {
        let parts: Vec<&str> = match format.separator() {
            Some(separator) => raw
                .first()
                .filter(|value| !value.is_empty())
                .map(|value| value.split(separator).collect())
                .unwrap_or_default(),
            None => raw.iter().map(String::as_str).collect(),
        };
        let items = resolver.resolve(&arr.items)?;
        return Ok(Value::Array(
            parts.into_iter().map(|part| coerce_scalar(items, part)).collect(),
        ));
    }

    let first = raw.first().map(String::as_str).unwrap_or_default();
    Ok(coerce_scalar(schema, first))
}

/// Coerce a single string against a non-array schema.
pub fn coerce_scalar(schema: &SchemaNode, raw: &str) -> Value {
    let parsed = match schema {
        SchemaNode::Integer(_) => parse_integer(raw),
        SchemaNode::Number(_) => parse_number(raw),
        SchemaNode::Boolean(_) => match raw {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        SchemaNode::Object(_) | SchemaNode::Array(_) | SchemaNode::Any(_) => {
            serde_json::from_str(raw).ok()
        }
        SchemaNode::String(_) | SchemaNode::Reference(_) => None,
    };
    parsed.unwrap_or_else(|| Value::String(raw.to_string()))
}

fn parse_integer(raw: &str) -> Option<Value> {
    if let Ok(n) = raw.trim().parse::<i64>() {
        return Some(Value::from(n));
    }
    if let Ok(n) = raw.trim().parse::<u64>() {
        return Some(Value::from(n));
    }
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .and_then(Number::from_f64)
        .map(Value::Number)
}

fn parse_number(raw: &str) -> Option<Value> {
    if let Ok(n) = raw.trim().parse::<i64>() {
        return Some(Value::from(n));
    }
    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn node(schema: Value) -> SchemaNode {
        SchemaNode::from_value(&schema).unwrap()
    }

    fn raw(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(coerce_scalar(&node(json!({"type": "integer"})), "42"), json!(42));
        assert_eq!(coerce_scalar(&node(json!({"type": "integer"})), "abc"), json!("abc"));
        assert_eq!(coerce_scalar(&node(json!({"type": "integer"})), "1.5"), json!("1.5"));
        assert_eq!(coerce_scalar(&node(json!({"type": "number"})), "1.5"), json!(1.5));
        assert_eq!(coerce_scalar(&node(json!({"type": "boolean"})), "true"), json!(true));
        assert_eq!(coerce_scalar(&node(json!({"type": "boolean"})), "yes"), json!("yes"));
        assert_eq!(coerce_scalar(&node(json!({"type": "string"})), "7"), json!("7"));
    }

    #[test]
    fn test_collection_formats() {
        let defs = BTreeMap::new();
        let resolver = Resolver::new(&defs);
        let schema = node(json!({"type": "array", "items": {"type": "integer"}}));

        let csv = coerce_parameter(&schema, &raw(&["1,2,3"]), CollectionFormat::Csv, resolver);
        assert_eq!(csv.unwrap(), json!([1, 2, 3]));

        let pipes = coerce_parameter(&schema, &raw(&["1|x"]), CollectionFormat::Pipes, resolver);
        assert_eq!(pipes.unwrap(), json!([1, "x"]));

        let multi = coerce_parameter(&schema, &raw(&["4", "5"]), CollectionFormat::Multi, resolver);
        assert_eq!(multi.unwrap(), json!([4, 5]));

        let empty = coerce_parameter(&schema, &raw(&[""]), CollectionFormat::Csv, resolver);
        assert_eq!(empty.unwrap(), json!([]));
    }
}
