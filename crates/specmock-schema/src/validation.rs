//! Validation of JSON values against schema nodes.

use crate::example::within_bounds;
use serde::Serialize;
use serde_json::Value;
use specmock_core::{AdditionalProperties, Document, NumericSchema, Result, SchemaNode};
use std::fmt;
use std::sync::Arc;

/// Distinct causes of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    TypeMismatch,
    MissingRequired,
    EnumMismatch,
    OutOfBounds,
    UnknownProperty,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViolationKind::TypeMismatch => "type mismatch",
            ViolationKind::MissingRequired => "missing required",
            ViolationKind::EnumMismatch => "enum mismatch",
            ViolationKind::OutOfBounds => "out of bounds",
            ViolationKind::UnknownProperty => "unknown property",
        };
        f.write_str(name)
    }
}

/// A single mismatch between a value and its schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// JSON pointer into the validated value.
    pub path: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Outcome of a validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "violations", rename_all = "lowercase")]
pub enum ValidationResult {
    Valid,
    Invalid(Vec<Violation>),
}

impl ValidationResult {
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        if violations.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(violations)
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            ValidationResult::Valid => &[],
            ValidationResult::Invalid(violations) => violations,
        }
    }

    pub fn into_violations(self) -> Vec<Violation> {
        match self {
            ValidationResult::Valid => Vec::new(),
            ValidationResult::Invalid(violations) => violations,
        }
    }
}

/// Validator settings.
#[derive(Debug, Clone, Default)]
pub struct ValidatorOptions {
    /// Reject properties not declared by an object schema.
    pub closed: bool,
}

/// Checks values against the schema graph of one document.
pub struct SchemaValidator {
    document: Arc<Document>,
    options: ValidatorOptions,
}

impl SchemaValidator {
    pub fn new(document: Arc<Document>, options: ValidatorOptions) -> Self {
        Self { document, options }
    }

    /// Validate a value against a node. Reference errors are returned as
    /// `Err`; mismatches are reported in the result.
    pub fn validate(&self, node: &SchemaNode, value: &Value) -> Result<ValidationResult> {
        let mut violations = Vec::new();
        self.check(node, value, "", &mut violations)?;
        Ok(ValidationResult::from_violations(violations))
    }

    /// Validate against a named definition.
    pub fn validate_definition(&self, name: &str, value: &Value) -> Result<ValidationResult> {
        let node = self.document.resolver().definition(name)?;
        self.validate(node, value)
    }

    /// Validate with every violation path prefixed, for embedding into a
    /// larger report.
    pub fn validate_at(
        &self,
        node: &SchemaNode,
        value: &Value,
        prefix: &str,
        violations: &mut Vec<Violation>,
    ) -> Result<()> {
        self.check(node, value, prefix, violations)
    }

    /// Names of every definition the value satisfies, in name order.
    pub fn matching_definitions(&self, value: &Value) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for (name, node) in self.document.definitions() {
            if self.validate(node, value)?.is_valid() {
                names.push(name.clone());
            }
        }
        Ok(names)
    }

    fn check(
        &self,
        node: &SchemaNode,
        value: &Value,
        path: &str,
        violations: &mut Vec<Violation>,
    ) -> Result<()> {
        match node {
            SchemaNode::Reference(_) => {
                let resolved = self.document.resolver().resolve(node)?;
                self.check(resolved, value, path, violations)?;
            }
            SchemaNode::Any(_) => {}
            SchemaNode::Object(obj) => {
                let Value::Object(map) = value else {
                    violations.push(type_mismatch(path, "object", value));
                    return Ok(());
                };

                for name in &obj.required {
                    if !map.contains_key(name) {
                        violations.push(Violation::new(
                            child(path, name),
                            ViolationKind::MissingRequired,
                            format!("Required property '{}' is missing", name),
                        ));
                    }
                }

                for (key, item) in map {
                    let item_path = child(path, key);
                    match obj.properties.get(key) {
                        // A null stands in for an optional value or a
                        // recursive reference cut off during generation.
                        Some(prop)
                            if item.is_null()
                                && (!obj.is_required(key)
                                    || matches!(prop, SchemaNode::Reference(_))) => {}
                        Some(prop) => self.check(prop, item, &item_path, violations)?,
                        None => match &obj.additional_properties {
                            AdditionalProperties::Schema(extra) => {
                                self.check(extra, item, &item_path, violations)?
                            }
                            AdditionalProperties::Any if !self.options.closed => {}
                            AdditionalProperties::Any | AdditionalProperties::Forbidden => {
                                violations.push(Violation::new(
                                    item_path,
                                    ViolationKind::UnknownProperty,
                                    format!("Property '{}' is not allowed", key),
                                ));
                            }
                        },
                    }
                }
            }
            SchemaNode::Array(arr) => {
                let Value::Array(items) = value else {
                    violations.push(type_mismatch(path, "array", value));
                    return Ok(());
                };

                let len = items.len() as u64;
                if let Some(min) = arr.min_items
                    && len < min
                {
                    violations.push(out_of_bounds(path, format!("expected at least {min} items, found {len}")));
                }
                if let Some(max) = arr.max_items
                    && len > max
                {
                    violations.push(out_of_bounds(path, format!("expected at most {max} items, found {len}")));
                }

                for (i, item) in items.iter().enumerate() {
                    self.check(&arr.items, item, &child(path, &i.to_string()), violations)?;
                }
            }
            SchemaNode::String(s) => {
                let Value::String(text) = value else {
                    violations.push(type_mismatch(path, "string", value));
                    return Ok(());
                };
                check_enum(&s.enumeration, value, path, violations);

                let len = text.chars().count() as u64;
                if let Some(min) = s.min_length
                    && len < min
                {
                    violations.push(out_of_bounds(path, format!("expected at least {min} characters, found {len}")));
                }
                if let Some(max) = s.max_length
                    && len > max
                {
                    violations.push(out_of_bounds(path, format!("expected at most {max} characters, found {len}")));
                }
            }
            SchemaNode::Number(s) => {
                let Some(n) = value.as_f64().filter(|_| value.is_number()) else {
                    violations.push(type_mismatch(path, "number", value));
                    return Ok(());
                };
                check_enum(&s.enumeration, value, path, violations);
                check_bounds(s, n, path, violations);
            }
            SchemaNode::Integer(s) => {
                let Some(n) = value.as_f64().filter(|_| is_integral(value)) else {
                    violations.push(type_mismatch(path, "integer", value));
                    return Ok(());
                };
                check_enum(&s.enumeration, value, path, violations);
                check_bounds(s, n, path, violations);
            }
            SchemaNode::Boolean(s) => {
                if !value.is_boolean() {
                    violations.push(type_mismatch(path, "boolean", value));
                    return Ok(());
                }
                check_enum(&s.enumeration, value, path, violations);
            }
        }
        Ok(())
    }
}

/// JSON type name of a value, as used in messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Append an escaped JSON pointer token.
fn child(path: &str, token: &str) -> String {
    format!("{}/{}", path, token.replace('~', "~0").replace('/', "~1"))
}

fn is_integral(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
        }
        _ => false,
    }
}

fn type_mismatch(path: &str, expected: &str, value: &Value) -> Violation {
    Violation::new(
        path,
        ViolationKind::TypeMismatch,
        format!("expected {}, found {}", expected, json_type_name(value)),
    )
}

fn out_of_bounds(path: &str, message: String) -> Violation {
    Violation::new(path, ViolationKind::OutOfBounds, message)
}

/// Numbers compare by value so `1` matches an enum entry `1.0`.
fn enum_contains(values: &[Value], value: &Value) -> bool {
    values.iter().any(|candidate| match (candidate, value) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => candidate == value,
    })
}

fn check_enum(
    enumeration: &Option<Vec<Value>>,
    value: &Value,
    path: &str,
    violations: &mut Vec<Violation>,
) {
    if let Some(values) = enumeration
        && !enum_contains(values, value)
    {
        violations.push(Violation::new(
            path,
            ViolationKind::EnumMismatch,
            format!("{} is not one of {}", value, Value::Array(values.clone())),
        ));
    }
}

fn check_bounds(schema: &NumericSchema, n: f64, path: &str, violations: &mut Vec<Violation>) {
    if within_bounds(schema, n) {
        return;
    }
    let lower = schema
        .minimum
        .map(|m| format!("{}{}", if schema.exclusive_minimum { ">" } else { ">=" }, m));
    let upper = schema
        .maximum
        .map(|m| format!("{}{}", if schema.exclusive_maximum { "<" } else { "<=" }, m));
    let range = [lower, upper].into_iter().flatten().collect::<Vec<_>>().join(" and ");
    violations.push(out_of_bounds(path, format!("{} is not {}", n, range)));
}
