//! Example synthesis for schema nodes.

use serde_json::{Map, Value, json};
use specmock_core::{
    AdditionalProperties, Document, Error, NumericSchema, Result, SchemaNode, StringSchema,
    definition_name,
};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, trace};

const INTEGER_SENTINEL: f64 = 42.0;
const NUMBER_SENTINEL: f64 = 5.5;
const ADDITIONAL_KEYS: [&str; 2] = ["additionalProp1", "additionalProp2"];
/// Largest `minItems` / `minLength` an example is generated for.
const MAX_GENERATED_LEN: u64 = 10_000;

/// Which object properties appear in generated examples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PropertySelection {
    #[default]
    All,
    Required,
}

/// Example generation settings.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub properties: PropertySelection,
    /// Prefer `example` / `x-example` / `default` declared on a schema.
    pub use_examples: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            properties: PropertySelection::All,
            use_examples: true,
        }
    }
}

/// Produces representative values for schema nodes.
///
/// Examples for named definitions requested at the top level are cached by
/// definition name; the first computed value is kept.
pub struct ExampleGenerator {
    document: Arc<Document>,
    options: GeneratorOptions,
    cache: RwLock<HashMap<String, Value>>,
}

impl ExampleGenerator {
    pub fn new(document: Arc<Document>, options: GeneratorOptions) -> Self {
        Self {
            document,
            options,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Generate an example for any node.
    pub fn generate(&self, node: &SchemaNode) -> Result<Value> {
        if let SchemaNode::Reference(token) = node
            && let Some(name) = definition_name(token)
            && self.document.definition(&name).is_some()
        {
            return self.generate_definition(&name);
        }

        let mut in_progress = Vec::new();
        Ok(self.expand(node, &mut in_progress)?.unwrap_or(Value::Null))
    }

    /// Generate (or fetch the cached) example for a named definition.
    pub fn generate_definition(&self, name: &str) -> Result<Value> {
        if let Some(cached) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            debug!(definition = %name, "Example cache hit");
            return Ok(cached.clone());
        }

        let node = self
            .document
            .definition(name)
            .ok_or_else(|| Error::UnresolvedReference(name.to_string()))?;

        let mut in_progress = vec![name.to_string()];
        let value = self.expand(node, &mut in_progress)?.unwrap_or(Value::Null);

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Ok(cache.entry(name.to_string()).or_insert(value).clone())
    }

    /// Number of definitions with a cached example.
    pub fn cached(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// `None` means the branch re-entered a definition already being
    /// expanded and was cut off.
    fn expand(&self, node: &SchemaNode, in_progress: &mut Vec<String>) -> Result<Option<Value>> {
        if self.options.use_examples
            && let Some(example) = node.declared_example()
        {
            return Ok(Some(example.clone()));
        }

        let value = match node {
            SchemaNode::Reference(_) => {
                let resolved = self.document.resolver().resolve_chain(node)?;
                if let Some(name) = resolved.chain.iter().find(|n| in_progress.contains(n)) {
                    trace!(definition = %name, "Truncating recursive example");
                    return Ok(None);
                }

                let depth = in_progress.len();
                in_progress.extend(resolved.chain);
                let expanded = self.expand(resolved.node, in_progress);
                in_progress.truncate(depth);
                return expanded;
            }
            SchemaNode::Object(obj) => {
                let mut map = Map::new();
                for (name, prop) in &obj.properties {
                    if self.options.properties == PropertySelection::Required
                        && !obj.is_required(name)
                    {
                        continue;
                    }
                    let value = self.expand(prop, in_progress)?.unwrap_or(Value::Null);
                    map.insert(name.clone(), value);
                }

                if let AdditionalProperties::Schema(extra) = &obj.additional_properties {
                    for key in ADDITIONAL_KEYS {
                        if map.contains_key(key) {
                            continue;
                        }
                        if let Some(value) = self.expand(extra, in_progress)? {
                            map.insert(key.to_string(), value);
                        }
                    }
                }
                Value::Object(map)
            }
            SchemaNode::Array(arr) => {
                let count = arr
                    .min_items
                    .unwrap_or(1)
                    .max(1)
                    .min(arr.max_items.unwrap_or(u64::MAX));
                check_generated_len(count, "minItems", in_progress)?;
                match self.expand(&arr.items, in_progress)? {
                    Some(item) if count > 0 => {
                        Value::Array((0..count).map(|_| item.clone()).collect())
                    }
                    _ => Value::Array(Vec::new()),
                }
            }
            SchemaNode::String(s) => match first_enum(&s.enumeration) {
                Some(value) => value,
                None => string_sample(s, in_progress)?,
            },
            SchemaNode::Number(s) => first_enum(&s.enumeration)
                .unwrap_or_else(|| json!(clamp_number(s, NUMBER_SENTINEL, false))),
            SchemaNode::Integer(s) => first_enum(&s.enumeration)
                .unwrap_or_else(|| json!(clamp_number(s, INTEGER_SENTINEL, true) as i64)),
            SchemaNode::Boolean(s) => first_enum(&s.enumeration).unwrap_or(Value::Bool(true)),
            SchemaNode::Any(_) => Value::Null,
        };

        Ok(Some(value))
    }
}

fn first_enum(values: &Option<Vec<Value>>) -> Option<Value> {
    values.as_ref()?.first().cloned()
}

/// Placeholder text for a string format.
fn format_placeholder(format: Option<&str>) -> &'static str {
    match format {
        Some("date-time") => "2015-08-28T09:02:57.481Z",
        Some("date") => "2015-08-28",
        Some("uuid") => "3fa85f64-5717-4562-b3fc-2c963f66afa6",
        Some("email") => "user@example.com",
        Some("byte") => "c3RyaW5n",
        Some("binary") | Some("file") => "my file contents",
        Some("password") => "password",
        Some("uri") | Some("url") => "https://example.com",
        Some("hostname") => "example.com",
        Some("ipv4") => "127.0.0.1",
        Some("ipv6") => "::1",
        _ => "string",
    }
}

fn string_sample(schema: &StringSchema, in_progress: &[String]) -> Result<Value> {
    let mut sample: String = format_placeholder(schema.format.as_deref()).to_string();
    let len = sample.chars().count() as u64;

    if let Some(min) = schema.min_length
        && len < min
    {
        check_generated_len(min, "minLength", in_progress)?;
        sample.extend(std::iter::repeat_n('x', (min - len) as usize));
    }
    if let Some(max) = schema.max_length
        && (sample.chars().count() as u64) > max
    {
        sample = sample.chars().take(max as usize).collect();
    }
    Ok(Value::String(sample))
}

/// Reject lower bounds too large to materialize. The error names the
/// innermost definition being expanded.
fn check_generated_len(len: u64, keyword: &str, in_progress: &[String]) -> Result<()> {
    if len <= MAX_GENERATED_LEN {
        return Ok(());
    }
    let location = in_progress
        .last()
        .map_or_else(|| "#".to_string(), |name| format!("#/definitions/{name}"));
    Err(Error::malformed(
        location,
        format!("{keyword} {len} exceeds the generation limit of {MAX_GENERATED_LEN}"),
    ))
}

/// Move a sentinel into the declared bounds, if it is not already there.
fn clamp_number(schema: &NumericSchema, sentinel: f64, integral: bool) -> f64 {
    if within_bounds(schema, sentinel) {
        return sentinel;
    }

    let (lower, upper) = if integral {
        (
            schema.minimum.map(|m| {
                if schema.exclusive_minimum {
                    m.floor() + 1.0
                } else {
                    m.ceil()
                }
            }),
            schema.maximum.map(|m| {
                if schema.exclusive_maximum {
                    m.ceil() - 1.0
                } else {
                    m.floor()
                }
            }),
        )
    } else {
        (
            schema.minimum.map(|m| if schema.exclusive_minimum { m + 1.0 } else { m }),
            schema.maximum.map(|m| if schema.exclusive_maximum { m - 1.0 } else { m }),
        )
    };

    match (lower, upper, schema.minimum, schema.maximum) {
        (Some(lo), Some(hi), _, _) if integral => ((lo + hi) / 2.0).floor().max(lo),
        (_, _, Some(min), Some(max)) => (min + max) / 2.0,
        (Some(lo), None, _, _) => lo,
        (None, Some(hi), _, _) => hi,
        _ => sentinel,
    }
}

pub(crate) fn within_bounds(schema: &NumericSchema, n: f64) -> bool {
    let above_min = match schema.minimum {
        Some(min) if schema.exclusive_minimum => n > min,
        Some(min) => n >= min,
        None => true,
    };
    let below_max = match schema.maximum {
        Some(max) if schema.exclusive_maximum => n < max,
        Some(max) => n <= max,
        None => true,
    };
    above_min && below_max
}
