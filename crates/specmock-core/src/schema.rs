//! Schema nodes and their construction from raw Swagger schema objects.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// A typed schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Object(ObjectSchema),
    Array(ArraySchema),
    String(StringSchema),
    Number(NumericSchema),
    Integer(NumericSchema),
    Boolean(BooleanSchema),
    /// Raw `$ref` token, resolved through [`crate::Resolver`].
    Reference(String),
    /// A schema without any constraint (`{}`).
    Any(AnySchema),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    pub properties: IndexMap<String, SchemaNode>,
    /// Required property names in declaration order.
    pub required: Vec<String>,
    pub additional_properties: AdditionalProperties,
    pub example: Option<Value>,
}

/// Policy for properties not listed in `properties`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AdditionalProperties {
    #[default]
    Any,
    Forbidden,
    Schema(Box<SchemaNode>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    pub items: Box<SchemaNode>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub example: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringSchema {
    pub format: Option<String>,
    pub enumeration: Option<Vec<Value>>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub example: Option<Value>,
}

/// Shared by `number` and `integer` schemas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericSchema {
    pub format: Option<String>,
    pub enumeration: Option<Vec<Value>>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: bool,
    pub exclusive_maximum: bool,
    pub example: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BooleanSchema {
    pub enumeration: Option<Vec<Value>>,
    pub example: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnySchema {
    pub example: Option<Value>,
}

impl ObjectSchema {
    /// Check if a property is required.
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

impl SchemaNode {
    /// Build a standalone node. `allOf` members referencing definitions
    /// cannot be merged without a document and fail as unresolved.
    pub fn from_value(value: &Value) -> Result<Self> {
        let raw = RawSchema::from_value(value, "#")?;
        SchemaBuilder::new(&IndexMap::new()).build(&raw, "#")
    }

    /// Construct a reference node pointing at a definition.
    pub fn reference(name: &str) -> Self {
        SchemaNode::Reference(format!("{DEFINITIONS_PREFIX}{name}"))
    }

    /// Swagger type name of this node.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SchemaNode::Object(_) => "object",
            SchemaNode::Array(_) => "array",
            SchemaNode::String(_) => "string",
            SchemaNode::Number(_) => "number",
            SchemaNode::Integer(_) => "integer",
            SchemaNode::Boolean(_) => "boolean",
            SchemaNode::Reference(_) => "$ref",
            SchemaNode::Any(_) => "any",
        }
    }

    /// Example value declared on the node itself, if any.
    pub fn declared_example(&self) -> Option<&Value> {
        match self {
            SchemaNode::Object(s) => s.example.as_ref(),
            SchemaNode::Array(s) => s.example.as_ref(),
            SchemaNode::String(s) => s.example.as_ref(),
            SchemaNode::Number(s) | SchemaNode::Integer(s) => s.example.as_ref(),
            SchemaNode::Boolean(s) => s.example.as_ref(),
            SchemaNode::Any(s) => s.example.as_ref(),
            SchemaNode::Reference(_) => None,
        }
    }

    /// Collect every `$ref` token reachable without crossing a reference.
    pub fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            SchemaNode::Reference(token) => out.push(token),
            SchemaNode::Object(s) => {
                for prop in s.properties.values() {
                    prop.collect_references(out);
                }
                if let AdditionalProperties::Schema(extra) = &s.additional_properties {
                    extra.collect_references(out);
                }
            }
            SchemaNode::Array(s) => s.items.collect_references(out),
            SchemaNode::String(_)
            | SchemaNode::Number(_)
            | SchemaNode::Integer(_)
            | SchemaNode::Boolean(_)
            | SchemaNode::Any(_) => {}
        }
    }
}

/// Extract the definition name from a `$ref` token.
///
/// Accepts `#/definitions/Name` and bare `Name`; anything else pointing
/// elsewhere in (or outside) the document yields `None`.
pub fn definition_name(token: &str) -> Option<String> {
    let name = match token.strip_prefix(DEFINITIONS_PREFIX) {
        Some(rest) => rest,
        None if token.contains('/') || token.starts_with('#') => return None,
        None => token,
    };
    if name.is_empty() || name.contains('/') {
        return None;
    }
    Some(name.replace("~1", "/").replace("~0", "~"))
}

/// `type` may be a single name or a list of names.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum TypeField {
    Single(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ItemsField {
    Single(Box<RawSchema>),
    Tuple(Vec<RawSchema>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum AdditionalField {
    Flag(bool),
    Schema(Box<RawSchema>),
}

/// Schema object as it appears in the document.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawSchema {
    #[serde(rename = "type")]
    pub schema_type: Option<TypeField>,
    pub format: Option<String>,
    pub properties: Option<IndexMap<String, RawSchema>>,
    pub required: Option<Vec<String>>,
    pub items: Option<ItemsField>,
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    #[serde(rename = "allOf")]
    pub all_of: Option<Vec<RawSchema>>,
    pub default: Option<Value>,
    pub example: Option<Value>,
    #[serde(rename = "x-example")]
    pub x_example: Option<Value>,
    #[serde(rename = "additionalProperties")]
    pub additional_properties: Option<AdditionalField>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    #[serde(rename = "exclusiveMinimum", default)]
    pub exclusive_minimum: bool,
    #[serde(rename = "exclusiveMaximum", default)]
    pub exclusive_maximum: bool,
    #[serde(rename = "minLength")]
    pub min_length: Option<u64>,
    #[serde(rename = "maxLength")]
    pub max_length: Option<u64>,
    #[serde(rename = "minItems")]
    pub min_items: Option<u64>,
    #[serde(rename = "maxItems")]
    pub max_items: Option<u64>,
}

impl RawSchema {
    pub(crate) fn from_value(value: &Value, location: &str) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::malformed(location, "schema must be a mapping"));
        }
        serde_json::from_value(value.clone()).map_err(|e| Error::malformed(location, e.to_string()))
    }

    fn type_name(&self) -> Option<&str> {
        match self.schema_type.as_ref()? {
            TypeField::Single(name) => Some(name.as_str()),
            TypeField::Many(names) => names
                .iter()
                .map(String::as_str)
                .find(|n| *n != "null")
                .or(names.first().map(String::as_str)),
        }
    }

    fn declared_example(&self) -> Option<Value> {
        self.example
            .clone()
            .or_else(|| self.x_example.clone())
            .or_else(|| self.default.clone())
    }

    /// Fold `other` into `self` for `allOf` merging. Fields already set on
    /// `self` win, except properties and `required`, which are unioned.
    fn absorb(&mut self, other: RawSchema) {
        if let Some(props) = other.properties {
            let target = self.properties.get_or_insert_with(IndexMap::new);
            for (name, schema) in props {
                target.insert(name, schema);
            }
        }
        if let Some(required) = other.required {
            let target = self.required.get_or_insert_with(Vec::new);
            for name in required {
                if !target.contains(&name) {
                    target.push(name);
                }
            }
        }
        if self.schema_type.is_none() {
            self.schema_type = other.schema_type;
        }
        if self.additional_properties.is_none() {
            self.additional_properties = other.additional_properties;
        }
        if self.items.is_none() {
            self.items = other.items;
        }
        if self.format.is_none() {
            self.format = other.format;
        }
        if self.enum_values.is_none() {
            self.enum_values = other.enum_values;
        }
    }
}

/// Turns raw schema objects into [`SchemaNode`]s, merging `allOf` against
/// the raw definition table.
pub(crate) struct SchemaBuilder<'a> {
    definitions: &'a IndexMap<String, RawSchema>,
}

impl<'a> SchemaBuilder<'a> {
    pub(crate) fn new(definitions: &'a IndexMap<String, RawSchema>) -> Self {
        Self { definitions }
    }

    /// Build a schema that is not the body of a named definition.
    pub(crate) fn build(&self, raw: &RawSchema, location: &str) -> Result<SchemaNode> {
        self.build_in(raw, location, &mut Vec::new())
    }

    /// Build the body of definition `name`. An `allOf` chain leading
    /// straight back to `name` is malformed; a nested schema reaching it
    /// again through `allOf` stays a reference.
    pub(crate) fn build_definition(
        &self,
        name: &str,
        raw: &RawSchema,
        location: &str,
    ) -> Result<SchemaNode> {
        let mut expanding = vec![name.to_string()];
        if raw.reference.is_none() && raw.all_of.is_some() {
            let mut visiting = vec![name.to_string()];
            return self.build_merged(raw, location, &mut visiting, &mut expanding);
        }
        self.build_in(raw, location, &mut expanding)
    }

    /// `expanding` names the definitions whose bodies enclose `raw`.
    fn build_in(
        &self,
        raw: &RawSchema,
        location: &str,
        expanding: &mut Vec<String>,
    ) -> Result<SchemaNode> {
        if let Some(token) = &raw.reference {
            return Ok(SchemaNode::Reference(token.clone()));
        }

        if raw.all_of.is_some() {
            if let Some(token) = recursive_alias(raw, expanding) {
                return Ok(SchemaNode::Reference(token));
            }
            return self.build_merged(raw, location, &mut Vec::new(), expanding);
        }

        self.build_typed(raw, location, expanding)
    }

    /// Flatten `allOf` and build the result. Definitions inlined by the
    /// merge enclose its children until the node is built.
    fn build_merged(
        &self,
        raw: &RawSchema,
        location: &str,
        visiting: &mut Vec<String>,
        expanding: &mut Vec<String>,
    ) -> Result<SchemaNode> {
        let depth = expanding.len();
        let node = self
            .flatten(raw, location, visiting, expanding)
            .and_then(|merged| self.build_typed(&merged, location, expanding));
        expanding.truncate(depth);
        node
    }

    fn build_typed(
        &self,
        raw: &RawSchema,
        location: &str,
        expanding: &mut Vec<String>,
    ) -> Result<SchemaNode> {
        let example = raw.declared_example();

        let type_name = match raw.type_name() {
            Some(name) => name,
            None if raw.properties.is_some() || raw.additional_properties.is_some() => "object",
            None if raw.items.is_some() => "array",
            None => return Ok(SchemaNode::Any(AnySchema { example })),
        };

        let node = match type_name {
            "object" => SchemaNode::Object(self.build_object(raw, example, location, expanding)?),
            "array" => {
                let items = match &raw.items {
                    Some(ItemsField::Single(item)) => {
                        self.build_in(item, &format!("{location}/items"), expanding)?
                    }
                    Some(ItemsField::Tuple(items)) => match items.first() {
                        Some(first) => {
                            self.build_in(first, &format!("{location}/items/0"), expanding)?
                        }
                        None => SchemaNode::Any(AnySchema::default()),
                    },
                    None => SchemaNode::Any(AnySchema::default()),
                };
                SchemaNode::Array(ArraySchema {
                    items: Box::new(items),
                    min_items: raw.min_items,
                    max_items: raw.max_items,
                    example,
                })
            }
            "string" | "file" => SchemaNode::String(StringSchema {
                format: if type_name == "file" {
                    Some("file".to_string())
                } else {
                    raw.format.clone()
                },
                enumeration: raw.enum_values.clone(),
                min_length: raw.min_length,
                max_length: raw.max_length,
                example,
            }),
            "number" => SchemaNode::Number(numeric(raw, example)),
            "integer" => SchemaNode::Integer(numeric(raw, example)),
            "boolean" => SchemaNode::Boolean(BooleanSchema {
                enumeration: raw.enum_values.clone(),
                example,
            }),
            "null" => SchemaNode::Any(AnySchema { example }),
            other => {
                return Err(Error::malformed(
                    location,
                    format!("unknown schema type '{other}'"),
                ));
            }
        };

        Ok(node)
    }

    fn build_object(
        &self,
        raw: &RawSchema,
        example: Option<Value>,
        location: &str,
        expanding: &mut Vec<String>,
    ) -> Result<ObjectSchema> {
        let mut properties = IndexMap::new();
        if let Some(props) = &raw.properties {
            for (name, prop) in props {
                let node =
                    self.build_in(prop, &format!("{location}/properties/{name}"), expanding)?;
                properties.insert(name.clone(), node);
            }
        }

        let additional_properties = match &raw.additional_properties {
            None | Some(AdditionalField::Flag(true)) => AdditionalProperties::Any,
            Some(AdditionalField::Flag(false)) => AdditionalProperties::Forbidden,
            Some(AdditionalField::Schema(extra)) => AdditionalProperties::Schema(Box::new(
                self.build_in(extra, &format!("{location}/additionalProperties"), expanding)?,
            )),
        };

        let mut required: Vec<String> = Vec::new();
        for name in raw.required.iter().flatten() {
            if required.contains(name) {
                continue;
            }
            if !properties.contains_key(name) && raw.additional_properties.is_none() {
                return Err(Error::malformed(
                    format!("{location}/required"),
                    format!("required property '{name}' is not declared in properties"),
                ));
            }
            required.push(name.clone());
        }

        Ok(ObjectSchema {
            properties,
            required,
            additional_properties,
            example,
        })
    }

    /// Merge every `allOf` member into one raw schema. Member properties
    /// come first; the schema's own fields override the members'.
    fn flatten(
        &self,
        raw: &RawSchema,
        location: &str,
        visiting: &mut Vec<String>,
        expanding: &mut Vec<String>,
    ) -> Result<RawSchema> {
        let mut members = RawSchema::default();
        for (i, member) in raw.all_of.iter().flatten().enumerate() {
            let member_location = format!("{location}/allOf/{i}");
            let expanded = self.expand_member(member, &member_location, visiting, expanding)?;
            members.absorb(expanded);
        }

        let mut merged = RawSchema {
            all_of: None,
            ..raw.clone()
        };
        let own = RawSchema {
            properties: merged.properties.take(),
            required: merged.required.take(),
            ..RawSchema::default()
        };
        merged.absorb(members);
        merged.absorb(own);

        if merged.schema_type.is_none() && merged.properties.is_some() {
            merged.schema_type = Some(TypeField::Single("object".to_string()));
        }

        Ok(merged)
    }

    fn expand_member(
        &self,
        member: &RawSchema,
        location: &str,
        visiting: &mut Vec<String>,
        expanding: &mut Vec<String>,
    ) -> Result<RawSchema> {
        let Some(token) = &member.reference else {
            return if member.all_of.is_some() {
                self.flatten(member, location, visiting, expanding)
            } else {
                Ok(member.clone())
            };
        };

        let name =
            definition_name(token).ok_or_else(|| Error::UnresolvedReference(token.clone()))?;
        if visiting.contains(&name) {
            return Err(Error::malformed(
                location,
                format!("allOf reference cycle through '{name}'"),
            ));
        }
        let target = self
            .definitions
            .get(&name)
            .ok_or_else(|| Error::UnresolvedReference(token.clone()))?;

        if expanding.contains(&name) {
            warn!(definition = %name, location = %location, "Skipping recursive allOf member");
            return Ok(RawSchema::default());
        }

        if target.example.is_some() {
            warn!(definition = %name, "Ignoring example of definition merged through allOf");
        }

        visiting.push(name.clone());
        let expanded = self.expand_member(target, location, visiting, expanding);
        visiting.pop();
        expanding.push(name);
        expanded.map(|raw| RawSchema {
            example: None,
            x_example: None,
            default: None,
            ..raw
        })
    }
}

/// Token of the first `allOf` member referring to a definition already
/// being built. Inlining it again would not terminate, so the whole
/// schema collapses to that reference and any sibling constraints drop.
fn recursive_alias(raw: &RawSchema, expanding: &[String]) -> Option<String> {
    let members = raw.all_of.as_deref()?;
    let token = members.iter().find_map(|member| {
        let token = member.reference.as_ref()?;
        let name = definition_name(token)?;
        expanding.contains(&name).then(|| token.clone())
    })?;

    let plain = !is_structural(raw)
        && members.iter().all(|member| {
            member.reference.as_ref() == Some(&token)
                || (member.reference.is_none()
                    && member.all_of.is_none()
                    && !is_structural(member))
        });
    if !plain {
        warn!(reference = %token, "Dropping allOf siblings of a recursive reference");
    }
    Some(token)
}

fn is_structural(raw: &RawSchema) -> bool {
    raw.schema_type.is_some()
        || raw.properties.is_some()
        || raw.required.is_some()
        || raw.items.is_some()
        || raw.additional_properties.is_some()
        || raw.enum_values.is_some()
}

fn numeric(raw: &RawSchema, example: Option<Value>) -> NumericSchema {
    NumericSchema {
        format: raw.format.clone(),
        enumeration: raw.enum_values.clone(),
        minimum: raw.minimum,
        maximum: raw.maximum,
        exclusive_minimum: raw.exclusive_minimum,
        exclusive_maximum: raw.exclusive_maximum,
        example,
    }
}
