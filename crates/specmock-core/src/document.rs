//! Typed view over a parsed Swagger 2.0 document.
//!
//! A [`Document`] is built once from a generic `serde_json::Value` (the
//! product of decoding JSON or YAML text) and is immutable afterwards.
//! Construction checks structural consistency and that every `$ref`
//! points at an existing definition, so consumers never see a partially
//! valid model.

use crate::error::{Error, Result};
use crate::resolver::Resolver;
use crate::schema::{RawSchema, SchemaBuilder, SchemaNode, definition_name};
use crate::template::PathTemplate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// HTTP verbs a Swagger path item may define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown HTTP method: {}", s))
    }
}

/// Where a parameter is carried in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Body,
    FormData,
}

impl ParameterLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Body => "body",
            ParameterLocation::FormData => "formData",
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How array-typed non-body parameters are serialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionFormat {
    #[default]
    Csv,
    Ssv,
    Tsv,
    Pipes,
    Multi,
}

impl CollectionFormat {
    /// Separator between items, `None` for repeated parameters.
    pub fn separator(&self) -> Option<char> {
        match self {
            CollectionFormat::Csv => Some(','),
            CollectionFormat::Ssv => Some(' '),
            CollectionFormat::Tsv => Some('\t'),
            CollectionFormat::Pipes => Some('|'),
            CollectionFormat::Multi => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub schema: SchemaNode,
    pub collection_format: CollectionFormat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub description: Option<String>,
    pub schema: Option<SchemaNode>,
}

/// A verb bound to a path template.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub method: HttpMethod,
    /// Path template, including the document's `basePath`.
    pub path: String,
    /// `operationId`, or the hex SHA-256 of `"{method}|{path}"`.
    pub operation_id: String,
    pub generated_id: bool,
    pub tags: Vec<String>,
    pub consumes: Vec<String>,
    pub parameters: Vec<Parameter>,
    /// Status code (or `default`) to response.
    pub responses: IndexMap<String, Response>,
}

impl Operation {
    pub fn body_parameter(&self) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.location == ParameterLocation::Body)
    }

    pub fn parameters_in(&self, location: ParameterLocation) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(move |p| p.location == location)
    }

    /// True when every declared media type is JSON.
    pub fn consumes_only_json(&self) -> bool {
        !self.consumes.is_empty() && self.consumes.iter().all(|m| m.contains("json"))
    }

    /// Generated id for operations lacking an `operationId`.
    pub fn generated_id_for(method: HttpMethod, path: &str) -> String {
        let digest = Sha256::digest(format!("{}|{}", method, path).as_bytes());
        hex::encode(digest)
    }
}

/// All operations sharing one path template.
#[derive(Debug, Clone, PartialEq)]
pub struct PathItem {
    pub template: PathTemplate,
    pub operations: IndexMap<HttpMethod, Operation>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDocument {
    #[serde(rename = "basePath", default)]
    base_path: Option<String>,
    #[serde(default)]
    definitions: IndexMap<String, Value>,
    #[serde(default)]
    parameters: IndexMap<String, Value>,
    #[serde(default)]
    responses: IndexMap<String, Value>,
    #[serde(default)]
    paths: IndexMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawOperation {
    #[serde(rename = "operationId")]
    operation_id: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    consumes: Vec<String>,
    #[serde(default)]
    parameters: Vec<Value>,
    #[serde(default)]
    responses: IndexMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawParameter {
    name: String,
    #[serde(rename = "in")]
    location: ParameterLocation,
    #[serde(default)]
    required: bool,
    schema: Option<Value>,
    #[serde(rename = "collectionFormat", default)]
    collection_format: CollectionFormat,
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    description: Option<String>,
    schema: Option<Value>,
}

/// Immutable, fully checked API description.
#[derive(Debug, Clone)]
pub struct Document {
    base_path: String,
    definitions: BTreeMap<String, SchemaNode>,
    paths: IndexMap<String, PathItem>,
    operation_index: HashMap<String, (String, HttpMethod)>,
}

impl Document {
    /// Build a document from a generic parsed value.
    pub fn from_value(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::malformed("#", "document must be a mapping"));
        }
        let raw: RawDocument = serde_json::from_value(value.clone())
            .map_err(|e| Error::malformed("#", e.to_string()))?;

        let raw_definitions = raw
            .definitions
            .iter()
            .map(|(name, schema)| {
                RawSchema::from_value(schema, &format!("#/definitions/{name}"))
                    .map(|raw| (name.clone(), raw))
            })
            .collect::<Result<IndexMap<_, _>>>()?;

        let builder = SchemaBuilder::new(&raw_definitions);
        let mut definitions = BTreeMap::new();
        for (name, schema) in &raw_definitions {
            let node = builder.build_definition(name, schema, &format!("#/definitions/{name}"))?;
            definitions.insert(name.clone(), node);
        }

        let tables = SharedTables {
            parameters: &raw.parameters,
            responses: &raw.responses,
            builder: &builder,
        };

        let base_path = raw
            .base_path
            .as_deref()
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_string();

        let mut paths = IndexMap::new();
        let mut operation_index = HashMap::new();
        for (raw_path, path_value) in &raw.paths {
            if raw_path.starts_with("x-") {
                continue;
            }
            let location = format!("#/paths/{raw_path}");
            let Some(path_item) = path_value.as_object() else {
                return Err(Error::malformed(location, "path item must be an object"));
            };
            let full_path = format!("{}{}", base_path, raw_path);
            let template = PathTemplate::parse(&full_path)?;

            let inherited = match path_item.get("parameters") {
                Some(params) => tables.parameters(params, &format!("{location}/parameters"))?,
                None => Vec::new(),
            };

            let mut operations = IndexMap::new();
            for (key, op_value) in path_item {
                let Ok(method) = key.parse::<HttpMethod>() else {
                    if key != "parameters" && !key.starts_with("x-") {
                        warn!(path = %raw_path, key = %key, "Ignoring unknown path item key");
                    }
                    continue;
                };
                let op_location = format!("{location}/{key}");
                let operation =
                    tables.operation(method, &full_path, op_value, &inherited, &op_location)?;

                if operation_index
                    .insert(operation.operation_id.clone(), (full_path.clone(), method))
                    .is_some()
                {
                    return Err(Error::malformed(
                        op_location,
                        format!("duplicate operationId '{}'", operation.operation_id),
                    ));
                }
                operations.insert(method, operation);
            }

            if paths
                .insert(full_path.clone(), PathItem { template, operations })
                .is_some()
            {
                return Err(Error::malformed(location, "duplicate path template"));
            }
        }

        let document = Self {
            base_path,
            definitions,
            paths,
            operation_index,
        };
        document.check_references()?;

        debug!(
            definitions = document.definitions.len(),
            paths = document.paths.len(),
            operations = document.operation_index.len(),
            "Document built"
        );
        Ok(document)
    }

    /// Every `$ref` must name an existing definition.
    fn check_references(&self) -> Result<()> {
        let mut tokens = Vec::new();
        for node in self.definitions.values() {
            node.collect_references(&mut tokens);
        }
        for operation in self.operations() {
            for param in &operation.parameters {
                param.schema.collect_references(&mut tokens);
            }
            for response in operation.responses.values() {
                if let Some(schema) = &response.schema {
                    schema.collect_references(&mut tokens);
                }
            }
        }

        for token in tokens {
            let known = definition_name(token)
                .map(|name| self.definitions.contains_key(&name))
                .unwrap_or(false);
            if !known {
                return Err(Error::UnresolvedReference(token.to_string()));
            }
        }
        Ok(())
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn definitions(&self) -> &BTreeMap<String, SchemaNode> {
        &self.definitions
    }

    pub fn definition(&self, name: &str) -> Option<&SchemaNode> {
        self.definitions.get(name)
    }

    pub fn paths(&self) -> &IndexMap<String, PathItem> {
        &self.paths
    }

    pub fn path(&self, template: &str) -> Option<&PathItem> {
        self.paths.get(template)
    }

    /// Look up an operation by path template and verb.
    pub fn operation(&self, template: &str, method: HttpMethod) -> Option<&Operation> {
        self.paths.get(template)?.operations.get(&method)
    }

    /// Look up an operation by `operationId` or generated id.
    pub fn operation_by_id(&self, id: &str) -> Option<&Operation> {
        let (path, method) = self.operation_index.get(id)?;
        self.operation(path, *method)
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.paths.values().flat_map(|item| item.operations.values())
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.definitions)
    }
}

/// Top-level `parameters` / `responses` tables used to expand `$ref`s.
struct SharedTables<'a> {
    parameters: &'a IndexMap<String, Value>,
    responses: &'a IndexMap<String, Value>,
    builder: &'a SchemaBuilder<'a>,
}

impl SharedTables<'_> {
    fn operation(
        &self,
        method: HttpMethod,
        path: &str,
        value: &Value,
        inherited: &[Parameter],
        location: &str,
    ) -> Result<Operation> {
        if !value.is_object() {
            return Err(Error::malformed(location, "operation must be a mapping"));
        }
        let raw: RawOperation = serde_json::from_value(value.clone())
            .map_err(|e| Error::malformed(location, e.to_string()))?;

        let mut parameters = inherited.to_vec();
        let own = self.parameters(
            &Value::Array(raw.parameters),
            &format!("{location}/parameters"),
        )?;
        for param in own {
            match parameters
                .iter_mut()
                .find(|p| p.name == param.name && p.location == param.location)
            {
                Some(existing) => *existing = param,
                None => parameters.push(param),
            }
        }

        if parameters
            .iter()
            .filter(|p| p.location == ParameterLocation::Body)
            .count()
            > 1
        {
            return Err(Error::malformed(location, "more than one body parameter"));
        }

        let mut responses = IndexMap::new();
        for (status, response) in &raw.responses {
            let response = self.response(response, &format!("{location}/responses/{status}"))?;
            responses.insert(status.clone(), response);
        }

        let (operation_id, generated_id) = match raw.operation_id {
            Some(id) => (id, false),
            None => (Operation::generated_id_for(method, path), true),
        };

        Ok(Operation {
            method,
            path: path.to_string(),
            operation_id,
            generated_id,
            tags: raw.tags,
            consumes: raw.consumes,
            parameters,
            responses,
        })
    }

    fn parameters(&self, value: &Value, location: &str) -> Result<Vec<Parameter>> {
        let Value::Array(items) = value else {
            return Err(Error::malformed(location, "parameters must be a sequence"));
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let item_location = format!("{location}/{i}");
                let item = self.expand(item, "#/parameters/", self.parameters, &item_location)?;
                self.parameter(item, &item_location)
            })
            .collect()
    }

    fn parameter(&self, value: &Value, location: &str) -> Result<Parameter> {
        let raw: RawParameter = serde_json::from_value(value.clone())
            .map_err(|e| Error::malformed(location, e.to_string()))?;

        let schema = match raw.location {
            ParameterLocation::Body => {
                let schema = raw.schema.as_ref().ok_or_else(|| {
                    Error::malformed(location, "body parameter requires a schema")
                })?;
                let schema_location = format!("{location}/schema");
                self.builder
                    .build(&RawSchema::from_value(schema, &schema_location)?, &schema_location)?
            }
            _ => {
                // Inline parameter fields double as a schema once the
                // parameter-only keys are dropped.
                let mut inline = value.clone();
                if let Some(map) = inline.as_object_mut() {
                    for key in ["name", "in", "required", "schema", "description"] {
                        map.remove(key);
                    }
                }
                self.builder
                    .build(&RawSchema::from_value(&inline, location)?, location)?
            }
        };

        Ok(Parameter {
            required: raw.required || raw.location == ParameterLocation::Path,
            name: raw.name,
            location: raw.location,
            schema,
            collection_format: raw.collection_format,
        })
    }

    fn response(&self, value: &Value, location: &str) -> Result<Response> {
        let value = self.expand(value, "#/responses/", self.responses, location)?;
        let raw: RawResponse = serde_json::from_value(value.clone())
            .map_err(|e| Error::malformed(location, e.to_string()))?;

        let schema = match &raw.schema {
            Some(schema) => {
                let schema_location = format!("{location}/schema");
                Some(
                    self.builder
                        .build(&RawSchema::from_value(schema, &schema_location)?, &schema_location)?,
                )
            }
            None => None,
        };

        Ok(Response {
            description: raw.description,
            schema,
        })
    }

    /// Replace a `{"$ref": "<prefix>Name"}` object with its table entry.
    fn expand<'v>(
        &self,
        value: &'v Value,
        prefix: &str,
        table: &'v IndexMap<String, Value>,
        location: &str,
    ) -> Result<&'v Value> {
        let Some(token) = value.get("$ref").and_then(Value::as_str) else {
            if !value.is_object() {
                return Err(Error::malformed(location, "expected a mapping"));
            }
            return Ok(value);
        };
        token
            .strip_prefix(prefix)
            .and_then(|name| table.get(name))
            .ok_or_else(|| Error::UnresolvedReference(token.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_http_method_parse() {
        assert_eq!("GET".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("patch".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert!("fetch".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_generated_operation_id() {
        assert_eq!(
            Operation::generated_id_for(HttpMethod::Post, "/test"),
            "3bd818fb7d55daf2fb8bf3354c061f9ba7f8cece39b30bdcb7e05551053ec2e8"
        );
    }

    #[test]
    fn test_collection_format_separator() {
        assert_eq!(CollectionFormat::default().separator(), Some(','));
        assert_eq!(CollectionFormat::Pipes.separator(), Some('|'));
        assert_eq!(CollectionFormat::Multi.separator(), None);
    }

    #[test]
    fn test_non_mapping_document() {
        let err = Document::from_value(&json!(["not", "a", "doc"])).unwrap_err();
        assert!(matches!(err, Error::MalformedSpec { .. }));
    }

    #[test]
    fn test_path_parameters_always_required() {
        let doc = Document::from_value(&json!({
            "paths": {
                "/items/{id}": {
                    "get": {
                        "parameters": [{"name": "id", "in": "path", "type": "integer"}],
                        "responses": {}
                    }
                }
            }
        }))
        .unwrap();

        let op = doc.operation("/items/{id}", HttpMethod::Get).unwrap();
        assert!(op.parameters[0].required);
        assert_eq!(op.parameters[0].schema.kind_name(), "integer");
    }
}
