//! Request validation and response synthesis for one document.

use crate::coerce::coerce_parameter;
use crate::matcher::{PathMatch, PathMatcher};
use crate::request::Request;
use serde_json::Value;
use specmock_core::{Document, Error, HttpMethod, Operation, ParameterLocation, Result};
use specmock_schema::{
    ExampleGenerator, GeneratorOptions, SchemaValidator, ValidationResult, ValidatorOptions,
    Violation, ViolationKind,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Options for the generator and validator owned by an [`Engine`].
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    pub generator: GeneratorOptions,
    pub validator: ValidatorOptions,
}

/// Mock engine over an immutable document. Safe to share across threads.
pub struct Engine {
    document: Arc<Document>,
    generator: ExampleGenerator,
    validator: SchemaValidator,
    matcher: PathMatcher,
}

impl Engine {
    pub fn new(document: Arc<Document>, options: EngineOptions) -> Self {
        info!(
            paths = document.paths().len(),
            definitions = document.definitions().len(),
            "Creating engine"
        );
        Self {
            generator: ExampleGenerator::new(document.clone(), options.generator),
            validator: SchemaValidator::new(document.clone(), options.validator),
            matcher: PathMatcher::new(&document),
            document,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn generator(&self) -> &ExampleGenerator {
        &self.generator
    }

    pub fn validator(&self) -> &SchemaValidator {
        &self.validator
    }

    pub fn matcher(&self) -> &PathMatcher {
        &self.matcher
    }

    /// Match a concrete path and look up the operation for `method`.
    pub fn route(&self, path: &str, method: HttpMethod) -> Result<(PathMatch, &Operation)> {
        let found = self
            .matcher
            .matches(path)
            .ok_or_else(|| Error::PathNotFound(path.to_string()))?;
        let operation = self
            .document
            .operation(&found.template, method)
            .ok_or_else(|| Error::OperationNotFound {
                path: found.template.clone(),
                method: method.to_string(),
            })?;
        Ok((found, operation))
    }

    /// Validate every part of a request against its operation.
    ///
    /// All mismatches are collected; only routing and reference failures
    /// are returned as errors.
    pub fn validate_request(&self, request: &Request) -> Result<ValidationResult> {
        let (found, operation) = self.route(&request.path, request.method)?;
        let resolver = self.document.resolver();
        let mut violations = Vec::new();

        for param in &operation.parameters {
            if param.location == ParameterLocation::Body {
                continue;
            }
            let location = format!("/{}/{}", param.location, pointer_token(&param.name));

            let raw: Vec<String> = match param.location {
                ParameterLocation::Path => found.params.get(&param.name).cloned().into_iter().collect(),
                ParameterLocation::Query => request.query.get(&param.name).cloned().unwrap_or_default(),
                ParameterLocation::Header => request
                    .header_value(&param.name)
                    .map(str::to_string)
                    .into_iter()
                    .collect(),
                ParameterLocation::FormData => request.form.get(&param.name).cloned().unwrap_or_default(),
                ParameterLocation::Body => Vec::new(),
            };

            if raw.is_empty() {
                if param.required {
                    violations.push(Violation::new(
                        location,
                        ViolationKind::MissingRequired,
                        format!("Required {} parameter '{}' is missing", param.location, param.name),
                    ));
                }
                continue;
            }

            let value = coerce_parameter(&param.schema, &raw, param.collection_format, resolver)?;
            self.validator
                .validate_at(&param.schema, &value, &location, &mut violations)?;
        }

        if let Some(param) = operation.body_parameter() {
            match &request.body {
                None if param.required => violations.push(Violation::new(
                    "/body",
                    ViolationKind::MissingRequired,
                    "Required request body is missing",
                )),
                None => {}
                Some(Value::String(text)) if operation.consumes_only_json() => {
                    match serde_json::from_str::<Value>(text) {
                        Ok(body) => {
                            self.validator
                                .validate_at(&param.schema, &body, "/body", &mut violations)?
                        }
                        Err(e) => violations.push(Violation::new(
                            "/body",
                            ViolationKind::TypeMismatch,
                            format!("body is not valid JSON: {}", e),
                        )),
                    }
                }
                Some(body) => {
                    self.validator
                        .validate_at(&param.schema, body, "/body", &mut violations)?
                }
            }
        }

        debug!(
            operation = %operation.operation_id,
            violations = violations.len(),
            "Validated request"
        );
        Ok(ValidationResult::from_violations(violations))
    }

    /// Example payload for every declared response that has a schema,
    /// keyed by status code.
    pub fn enumerate_responses(
        &self,
        path: &str,
        method: HttpMethod,
    ) -> Result<BTreeMap<String, Value>> {
        let (_, operation) = self.route(path, method)?;

        let mut examples = BTreeMap::new();
        for (status, response) in &operation.responses {
            if let Some(schema) = &response.schema {
                examples.insert(status.clone(), self.generator.generate(schema)?);
            }
        }
        debug!(operation = %operation.operation_id, count = examples.len(), "Enumerated responses");
        Ok(examples)
    }

    /// Example body for the operation's body parameter, if it has one.
    pub fn example_request_body(&self, path: &str, method: HttpMethod) -> Result<Option<Value>> {
        let (_, operation) = self.route(path, method)?;
        operation
            .body_parameter()
            .map(|param| self.generator.generate(&param.schema))
            .transpose()
    }
}

fn pointer_token(name: &str) -> String {
    name.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_engine_is_send_and_sync() {
        assert_send_sync::<Engine>();
    }

    #[test]
    fn test_pointer_token() {
        assert_eq!(pointer_token("a/b~c"), "a~1b~0c");
    }

    #[test]
    fn test_route_errors() {
        let document = Document::from_value(&json!({
            "paths": {"/items": {"get": {"responses": {}}}}
        }))
        .unwrap();
        let engine = Engine::new(Arc::new(document), EngineOptions::default());

        assert!(matches!(
            engine.route("/nothing", HttpMethod::Get),
            Err(Error::PathNotFound(_))
        ));
        assert!(matches!(
            engine.route("/items", HttpMethod::Delete),
            Err(Error::OperationNotFound { .. })
        ));
        assert!(engine.route("/items", HttpMethod::Get).is_ok());
    }
}
