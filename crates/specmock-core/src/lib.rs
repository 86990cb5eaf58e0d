//! specmock core
//!
//! Document model, schema nodes, path templates and reference resolution
//! for Swagger 2.0 API descriptions. This crate performs no I/O: it
//! consumes an already decoded `serde_json::Value` and defines the shared
//! vocabulary used by the other specmock crates.

pub mod document;
pub mod error;
pub mod resolver;
pub mod schema;
pub mod template;

pub use document::{
    CollectionFormat, Document, HttpMethod, Operation, Parameter, ParameterLocation, PathItem,
    Response,
};
pub use error::{Error, Result};
pub use resolver::{Resolved, Resolver};
pub use schema::{
    AdditionalProperties, AnySchema, ArraySchema, BooleanSchema, NumericSchema, ObjectSchema,
    SchemaNode, StringSchema, definition_name,
};
pub use template::{PathTemplate, Segment};
