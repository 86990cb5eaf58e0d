//! specmock schema
//!
//! Example synthesis and structural validation over the schema graph of a
//! [`specmock_core::Document`].

pub mod example;
pub mod validation;

pub use example::{ExampleGenerator, GeneratorOptions, PropertySelection};
pub use validation::{
    SchemaValidator, ValidationResult, ValidatorOptions, Violation, ViolationKind, json_type_name,
};
