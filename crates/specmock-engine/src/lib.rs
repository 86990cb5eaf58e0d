//! specmock engine
//!
//! Ties a [`specmock_core::Document`] to concrete traffic: matching request
//! paths to templates, validating whole requests and producing example
//! responses for an operation.

pub mod coerce;
pub mod engine;
pub mod matcher;
pub mod request;

pub use engine::{Engine, EngineOptions};
pub use matcher::{PathMatch, PathMatcher};
pub use request::Request;
