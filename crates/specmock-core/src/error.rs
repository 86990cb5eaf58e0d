//! Error types for specmock.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Document construction errors
    #[error("Malformed spec at {location}: {message}")]
    MalformedSpec { location: String, message: String },

    // Reference errors
    #[error("Unresolved reference: {0}")]
    UnresolvedReference(String),

    #[error("Circular reference: {}", chain.join(" -> "))]
    CircularReference { chain: Vec<String> },

    // Routing errors
    #[error("No path matches: {0}")]
    PathNotFound(String),

    #[error("Operation {method} not defined on {path}")]
    OperationNotFound { path: String, method: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Shorthand for a [`Error::MalformedSpec`] at the given location.
    pub fn malformed(location: impl Into<String>, message: impl Into<String>) -> Self {
        Error::MalformedSpec {
            location: location.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
