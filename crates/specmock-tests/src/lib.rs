//! Shared test infrastructure for specmock.
//!
//! # Usage
//!
//! ```ignore
//! use specmock_tests::DocumentFixture;
//!
//! #[test]
//! fn test_something() {
//!     let document = DocumentFixture::pet_store().build();
//!     // Hand the document to a generator, validator or engine.
//! }
//! ```

pub mod fixtures;

pub use fixtures::*;

/// Initialize test logging (call once per test binary).
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,specmock_tests=debug")),
        )
        .with_test_writer()
        .try_init();
}
