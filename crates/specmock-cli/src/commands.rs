//! CLI command definitions.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Load a document and summarize it
    Check {
        /// Path to a Swagger 2.0 document (YAML or JSON)
        doc: PathBuf,
    },

    /// Print the example for a definition
    Example {
        /// Path to the document
        doc: PathBuf,

        /// Definition name
        definition: String,
    },

    /// Validate a JSON/YAML value against a definition
    Validate {
        /// Path to the document
        doc: PathBuf,

        /// Definition name, or `-` to list every matching definition
        definition: String,

        /// File holding the value
        value: PathBuf,
    },

    /// Validate a request against its operation
    Request {
        /// Path to the document
        doc: PathBuf,

        /// HTTP method
        method: String,

        /// Concrete request path, optionally with a query string
        path: String,

        /// Query parameter as name=value
        #[arg(short, long)]
        query: Vec<String>,

        /// Header as name=value
        #[arg(short = 'H', long)]
        header: Vec<String>,

        /// Form field as name=value
        #[arg(long)]
        form: Vec<String>,

        /// File holding the request body
        #[arg(short, long)]
        body: Option<PathBuf>,
    },

    /// Print example responses for an operation
    Responses {
        /// Path to the document
        doc: PathBuf,

        /// HTTP method
        method: String,

        /// Concrete request path
        path: String,
    },

    /// List operations and their ids
    Routes {
        /// Path to the document
        doc: PathBuf,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set configuration value
    Set {
        /// Key
        key: String,

        /// Value
        value: String,
    },
}
