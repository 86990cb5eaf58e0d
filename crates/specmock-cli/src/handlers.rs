//! Command handlers.

use crate::config::{CliConfig, OutputFormat};
use crate::loader::{load_document, parse_pair, read_value};
use console::style;
use serde::Serialize;
use specmock_core::{Document, HttpMethod};
use specmock_engine::{Engine, Request};
use specmock_schema::ValidationResult;
use std::path::Path;
use std::sync::Arc;

type HandlerResult = Result<(), Box<dyn std::error::Error>>;

fn engine(config: &CliConfig, doc: &Path) -> Result<Engine, Box<dyn std::error::Error>> {
    let document = load_document(doc)?;
    Ok(Engine::new(Arc::new(document), config.engine_options()))
}

fn print<T: Serialize>(format: OutputFormat, value: &T) -> HandlerResult {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

fn parse_method(method: &str) -> Result<HttpMethod, Box<dyn std::error::Error>> {
    Ok(method.parse::<HttpMethod>()?)
}

/// Print violations; an invalid result becomes an error for the exit code.
fn report(result: &ValidationResult) -> HandlerResult {
    match result {
        ValidationResult::Valid => {
            println!("{} Valid", style("✓").green());
            Ok(())
        }
        ValidationResult::Invalid(violations) => {
            println!("{} {} violation(s)", style("✗").red(), violations.len());
            for violation in violations {
                println!(
                    "  {} {} {}",
                    style(format!("[{}]", violation.kind)).yellow(),
                    style(if violation.path.is_empty() { "(root)" } else { violation.path.as_str() }).bold(),
                    violation.message
                );
            }
            Err(format!("{} violation(s)", violations.len()).into())
        }
    }
}

/// Load a document and print a summary.
pub fn check(doc: &Path) -> HandlerResult {
    let document = load_document(doc)?;

    println!("{} Document {} is valid", style("✓").green(), doc.display());
    if !document.base_path().is_empty() {
        println!("  Base path: {}", document.base_path());
    }
    println!("  Definitions: {}", document.definitions().len());
    println!("  Paths: {}", document.paths().len());
    println!("  Operations: {}", document.operations().count());

    Ok(())
}

/// Print the example for a definition.
pub fn example(config: &CliConfig, doc: &Path, definition: &str) -> HandlerResult {
    let engine = engine(config, doc)?;
    let value = engine.generator().generate_definition(definition)?;
    print(config.output_format, &value)
}

/// Validate a value file against a definition, or list matching
/// definitions when `definition` is `-`.
pub fn validate(config: &CliConfig, doc: &Path, definition: &str, value: &Path) -> HandlerResult {
    let engine = engine(config, doc)?;
    let value = read_value(value)?;

    if definition == "-" {
        let names = engine.validator().matching_definitions(&value)?;
        if names.is_empty() {
            println!("{} No definition matches", style("✗").red());
            return Err("no matching definition".into());
        }
        for name in names {
            println!("  {} {}", style("✓").green(), name);
        }
        return Ok(());
    }

    let result = engine.validator().validate_definition(definition, &value)?;
    report(&result)
}

/// Validate a request described on the command line.
#[allow(clippy::too_many_arguments)]
pub fn request(
    config: &CliConfig,
    doc: &Path,
    method: &str,
    path: &str,
    query: &[String],
    headers: &[String],
    form: &[String],
    body: Option<&Path>,
) -> HandlerResult {
    let engine = engine(config, doc)?;
    let mut request = Request::new(parse_method(method)?, path);

    for arg in query {
        let (name, value) = parse_pair(arg)?;
        request = request.query(name, value);
    }
    for arg in headers {
        let (name, value) = parse_pair(arg)?;
        request = request.header(name, value);
    }
    for arg in form {
        let (name, value) = parse_pair(arg)?;
        request = request.form(name, value);
    }
    if let Some(body) = body {
        request = request.body(read_value(body)?);
    }

    let result = engine.validate_request(&request)?;
    report(&result)
}

/// Print example responses keyed by status code.
pub fn responses(config: &CliConfig, doc: &Path, method: &str, path: &str) -> HandlerResult {
    let engine = engine(config, doc)?;
    let examples = engine.enumerate_responses(path, parse_method(method)?)?;
    print(config.output_format, &examples)
}

/// List every operation.
pub fn routes(doc: &Path) -> HandlerResult {
    let document: Document = load_document(doc)?;

    for operation in document.operations() {
        let id = if operation.generated_id {
            style(operation.operation_id.as_str()).dim()
        } else {
            style(operation.operation_id.as_str()).cyan()
        };
        println!(
            "{:<7} {:<40} {}",
            operation.method.as_str().to_uppercase(),
            operation.path,
            id
        );
    }

    Ok(())
}

/// Show configuration.
pub fn show_config(config: &CliConfig) -> HandlerResult {
    println!("Current configuration:");
    println!("  output_format: {:?}", config.output_format);
    println!("  required_only: {}", config.required_only);
    println!("  use_examples: {}", config.use_examples);
    println!("  closed: {}", config.closed);

    if let Ok(path) = CliConfig::config_path() {
        println!("\nConfig file: {}", path.display());
    }

    Ok(())
}

/// Set configuration.
pub fn set_config(key: &str, value: &str) -> HandlerResult {
    let mut config = CliConfig::load().unwrap_or_default();
    config.set(key, value)?;
    config.save()?;

    println!("{} Set {} = {}", style("✓").green(), key, value);
    Ok(())
}
