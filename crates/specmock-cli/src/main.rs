//! specmock CLI entrypoint.

use clap::Parser;

mod commands;
mod config;
mod handlers;
mod loader;

use commands::{Commands, ConfigCommands};
use config::{CliConfig, OutputFormat};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "specmock")]
#[command(author, version, about = "Swagger 2.0 example synthesis and validation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for generated values
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Only generate required object properties
    #[arg(long, global = true)]
    required_only: bool,

    /// Ignore examples declared in the document
    #[arg(long, global = true)]
    no_examples: bool,

    /// Reject object properties the schema does not declare
    #[arg(long, global = true)]
    closed: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let mut config = CliConfig::load().unwrap_or_default();
    if let Some(format) = cli.format {
        config.output_format = format;
    }
    config.required_only |= cli.required_only;
    config.use_examples &= !cli.no_examples;
    config.closed |= cli.closed;

    match cli.command {
        Commands::Check { doc } => handlers::check(&doc)?,
        Commands::Example { doc, definition } => handlers::example(&config, &doc, &definition)?,
        Commands::Validate {
            doc,
            definition,
            value,
        } => handlers::validate(&config, &doc, &definition, &value)?,
        Commands::Request {
            doc,
            method,
            path,
            query,
            header,
            form,
            body,
        } => handlers::request(
            &config,
            &doc,
            &method,
            &path,
            &query,
            &header,
            &form,
            body.as_deref(),
        )?,
        Commands::Responses { doc, method, path } => {
            handlers::responses(&config, &doc, &method, &path)?
        }
        Commands::Routes { doc } => handlers::routes(&doc)?,
        Commands::Config { command } => match command {
            ConfigCommands::Show => handlers::show_config(&config)?,
            ConfigCommands::Set { key, value } => handlers::set_config(&key, &value)?,
        },
    }

    Ok(())
}
