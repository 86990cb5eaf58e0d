//! CLI configuration management.

use serde::{Deserialize, Serialize};
use specmock_engine::EngineOptions;
use specmock_schema::{GeneratorOptions, PropertySelection, ValidatorOptions};
use std::path::PathBuf;

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Output format.
    #[serde(default)]
    pub output_format: OutputFormat,
    /// Only generate required object properties.
    #[serde(default)]
    pub required_only: bool,
    /// Prefer examples declared in the document.
    #[serde(default = "default_use_examples")]
    pub use_examples: bool,
    /// Reject undeclared object properties.
    #[serde(default)]
    pub closed: bool,
}

fn default_use_examples() -> bool {
    true
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::default(),
            required_only: false,
            use_examples: default_use_examples(),
            closed: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl CliConfig {
    /// Load configuration from file.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::config_path()?;
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        let dirs = directories::ProjectDirs::from("dev", "specmock", "specmock")
            .ok_or("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.yaml"))
    }

    /// Set a configuration value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        let flag = || match value {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(format!("Invalid boolean for {}: {}", key, value)),
        };
        match key {
            "output_format" => {
                self.output_format = match value {
                    "json" => OutputFormat::Json,
                    "yaml" => OutputFormat::Yaml,
                    _ => return Err(format!("Invalid output format: {}", value)),
                };
            }
            "required_only" => self.required_only = flag()?,
            "use_examples" => self.use_examples = flag()?,
            "closed" => self.closed = flag()?,
            _ => return Err(format!("Unknown config key: {}", key)),
        }
        Ok(())
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            generator: GeneratorOptions {
                properties: if self.required_only {
                    PropertySelection::Required
                } else {
                    PropertySelection::All
                },
                use_examples: self.use_examples,
            },
            validator: ValidatorOptions {
                closed: self.closed,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_from_empty_file() {
        let config: CliConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.output_format, OutputFormat::Json);
        assert!(config.use_examples);
        assert!(!config.required_only);
        assert!(!config.closed);
    }

    #[test]
    fn test_set_values() {
        let mut config = CliConfig::default();
        config.set("output_format", "yaml").unwrap();
        config.set("required_only", "true").unwrap();
        config.set("closed", "true").unwrap();

        assert_eq!(config.output_format, OutputFormat::Yaml);
        let options = config.engine_options();
        assert_eq!(options.generator.properties, PropertySelection::Required);
        assert!(options.validator.closed);

        assert!(config.set("closed", "maybe").is_err());
        assert!(config.set("api_url", "x").is_err());
    }
}
