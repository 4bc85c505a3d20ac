//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::{AppConfig, GraphQLConfig, ObservabilityConfig};
use crate::config::validation::{validate_config, Section};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Load a configuration file. Values missing from the file take their defaults.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Turn a load result into a usable configuration.
///
/// Never fails: a load error yields the defaults, and a section that does not
/// validate is replaced by its defaults. Every substitution is logged.
pub fn resolve(loaded: Result<AppConfig, ConfigError>) -> AppConfig {
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load configuration, using defaults");
            return AppConfig::default();
        }
    };

    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            tracing::warn!(error = %error, "Invalid configuration value");
        }

        if errors.iter().any(|e| e.section == Section::GraphQL) {
            tracing::warn!(section = %Section::GraphQL, "Using default section");
            config.graphql = GraphQLConfig::default();
        }
        if errors.iter().any(|e| e.section == Section::Observability) {
            tracing::warn!(section = %Section::Observability, "Using default section");
            config.observability = ObservabilityConfig::default();
        }
    }

    config
}

/// Load and resolve in one step. `None` means "no file", i.e. defaults.
pub fn resolve_path(path: Option<&Path>) -> AppConfig {
    match path {
        Some(path) => resolve(load_config(path)),
        None => AppConfig::default(),
    }
}
