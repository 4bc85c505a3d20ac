//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits > 0, addresses resolvable)
//! - Check TLS settings are complete when TLS is requested
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Each error names its section so resolution can reset only that section

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{AppConfig, GraphQLConfig, ObservabilityConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Top-level configuration section an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    GraphQL,
    Observability,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::GraphQL => write!(f, "graphql"),
            Section::Observability => write!(f, "observability"),
        }
    }
}

/// A single semantic problem with a configuration value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{section}.{field}: {message}")]
pub struct ValidationError {
    pub section: Section,
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(section: Section, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            section,
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    validate_graphql(&config.graphql, &mut errors);
    validate_observability(&config.observability, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_graphql(config: &GraphQLConfig, errors: &mut Vec<ValidationError>) {
    let section = Section::GraphQL;

    if let Err(e) = config.socket_addr() {
        errors.push(ValidationError::new(section, "address", e.to_string()));
    }

    if config.use_tls {
        if config.cert_file_path.is_empty() {
            errors.push(ValidationError::new(
                section,
                "cert_file_path",
                "required when use_tls is enabled",
            ));
        }
        if config.key_file_path.is_empty() {
            errors.push(ValidationError::new(
                section,
                "key_file_path",
                "required when use_tls is enabled",
            ));
        }
    }

    let positive = [
        ("max_query_depth", config.max_query_depth as u64),
        ("max_query_complexity", config.max_query_complexity as u64),
        ("request_timeout_secs", config.request_timeout_secs),
        ("max_body_size", config.max_body_size as u64),
        ("read_header_timeout_secs", config.read_header_timeout_secs),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::new(section, field, "must be greater than zero"));
        }
    }
}

/// Whether `level` names a tracing level, ignoring case.
pub fn is_known_log_level(level: &str) -> bool {
    LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str())
}

fn validate_observability(config: &ObservabilityConfig, errors: &mut Vec<ValidationError>) {
    let section = Section::Observability;

    if !is_known_log_level(&config.log_level) {
        errors.push(ValidationError::new(
            section,
            "log_level",
            format!("unknown level {:?}", config.log_level),
        ));
    }

    if config.metrics_enabled && config.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            section,
            "metrics_address",
            format!("invalid socket address {:?}", config.metrics_address),
        ));
    }
}
