//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Configure log level from config, overridable through `RUST_LOG`

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{is_known_log_level, DEFAULT_LOG_LEVEL};

/// The level to log at before configuration is resolved.
///
/// An unknown level would leave the filter without a usable directive and
/// hide the warnings resolution emits, so it falls back to the default.
pub fn effective_level(level: &str) -> &str {
    if is_known_log_level(level) {
        level
    } else {
        DEFAULT_LOG_LEVEL
    }
}

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(level: &str) -> String {
    let level = level.to_ascii_lowercase();
    format!("graphql_service={level},tower_http={level}")
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_tracing(level: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level).into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_targets_service_and_http_layers() {
        assert_eq!(default_filter("WARN"), "graphql_service=warn,tower_http=warn");
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        assert_eq!(effective_level("loud"), "info");
        assert_eq!(default_filter(effective_level("loud")), "graphql_service=info,tower_http=info");
    }

    #[test]
    fn known_level_is_kept() {
        assert_eq!(effective_level("WARN"), "WARN");
        assert_eq!(effective_level("debug"), "debug");
    }
}
