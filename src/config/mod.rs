//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → loader::resolve (defaults substituted for anything unusable)
//!     → AppConfig (immutable, captured by value in each service)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once resolved; there is no shared mutable copy
//! - All fields have defaults to allow minimal configs
//! - A bad file never stops the process: defaults plus a warning

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, resolve, resolve_path, ConfigError};
pub use schema::{AppConfig, GraphQLConfig, ObservabilityConfig, SecurityConfig, DEFAULT_LOG_LEVEL};
pub use validation::{is_known_log_level, validate_config, ValidationError};
