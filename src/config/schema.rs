//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs};

use serde::{Deserialize, Serialize};

/// Root configuration file.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// The `[graphql]` section owned by the service itself.
    pub graphql: GraphQLConfig,

    /// Settings for the certificate provider.
    pub security: SecurityConfig,

    /// Logging and metrics exposition.
    pub observability: ObservabilityConfig,
}

/// GraphQL service configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GraphQLConfig {
    /// Listen address. A bare `:port` binds every interface.
    pub address: String,

    /// Serve over TLS when certificate material is available.
    pub use_tls: bool,

    /// Path to certificate chain (PEM).
    pub cert_file_path: String,

    /// Path to private key (PEM).
    pub key_file_path: String,

    /// Serve the GraphiQL page on `GET` of the endpoint.
    pub graphiql: bool,

    /// Maximum nesting depth accepted for a query.
    pub max_query_depth: usize,

    /// Maximum computed complexity accepted for a query.
    pub max_query_complexity: usize,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,

    /// Seconds a client has to finish sending request headers.
    pub read_header_timeout_secs: u64,
}

impl Default for GraphQLConfig {
    fn default() -> Self {
        Self {
            address: ":8081".to_string(),
            use_tls: false,
            cert_file_path: String::new(),
            key_file_path: String::new(),
            graphiql: true,
            max_query_depth: 16,
            max_query_complexity: 256,
            request_timeout_secs: 30,
            max_body_size: 1024 * 1024, // 1MB
            read_header_timeout_secs: 5,
        }
    }
}

impl GraphQLConfig {
    /// Resolve `address` to a socket address.
    ///
    /// `":8081"` is shorthand for `0.0.0.0:8081`; host names are resolved and
    /// the first result wins. Blocks on DNS; async callers use
    /// [`GraphQLConfig::lookup_addr`].
    pub fn socket_addr(&self) -> io::Result<SocketAddr> {
        self.first_addr(self.host_port().to_socket_addrs()?)
    }

    /// Async form of [`GraphQLConfig::socket_addr`].
    pub async fn lookup_addr(&self) -> io::Result<SocketAddr> {
        self.first_addr(tokio::net::lookup_host(self.host_port()).await?)
    }

    fn host_port(&self) -> String {
        if self.address.starts_with(':') {
            format!("0.0.0.0{}", self.address)
        } else {
            self.address.clone()
        }
    }

    fn first_addr(&self, mut addrs: impl Iterator<Item = SocketAddr>) -> io::Result<SocketAddr> {
        addrs.next().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("address {:?} did not resolve", self.address),
            )
        })
    }
}

/// Certificate provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct SecurityConfig {
    /// CA bundle used to verify client certificates (PEM).
    /// When set, clients must present a certificate signed by it.
    pub client_ca_file_path: String,
}

impl SecurityConfig {
    /// The client CA path, if mutual TLS is configured.
    pub fn client_ca(&self) -> Option<&str> {
        Some(self.client_ca_file_path.as_str()).filter(|p| !p.is_empty())
    }
}

/// Level used when none is configured or the configured one is unknown.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
