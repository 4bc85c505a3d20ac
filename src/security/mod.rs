//! Transport security subsystem.
//!
//! # Data Flow
//! ```text
//! SecurityProvider (mtls.rs: PEM files → rustls ServerConfig)
//!     → SecurityContext::Configured | SecurityContext::Unconfigured
//!     → lifecycle decides TLS or plaintext at start
//! ```
//!
//! # Design Decisions
//! - TLS is opportunistic: a provider failure yields `Unconfigured`, never a panic
//! - The context is a sum type so every consumer handles the plaintext branch
//! - Mutual TLS is enabled by configuring a client CA bundle

pub mod mtls;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use rustls::ServerConfig;

pub use mtls::MtlsProvider;

/// Error type for certificate provisioning.
#[derive(Debug, thiserror::Error)]
pub enum SecurityError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no certificates found in {0:?}")]
    NoCertificates(PathBuf),
    #[error("no private key found in {0:?}")]
    NoPrivateKey(PathBuf),
    #[error("invalid client CA certificate: {0}")]
    ClientCa(String),
    #[error("TLS configuration rejected: {0}")]
    Tls(#[from] rustls::Error),
    #[error("security provider unavailable: {0}")]
    Unavailable(String),
}

/// Produces the server side TLS configuration from installed certificate material.
pub trait SecurityProvider: Send + Sync {
    /// Build a server configuration. Called at construction and again on
    /// every `initialize`, so rotated files on disk are picked up.
    fn server_tls_config(&self) -> Result<Arc<ServerConfig>, SecurityError>;
}

/// TLS material held by a configured context.
#[derive(Clone)]
pub struct TlsMaterial {
    config: Arc<ServerConfig>,
}

impl TlsMaterial {
    /// Configuration in the form the listener consumes.
    pub fn rustls_config(&self) -> RustlsConfig {
        RustlsConfig::from_config(Arc::clone(&self.config))
    }
}

impl fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alpn: Vec<_> = self
            .config
            .alpn_protocols
            .iter()
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .collect();
        f.debug_struct("TlsMaterial").field("alpn", &alpn).finish()
    }
}

/// Result of asking a provider for TLS material.
#[derive(Debug, Clone)]
pub enum SecurityContext {
    Configured(TlsMaterial),
    Unconfigured,
}

impl SecurityContext {
    /// Ask the provider for material, degrading to `Unconfigured` on failure.
    pub fn provision(provider: &dyn SecurityProvider) -> Self {
        match Self::try_provision(provider) {
            Ok(context) => context,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to configure mTLS, proceeding without TLS");
                SecurityContext::Unconfigured
            }
        }
    }

    /// Ask the provider for material, surfacing the failure.
    pub fn try_provision(provider: &dyn SecurityProvider) -> Result<Self, SecurityError> {
        let config = provider.server_tls_config()?;
        Ok(SecurityContext::Configured(TlsMaterial { config }))
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, SecurityContext::Configured(_))
    }
}

/// A provider for deployments that never serve TLS.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTls;

impl SecurityProvider for NoTls {
    fn server_tls_config(&self) -> Result<Arc<ServerConfig>, SecurityError> {
        Err(SecurityError::Unavailable("no certificate source configured".into()))
    }
}
