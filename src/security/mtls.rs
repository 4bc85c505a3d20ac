//! Certificate loading and mutual TLS configuration.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustls::crypto::{aws_lc_rs, CryptoProvider};
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig};

use crate::config::{GraphQLConfig, SecurityConfig};
use crate::security::{SecurityError, SecurityProvider};

/// Loads server certificates from PEM files on every call.
///
/// With a client CA configured, clients must present a certificate chaining
/// to it; otherwise the server authenticates itself only.
#[derive(Debug, Clone)]
pub struct MtlsProvider {
    cert_path: PathBuf,
    key_path: PathBuf,
    client_ca_path: Option<PathBuf>,
}

impl MtlsProvider {
    pub fn new(cert_path: impl Into<PathBuf>, key_path: impl Into<PathBuf>) -> Self {
        Self {
            cert_path: cert_path.into(),
            key_path: key_path.into(),
            client_ca_path: None,
        }
    }

    /// Require client certificates signed by the CA bundle at `path`.
    pub fn with_client_ca(mut self, path: impl Into<PathBuf>) -> Self {
        self.client_ca_path = Some(path.into());
        self
    }

    /// Build from the `[graphql]` and `[security]` sections.
    pub fn from_config(graphql: &GraphQLConfig, security: &SecurityConfig) -> Self {
        let provider = Self::new(&graphql.cert_file_path, &graphql.key_file_path);
        match security.client_ca() {
            Some(ca) => provider.with_client_ca(ca),
            None => provider,
        }
    }

    fn client_roots(&self, path: &Path) -> Result<Arc<RootCertStore>, SecurityError> {
        let mut roots = RootCertStore::empty();
        for cert in load_certs(path)? {
            roots
                .add(cert)
                .map_err(|e| SecurityError::ClientCa(e.to_string()))?;
        }
        Ok(Arc::new(roots))
    }
}

impl SecurityProvider for MtlsProvider {
    fn server_tls_config(&self) -> Result<Arc<ServerConfig>, SecurityError> {
        let certs = load_certs(&self.cert_path)?;
        let key = load_private_key(&self.key_path)?;

        // The process-wide default is ambiguous once several backends are linked.
        let provider: Arc<CryptoProvider> = Arc::new(aws_lc_rs::default_provider());
        let builder = ServerConfig::builder_with_provider(Arc::clone(&provider))
            .with_safe_default_protocol_versions()?;

        let builder = match &self.client_ca_path {
            Some(ca) => {
                let verifier =
                    WebPkiClientVerifier::builder_with_provider(self.client_roots(ca)?, provider)
                        .build()
                        .map_err(|e| SecurityError::ClientCa(e.to_string()))?;
                builder.with_client_cert_verifier(verifier)
            }
            None => builder.with_no_client_auth(),
        };

        let mut config = builder.with_single_cert(certs, key)?;
        config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

        tracing::debug!(
            cert = ?self.cert_path,
            client_auth = self.client_ca_path.is_some(),
            "Server TLS configuration loaded"
        );

        Ok(Arc::new(config))
    }
}

fn open(path: &Path) -> Result<BufReader<File>, SecurityError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| SecurityError::Read {
            path: path.to_path_buf(),
            source,
        })
}

/// Read every certificate from a PEM file.
pub fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, SecurityError> {
    let certs = rustls_pemfile::certs(&mut open(path)?)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| SecurityError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    if certs.is_empty() {
        return Err(SecurityError::NoCertificates(path.to_path_buf()));
    }
    Ok(certs)
}

/// Read the first private key (PKCS#8, PKCS#1 or SEC1) from a PEM file.
pub fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, SecurityError> {
    rustls_pemfile::private_key(&mut open(path)?)
        .map_err(|source| SecurityError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| SecurityError::NoPrivateKey(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct Material {
        dir: tempfile::TempDir,
    }

    impl Material {
        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }
    }

    fn self_signed() -> Material {
        let dir = tempfile::tempdir().unwrap();
        let rcgen::CertifiedKey { cert, key_pair } =
            rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        fs::write(dir.path().join("server.crt"), cert.pem()).unwrap();
        fs::write(dir.path().join("server.key"), key_pair.serialize_pem()).unwrap();
        Material { dir }
    }

    #[test]
    fn loads_server_only_tls() {
        let material = self_signed();
        let provider = MtlsProvider::new(material.path("server.crt"), material.path("server.key"));

        let config = provider.server_tls_config().unwrap();
        assert_eq!(config.alpn_protocols[0], b"h2".to_vec());
    }

    #[test]
    fn loads_with_client_ca() {
        let material = self_signed();
        let provider = MtlsProvider::new(material.path("server.crt"), material.path("server.key"))
            .with_client_ca(material.path("server.crt"));

        assert!(provider.server_tls_config().is_ok());
    }

    #[test]
    fn missing_certificate_is_a_read_error() {
        let material = self_signed();
        let provider = MtlsProvider::new(material.path("absent.crt"), material.path("server.key"));

        let err = provider.server_tls_config().unwrap_err();
        assert!(matches!(err, SecurityError::Read { .. }));
    }

    #[test]
    fn key_file_without_key_is_rejected() {
        let material = self_signed();
        // A certificate PEM contains no private key block.
        let provider = MtlsProvider::new(material.path("server.crt"), material.path("server.crt"));

        let err = provider.server_tls_config().unwrap_err();
        assert!(matches!(err, SecurityError::NoPrivateKey(_)));
    }

    #[test]
    fn empty_certificate_file_is_rejected() {
        let material = self_signed();
        fs::write(material.path("empty.crt"), "").unwrap();
        let provider = MtlsProvider::new(material.path("empty.crt"), material.path("server.key"));

        let err = provider.server_tls_config().unwrap_err();
        assert!(matches!(err, SecurityError::NoCertificates(_)));
    }

    #[test]
    fn config_sections_select_client_ca() {
        let graphql = GraphQLConfig {
            cert_file_path: "a.crt".into(),
            key_file_path: "a.key".into(),
            ..Default::default()
        };
        let provider = MtlsProvider::from_config(&graphql, &SecurityConfig::default());
        assert!(provider.client_ca_path.is_none());

        let security = SecurityConfig {
            client_ca_file_path: "ca.crt".into(),
        };
        let provider = MtlsProvider::from_config(&graphql, &security);
        assert_eq!(provider.client_ca_path, Some(PathBuf::from("ca.crt")));
    }
}
