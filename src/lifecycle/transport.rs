//! Listener transport selection.
//!
//! TLS is served only when the configuration asks for it and the security
//! context holds usable material. Every other combination serves plaintext,
//! and that decision is always logged at warning level.

use std::fmt;

use crate::security::{SecurityContext, TlsMaterial};

#[derive(Debug, Clone)]
pub enum Transport {
    Tls(TlsMaterial),
    Plaintext(PlaintextReason),
}

/// Why a listener runs without transport security.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaintextReason {
    /// `use_tls` is off.
    Disabled,
    /// `use_tls` is on but the security provider produced nothing usable.
    Unconfigured,
}

impl Transport {
    pub fn select(use_tls: bool, context: &SecurityContext) -> Self {
        match (use_tls, context) {
            (true, SecurityContext::Configured(material)) => Transport::Tls(material.clone()),
            (true, SecurityContext::Unconfigured) => {
                Transport::Plaintext(PlaintextReason::Unconfigured)
            }
            (false, _) => Transport::Plaintext(PlaintextReason::Disabled),
        }
    }

    pub fn is_tls(&self) -> bool {
        matches!(self, Transport::Tls(_))
    }

    /// Emit the warning for a plaintext decision.
    pub fn announce(&self, service: &str) {
        match self {
            Transport::Tls(_) => {
                tracing::info!(service, "TLS enabled for GraphQL listener");
            }
            Transport::Plaintext(PlaintextReason::Disabled) => {
                tracing::warn!(service, "TLS disabled by configuration, serving plaintext");
            }
            Transport::Plaintext(PlaintextReason::Unconfigured) => {
                tracing::warn!(
                    service,
                    "TLS requested but no security context is available, serving plaintext"
                );
            }
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Tls(_) => f.write_str("https"),
            Transport::Plaintext(_) => f.write_str("http"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::{MtlsProvider, SecurityProvider};

    fn configured() -> SecurityContext {
        let cert = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let cert_path = dir.path().join("server.crt");
        let key_path = dir.path().join("server.key");
        std::fs::write(&cert_path, cert.cert.pem()).unwrap();
        std::fs::write(&key_path, cert.key_pair.serialize_pem()).unwrap();

        let provider = MtlsProvider::new(&cert_path, &key_path);
        let config = provider.server_tls_config().unwrap();
        assert!(!config.alpn_protocols.is_empty());
        SecurityContext::try_provision(&provider).unwrap()
    }

    #[test]
    fn tls_requires_flag_and_material() {
        assert!(Transport::select(true, &configured()).is_tls());
    }

    #[test]
    fn material_without_flag_is_ignored() {
        let transport = Transport::select(false, &configured());
        assert!(matches!(
            transport,
            Transport::Plaintext(PlaintextReason::Disabled)
        ));
    }

    #[test]
    fn flag_without_material_degrades() {
        let transport = Transport::select(true, &SecurityContext::Unconfigured);
        assert!(matches!(
            transport,
            Transport::Plaintext(PlaintextReason::Unconfigured)
        ));
        assert_eq!(transport.to_string(), "http");
    }
}
