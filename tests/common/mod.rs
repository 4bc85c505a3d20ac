//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use graphql_service::config::{GraphQLConfig, SecurityConfig};
use graphql_service::{GraphQLService, MetricsRegistry, MtlsProvider, RootSchemaProvider, Service};
use rcgen::{
    BasicConstraints, CertificateParams, DnType, ExtendedKeyUsagePurpose, IsCa, KeyPair,
    KeyUsagePurpose,
};
use tempfile::TempDir;

pub const STATUS_QUERY: &str = r#"{"query":"{ status }"}"#;

/// A throwaway CA with a server and a client certificate, written as PEM.
pub struct TestPki {
    pub dir: TempDir,
    pub server_cert: PathBuf,
    pub server_key: PathBuf,
    pub ca_cert: PathBuf,
    pub client_cert_pem: String,
    pub client_key_pem: String,
}

impl TestPki {
    pub fn generate() -> Self {
        let dir = tempfile::tempdir().unwrap();

        let ca_key = KeyPair::generate().unwrap();
        let mut ca_params = CertificateParams::new(Vec::<String>::new()).unwrap();
        ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        ca_params
            .distinguished_name
            .push(DnType::CommonName, "graphql-service test CA");
        ca_params.key_usages = vec![
            KeyUsagePurpose::KeyCertSign,
            KeyUsagePurpose::CrlSign,
            KeyUsagePurpose::DigitalSignature,
        ];
        let ca = ca_params.self_signed(&ca_key).unwrap();

        let server_key = KeyPair::generate().unwrap();
        let mut server_params =
            CertificateParams::new(vec!["localhost".to_string(), "127.0.0.1".to_string()])
                .unwrap();
        server_params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];
        let server = server_params.signed_by(&server_key, &ca, &ca_key).unwrap();

        let client_key = KeyPair::generate().unwrap();
        let mut client_params = CertificateParams::new(Vec::<String>::new()).unwrap();
        client_params
            .distinguished_name
            .push(DnType::CommonName, "test client");
        client_params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ClientAuth];
        let client = client_params.signed_by(&client_key, &ca, &ca_key).unwrap();

        let server_cert = dir.path().join("server.crt");
        let server_key_path = dir.path().join("server.key");
        let ca_cert = dir.path().join("ca.crt");
        std::fs::write(&server_cert, server.pem()).unwrap();
        std::fs::write(&server_key_path, server_key.serialize_pem()).unwrap();
        std::fs::write(&ca_cert, ca.pem()).unwrap();

        Self {
            dir,
            server_cert,
            server_key: server_key_path,
            ca_cert,
            client_cert_pem: client.pem(),
            client_key_pem: client_key.serialize_pem(),
        }
    }

    pub fn tls_config(&self) -> GraphQLConfig {
        GraphQLConfig {
            use_tls: true,
            cert_file_path: self.server_cert.display().to_string(),
            key_file_path: self.server_key.display().to_string(),
            ..local_config()
        }
    }

    pub fn client_identity(&self) -> reqwest::Identity {
        reqwest::Identity::from_pkcs8_pem(
            self.client_cert_pem.as_bytes(),
            self.client_key_pem.as_bytes(),
        )
        .unwrap()
    }
}

/// Plaintext on an ephemeral loopback port.
pub fn local_config() -> GraphQLConfig {
    GraphQLConfig {
        address: "127.0.0.1:0".into(),
        ..Default::default()
    }
}

pub fn build_service(config: GraphQLConfig, security: &SecurityConfig) -> GraphQLService {
    let registry = MetricsRegistry::new().unwrap();
    let provider = Arc::new(MtlsProvider::from_config(&config, security));
    let schema = RootSchemaProvider::from_config(&config);
    GraphQLService::new(config, provider, &schema, &registry).unwrap()
}

/// Build, initialize and start a service.
pub async fn start_service(config: GraphQLConfig, security: &SecurityConfig) -> GraphQLService {
    let mut service = build_service(config, security);
    service.initialize().await.unwrap();
    service.start().await.unwrap();
    service
}

pub fn plain_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

/// A client that skips server verification; TLS tests exercise the server side.
pub fn insecure_client() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .no_proxy()
        .danger_accept_invalid_certs(true)
        .danger_accept_invalid_hostnames(true)
        .timeout(Duration::from_secs(5))
}

pub async fn query_status(client: &reqwest::Client, url: &str) -> reqwest::Result<String> {
    client
        .post(url)
        .header("content-type", "application/json")
        .body(STATUS_QUERY)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
}
