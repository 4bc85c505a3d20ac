//! TLS and mutual TLS listener tests.

use graphql_service::config::SecurityConfig;
use graphql_service::{LifecycleError, Service};

mod common;

fn https_url(service: &graphql_service::GraphQLService) -> String {
    format!("https://{}/graphql", service.local_addr().unwrap())
}

fn mutual(pki: &common::TestPki) -> SecurityConfig {
    SecurityConfig {
        client_ca_file_path: pki.ca_cert.display().to_string(),
    }
}

#[tokio::test]
async fn tls_service_serves_https_only() {
    let pki = common::TestPki::generate();
    let mut service = common::start_service(pki.tls_config(), &SecurityConfig::default()).await;
    assert!(service.transport().is_tls());

    let client = common::insecure_client().build().unwrap();
    let body = common::query_status(&client, &https_url(&service)).await.unwrap();
    assert!(body.contains("Service is healthy"));

    let plain_url = format!("http://{}/graphql", service.local_addr().unwrap());
    assert!(common::query_status(&common::plain_client(), &plain_url)
        .await
        .is_err());

    service.stop().await.unwrap();
}

#[tokio::test]
async fn mutual_tls_requires_client_certificate() {
    let pki = common::TestPki::generate();
    let mut service = common::start_service(pki.tls_config(), &mutual(&pki)).await;
    let url = https_url(&service);

    let anonymous = common::insecure_client().build().unwrap();
    assert!(common::query_status(&anonymous, &url).await.is_err());

    let authenticated = common::insecure_client()
        .identity(pki.client_identity())
        .build()
        .unwrap();
    let body = common::query_status(&authenticated, &url).await.unwrap();
    assert!(body.contains("Service is healthy"));

    service.stop().await.unwrap();
}

#[tokio::test]
async fn initialize_fails_when_configured_material_disappears() {
    let pki = common::TestPki::generate();
    let mut service = common::build_service(pki.tls_config(), &SecurityConfig::default());
    assert!(service.security_context().is_configured());

    std::fs::remove_file(&pki.server_cert).unwrap();
    let err = service.initialize().await.unwrap_err();
    assert!(matches!(err, LifecycleError::Security(_)));
}

#[tokio::test]
async fn initialize_picks_up_material_that_appears_later() {
    let pki = common::TestPki::generate();
    let cert = std::fs::read(&pki.server_cert).unwrap();
    std::fs::remove_file(&pki.server_cert).unwrap();

    let mut service = common::build_service(pki.tls_config(), &SecurityConfig::default());
    assert!(!service.security_context().is_configured());

    std::fs::write(&pki.server_cert, cert).unwrap();
    service.initialize().await.unwrap();
    assert!(service.transport().is_tls());
}
