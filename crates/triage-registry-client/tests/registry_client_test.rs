//! Contract tests for RegistryClient against a simulated patient registry.
//!
//! ## Endpoints Tested
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | GET | `/api/v1/patients/temporary-ids/{id}` | `lookup_*` |

use std::sync::Arc;
use std::time::{Duration, Instant};

use triage_core::{
    InMemoryRegistry, PatientRecordValidator, RegistryError, TemporaryIdRegistry,
    ValidatorOptions,
};
use triage_registry_client::{RegistryClient, RegistryClientError, RegistryConfig, RetryPolicy};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Build a RegistryClient pointed at a wiremock server.
fn test_client(mock_server: &MockServer, token: Option<&str>) -> RegistryClient {
    let config = RegistryConfig {
        base_url: mock_server.uri().parse().unwrap(),
        api_token: token.map(str::to_string),
        timeout_secs: 5,
        retry: RetryPolicy::default(),
    };
    RegistryClient::new(config).unwrap()
}

#[tokio::test]
async fn lookup_returns_true_on_200() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/patients/temporary-ids/ABC123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "ABC123"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server, None);
    assert!(client.temporary_id_exists("ABC123").await.unwrap());
}

#[tokio::test]
async fn lookup_returns_false_on_404() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/patients/temporary-ids/NEW-1"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server, None);
    assert!(!client.temporary_id_exists("NEW-1").await.unwrap());
}

#[tokio::test]
async fn lookup_sends_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/patients/temporary-ids/ABC123"))
        .and(header("authorization", "Bearer registry-token"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server, Some("registry-token"));
    assert!(!client.temporary_id_exists("ABC123").await.unwrap());
}

#[tokio::test]
async fn lookup_surfaces_unexpected_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/patients/temporary-ids/ABC123"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database offline"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server, None);
    match client.temporary_id_exists("ABC123").await.unwrap_err() {
        RegistryClientError::ApiError { status, body, .. } => {
            assert_eq!(status, 500);
            assert!(body.contains("database offline"));
        }
        other => panic!("expected ApiError, got: {other:?}"),
    }
}

#[tokio::test]
async fn capability_maps_status_to_upstream_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/patients/temporary-ids/ABC123"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let registry = test_client(&mock_server, None);
    assert_eq!(
        registry.exists("ABC123").await,
        Err(RegistryError::Upstream { status: 503 })
    );
}

#[tokio::test]
async fn capability_reports_unreachable_registry() {
    let config = RegistryConfig {
        base_url: "http://127.0.0.1:1".parse().unwrap(),
        api_token: None,
        timeout_secs: 1,
        retry: RetryPolicy::default(),
    };
    let registry = RegistryClient::new(config).unwrap();
    assert!(matches!(
        registry.exists("ABC123").await,
        Err(RegistryError::Unreachable(_))
    ));
}

#[tokio::test]
async fn unreachable_registry_gives_up_within_lookup_budget() {
    let mut config = RegistryConfig::new("http://127.0.0.1:1".parse().unwrap())
        .with_lookup_budget(Duration::from_millis(150));
    config.retry.max_retries = 5;
    let registry = RegistryClient::new(config).unwrap();

    // Unbounded, five retries would back off for 3.1s. Only the first
    // 100ms backoff fits the budget.
    let started = Instant::now();
    let result = registry.exists("ABC123").await;
    assert!(matches!(result, Err(RegistryError::Unreachable(_))));
    assert!(
        started.elapsed() < Duration::from_millis(1000),
        "lookup ran past its budget: {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn validator_flags_registered_id_through_http() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/patients/temporary-ids/ABC123"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let validator = PatientRecordValidator::emergency_patient(
        Arc::new(test_client(&mock_server, None)),
        ValidatorOptions::default(),
    )
    .unwrap();

    let record = serde_json::json!({
        "patient_temporary_id": "ABC123",
        "emergency_time": "14:30",
        "emergency_first_name": "Jane",
        "emergency_middle_name": "A",
        "emergency_last_name": "Doe",
        "priority_level": "High",
        "B_P": "120/80",
        "temperature": 37,
        "heart_rate": 80,
        "pulse_rate": 78,
        "respiratory_rate": 16,
        "vitals_note": "stable"
    });
    let result = validator.validate_value(&record).await.unwrap();
    assert_eq!(
        result.violations().map(|v| v.messages()),
        Some(vec!["The patient temporary ID must be unique.".to_string()])
    );

    // The in-memory registry answers the same way for the same data.
    let in_memory = PatientRecordValidator::emergency_patient(
        Arc::new(InMemoryRegistry::with_ids(["ABC123"])),
        ValidatorOptions::default(),
    )
    .unwrap();
    assert_eq!(in_memory.validate_value(&record).await.unwrap(), result);
}
