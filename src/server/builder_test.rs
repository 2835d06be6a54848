use std::sync::Arc;

use super::*;
use crate::test_utils::test_config;
use crate::test_utils::ManualEngine;
use crate::Error;
use crate::ids;
use crate::ServerConfig;

#[test]
fn build_without_runtime_reports_engine_unavailable() {
    let result = ServerBuilder::new(ServerConfig::default()).build();

    assert!(matches!(result, Err(Error::EngineUnavailable(_))));
}

#[tokio::test]
async fn build_binds_tokio_engine_inside_runtime() {
    let server = ServerBuilder::new(test_config()).build().unwrap();

    assert!(server.node_exists(&ids::OBJECTS_FOLDER));
    assert_eq!(server.namespaces()[1], "urn:ua-space:unit");
}

#[test]
fn build_rejects_invalid_config() {
    let mut config = test_config();
    config.server.application_uri.clear();

    let result = ServerBuilder::new(config)
        .engine(Arc::new(ManualEngine::new()))
        .build();

    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn injected_policy_is_used() {
    let mut policy = MockAccessPolicy::new();
    policy.expect_allow().return_const(false);
    let server = ServerBuilder::new(test_config())
        .engine(Arc::new(ManualEngine::new()))
        .access_policy(Box::new(policy))
        .build()
        .unwrap();

    let err = server.read_value(&ids::SERVER).unwrap_err();

    assert_eq!(err.status_code(), crate::StatusCode::BAD_USER_ACCESS_DENIED);
}
