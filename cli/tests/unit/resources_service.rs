//! Resource lifecycle: creation order, idempotence and existing-mode checks.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use lens_deploy::application::services::resources::{PLACEHOLDER_IMAGE, ensure_resources};
use lens_deploy::domain::{DeployError, ResourceSizing};
use lens_deploy_common::{DeploymentMode, ResourceKind};

use crate::helpers::target;
use crate::mocks::{FakeCloud, RecordingReporter};

#[tokio::test]
async fn new_mode_creates_missing_resources_in_dependency_order() {
    let cloud = FakeCloud::empty();
    let outcome = ensure_resources(
        &cloud,
        &target(),
        DeploymentMode::New,
        &ResourceSizing::default(),
        &RecordingReporter::default(),
    )
    .await
    .unwrap();

    assert_eq!(outcome.created, ResourceKind::ORDERED.to_vec());
    assert_eq!(outcome.registry_server, "acrlens.azurecr.io");
    let created = cloud.created();
    assert_eq!(created.len(), 4);
    assert_eq!(created[0], "create:ResourceGroup");
    assert_eq!(created[1], "create:Registry");
    assert_eq!(created[2], "create:Environment");
    assert_eq!(
        created[3],
        format!("create:Application image={PLACEHOLDER_IMAGE} port=8501 server=acrlens.azurecr.io")
    );
}

#[tokio::test]
async fn new_mode_is_idempotent() {
    let cloud = FakeCloud::empty();
    let reporter = RecordingReporter::default();
    let sizing = ResourceSizing::default();

    let first = ensure_resources(&cloud, &target(), DeploymentMode::New, &sizing, &reporter)
        .await
        .unwrap();
    let second = ensure_resources(&cloud, &target(), DeploymentMode::New, &sizing, &reporter)
        .await
        .unwrap();

    assert_eq!(first.created.len(), 4);
    assert!(second.created.is_empty(), "second run must create nothing");
    assert_eq!(cloud.created().len(), 4);
    assert_eq!(first.registry_server, second.registry_server);
}

#[tokio::test]
async fn new_mode_only_creates_what_is_missing() {
    let cloud = FakeCloud::provisioned().without(ResourceKind::Environment);
    let outcome = ensure_resources(
        &cloud,
        &target(),
        DeploymentMode::New,
        &ResourceSizing::default(),
        &RecordingReporter::default(),
    )
    .await
    .unwrap();
    assert_eq!(outcome.created, vec![ResourceKind::Environment]);
}

#[tokio::test]
async fn existing_mode_missing_registry_fails_without_mutation() {
    let cloud = FakeCloud::provisioned().without(ResourceKind::Registry);
    let err = ensure_resources(
        &cloud,
        &target(),
        DeploymentMode::Existing,
        &ResourceSizing::default(),
        &RecordingReporter::default(),
    )
    .await
    .unwrap_err();

    match err.downcast_ref::<DeployError>() {
        Some(DeployError::ResourceMissing { kind, name, .. }) => {
            assert_eq!(*kind, ResourceKind::Registry);
            assert_eq!(name, "acrlens");
        }
        other => panic!("expected ResourceMissing, got {other:?}"),
    }
    let msg = err.to_string();
    assert!(msg.contains("registry 'acrlens' does not exist"), "{msg}");
    assert!(msg.contains("--mode new"), "{msg}");
    assert!(cloud.created().is_empty());
    // Later resources are not even queried.
    assert!(!cloud.called("exists:Environment"));
}

#[tokio::test]
async fn existing_mode_with_everything_present_succeeds() {
    let cloud = FakeCloud::provisioned();
    let outcome = ensure_resources(
        &cloud,
        &target(),
        DeploymentMode::Existing,
        &ResourceSizing::default(),
        &RecordingReporter::default(),
    )
    .await
    .unwrap();
    assert!(outcome.created.is_empty());
    assert!(cloud.created().is_empty());
}
