//! Build strategy selection and the change-classifier fallback.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use lens_deploy::application::services::fingerprint::{compute, persist};
use lens_deploy::application::services::plan::plan_build;
use lens_deploy::domain::BuildInputs;
use lens_deploy_common::{BuildTier, Detection};

use crate::mocks::{FakeTree, FakeVcs, MemoryFingerprintStore, RecordingReporter};

const KEY: &str = "rg-lens--lens-app";

async fn plan(
    tier: BuildTier,
    tree: &FakeTree,
    store: &MemoryFingerprintStore,
    vcs: &FakeVcs,
) -> lens_deploy::application::services::plan::BuildPlan {
    plan_build(
        tier,
        tree,
        store,
        vcs,
        KEY,
        &BuildInputs::STANDARD,
        &RecordingReporter::default(),
    )
    .await
}

#[tokio::test]
async fn explicit_tiers_bypass_detection() {
    let tree = FakeTree::app();
    let store = MemoryFingerprintStore::default();
    let vcs = FakeVcs::broken();

    for (tier, builds) in [
        (BuildTier::ConfigOnly, false),
        (BuildTier::SkipBuild, false),
        (BuildTier::ForceRebuild, true),
        (BuildTier::Standard, true),
    ] {
        let p = plan(tier, &tree, &store, &vcs).await;
        assert_eq!(p.build, builds, "{tier}");
        assert_eq!(p.detection, None, "{tier} must not run detection");
    }
}

#[tokio::test]
async fn fast_with_matching_fingerprint_skips_build() {
    let tree = FakeTree::app();
    let store = MemoryFingerprintStore::default();
    let digest = compute(&tree, &BuildInputs::STANDARD).unwrap();
    persist(&store, KEY, &digest).await.unwrap();

    let p = plan(BuildTier::FastDeploy, &tree, &store, &FakeVcs::broken()).await;
    assert!(!p.build);
    assert_eq!(p.detection, Some(Detection::Unchanged));
    assert_eq!(p.fingerprint.as_deref(), Some(digest.as_str()));
}

#[tokio::test]
async fn fast_with_different_fingerprint_builds() {
    let tree = FakeTree::app();
    let store = MemoryFingerprintStore::default();
    persist(&store, KEY, &"a".repeat(64)).await.unwrap();

    let p = plan(BuildTier::FastDeploy, &tree, &store, &FakeVcs::changed(&[])).await;
    assert!(p.build);
    assert_eq!(p.detection, Some(Detection::Changed));
}

#[tokio::test]
async fn no_history_and_docs_only_changes_skip_build() {
    let p = plan(
        BuildTier::FastDeploy,
        &FakeTree::app(),
        &MemoryFingerprintStore::default(),
        &FakeVcs::changed(&["README.md", ".gitignore", "README.md"]),
    )
    .await;
    assert!(!p.build);
    assert_eq!(p.detection, Some(Detection::ClassifiedSkip));
    assert!(p.fingerprint.is_some(), "fresh digest is still carried for persistence");
}

#[tokio::test]
async fn no_history_and_source_change_rebuilds() {
    let p = plan(
        BuildTier::FastDeploy,
        &FakeTree::app(),
        &MemoryFingerprintStore::default(),
        &FakeVcs::changed(&["README.md", "src/app/main.ext"]),
    )
    .await;
    assert!(p.build);
    assert_eq!(
        p.detection,
        Some(Detection::ClassifiedRebuild {
            critical: vec!["src/app/main.ext".to_owned()]
        })
    );
}

#[tokio::test]
async fn no_history_and_broken_vcs_rebuilds() {
    let reporter = RecordingReporter::default();
    let p = plan_build(
        BuildTier::FastDeploy,
        &FakeTree::app(),
        &MemoryFingerprintStore::default(),
        &FakeVcs::broken(),
        KEY,
        &BuildInputs::STANDARD,
        &reporter,
    )
    .await;
    assert!(p.build);
    assert_eq!(
        p.detection,
        Some(Detection::ClassifiedRebuild { critical: vec![] })
    );
    assert!(reporter.warnings().iter().any(|w| w.contains("git status unavailable")));
}

#[tokio::test]
async fn no_history_and_empty_change_set_rebuilds() {
    let p = plan(
        BuildTier::FastDeploy,
        &FakeTree::app(),
        &MemoryFingerprintStore::default(),
        &FakeVcs::changed(&[]),
    )
    .await;
    assert!(p.build);
}

#[tokio::test]
async fn unreadable_input_falls_through_to_classifier() {
    let mut tree = FakeTree::app();
    tree.unreadable.insert("requirements.txt".to_owned());
    let store = MemoryFingerprintStore::default();
    let p = plan(
        BuildTier::FastDeploy,
        &tree,
        &store,
        &FakeVcs::changed(&["docs/architecture.md"]),
    )
    .await;
    assert_eq!(p.detection, Some(Detection::ClassifiedSkip));
    assert_eq!(p.fingerprint, None);
}
