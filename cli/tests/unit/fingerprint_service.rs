//! Fingerprint engine over the in-memory source tree and store.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use lens_deploy::application::services::fingerprint::{compute, evaluate, persist};
use lens_deploy::domain::BuildInputs;
use lens_deploy::domain::fingerprint::Comparison;

use crate::mocks::{FakeTree, MemoryFingerprintStore, RecordingReporter};

const KEY: &str = "rg-lens--lens-app";

#[test]
fn compute_is_deterministic() {
    let tree = FakeTree::app();
    let a = compute(&tree, &BuildInputs::STANDARD).unwrap();
    let b = compute(&tree, &BuildInputs::STANDARD).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), 64);
}

#[test]
fn compute_tracks_sources_manifest_and_descriptor_only() {
    let tree = FakeTree::app();
    let base = compute(&tree, &BuildInputs::STANDARD).unwrap();

    tree.write("README.md", "# changed docs\n");
    assert_eq!(compute(&tree, &BuildInputs::STANDARD).unwrap(), base);

    tree.write("src/web/__pycache__/app.cpython-311.pyc", "bytecode");
    assert_eq!(compute(&tree, &BuildInputs::STANDARD).unwrap(), base);

    tree.write("requirements.txt", "streamlit==1.39.0\n");
    assert_ne!(compute(&tree, &BuildInputs::STANDARD).unwrap(), base);
}

#[test]
fn compute_fails_on_unreadable_file() {
    let mut tree = FakeTree::app();
    tree.unreadable.insert("src/llm/openai_client.py".to_owned());
    let err = compute(&tree, &BuildInputs::STANDARD).unwrap_err();
    assert!(format!("{err:#}").contains("permission denied"));
}

#[test]
fn compute_fails_without_sources() {
    let tree = FakeTree::app();
    tree.remove("src/web/streamlit_app_modular.py");
    tree.remove("src/llm/openai_client.py");
    assert!(compute(&tree, &BuildInputs::STANDARD).is_err());
}

#[tokio::test]
async fn persisted_digest_matches_next_evaluation() {
    let tree = FakeTree::app();
    let store = MemoryFingerprintStore::default();
    let reporter = RecordingReporter::default();

    let first = evaluate(&tree, &store, KEY, &BuildInputs::STANDARD, &reporter).await;
    assert_eq!(first.comparison, Some(Comparison::NoHistory));

    persist(&store, KEY, first.digest.as_deref().unwrap())
        .await
        .unwrap();
    let second = evaluate(&tree, &store, KEY, &BuildInputs::STANDARD, &reporter).await;
    assert_eq!(second.comparison, Some(Comparison::Match));

    tree.write("src/web/streamlit_app_modular.py", "import streamlit as st  # v2\n");
    let third = evaluate(&tree, &store, KEY, &BuildInputs::STANDARD, &reporter).await;
    assert_eq!(third.comparison, Some(Comparison::Differs));
}

#[tokio::test]
async fn undecidable_fingerprint_is_reported_not_matched() {
    let mut tree = FakeTree::app();
    tree.unreadable.insert("Dockerfile".to_owned());
    let store = MemoryFingerprintStore::default();
    store
        .records
        .lock()
        .unwrap()
        .insert(KEY.to_owned(), "0".repeat(64));
    let reporter = RecordingReporter::default();

    let eval = evaluate(&tree, &store, KEY, &BuildInputs::STANDARD, &reporter).await;
    assert_eq!(eval.digest, None);
    assert_eq!(eval.comparison, None);
    assert_eq!(reporter.warnings().len(), 1);
}
