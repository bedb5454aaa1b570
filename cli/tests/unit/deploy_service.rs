//! End-to-end pipeline ordering over in-memory ports.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use lens_deploy::application::services::deploy::{DeployOptions, deploy, preflight, resolve_tier};
use lens_deploy::domain::{BuildInputs, DeployError, TierFlags};
use lens_deploy_common::{
    BuildPath, BuildTier, DeploymentMode, DeploymentReport, Detection, ResourceKind, VerifyStatus,
};

use crate::helpers::{config, env, target};
use crate::mocks::{
    FakeBuilder, FakeCloud, FakeProbe, FakeTree, FakeVcs, MemoryFingerprintStore,
    RecordingReporter,
};

const PAGE: &str = "<html><title>Bundestag.AI Lens</title><script>streamlit</script></html>";

struct World {
    cloud: FakeCloud,
    builder: FakeBuilder,
    tree: FakeTree,
    vcs: FakeVcs,
    store: MemoryFingerprintStore,
    probe: FakeProbe,
    reporter: RecordingReporter,
}

impl World {
    fn new() -> Self {
        Self {
            cloud: FakeCloud::provisioned(),
            builder: FakeBuilder::working(),
            tree: FakeTree::app(),
            vcs: FakeVcs::changed(&["src/app/main.ext"]),
            store: MemoryFingerprintStore::default(),
            probe: FakeProbe::serving(PAGE),
            reporter: RecordingReporter::default(),
        }
    }

    async fn run(
        &self,
        flags: TierFlags,
        mode: DeploymentMode,
    ) -> anyhow::Result<DeploymentReport> {
        self.run_with(flags, mode, false).await
    }

    async fn run_with(
        &self,
        flags: TierFlags,
        mode: DeploymentMode,
        explicit_tag: bool,
    ) -> anyhow::Result<DeploymentReport> {
        let target = target();
        let env = env();
        let config = config();
        deploy(
            &self.cloud,
            &self.builder,
            &self.tree,
            &self.vcs,
            &self.store,
            &self.probe,
            DeployOptions {
                reporter: &self.reporter,
                target: &target,
                mode,
                flags,
                inputs: BuildInputs::STANDARD,
                explicit_tag,
                env: &env,
                config: &config,
            },
        )
        .await
    }
}

fn fast() -> TierFlags {
    TierFlags {
        fast: true,
        ..TierFlags::default()
    }
}

fn config_only() -> TierFlags {
    TierFlags {
        config_only: true,
        ..TierFlags::default()
    }
}

#[tokio::test]
async fn standard_run_builds_updates_and_verifies() {
    let w = World::new();
    let report = w
        .run(TierFlags::default(), DeploymentMode::Existing)
        .await
        .unwrap();

    let image = "acrlens.azurecr.io/bundestag-lens:20250101120000";
    assert_eq!(report.tier, BuildTier::Standard);
    assert_eq!(report.build, BuildPath::Local { cache_hit: true });
    assert_eq!(report.image.as_deref(), Some(image));
    assert_eq!(report.verify, VerifyStatus::Pass);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(*w.cloud.image.lock().unwrap(), Some(image.to_owned()));
    assert_eq!(
        w.cloud.env.lock().unwrap().get("OPENAI_API_KEY").map(String::as_str),
        Some("sk-test")
    );
    assert!(report.fingerprint.is_some());
    assert_eq!(w.store.get(&target().record_key()), report.fingerprint);
    assert_eq!(
        report.url.as_deref(),
        Some("https://lens-app.example.azurecontainerapps.io")
    );
}

#[tokio::test]
async fn stages_run_in_order() {
    let w = World::new();
    w.run(TierFlags::default(), DeploymentMode::Existing)
        .await
        .unwrap();

    let calls = w.cloud.calls();
    let pos = |prefix: &str| {
        calls
            .iter()
            .position(|c| c.starts_with(prefix))
            .unwrap_or_else(|| panic!("{prefix} not called: {calls:?}"))
    };
    assert!(pos("account") < pos("exists:ResourceGroup"));
    assert!(pos("exists:Application") < pos("login:"));
    assert!(pos("login:") < pos("update:"));
    assert!(pos("update:") < pos("merge_env:"));
    assert!(pos("merge_env:") < pos("restart"));
}

#[tokio::test]
async fn config_only_never_touches_the_builder() {
    let w = World::new();
    let report = w.run(config_only(), DeploymentMode::Existing).await.unwrap();

    assert!(w.builder.calls().is_empty());
    assert!(w.cloud.called("update:image=- replicas=0-3"));
    assert!(w.cloud.called("merge_env:6"));
    assert!(w.cloud.called("restart"));
    assert_eq!(report.image, None);
    assert_eq!(report.build, BuildPath::NotBuilt);
    assert_eq!(report.detection, None);
    assert_eq!(report.fingerprint, None);
    assert!(w.store.records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn config_only_does_not_require_build_inputs() {
    let w = World::new();
    w.tree.remove("Dockerfile");
    assert!(w.run(config_only(), DeploymentMode::Existing).await.is_ok());
}

#[tokio::test]
async fn existing_mode_with_missing_registry_mutates_nothing() {
    let mut w = World::new();
    w.cloud = FakeCloud::provisioned().without(ResourceKind::Registry);
    let err = w
        .run(TierFlags::default(), DeploymentMode::Existing)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DeployError>(),
        Some(DeployError::ResourceMissing {
            kind: ResourceKind::Registry,
            ..
        })
    ));
    assert!(w.cloud.created().is_empty());
    assert!(!w.cloud.called("update:"));
    assert!(!w.cloud.called("merge_env:"));
    assert!(w.builder.calls().is_empty());
}

#[tokio::test]
async fn new_mode_provisions_then_deploys() {
    let mut w = World::new();
    w.cloud = FakeCloud::empty();
    w.run(TierFlags::default(), DeploymentMode::New)
        .await
        .unwrap();

    assert_eq!(w.cloud.created().len(), 4);
    assert!(w.cloud.called("update:image=acrlens.azurecr.io/bundestag-lens:20250101120000"));
}

#[tokio::test]
async fn fast_after_successful_deploy_skips_build() {
    let w = World::new();
    w.run(TierFlags::default(), DeploymentMode::Existing)
        .await
        .unwrap();
    let built = w.builder.calls().len();

    let report = w.run(fast(), DeploymentMode::Existing).await.unwrap();
    assert_eq!(report.detection, Some(Detection::Unchanged));
    assert_eq!(report.build, BuildPath::NotBuilt);
    assert_eq!(report.image, None);
    assert_eq!(w.builder.calls().len(), built, "no new builder calls");
    assert!(w.cloud.called("update:image=-"));
}

#[tokio::test]
async fn fast_after_source_edit_rebuilds() {
    let w = World::new();
    w.run(TierFlags::default(), DeploymentMode::Existing)
        .await
        .unwrap();
    let first = w.store.get(&target().record_key()).unwrap();

    w.tree
        .write("src/web/streamlit_app_modular.py", "import streamlit as st\nst.title('x')\n");
    let report = w.run(fast(), DeploymentMode::Existing).await.unwrap();

    assert_eq!(report.detection, Some(Detection::Changed));
    assert!(matches!(report.build, BuildPath::Local { .. }));
    assert_ne!(w.store.get(&target().record_key()).unwrap(), first);
}

#[tokio::test]
async fn skip_build_without_tag_fails_before_any_remote_call() {
    let w = World::new();
    let flags = TierFlags {
        skip_build: true,
        ..TierFlags::default()
    };
    let err = w.run(flags, DeploymentMode::Existing).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DeployError>(),
        Some(DeployError::SkipBuildWithoutTag)
    ));
    assert!(w.cloud.calls().is_empty());
}

#[tokio::test]
async fn skip_build_with_tag_deploys_existing_image() {
    let w = World::new();
    let flags = TierFlags {
        skip_build: true,
        ..TierFlags::default()
    };
    let report = w
        .run_with(flags, DeploymentMode::Existing, true)
        .await
        .unwrap();
    assert!(w.builder.calls().is_empty());
    assert_eq!(
        report.image.as_deref(),
        Some("acrlens.azurecr.io/bundestag-lens:20250101120000")
    );
    assert!(w.store.records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn skip_build_leaves_an_existing_record_untouched() {
    let w = World::new();
    w.store
        .records
        .lock()
        .unwrap()
        .insert(target().record_key(), "old-digest".to_owned());
    let flags = TierFlags {
        skip_build: true,
        ..TierFlags::default()
    };
    w.run_with(flags, DeploymentMode::Existing, true)
        .await
        .unwrap();
    assert_eq!(
        w.store.get(&target().record_key()).as_deref(),
        Some("old-digest")
    );
}

#[tokio::test]
async fn force_rebuild_refreshes_the_record() {
    let w = World::new();
    w.store
        .records
        .lock()
        .unwrap()
        .insert(target().record_key(), "old-digest".to_owned());
    let flags = TierFlags {
        force_rebuild: true,
        ..TierFlags::default()
    };
    let report = w.run(flags, DeploymentMode::Existing).await.unwrap();

    assert_eq!(report.tier, BuildTier::ForceRebuild);
    assert!(!w.builder.calls().is_empty());
    let stored = w.store.get(&target().record_key());
    assert!(report.fingerprint.is_some());
    assert_eq!(stored, report.fingerprint);
    assert_ne!(stored.as_deref(), Some("old-digest"));
}

#[tokio::test]
async fn missing_descriptor_fails_before_sign_in_check() {
    let w = World::new();
    w.tree.remove("Dockerfile");
    let err = w
        .run(TierFlags::default(), DeploymentMode::Existing)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DeployError>(),
        Some(DeployError::MissingInput { path, .. }) if path == "Dockerfile"
    ));
    assert!(!w.cloud.called("account"));
}

#[tokio::test]
async fn signed_out_cli_is_reported() {
    let mut w = World::new();
    w.cloud.account = None;
    let err = w
        .run(TierFlags::default(), DeploymentMode::Existing)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DeployError>(),
        Some(DeployError::NotAuthenticated { .. })
    ));
    assert!(!w.cloud.called("exists:"));
}

#[tokio::test]
async fn failed_update_aborts_before_verification() {
    let mut w = World::new();
    w.cloud.fail_update = true;
    let err = w
        .run(config_only(), DeploymentMode::Existing)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DeployError>(),
        Some(DeployError::UpdateFailed { .. })
    ));
    assert!(w.probe.urls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn restart_failure_is_only_a_warning() {
    let mut w = World::new();
    w.cloud.fail_restart = true;
    let report = w.run(config_only(), DeploymentMode::Existing).await.unwrap();
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("restart"));
}

#[tokio::test]
async fn unreachable_app_still_succeeds() {
    let mut w = World::new();
    w.probe = FakeProbe::down();
    let report = w.run(config_only(), DeploymentMode::Existing).await.unwrap();
    assert!(matches!(report.verify, VerifyStatus::Unreachable { .. }));
    assert!(report.warnings.iter().any(|m| m.starts_with("verification:")));
}

#[tokio::test]
async fn unexpected_page_soft_warns() {
    let mut w = World::new();
    w.probe = FakeProbe::status(502, "Bad Gateway");
    let report = w.run(config_only(), DeploymentMode::Existing).await.unwrap();
    assert_eq!(
        report.verify,
        VerifyStatus::SoftWarn {
            reason: "HTTP 502".to_owned()
        }
    );
}

#[tokio::test]
async fn fingerprint_write_failure_only_warns() {
    let mut w = World::new();
    w.store = MemoryFingerprintStore {
        fail_save: true,
        ..MemoryFingerprintStore::default()
    };
    let report = w
        .run(TierFlags::default(), DeploymentMode::Existing)
        .await
        .unwrap();
    assert!(
        report
            .warnings
            .iter()
            .any(|m| m.starts_with("fingerprint not recorded"))
    );
}

#[test]
fn losing_tier_flags_are_reported() {
    let reporter = RecordingReporter::default();
    let (tier, warnings) = resolve_tier(
        &TierFlags {
            config_only: true,
            fast: true,
            force_rebuild: true,
            ..TierFlags::default()
        },
        false,
        &reporter,
    )
    .unwrap();
    assert_eq!(tier, BuildTier::ConfigOnly);
    assert_eq!(
        warnings,
        vec![
            "--force-rebuild ignored: --config-only takes precedence",
            "--fast ignored: --config-only takes precedence",
        ]
    );
    assert_eq!(reporter.warnings(), warnings);
}

#[test]
fn preflight_names_first_missing_file() {
    let tree = FakeTree::app();
    tree.remove("requirements.txt");
    let err = preflight(&tree, &BuildInputs::STANDARD).unwrap_err();
    assert!(err.to_string().contains("requirements.txt"));
}
