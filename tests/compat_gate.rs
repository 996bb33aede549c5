#[path = "support/mocks.rs"]
mod mocks;

use std::collections::BTreeMap;

use serde_json::{Value, json};

use fabrica::collection::DEFAULT_COLLECTION;
use fabrica::compat::{self, CompatError};
use fabrica::dispatch;
use fabrica::settings::Settings;
use mocks::{RecordingEngine, RecordingProbe};

fn options(skip_install: Option<bool>, package_manager: Option<&str>) -> BTreeMap<String, Value> {
    let mut options = BTreeMap::new();
    options.insert("name".to_string(), json!("shop"));
    if let Some(skip) = skip_install {
        options.insert("skip-install".to_string(), json!(skip));
    }
    if let Some(pm) = package_manager {
        options.insert("package-manager".to_string(), json!(pm));
    }
    options
}

#[test]
fn skip_install_bypasses_the_version_check() {
    let probe = RecordingProbe::reporting("7.0.1");
    let temp = tempfile::tempdir().unwrap();
    compat::check_compatibility(
        DEFAULT_COLLECTION,
        &options(Some(true), None),
        &Settings::default(),
        temp.path(),
        &probe,
    )
    .unwrap();
    assert_eq!(probe.call_count(), 0);
}

#[test]
fn custom_collection_bypasses_the_version_check() {
    let probe = RecordingProbe::reporting("7.0.1");
    let temp = tempfile::tempdir().unwrap();
    for (skip, pm) in [
        (None, None),
        (Some(false), Some("npm")),
        (Some(true), Some("yarn")),
    ] {
        compat::check_compatibility(
            "my-custom-collection",
            &options(skip, pm),
            &Settings::default(),
            temp.path(),
            &probe,
        )
        .unwrap();
    }
    assert_eq!(probe.call_count(), 0);
}

#[test]
fn non_default_package_manager_bypasses_the_version_check() {
    let probe = RecordingProbe::reporting("7.0.1");
    let temp = tempfile::tempdir().unwrap();
    compat::check_compatibility(
        DEFAULT_COLLECTION,
        &options(Some(false), Some("pnpm")),
        &Settings::default(),
        temp.path(),
        &probe,
    )
    .unwrap();
    assert_eq!(probe.call_count(), 0);
}

#[test]
fn configured_package_manager_counts_as_requested() {
    let probe = RecordingProbe::reporting("7.0.1");
    let temp = tempfile::tempdir().unwrap();
    let mut settings = Settings::default();
    settings.generators.package_manager = Some("yarn".to_string());
    compat::check_compatibility(
        DEFAULT_COLLECTION,
        &options(None, None),
        &settings,
        temp.path(),
        &probe,
    )
    .unwrap();
    assert_eq!(probe.call_count(), 0);
}

#[test]
fn default_install_path_runs_the_version_check() {
    let temp = tempfile::tempdir().unwrap();
    for pm in [None, Some("npm")] {
        let probe = RecordingProbe::reporting("8.1.0");
        compat::check_compatibility(
            DEFAULT_COLLECTION,
            &options(Some(false), pm),
            &Settings::default(),
            temp.path(),
            &probe,
        )
        .unwrap();
        assert_eq!(probe.call_count(), 1);
    }
}

#[test]
fn broken_npm_seven_line_is_rejected() {
    let temp = tempfile::tempdir().unwrap();
    for version in ["7.0.0", "7.0.1", "7.5.5"] {
        let probe = RecordingProbe::reporting(version);
        let err = compat::check_compatibility(
            DEFAULT_COLLECTION,
            &options(None, None),
            &Settings::default(),
            temp.path(),
            &probe,
        )
        .unwrap_err();
        let CompatError::IncompatibleEnvironment {
            package_manager, ..
        } = err;
        assert_eq!(package_manager, "npm");
    }
}

#[test]
fn supported_versions_pass() {
    let temp = tempfile::tempdir().unwrap();
    for version in ["6.11.0", "6.14.15", "7.5.6", "8.19.4"] {
        let probe = RecordingProbe::reporting(version);
        compat::check_compatibility(
            DEFAULT_COLLECTION,
            &options(None, None),
            &Settings::default(),
            temp.path(),
            &probe,
        )
        .unwrap();
    }
}

#[test]
fn whole_npm_six_line_passes() {
    let temp = tempfile::tempdir().unwrap();
    for version in ["6.0.0", "6.10.0", "6.14.18"] {
        let probe = RecordingProbe::reporting(version);
        compat::check_compatibility(
            DEFAULT_COLLECTION,
            &options(None, None),
            &Settings::default(),
            temp.path(),
            &probe,
        )
        .unwrap();
    }
}

#[test]
fn versions_below_six_are_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let probe = RecordingProbe::reporting("5.6.0");
    let err = compat::check_compatibility(
        DEFAULT_COLLECTION,
        &options(None, None),
        &Settings::default(),
        temp.path(),
        &probe,
    )
    .unwrap_err();
    let CompatError::IncompatibleEnvironment { version, .. } = err;
    assert_eq!(version.to_string(), "5.6.0");
}

#[test]
fn unreadable_version_is_a_pass() {
    let probe = RecordingProbe::unavailable();
    let temp = tempfile::tempdir().unwrap();
    compat::check_compatibility(
        DEFAULT_COLLECTION,
        &options(None, None),
        &Settings::default(),
        temp.path(),
        &probe,
    )
    .unwrap();
    assert_eq!(probe.call_count(), 1);
}

#[test]
fn incompatible_environment_aborts_before_dispatch() {
    let engine = RecordingEngine::with_exit(0);
    let probe = RecordingProbe::reporting("7.0.1");
    let temp = tempfile::tempdir().unwrap();

    let mut invocation = options(Some(false), None);
    invocation.insert("collection".to_string(), json!(DEFAULT_COLLECTION));

    let err = dispatch::run(
        &engine,
        &probe,
        &Settings::default(),
        temp.path(),
        invocation,
    )
    .unwrap_err();

    assert!(err.downcast_ref::<CompatError>().is_some());
    assert!(engine.executed_requests().is_empty());
    assert_eq!(probe.call_count(), 1);
}
