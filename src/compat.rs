use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use once_cell::sync::Lazy;
use semver::{Version, VersionReq};
use serde_json::Value;

use crate::collection::DEFAULT_COLLECTION;
use crate::settings::Settings;

pub const DEFAULT_PACKAGE_MANAGER: &str = "npm";

// npm 7 releases before 7.5.6 mishandle nested peer dependency trees and
// corrupt freshly scaffolded workspaces on install. The 6.x line is safe.
static LEGACY_LINE: Lazy<VersionReq> =
    Lazy::new(|| VersionReq::parse(">=6.0.0, <7.0.0").expect("static version requirement"));
static FIXED_LINE: Lazy<VersionReq> =
    Lazy::new(|| VersionReq::parse(">=7.5.6").expect("static version requirement"));

#[derive(Debug, thiserror::Error)]
pub enum CompatError {
    #[error(
        "incompatible environment: {package_manager} {version} cannot install a new workspace; \
         upgrade {package_manager} (>= 7.5.6), or pass --skip-install and install dependencies manually"
    )]
    IncompatibleEnvironment {
        package_manager: String,
        version: Version,
    },
}

/// Reads the installed package-manager version at a workspace root. A seam so
/// the gate can be exercised without spawning anything.
pub trait VersionProbe {
    /// `None` means the version could not be read or parsed; the gate treats
    /// that as a pass, matching the tolerance of the install path itself.
    fn installed_version(&self, root: &Path, package_manager: &str) -> Option<Version>;
}

/// Production probe: `<package-manager> --version` at the target root.
pub struct CommandProbe;

impl VersionProbe for CommandProbe {
    fn installed_version(&self, root: &Path, package_manager: &str) -> Option<Version> {
        let output = Command::new(package_manager)
            .arg("--version")
            .current_dir(root)
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let text = String::from_utf8_lossy(&output.stdout);
        Version::parse(text.trim()).ok()
    }
}

/// Pre-flight environment gate. Runs only when the default install path will
/// be taken: the resolved collection is the built-in default, the invocation
/// does not skip dependency installation, and the requested package manager
/// is unspecified or the default one. Must complete before any engine
/// dispatch so a failure prevents all filesystem mutation.
pub fn check_compatibility(
    collection: &str,
    options: &BTreeMap<String, Value>,
    settings: &Settings,
    root: &Path,
    probe: &dyn VersionProbe,
) -> Result<(), CompatError> {
    if collection != DEFAULT_COLLECTION {
        return Ok(());
    }
    if options
        .get("skip-install")
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        return Ok(());
    }
    let requested = options
        .get("package-manager")
        .and_then(Value::as_str)
        .or(settings.generators.package_manager.as_deref());
    if let Some(package_manager) = requested {
        if package_manager != DEFAULT_PACKAGE_MANAGER {
            return Ok(());
        }
    }

    let Some(version) = probe.installed_version(root, DEFAULT_PACKAGE_MANAGER) else {
        return Ok(());
    };
    if is_supported(&version) {
        Ok(())
    } else {
        Err(CompatError::IncompatibleEnvironment {
            package_manager: DEFAULT_PACKAGE_MANAGER.to_string(),
            version,
        })
    }
}

fn is_supported(version: &Version) -> bool {
    LEGACY_LINE.matches(version) || FIXED_LINE.matches(version)
}
