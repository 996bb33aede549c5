use std::path::{Path, PathBuf};

use crate::settings::{self, Settings};

pub const ENGINE_BINARY: &str = "fabrica-engine";
const ENGINE_ENV_OVERRIDE: &str = "FABRICA_ENGINE_BIN";

/// Locate the workflow-engine binary: configured path, then environment
/// override, then the config-dir bin directory, then `PATH`.
pub fn resolve_engine(config: &Settings) -> anyhow::Result<PathBuf> {
    if let Some(explicit) = config.engine.path.as_ref() {
        let resolved = resolve_relative(&settings::config_dir()?, explicit);
        if resolved.exists() {
            return Ok(resolved);
        }
        return Err(anyhow::anyhow!(
            "configured engine path not found: {}",
            resolved.display()
        ));
    }

    if let Some(env_path) = std::env::var_os(ENGINE_ENV_OVERRIDE).map(PathBuf::from) {
        if env_path.exists() {
            return Ok(env_path);
        }
        return Err(anyhow::anyhow!(
            "engine override from environment not found: {}",
            env_path.display()
        ));
    }

    let local = settings::config_dir()?.join("bin").join(binary_name());
    if local.exists() {
        return Ok(local);
    }

    if let Some(path) = find_on_path() {
        return Ok(path);
    }

    Err(anyhow::anyhow!(
        "workflow engine not found: {ENGINE_BINARY}\nTried:\n  - {}\nSuggestions:\n  - set engine.path in settings.yaml\n  - set {ENGINE_ENV_OVERRIDE}",
        local.display()
    ))
}

fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn binary_name() -> String {
    if cfg!(windows) {
        format!("{ENGINE_BINARY}.exe")
    } else {
        ENGINE_BINARY.to_string()
    }
}

fn find_on_path() -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(binary_name());
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}
