use std::path::{Path, PathBuf};

use directories_next::ProjectDirs;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub generators: GeneratorSettings,
    #[serde(default)]
    pub engine: EngineSettings,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct GeneratorSettings {
    #[serde(default)]
    pub default_collection: Option<String>,
    #[serde(default)]
    pub package_manager: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct EngineSettings {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let path = settings_path()?;
    if !path.exists() {
        return Ok(Settings::default());
    }
    let contents = std::fs::read_to_string(&path)?;
    let settings: Settings = serde_yaml_bw::from_str(&contents)?;
    Ok(settings)
}

pub fn save_settings(settings: &Settings) -> anyhow::Result<()> {
    let path = settings_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = serde_yaml_bw::to_string(settings)?;
    std::fs::write(&path, contents)?;
    Ok(())
}

pub fn config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("FABRICA_CONFIG_DIR") {
        return Ok(Path::new(&value).to_path_buf());
    }
    let dirs = ProjectDirs::from("", "fabrica", "fabrica")
        .ok_or_else(|| anyhow::anyhow!("unable to determine config directory"))?;
    Ok(dirs.config_dir().to_path_buf())
}

pub fn settings_path() -> anyhow::Result<PathBuf> {
    Ok(config_dir()?.join("settings.yaml"))
}
