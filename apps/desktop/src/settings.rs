use std::path::{Path, PathBuf};

use notefy_domain::GameRules;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PersistedSettings {
    pub theme: String,
    pub sound_enabled: bool,
    pub rules: GameRules,
}

impl Default for PersistedSettings {
    fn default() -> Self {
        Self {
            theme: "night".into(),
            sound_enabled: true,
            rules: GameRules::default(),
        }
    }
}

fn app_dir() -> Option<PathBuf> {
    let base = dirs::config_dir()?;
    let dir = base.join("notefy");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

pub fn settings_path() -> Option<PathBuf> {
    Some(app_dir()?.join("settings.json"))
}

pub fn progress_path() -> Option<PathBuf> {
    Some(app_dir()?.join("progress.json"))
}

pub fn save_settings(data: &PersistedSettings) -> anyhow::Result<()> {
    if let Some(path) = settings_path() {
        save_settings_to(&path, data)?;
    }
    Ok(())
}

pub fn load_settings() -> anyhow::Result<PersistedSettings> {
    let path = settings_path().ok_or_else(|| anyhow::anyhow!("no config dir"))?;
    load_settings_from(&path)
}

fn save_settings_to(path: &Path, data: &PersistedSettings) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn load_settings_from(path: &Path) -> anyhow::Result<PersistedSettings> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}
