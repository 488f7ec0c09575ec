// SPDX-License-Identifier: GPL-3.0-only

use crate::constants;
use crate::errors::{AppError, AppResult};
use crate::handoff::ApplicationCandidate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};

/// User configuration, stored as JSON under the XDG config directory
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Handoff targets, tried in ascending priority
    pub candidates: Vec<ApplicationCandidate>,
    /// Prompt label of the fallback chooser
    pub chooser_title: String,
    /// Authority part of minted share references
    pub provider_authority: String,
    /// Path segment under the authority naming the cache share
    pub share_root: String,
    /// Override for the private capture directory
    pub cache_dir: Option<PathBuf>,
    /// Camera device node
    pub camera_device: String,
    /// Requested capture width
    pub capture_width: u32,
    /// Requested capture height
    pub capture_height: u32,
    /// Post notices to the desktop notification daemon
    pub desktop_notifications: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            candidates: ApplicationCandidate::defaults(),
            chooser_title: constants::CHOOSER_TITLE.to_string(),
            provider_authority: format!("{}.fileprovider", constants::APP_ID),
            share_root: "cache".to_string(),
            cache_dir: None,
            camera_device: "/dev/video0".to_string(),
            capture_width: 1280,
            capture_height: 720,
            desktop_notifications: true,
        }
    }
}

impl Config {
    /// Location of the config file
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join(constants::APP_DIR_NAME)
            .join("config.json")
    }

    /// Load the config file, falling back to defaults when it does not exist
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &std::path::Path) -> AppResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                debug!(path = %path.display(), "Loaded config");
                Ok(serde_json::from_str(&text)?)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(AppError::Config(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Like [`Config::load`], but a broken file only produces a warning
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring unreadable config, using defaults");
            Self::default()
        })
    }

    pub fn save_to(&self, path: &std::path::Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Config(format!("failed to create {}: {}", parent.display(), e)))?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)
            .map_err(|e| AppError::Config(format!("failed to write {}: {}", path.display(), e)))
    }

    pub fn save(&self) -> AppResult<()> {
        self.save_to(&Self::path())
    }

    /// Private directory that receives capture files
    pub fn capture_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(constants::APP_DIR_NAME)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "chooser_title": "Find with" }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.chooser_title, "Find with");
        assert_eq!(config.candidates, ApplicationCandidate::defaults());
    }

    #[test]
    fn malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(Config::load_from(&path), Err(AppError::Config(_))));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = Config::default();
        config.camera_device = "/dev/video2".into();

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().camera_device, "/dev/video2");
    }
}
