//! Optional user settings read from `~/.invitation-dashboard/config.toml`.
//!
//! Configuration never blocks startup: a missing file, a parse error or an
//! invalid value all fall back to defaults with a log line.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use directories::BaseDirs;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::designer::validate_color;
use crate::models::{TemplateConfig, DEFAULT_PRIMARY_COLOR};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".invitation-dashboard";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub template: TemplateSettings,
    pub ui: UiSettings,
    pub preview: PreviewSettings,
}

/// Initial template of a session.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TemplateSettings {
    pub primary_color: String,
    pub image_url: String,
    pub sound_url: String,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            image_url: String::new(),
            sound_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UiSettings {
    /// Input poll interval; also the resolution of the playback clock.
    pub tick_rate_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self { tick_rate_ms: 250 }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PreviewSettings {
    /// Assumed clip length for sounds whose length cannot be measured.
    pub fallback_clip_ms: u64,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            fallback_clip_ms: 1500,
        }
    }
}

impl Settings {
    /// The template a fresh session (or a reset) starts from.
    pub fn initial_template(&self) -> TemplateConfig {
        let primary_color = match validate_color(&self.template.primary_color) {
            Ok(color) => color.to_string(),
            Err(err) => {
                warn!("ignoring configured color: {err}");
                DEFAULT_PRIMARY_COLOR.to_string()
            }
        };
        TemplateConfig {
            primary_color,
            image_url: self.template.image_url.clone(),
            sound_url: self.template.sound_url.clone(),
        }
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.ui.tick_rate_ms.max(10))
    }

    pub fn fallback_clip(&self) -> Duration {
        Duration::from_millis(self.preview.fallback_clip_ms)
    }
}

/// Load settings from `path`, falling back to defaults on any problem.
pub fn load_settings(path: &Path) -> Settings {
    if !path.exists() {
        debug!("No config file at {:?}, using defaults", path);
        return Settings::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", path, e);
            Settings::default()
        }
    }
}

/// `~/.invitation-dashboard`, home of the config file and the logs.
pub fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(CONFIG_FILE_NAME))
}
