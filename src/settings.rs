use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
const LEGACY_SETTINGS_FILENAME: &str = ".notokrat_settings.yaml";
const APP_NAME: &str = "notokrat";

/// Persisted panel configuration. Loaded once at startup and threaded
/// through the app explicitly; there are no module-level accessors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_theme")]
    pub theme: String,

    /// Reviewer tier 1..=5 used when the CLI does not override it.
    #[serde(default = "default_role")]
    pub role: u8,

    /// Select a freshly created annotation in the engine (hosts deep-linking
    /// into the panel turn this on).
    #[serde(default)]
    pub select_annotation_on_creation: bool,

    /// Narrow-terminal layout: larger overlay gaps, denser rows.
    #[serde(default)]
    pub compact_layout: bool,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_theme() -> String {
    "Oceanic Next".to_string()
}

fn default_role() -> u8 {
    3
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            version: CURRENT_VERSION,
            theme: default_theme(),
            role: default_role(),
            select_annotation_on_creation: false,
            compact_layout: false,
        }
    }
}

impl Settings {
    /// Load settings from the config directory, migrating from the legacy
    /// dotfile location when present. Any failure falls back to defaults;
    /// a broken config file must not keep the panel from starting.
    pub fn load() -> Settings {
        match Self::try_load() {
            Ok(settings) => settings,
            Err(err) => {
                warn!("failed to load settings, using defaults: {err:#}");
                Settings::default()
            }
        }
    }

    fn try_load() -> Result<Settings> {
        let path = Self::settings_path()?;
        let content = if path.exists() {
            fs::read_to_string(&path).context("Failed to read settings file")?
        } else if let Some(legacy) = Self::legacy_settings_path() {
            if legacy.exists() {
                info!("migrating settings from {}", legacy.display());
                fs::read_to_string(&legacy).context("Failed to read legacy settings file")?
            } else {
                return Ok(Settings::default());
            }
        } else {
            return Ok(Settings::default());
        };
        serde_yaml::from_str(&content).context("Failed to parse settings YAML")
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::settings_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let yaml = serde_yaml::to_string(self).context("Failed to serialize settings")?;
        fs::write(&path, yaml).context("Failed to write settings file")?;
        Ok(())
    }

    fn settings_path() -> Result<PathBuf> {
        if let Ok(custom_dir) = std::env::var("NOTOKRAT_CONFIG_DIR") {
            return Ok(PathBuf::from(custom_dir).join(SETTINGS_FILENAME));
        }
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join(APP_NAME).join(SETTINGS_FILENAME))
    }

    fn legacy_settings_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(LEGACY_SETTINGS_FILENAME))
    }
}
