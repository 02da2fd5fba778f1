use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, RwLock};

use crate::pdf::{DEFAULT_CACHE_SIZE, Zoom};

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "folio";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_theme")]
    pub theme: String,

    /// Multiplier per zoom in/out step
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f32,

    /// Number of rendered pages kept in memory
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    /// Directory the Open dialog starts in when no file was given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_dir: Option<PathBuf>,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_theme() -> String {
    "Oceanic Next".to_string()
}

fn default_zoom_step() -> f32 {
    Zoom::DEFAULT_RATE
}

fn default_cache_size() -> usize {
    DEFAULT_CACHE_SIZE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            theme: default_theme(),
            zoom_step: default_zoom_step(),
            cache_size: default_cache_size(),
            start_dir: None,
        }
    }
}

impl Settings {
    /// Replace out-of-range values with defaults
    fn sanitize(&mut self) {
        if !self.zoom_step.is_finite() || !(1.01..=4.0).contains(&self.zoom_step) {
            warn!(
                "zoom_step {} out of range, using {}",
                self.zoom_step,
                default_zoom_step()
            );
            self.zoom_step = default_zoom_step();
        }
        if self.cache_size == 0 {
            self.cache_size = default_cache_size();
        }
    }
}

static SETTINGS: LazyLock<RwLock<Settings>> = LazyLock::new(|| RwLock::new(Settings::default()));

fn preferred_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

pub fn load_settings() {
    let Some(path) = preferred_config_path() else {
        warn!("Could not determine config directory, using default settings");
        return;
    };

    if path.exists() {
        load_settings_from_path(&path);
    } else {
        info!("Settings file not found, creating with defaults at {path:?}");
        if let Ok(settings) = SETTINGS.read() {
            save_settings_to_file(&settings, &path);
        }
    }
}

pub fn load_settings_from_path(path: &Path) {
    match fs::read_to_string(path) {
        Ok(content) => match parse_settings(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {path:?}");

                if settings.version < CURRENT_VERSION {
                    save_settings_to_file(&settings, path);
                }

                if let Ok(mut global) = SETTINGS.write() {
                    *global = settings;
                }
            }
            Err(e) => {
                error!("Failed to parse settings file {path:?}: {e}");
            }
        },
        Err(e) => {
            error!("Failed to read settings file {path:?}: {e}");
        }
    }
}

/// Parse, migrate and sanitize a settings document
pub fn parse_settings(content: &str) -> Result<Settings, serde_yaml::Error> {
    let mut settings = if content.trim().is_empty() {
        Settings::default()
    } else {
        serde_yaml::from_str::<Settings>(content)?
    };

    if settings.version < CURRENT_VERSION {
        migrate_settings(&mut settings);
    }
    settings.sanitize();
    Ok(settings)
}

fn migrate_settings(settings: &mut Settings) {
    info!(
        "Migrating settings from v{} to v{}",
        settings.version, CURRENT_VERSION
    );

    settings.version = CURRENT_VERSION;
}

fn save_settings_to_file(settings: &Settings, path: &Path) {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create config directory {parent:?}: {e}");
                return;
            }
        }
    }

    let body = match serde_yaml::to_string(settings) {
        Ok(body) => body,
        Err(e) => {
            error!("Failed to serialize settings: {e}");
            return;
        }
    };

    match fs::write(path, format!("{SETTINGS_HEADER}{body}")) {
        Ok(()) => debug!("Saved settings to {path:?}"),
        Err(e) => error!("Failed to save settings to {path:?}: {e}"),
    }
}

const SETTINGS_HEADER: &str = r#"# folio settings
#
# theme:      "Oceanic Next" or "Catppuccin Mocha"
# zoom_step:  multiplier per zoom in/out step (1.01 - 4.0)
# cache_size: rendered pages kept in memory
# start_dir:  directory the Open dialog starts in (optional)

"#;

// Public API for accessing settings

pub fn get_theme_name() -> String {
    SETTINGS
        .read()
        .map(|s| s.theme.clone())
        .unwrap_or_else(|_| default_theme())
}

pub fn get_zoom_step() -> f32 {
    SETTINGS
        .read()
        .map(|s| s.zoom_step)
        .unwrap_or_else(|_| default_zoom_step())
}

pub fn get_cache_size() -> usize {
    SETTINGS
        .read()
        .map(|s| s.cache_size)
        .unwrap_or_else(|_| default_cache_size())
}

pub fn get_start_dir() -> Option<PathBuf> {
    SETTINGS.read().ok().and_then(|s| s.start_dir.clone())
}

/// Replace the global settings, mainly for tests
pub fn set_settings(settings: Settings) {
    if let Ok(mut global) = SETTINGS.write() {
        *global = settings;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(parse_settings("").unwrap(), Settings::default());
    }

    #[test]
    fn partial_document_fills_in_defaults() {
        let settings = parse_settings("theme: \"Catppuccin Mocha\"\nzoom_step: 1.5\n").unwrap();
        assert_eq!(settings.theme, "Catppuccin Mocha");
        assert_eq!(settings.zoom_step, 1.5);
        assert_eq!(settings.cache_size, DEFAULT_CACHE_SIZE);
        assert_eq!(settings.start_dir, None);
    }

    #[test]
    fn out_of_range_values_are_replaced() {
        let settings = parse_settings("zoom_step: 0.5\ncache_size: 0\n").unwrap();
        assert_eq!(settings.zoom_step, Zoom::DEFAULT_RATE);
        assert_eq!(settings.cache_size, DEFAULT_CACHE_SIZE);
    }

    #[test]
    fn old_versions_are_migrated() {
        let settings = parse_settings("version: 0\n").unwrap();
        assert_eq!(settings.version, CURRENT_VERSION);
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(parse_settings("zoom_step: [not, a, number]").is_err());
    }

    #[test]
    #[serial]
    fn saved_file_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILENAME);
        let settings = Settings {
            theme: "Catppuccin Mocha".to_string(),
            cache_size: 4,
            start_dir: Some(PathBuf::from("/tmp/papers")),
            ..Settings::default()
        };

        save_settings_to_file(&settings, &path);
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# folio settings"));

        load_settings_from_path(&path);
        assert_eq!(get_theme_name(), "Catppuccin Mocha");
        assert_eq!(get_cache_size(), 4);
        assert_eq!(get_start_dir(), Some(PathBuf::from("/tmp/papers")));

        set_settings(Settings::default());
    }
}
