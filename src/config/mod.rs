//! Configuration module for cse-harvest
//!
//! Handles loading settings from YAML files and environment variables,
//! and the validated per-run parameters derived from them.

mod run;
mod settings;

pub use run::*;
pub use settings::*;

use crate::error::ConfigError;
use std::path::{Path, PathBuf};
use tracing::info;

/// Load settings from an explicit file, a discovered file, or defaults
///
/// Lookup order: `explicit`, `CSE_HARVEST_SETTINGS_PATH`, `settings.yml`,
/// `config/settings.yml`, then `<config dir>/cse-harvest/settings.yml`.
/// Environment overrides are merged on top in every case.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings, ConfigError> {
    if let Some(path) = explicit {
        info!("Loading settings from: {}", path.display());
        let mut settings = Settings::from_file(path)?;
        settings.merge_env();
        return Ok(settings);
    }

    if let Ok(path) = std::env::var("CSE_HARVEST_SETTINGS_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Loading settings from: {}", path.display());
            let mut settings = Settings::from_file(&path)?;
            settings.merge_env();
            return Ok(settings);
        }
    }

    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("cse-harvest/settings.yml"));
    }

    for path in paths.iter() {
        if path.exists() {
            info!("Loading settings from: {}", path.display());
            let mut settings = Settings::from_file(path)?;
            settings.merge_env();
            return Ok(settings);
        }
    }

    info!("No settings file found, using defaults");
    let mut settings = Settings::default();
    settings.merge_env();
    Ok(settings)
}
