use directories::ProjectDirs;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

const CONFIG_FILE: &str = "config.toml";

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("me", "liesegang", "diagram_editor")
}

/// User settings read from `config.toml` in the platform config directory.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Overrides where the diagram state is stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub dark_mode: bool,
    pub grid_spacing: f32,
    pub save_on_exit: bool,
    pub window_size: [f32; 2],
    /// Extra font tried before the egui defaults.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            dark_mode: true,
            grid_spacing: 50.0,
            save_on_exit: false,
            window_size: [1280.0, 720.0],
            font_path: None,
        }
    }
}

impl AppConfig {
    pub fn from_toml(s: &str) -> Result<Self, AppError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml(&self) -> Result<String, AppError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Records the window size to restore next launch. Returns whether it
    /// differs from the stored one.
    pub fn remember_window_size(&mut self, size: [f32; 2]) -> bool {
        let size = size.map(f32::round);
        if size[0] <= 0.0 || size[1] <= 0.0 || size == self.window_size {
            return false;
        }
        self.window_size = size;
        true
    }
}

fn get_config_path() -> Option<PathBuf> {
    let proj_dirs = project_dirs()?;
    let config_dir = proj_dirs.config_dir();
    if !config_dir.exists() {
        if let Err(e) = fs::create_dir_all(config_dir) {
            error!("Failed to create config directory: {}", e);
            return None;
        }
    }
    Some(config_dir.join(CONFIG_FILE))
}

pub fn save_config(config: &AppConfig) {
    if let Some(path) = get_config_path() {
        match save_config_to(config, &path) {
            Ok(()) => info!("Config saved to {}", path.display()),
            Err(e) => error!("Failed to save config: {}", e),
        }
    }
}

pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), AppError> {
    fs::write(path, config.to_toml()?)?;
    Ok(())
}

pub fn load_config() -> AppConfig {
    let Some(path) = get_config_path() else {
        warn!("No config directory, using defaults");
        return AppConfig::default();
    };
    load_config_from(&path)
}

/// Reads the config at `path`. A missing file or any error gives the defaults.
pub fn load_config_from(path: &Path) -> AppConfig {
    if !path.exists() {
        return AppConfig::default();
    }
    match fs::read_to_string(path) {
        Ok(toml_str) => match AppConfig::from_toml(&toml_str) {
            Ok(config) => return config,
            Err(e) => {
                warn!("Failed to parse config file, using defaults: {}", e);
            }
        },
        Err(e) => {
            warn!("Failed to read config file, using defaults: {}", e);
        }
    }
    AppConfig::default()
}
