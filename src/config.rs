use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DramatisConfig {
    pub simulation: SimulationConfig,
    pub camera: CameraConfig,
    pub replay: ReplayConfig,
    pub palette: PaletteConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_alpha_min")]
    pub alpha_min: f32,
    #[serde(default = "default_alpha_decay")]
    pub alpha_decay: f32,
    #[serde(default = "default_velocity_decay")]
    pub velocity_decay: f32,
    #[serde(default = "default_drag_alpha_target")]
    pub drag_alpha_target: f32,
    #[serde(default = "default_update_alpha")]
    pub update_alpha: f32,
    #[serde(default = "default_settle_alpha")]
    pub settle_alpha: f32,
    #[serde(default = "default_charge_theta")]
    pub charge_theta: f32,
}

fn default_alpha_min() -> f32 { 0.001 }
fn default_alpha_decay() -> f32 { 1.0 - 0.001_f32.powf(1.0 / 300.0) }
fn default_velocity_decay() -> f32 { 0.4 }
fn default_drag_alpha_target() -> f32 { 0.3 }
fn default_update_alpha() -> f32 { 0.3 }
fn default_settle_alpha() -> f32 { 0.1 }
fn default_charge_theta() -> f32 { 0.9 }

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            alpha_min: default_alpha_min(),
            alpha_decay: default_alpha_decay(),
            velocity_decay: default_velocity_decay(),
            drag_alpha_target: default_drag_alpha_target(),
            update_alpha: default_update_alpha(),
            settle_alpha: default_settle_alpha(),
            charge_theta: default_charge_theta(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_padding")]
    pub padding: f32,
    #[serde(default = "default_max_scale")]
    pub max_scale: f32,
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f32,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f32,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default = "default_immediate_ms")]
    pub immediate_ms: u64,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

fn default_padding() -> f32 { 80.0 }
fn default_max_scale() -> f32 { 1.5 }
fn default_min_zoom() -> f32 { 0.1 }
fn default_max_zoom() -> f32 { 4.0 }
fn default_delay_ms() -> u64 { 100 }
fn default_immediate_ms() -> u64 { 500 }
fn default_settle_ms() -> u64 { 1500 }

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            padding: default_padding(),
            max_scale: default_max_scale(),
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
            delay_ms: default_delay_ms(),
            immediate_ms: default_immediate_ms(),
            settle_ms: default_settle_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplayConfig {
    #[serde(default = "default_batch_interval_ms")]
    pub batch_interval_ms: u64,
}

fn default_batch_interval_ms() -> u64 { 600 }

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            batch_interval_ms: default_batch_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PaletteConfig {
    #[serde(default)]
    pub sticky_colors: bool,
}

impl DramatisConfig {
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads a config file. A missing `path` yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents, path)
    }
}
