// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Stored as JSON. Every section falls back to its defaults field by field,
//! so partial files written by hand keep working across versions.

use crate::constants::{self, kinect, one_euro};
use crate::depth::Intrinsics;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Current config schema version
pub const CONFIG_VERSION: u32 = 1;

/// Application directory name under the platform config dir
const APP_DIR: &str = "depth-mesh";
const CONFIG_FILE: &str = "config.json";

/// Reconstruction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshSettings {
    /// Samples strictly below this depth (metres) are invalid
    pub min_valid_depth: f32,
    /// Depth substituted for invalid samples (metres)
    pub invalid_replacement: f32,
    /// Per-axis decimation of the collision mesh (<= 1 disables it)
    pub collision_decimation: u32,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            min_valid_depth: constants::DEFAULT_MIN_VALID_DEPTH,
            invalid_replacement: constants::DEFAULT_INVALID_REPLACEMENT,
            collision_decimation: constants::DEFAULT_COLLISION_DECIMATION,
        }
    }
}

/// One-Euro filter tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    pub min_cutoff: f32,
    pub beta: f32,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            min_cutoff: one_euro::DEFAULT_MIN_CUTOFF,
            beta: one_euro::DEFAULT_BETA,
        }
    }
}

/// Sensor intrinsics and the resolution they were calibrated at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntrinsicsSettings {
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
    pub base_width: u32,
    pub base_height: u32,
}

impl Default for IntrinsicsSettings {
    fn default() -> Self {
        Self {
            fx: kinect::FX,
            fy: kinect::FY,
            cx: kinect::CX,
            cy: kinect::CY,
            base_width: kinect::BASE_WIDTH,
            base_height: kinect::BASE_HEIGHT,
        }
    }
}

impl IntrinsicsSettings {
    /// Intrinsics rescaled to a frame of `width x height`
    pub fn for_frame(&self, width: usize, height: usize) -> Intrinsics {
        Intrinsics::new(self.fx, self.fy, self.cx, self.cy).for_resolution(
            self.base_width as usize,
            self.base_height as usize,
            width,
            height,
        )
    }
}

/// Scene export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Depth mapped to white in the preview (metres)
    pub preview_min_depth: f32,
    /// Depth mapped to black in the preview (metres)
    pub preview_max_depth: f32,
    pub write_collision_mesh: bool,
    pub write_point_cloud: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            preview_min_depth: constants::PREVIEW_MIN_DEPTH,
            preview_max_depth: constants::PREVIEW_MAX_DEPTH,
            write_collision_mesh: true,
            write_point_cloud: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schema version the file was written with
    pub version: u32,
    pub mesh: MeshSettings,
    pub filter: FilterSettings,
    pub intrinsics: IntrinsicsSettings,
    pub export: ExportSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            mesh: MeshSettings::default(),
            filter: FilterSettings::default(),
            intrinsics: IntrinsicsSettings::default(),
            export: ExportSettings::default(),
        }
    }
}

impl Config {
    /// Default config file location (`$XDG_CONFIG_HOME/depth-mesh/config.json`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Parse a config from JSON text
    pub fn from_json(text: &str) -> AppResult<Self> {
        serde_json::from_str(text).map_err(|e| AppError::Config(e.to_string()))
    }

    pub fn to_json(&self) -> AppResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Load from `path`
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_json(&text)?;
        debug!(path = %path.display(), version = config.version, "Loaded config");
        Ok(config)
    }

    /// Load from an explicit path, else the default location if present,
    /// else defaults
    pub fn load(explicit: Option<&Path>) -> AppResult<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Write as pretty JSON, creating parent directories
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Config(e.to_string()))?;
        }
        std::fs::write(path, self.to_json()?).map_err(|e| AppError::Config(e.to_string()))?;
        info!(path = %path.display(), "Saved config");
        Ok(())
    }
}
