mod cms;

use axes::{AxisPreset, PolarLimits};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub use cms::{CmsConfig, EntityConfig, LabelConfig};

const QUALIFIER: &str = "com";
const ORGANIZATION: &str = "scene-labels";
const APPLICATION: &str = "scene-labels";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("unable to resolve platform config directory")]
    MissingProjectDirs,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub camera: CameraSettings,
    pub labels: LabelSettings,
    pub interaction: InteractionSettings,
    pub orbit: OrbitSettings,
    /// Optional FPS cap. 0.0 = uncapped.
    pub fps_cap: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Radians from the vertical axis; keeps away from the top-down singularity.
    pub min_polar_angle: f32,
    /// Radians from the vertical axis; just above the horizon.
    pub max_polar_angle: f32,
    pub auto_rotate: bool,
    /// One revolution per 60 seconds at 1.0.
    pub auto_rotate_speed: f32,
    pub rotate_speed: f32,
    pub zoom_sensitivity: f32,
    pub invert_zoom: bool,
    pub axis_preset: AxisPreset,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 50.0,
            near: 0.1,
            far: 100.0,
            min_distance: 0.5,
            max_distance: 10.0,
            min_polar_angle: 0.9,
            max_polar_angle: std::f32::consts::FRAC_PI_2 - 0.05,
            auto_rotate: true,
            auto_rotate_speed: 0.6,
            rotate_speed: 1.0,
            zoom_sensitivity: 0.15,
            invert_zoom: false,
            axis_preset: AxisPreset::default(),
        }
    }
}

impl CameraSettings {
    pub fn polar_limits(&self) -> PolarLimits {
        PolarLimits::new(self.min_polar_angle, self.max_polar_angle)
    }
}

/// Floating label placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelSettings {
    /// Labels shown at once, not counting the hovered one.
    pub max_visible: usize,
    /// Padding added around each placed label before overlap tests, in pixels.
    pub min_separation_px: f32,
    /// Hide labels whose anchor is behind another object.
    pub occlusion: bool,
    pub fade_offset: f32,
    pub fade_range: f32,
    pub fade_floor: f32,
    pub fade_ceiling: f32,
    /// NDC extent beyond which an anchor counts as off-screen.
    pub offscreen_margin: f32,
    /// Size used for labels that have not reported their own, in pixels.
    pub default_label_size: [f32; 2],
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            max_visible: 6,
            min_separation_px: 52.0,
            occlusion: true,
            fade_offset: 1.2,
            fade_range: 12.0,
            fade_floor: 0.4,
            fade_ceiling: 1.0,
            offscreen_margin: 1.2,
            default_label_size: [96.0, 28.0],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionSettings {
    /// Press/release displacement above which a press is a drag, in pixels.
    pub click_distance_px: f32,
    pub highlight_factor: f32,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            click_distance_px: 6.0,
            highlight_factor: 1.25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    pub duration_ms: u64,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self { duration_ms: 900 }
    }
}

pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store rooted in the platform config directory.
    pub fn new() -> Result<Self, SettingsError> {
        let dirs = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .ok_or(SettingsError::MissingProjectDirs)?;
        Ok(Self {
            path: dirs.config_dir().join(SETTINGS_FILE),
        })
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Missing file yields defaults.
    pub fn load(&self) -> Result<ViewerSettings, SettingsError> {
        if !self.path.exists() {
            return Ok(ViewerSettings::default());
        }
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let settings = serde_json::from_reader(reader)?;
        Ok(settings)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Clone for SettingsStore {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_viewer_constants() {
        let s = ViewerSettings::default();
        assert_eq!(s.labels.max_visible, 6);
        assert_eq!(s.labels.min_separation_px, 52.0);
        assert_eq!(s.interaction.click_distance_px, 6.0);
        assert_eq!(s.orbit.duration_ms, 900);
        let limits = s.camera.polar_limits();
        assert_eq!(limits.min, 0.9);
        assert!(limits.max < std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let s: ViewerSettings =
            serde_json::from_str(r#"{ "labels": { "max_visible": 3 }, "fps_cap": 30 }"#).unwrap();
        assert_eq!(s.labels.max_visible, 3);
        assert_eq!(s.labels.min_separation_px, 52.0);
        assert_eq!(s.fps_cap, 30.0);
        assert!(s.camera.auto_rotate);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let store = SettingsStore::at("/definitely/not/here/settings.json");
        let s = store.load().unwrap();
        assert_eq!(s.camera.fov_degrees, 50.0);
    }
}
