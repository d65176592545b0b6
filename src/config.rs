use crate::camera3d::CameraTuning;
use crate::catalog::Vec3Data;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "CameraConfig::default_min_distance")]
    pub min_distance: f32,
    #[serde(default = "CameraConfig::default_max_distance")]
    pub max_distance: f32,
    #[serde(default = "CameraConfig::default_rotate_sensitivity")]
    pub rotate_sensitivity: f32,
    #[serde(default = "CameraConfig::default_zoom_factor")]
    pub zoom_factor: f32,
    #[serde(default = "CameraConfig::default_pan_speed")]
    pub pan_speed: f32,
    #[serde(default = "CameraConfig::default_screen_space_panning")]
    pub screen_space_panning: bool,
    #[serde(default = "CameraConfig::default_initial_position")]
    pub initial_position: Vec3Data,
    #[serde(default)]
    pub initial_target: Vec3Data,
    #[serde(default = "CameraConfig::default_fov_degrees")]
    pub fov_degrees: f32,
}

impl CameraConfig {
    const fn default_min_distance() -> f32 {
        5.0
    }

    const fn default_max_distance() -> f32 {
        30.0
    }

    const fn default_rotate_sensitivity() -> f32 {
        0.005
    }

    const fn default_zoom_factor() -> f32 {
        0.1
    }

    const fn default_pan_speed() -> f32 {
        0.01
    }

    const fn default_screen_space_panning() -> bool {
        true
    }

    const fn default_initial_position() -> Vec3Data {
        Vec3Data::new(10.0, 8.0, 10.0)
    }

    const fn default_fov_degrees() -> f32 {
        60.0
    }

    pub fn tuning(&self) -> CameraTuning {
        CameraTuning {
            rotate_sensitivity: self.rotate_sensitivity,
            zoom_factor: self.zoom_factor,
            pan_speed: self.pan_speed,
            screen_space_panning: self.screen_space_panning,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_distance: Self::default_min_distance(),
            max_distance: Self::default_max_distance(),
            rotate_sensitivity: Self::default_rotate_sensitivity(),
            zoom_factor: Self::default_zoom_factor(),
            pan_speed: Self::default_pan_speed(),
            screen_space_panning: Self::default_screen_space_panning(),
            initial_position: Self::default_initial_position(),
            initial_target: Vec3Data::ZERO,
            fov_degrees: Self::default_fov_degrees(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    #[serde(default = "TreeConfig::default_expanded")]
    pub default_expanded: Vec<String>,
}

impl TreeConfig {
    fn default_expanded() -> Vec<String> {
        vec!["components/".to_string(), "hooks/".to_string()]
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self { default_expanded: Self::default_expanded() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub tree: TreeConfig,
    /// JSON catalog; the built-in workspace layout is used when unset.
    #[serde(default)]
    pub catalog_path: Option<String>,
    /// JSON avatar store; avatars are kept in memory when unset.
    #[serde(default)]
    pub avatar_store_path: Option<String>,
    /// Repository metadata for the code panel; a built-in sample is shown when unset.
    #[serde(default)]
    pub snapshot_path: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AppConfigOverrides {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub screen_space_panning: Option<bool>,
    pub catalog_path: Option<String>,
    pub avatar_store_path: Option<String>,
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("Config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &AppConfigOverrides) {
        if let Some(min) = overrides.min_distance {
            self.camera.min_distance = min;
        }
        if let Some(max) = overrides.max_distance {
            self.camera.max_distance = max;
        }
        if let Some(screen_space) = overrides.screen_space_panning {
            self.camera.screen_space_panning = screen_space;
        }
        if let Some(path) = &overrides.catalog_path {
            self.catalog_path = Some(path.clone());
        }
        if let Some(path) = &overrides.avatar_store_path {
            self.avatar_store_path = Some(path.clone());
        }
    }
}

impl AppConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.min_distance.is_none()
            && self.max_distance.is_none()
            && self.screen_space_panning.is_none()
            && self.catalog_path.is_none()
            && self.avatar_store_path.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.min_distance.is_some() {
            fields.push("min_distance");
        }
        if self.max_distance.is_some() {
            fields.push("max_distance");
        }
        if self.screen_space_panning.is_some() {
            fields.push("screen_space_panning");
        }
        if self.catalog_path.is_some() {
            fields.push("catalog_path");
        }
        if self.avatar_store_path.is_some() {
            fields.push("avatar_store_path");
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_use_defaults() {
        let cfg: AppConfig = serde_json::from_str(r#"{ "camera": { "max_distance": 40.0 } }"#).expect("parse");
        assert_eq!(cfg.camera.min_distance, 5.0);
        assert_eq!(cfg.camera.max_distance, 40.0);
        assert_eq!(cfg.camera.initial_position, Vec3Data::new(10.0, 8.0, 10.0));
        assert_eq!(cfg.tree.default_expanded, vec!["components/", "hooks/"]);
        assert!(cfg.catalog_path.is_none());
    }

    #[test]
    fn overrides_replace_only_present_fields() {
        let mut cfg = AppConfig::default();
        let overrides = AppConfigOverrides { max_distance: Some(50.0), ..AppConfigOverrides::default() };
        cfg.apply_overrides(&overrides);
        assert_eq!(cfg.camera.max_distance, 50.0);
        assert_eq!(cfg.camera.min_distance, 5.0);
        assert_eq!(overrides.applied_fields(), vec!["max_distance"]);
        assert!(AppConfigOverrides::default().is_empty());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = AppConfig::load_or_default("/definitely/not/here/metaworkspace.json");
        assert_eq!(cfg.camera.zoom_factor, 0.1);
    }
}
