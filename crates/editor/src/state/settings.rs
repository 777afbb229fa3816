//! Editor settings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::EditorError;

/// Material used when a configured material path is empty
pub const DEFAULT_SURFACE_MATERIAL: &str = "/Engine/EngineMaterials/DefaultSurfaceMaterial";

/// Materials applied to scene objects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialSettings {
    /// Material of unselected objects
    pub standard: String,
    /// Highlight material of selected objects
    pub selected: String,
}

impl Default for MaterialSettings {
    fn default() -> Self {
        Self {
            standard: "/Game/RuntimeToolsFrameworkMaterials/DefaultObjectMaterial".to_string(),
            selected: "/Game/RuntimeToolsFrameworkMaterials/SelectedMaterial".to_string(),
        }
    }
}

impl MaterialSettings {
    pub fn standard_or_default(&self) -> &str {
        non_empty_or(&self.standard, DEFAULT_SURFACE_MATERIAL)
    }

    pub fn selected_or_default(&self) -> &str {
        non_empty_or(&self.selected, DEFAULT_SURFACE_MATERIAL)
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

/// Undo history settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySettings {
    /// Maximum number of undo steps kept
    pub max_depth: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_depth: crate::state::scene::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Transform gizmo settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GizmoSettings {
    /// Show a gizmo for the selection at all
    pub enabled: bool,
    /// Offer scale handles
    pub enable_scaling: bool,
    /// Offer per-axis scale handles (single selection only)
    pub enable_non_uniform_scaling: bool,
}

impl Default for GizmoSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            enable_scaling: true,
            enable_non_uniform_scaling: true,
        }
    }
}

/// Picking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickingSettings {
    /// Maximum ray distance for scene picking
    pub max_distance: f32,
}

impl Default for PickingSettings {
    fn default() -> Self {
        Self {
            max_distance: 100_000.0,
        }
    }
}

/// All editor settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorSettings {
    #[serde(default)]
    pub materials: MaterialSettings,
    #[serde(default)]
    pub history: HistorySettings,
    #[serde(default)]
    pub gizmo: GizmoSettings,
    #[serde(default)]
    pub picking: PickingSettings,
}

impl EditorSettings {
    /// Platform config location of `settings.json`
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "meshscene", "mesh-scene-editor")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from the default location. On first run the defaults are written
    /// there so they can be edited; unreadable settings fall back to defaults.
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_or_init(&path),
            None => Self::default(),
        }
    }

    /// Load settings from `path`, creating it with the defaults if it does not exist
    pub fn load_or_init(path: &Path) -> Self {
        if !path.exists() {
            let settings = Self::default();
            match settings.save_to(path) {
                Ok(()) => tracing::info!("Wrote default settings to {}", path.display()),
                Err(e) => tracing::warn!("{e}"),
            }
            return settings;
        }
        match Self::load_from(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from a specific file
    pub fn load_from(path: &Path) -> Result<Self, EditorError> {
        let json = std::fs::read_to_string(path).map_err(|source| EditorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| EditorError::Settings {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save settings to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), EditorError> {
        let io_err = |source| EditorError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| EditorError::Settings {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("mesh-scene-editor-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[test]
    fn test_defaults() {
        let s = EditorSettings::default();
        assert_eq!(s.history.max_depth, 100);
        assert!(s.gizmo.enabled);
        assert!(s.gizmo.enable_scaling);
        assert!(s.gizmo.enable_non_uniform_scaling);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s: EditorSettings =
            serde_json::from_str(r#"{"history": {"max_depth": 7}}"#).unwrap();
        assert_eq!(s.history.max_depth, 7);
        assert!(s.gizmo.enabled);
    }

    #[test]
    fn test_empty_material_falls_back() {
        let m = MaterialSettings {
            standard: String::new(),
            selected: "  ".to_string(),
        };
        assert_eq!(m.standard_or_default(), DEFAULT_SURFACE_MATERIAL);
        assert_eq!(m.selected_or_default(), DEFAULT_SURFACE_MATERIAL);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_path("settings.json");
        let mut s = EditorSettings::default();
        s.gizmo.enable_scaling = false;
        s.save_to(&path).unwrap();

        let loaded = EditorSettings::load_from(&path).unwrap();
        assert!(!loaded.gizmo.enable_scaling);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_or_init_writes_defaults_on_first_run() {
        let path = temp_path("settings.json");
        let s = EditorSettings::load_or_init(&path);
        assert!(s.gizmo.enabled);
        assert!(path.exists());

        let loaded = EditorSettings::load_from(&path).unwrap();
        assert_eq!(loaded.history.max_depth, s.history.max_depth);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_or_init_keeps_existing_file() {
        let path = temp_path("settings.json");
        let mut s = EditorSettings::default();
        s.materials.standard = "/Game/Custom/Standard".to_string();
        s.save_to(&path).unwrap();

        let loaded = EditorSettings::load_or_init(&path);
        assert_eq!(loaded.materials.standard, "/Game/Custom/Standard");
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_or_init_falls_back_on_invalid_file() {
        let path = temp_path("settings.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ broken").unwrap();

        let loaded = EditorSettings::load_or_init(&path);
        assert_eq!(loaded.history.max_depth, 100);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ broken");
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = EditorSettings::load_from(&temp_path("missing.json")).unwrap_err();
        assert!(matches!(err, EditorError::Io { .. }));
    }

    #[test]
    fn test_load_invalid_json_is_settings_error() {
        let path = temp_path("bad.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();

        let err = EditorSettings::load_from(&path).unwrap_err();
        assert!(matches!(err, EditorError::Settings { .. }));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
