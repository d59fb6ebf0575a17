//! Build configuration, loaded from RON

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::camera::CameraConfig;
use crate::constants::DEFAULT_PATTERN;
use crate::scene::Pivot;

/// Immutable settings threaded into the scene and cameras
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitConfig {
    pub attach: AttachConfig,
    pub orient: OrientConfig,
    pub camera: CameraConfig,
    /// Directory catalogs to register, in order
    pub catalogs: Vec<CatalogConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachConfig {
    /// Pattern used when an attach call does not give one
    pub default_pattern: String,
}

impl Default for AttachConfig {
    fn default() -> Self {
        Self {
            default_pattern: DEFAULT_PATTERN.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientConfig {
    pub pivot: Pivot,
}

/// A named catalog rooted at a directory of `<part>.ron` files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub name: String,
    pub path: PathBuf,
}

impl KitConfig {
    /// Load configuration from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Io(e.to_string()))
    }

    /// Resolve relative catalog paths against `base`
    pub fn resolve_catalog_paths(&mut self, base: &Path) {
        for catalog in &mut self.catalogs {
            if catalog.path.is_relative() {
                catalog.path = base.join(&catalog.path);
            }
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = KitConfig::from_ron_str("(orient: (pivot: Origin))").unwrap();
        assert_eq!(config.orient.pivot, Pivot::Origin);
        assert_eq!(config.attach.default_pattern, "1");
        assert!(config.catalogs.is_empty());
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_bad_config() {
        assert!(matches!(
            KitConfig::from_ron_str("(attach: 3)"),
            Err(ConfigError::Deserialize(_))
        ));
        assert!(matches!(
            KitConfig::load("/nonexistent/kit.ron"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kit.ron");
        let mut config = KitConfig::default();
        config.attach.default_pattern = "10".to_string();
        config.catalogs.push(CatalogConfig {
            name: "Contraptor".to_string(),
            path: PathBuf::from("parts/contraptor"),
        });
        config.save(&path).unwrap();

        let mut loaded = KitConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        loaded.resolve_catalog_paths(dir.path());
        assert_eq!(loaded.catalogs[0].path, dir.path().join("parts/contraptor"));
    }
}
