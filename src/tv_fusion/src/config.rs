//! Grid configuration
//!
//! Grid dimensions and the world-space volume, loadable from JSON:
//!
//! ```json
//! {
//!   "width": 128,
//!   "height": 128,
//!   "depth": 64,
//!   "volume_min": [-1.0, -1.0, 0.0],
//!   "volume_max": [1.0, 1.0, 1.0]
//! }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use fusion_memory::PitchedStorage;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::FusionError;
use crate::grid::FusionGrid;
use crate::voxel::Voxel;
use crate::volume::BoundingVolume;

/// Grid construction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionGridConfig {
    /// Voxels along x
    pub width: usize,
    /// Voxels along y
    pub height: usize,
    /// Voxels along z
    pub depth: usize,
    /// First world-space corner of the volume
    pub volume_min: [f32; 3],
    /// Opposite world-space corner of the volume
    pub volume_max: [f32; 3],
}

impl Default for FusionGridConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 128,
            depth: 128,
            volume_min: [0.0; 3],
            volume_max: [1.0; 3],
        }
    }
}

impl FusionGridConfig {
    /// Parse a configuration from a JSON string.
    ///
    /// Missing fields take their default value.
    pub fn from_json_str(json: &str) -> Result<Self, FusionError> {
        serde_json::from_str(json).map_err(|e| FusionError::InvalidConfig(e.to_string()))
    }

    /// Read and validate a configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read grid config {}", path.display()))?;
        let config = Self::from_json_str(&json)
            .with_context(|| format!("Failed to parse grid config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid grid config {}", path.display()))?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check that every grid dimension is non-zero.
    pub fn validate(&self) -> Result<(), FusionError> {
        for (name, value) in [
            ("width", self.width),
            ("height", self.height),
            ("depth", self.depth),
        ] {
            if value == 0 {
                return Err(FusionError::InvalidConfig(format!("{name} must be non-zero")));
            }
        }
        Ok(())
    }

    pub fn volume(&self) -> BoundingVolume {
        BoundingVolume::new(
            Vector3::from(self.volume_min),
            Vector3::from(self.volume_max),
        )
    }
}

impl<const B: usize, S: PitchedStorage<Voxel<B>>> FusionGrid<B, S> {
    /// Allocate a grid described by `config`.
    pub fn from_config(config: &FusionGridConfig) -> Result<Self, FusionError> {
        config.validate()?;
        Self::with_volume(config.width, config.height, config.depth, config.volume())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::FusionGrid5;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_is_valid() {
        let config = FusionGridConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.volume(), BoundingVolume::unit_cube());
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"{
            "width": 4,
            "height": 3,
            "depth": 2,
            "volume_min": [-1.0, -1.0, 0.0],
            "volume_max": [1.0, 1.0, 2.0]
        }"#;
        let config = FusionGridConfig::from_json_str(json).unwrap();
        assert_eq!((config.width, config.height, config.depth), (4, 3, 2));
        assert_relative_eq!(config.volume().size(), Vector3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = FusionGridConfig::from_json_str(r#"{ "depth": 16 }"#).unwrap();
        assert_eq!(config.depth, 16);
        assert_eq!(config.width, FusionGridConfig::default().width);
        assert_eq!(config.volume_max, [1.0; 3]);
    }

    #[test]
    fn test_malformed_json() {
        let err = FusionGridConfig::from_json_str("{ width: ").unwrap_err();
        assert!(matches!(err, FusionError::InvalidConfig(_)));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let config = FusionGridConfig {
            height: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err, FusionError::InvalidConfig("height must be non-zero".into()));
        assert!(FusionGrid5::from_config(&config).is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = FusionGridConfig {
            width: 8,
            volume_min: [-0.5, 0.0, 0.25],
            ..Default::default()
        };
        let json = config.to_json_pretty().unwrap();
        assert_eq!(FusionGridConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_from_json_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("grid.json");
        std::fs::write(&path, r#"{ "width": 2, "height": 2, "depth": 2 }"#).unwrap();

        let config = FusionGridConfig::from_json_file(&path).unwrap();
        assert_eq!(config.width, 2);

        let missing = FusionGridConfig::from_json_file(temp_dir.path().join("missing.json"));
        assert!(missing.is_err());
    }

    #[test]
    fn test_from_json_file_rejects_zero_dimension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("grid.json");
        std::fs::write(&path, r#"{ "width": 0 }"#).unwrap();

        let err = FusionGridConfig::from_json_file(&path).unwrap_err();
        let root = err.downcast_ref::<FusionError>().unwrap();
        assert_eq!(root, &FusionError::InvalidConfig("width must be non-zero".into()));
    }

    #[test]
    fn test_grid_from_config() {
        let config = FusionGridConfig {
            width: 4,
            height: 3,
            depth: 2,
            volume_min: [-1.0; 3],
            volume_max: [1.0; 3],
        };
        let grid = FusionGrid5::from_config(&config).unwrap();
        assert_eq!(grid.dims(), [4, 3, 2]);
        assert_eq!(grid.volume(), &config.volume());
        assert_relative_eq!(grid.world_coords(0, 0, 0), Vector3::new(-0.75, -2.0 / 3.0, -0.5));
    }
}
