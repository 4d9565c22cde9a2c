use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context as _;

use crate::{
    error::{SpritemillError, SpritemillResult},
    frames::AnimKey,
};

pub const DEFAULT_FACE_SIZE: u32 = 1024;
pub const DEFAULT_TARGET_RESOLUTION: u32 = 128;
pub const DEFAULT_FRAME_RATE: u32 = 6;

const DEFAULT_CHARACTERS: [&str; 2] = ["Alex", "Ryan"];
const DEFAULT_ANIMATIONS: [&str; 5] = ["Walking", "Punching", "Kicking", "Hurt", "Standing"];

/// Process-wide pipeline constants, overridable from a JSON file.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Side length of a cube face in the packed cross canvas, and the
    /// output size of unpacked faces.
    pub face_size: u32,
    /// Square resolution animation frames are resampled to before encoding.
    pub target_resolution: u32,
    /// Fixed frame rate of encoded animation videos.
    pub frame_rate: u32,
    /// Animation keys eligible for encoding. Keys present on disk but not
    /// listed here are skipped silently.
    pub allowed_keys: Vec<AnimKey>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let mut allowed_keys = Vec::with_capacity(DEFAULT_CHARACTERS.len() * DEFAULT_ANIMATIONS.len());
        for character in DEFAULT_CHARACTERS {
            for animation in DEFAULT_ANIMATIONS {
                allowed_keys.push(AnimKey::new(character, animation));
            }
        }
        Self {
            face_size: DEFAULT_FACE_SIZE,
            target_resolution: DEFAULT_TARGET_RESOLUTION,
            frame_rate: DEFAULT_FRAME_RATE,
            allowed_keys,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> SpritemillResult<()> {
        if self.face_size == 0 {
            return Err(SpritemillError::validation("face_size must be non-zero"));
        }
        if self.target_resolution == 0 {
            return Err(SpritemillError::validation(
                "target_resolution must be non-zero",
            ));
        }
        if !self.target_resolution.is_multiple_of(2) {
            // yuva420p chroma subsampling needs even frame dimensions.
            return Err(SpritemillError::validation(
                "target_resolution must be even (required for yuva420p webm output)",
            ));
        }
        if self.frame_rate == 0 {
            return Err(SpritemillError::validation("frame_rate must be non-zero"));
        }
        Ok(())
    }

    /// Load a config from a JSON file. Absent fields fall back to defaults.
    pub fn load(path: &Path) -> SpritemillResult<Self> {
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let cfg: Self =
            serde_json::from_reader(BufReader::new(f)).with_context(|| "parse config JSON")?;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = PipelineConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.face_size, 1024);
        assert_eq!(cfg.target_resolution, 128);
        assert_eq!(cfg.frame_rate, 6);
        assert_eq!(cfg.allowed_keys.len(), 10);
        assert_eq!(cfg.allowed_keys[0].to_string(), "Alex_Walking");
        assert_eq!(cfg.allowed_keys[9].to_string(), "Ryan_Standing");
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut cfg = PipelineConfig::default();
        cfg.face_size = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = PipelineConfig::default();
        cfg.target_resolution = 127;
        assert!(cfg.validate().is_err());

        let mut cfg = PipelineConfig::default();
        cfg.frame_rate = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn load_fills_absent_fields_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        std::fs::write(&path, r#"{ "target_resolution": 64 }"#).unwrap();

        let cfg = PipelineConfig::load(&path).unwrap();
        assert_eq!(cfg.target_resolution, 64);
        assert_eq!(cfg.face_size, 1024);
        assert_eq!(cfg.frame_rate, 6);
    }
}
