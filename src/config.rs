use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GenError;
use crate::perlin::Interpolation;

/// Upper bound on the octave count a config may request.
pub const MAX_OCTAVES: u32 = 16;
/// Amplitude decay used by [`GeneratorConfig::fractal`].
pub const FRACTAL_PERSISTENCE: f64 = 0.5;

/// Default rows and columns per layer.
pub const CHUNK_SIZE: usize = 500;
/// Default number of layers.
pub const MAX_HEIGHT: usize = 100;
pub const BASE_FREQUENCY: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of layers.
    pub height: usize,
    /// Rows per layer.
    pub width: usize,
    /// Columns per row.
    pub depth: usize,
    pub frequency: f64,
    pub octaves: u32,
    pub persistence: f64,
    pub interpolation: Interpolation,
    /// Permutation seed. `None` lets the host draw one.
    pub seed: Option<u64>,
    /// Fill layers on the rayon pool instead of the calling thread.
    pub parallel: bool,
}

impl Default for GeneratorConfig {
    /// Single octave with no amplitude decay, matching the reference terrain.
    fn default() -> Self {
        Self {
            height: MAX_HEIGHT,
            width: CHUNK_SIZE,
            depth: CHUNK_SIZE,
            frequency: BASE_FREQUENCY,
            octaves: 1,
            persistence: 1.0,
            interpolation: Interpolation::Smoothstep,
            seed: None,
            parallel: false,
        }
    }
}

impl GeneratorConfig {
    /// Reference sizing with every octave enabled and halving amplitude.
    ///
    /// The reference program declares these limits but only ever runs one
    /// octave at full amplitude, so this is opt-in.
    pub fn fractal() -> Self {
        Self {
            octaves: MAX_OCTAVES,
            persistence: FRACTAL_PERSISTENCE,
            ..Self::default()
        }
    }

    pub fn with_dimensions(mut self, height: usize, width: usize, depth: usize) -> Self {
        self.height = height;
        self.width = width;
        self.depth = depth;
        self
    }

    pub fn with_octaves(mut self, octaves: u32, persistence: f64) -> Self {
        self.octaves = octaves;
        self.persistence = persistence;
        self
    }

    pub fn from_toml_str(source: &str) -> Result<Self, GenError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GenError> {
        let source = std::fs::read_to_string(path.as_ref())?;
        log::debug!("loading generator config from {}", path.as_ref().display());
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), GenError> {
        if self.height == 0 || self.width == 0 || self.depth == 0 {
            return Err(GenError::InvalidDimensions {
                height: self.height,
                width: self.width,
                depth: self.depth,
            });
        }
        if self.octaves > MAX_OCTAVES {
            return Err(GenError::TooManyOctaves {
                requested: self.octaves,
                max: MAX_OCTAVES,
            });
        }
        if !self.frequency.is_finite() || self.frequency <= 0.0 {
            return Err(GenError::InvalidParameter {
                name: "frequency",
                value: self.frequency,
            });
        }
        if !self.persistence.is_finite() {
            return Err(GenError::InvalidParameter {
                name: "persistence",
                value: self.persistence,
            });
        }
        Ok(())
    }

    pub fn cell_count(&self) -> Option<usize> {
        self.height
            .checked_mul(self.width)
            .and_then(|n| n.checked_mul(self.depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn default_matches_reference() {
        let config = GeneratorConfig::default();
        assert_eq!((config.height, config.width, config.depth), (100, 500, 500));
        assert_eq!(config.frequency, 0.2);
        assert_eq!(config.octaves, 1);
        assert_eq!(config.persistence, 1.0);
        assert_eq!(config.interpolation, Interpolation::Smoothstep);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn fractal_uses_declared_limits() {
        let config = GeneratorConfig::fractal();
        assert_eq!(config.octaves, 16);
        assert_eq!(config.persistence, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_dimensions() {
        let err = GeneratorConfig::default()
            .with_dimensions(10, 0, 10)
            .validate()
            .unwrap_err();
        assert!(matches!(err, GenError::InvalidDimensions { width: 0, .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    }

    #[test]
    fn rejects_too_many_octaves() {
        let err = GeneratorConfig::default()
            .with_octaves(17, 0.5)
            .validate()
            .unwrap_err();
        assert!(matches!(err, GenError::TooManyOctaves { requested: 17, max: 16 }));

        for octaves in [0, 1, MAX_OCTAVES] {
            let config = GeneratorConfig::default().with_octaves(octaves, 0.5);
            assert!(config.validate().is_ok(), "{octaves} octaves");
        }
    }

    #[test]
    fn rejects_bad_floats() {
        let mut config = GeneratorConfig::default();
        config.frequency = 0.0;
        assert!(matches!(
            config.validate(),
            Err(GenError::InvalidParameter { name: "frequency", .. })
        ));

        let mut config = GeneratorConfig::default();
        config.persistence = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(GenError::InvalidParameter { name: "persistence", .. })
        ));
    }

    #[test]
    fn toml_overrides_keep_defaults() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            height = 8
            octaves = 4
            persistence = 0.5
            interpolation = "fade"
            seed = 1234
            "#,
        )
        .unwrap();
        assert_eq!(config.height, 8);
        assert_eq!(config.width, CHUNK_SIZE);
        assert_eq!(config.octaves, 4);
        assert_eq!(config.interpolation, Interpolation::Fade);
        assert_eq!(config.seed, Some(1234));
        assert!(!config.parallel);
    }

    #[test]
    fn toml_is_validated() {
        let err = GeneratorConfig::from_toml_str("octaves = 40").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);

        let err = GeneratorConfig::from_toml_str("height = \"tall\"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn cell_count_overflow() {
        let config = GeneratorConfig::default().with_dimensions(usize::MAX, 2, 1);
        assert_eq!(config.cell_count(), None);
        assert_eq!(GeneratorConfig::default().cell_count(), Some(25_000_000));
    }
}
