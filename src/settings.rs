//! Animation settings: parameter ranges and scene timing
//!
//! Loaded once at startup and immutable afterwards. On web the JSON form is
//! read from LocalStorage; natively the built-in defaults are used.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::params::ParamId;

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid range for `{name}`: min {min} > max {max}")]
    InvalidRange { name: String, min: f32, max: f32 },
    #[error("non-finite bound for `{name}`")]
    NonFinite { name: String },
    #[error("`{name}` must be strictly positive, got min {min}")]
    NonPositive { name: String, min: f32 },
    #[error("malformed settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Bounds a value is drawn from. Bounds are inclusive for validation and
/// `contains`; draws through `lerp` with a `[0, 1)` sample land in
/// `[min, max)`, or exactly on `min` when the range is degenerate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Map a unit sample in `[0, 1)` into `[min, max)`, clamped so float
    /// rounding never leaves the range
    #[inline]
    pub fn lerp(&self, unit: f32) -> f32 {
        (self.min + (self.max - self.min) * unit).clamp(self.min, self.max)
    }

    fn validate(&self, name: impl Into<String>) -> Result<(), ConfigError> {
        let name = name.into();
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(ConfigError::NonFinite { name });
        }
        if self.min > self.max {
            return Err(ConfigError::InvalidRange {
                name,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Particle layout ranges
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticleRanges {
    pub area_h: Range,
    pub area_w: Range,
    pub size: Range,
    pub spacing: Range,
}

/// Ranges for one noise layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseRanges {
    pub level: Range,
    pub scale: Range,
    pub speed: Range,
}

/// Camera target ranges; `fov` is an offset from the base field of view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraRanges {
    pub x: Range,
    pub y: Range,
    pub z: Range,
    pub fov: Range,
}

/// The full group -> param -> range table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamRanges {
    pub particles: ParticleRanges,
    pub noise_color: NoiseRanges,
    pub noise_a: NoiseRanges,
    pub noise_b: NoiseRanges,
}

impl ParamRanges {
    /// Range declared for a registry parameter
    pub fn range(&self, id: ParamId) -> Range {
        match id {
            ParamId::AreaH => self.particles.area_h,
            ParamId::AreaW => self.particles.area_w,
            ParamId::Size => self.particles.size,
            ParamId::Spacing => self.particles.spacing,
            ParamId::NoiseColorLevel => self.noise_color.level,
            ParamId::NoiseColorScale => self.noise_color.scale,
            ParamId::NoiseColorSpeed => self.noise_color.speed,
            ParamId::NoiseALevel => self.noise_a.level,
            ParamId::NoiseAScale => self.noise_a.scale,
            ParamId::NoiseASpeed => self.noise_a.speed,
            ParamId::NoiseBLevel => self.noise_b.level,
            ParamId::NoiseBScale => self.noise_b.scale,
            ParamId::NoiseBSpeed => self.noise_b.speed,
        }
    }
}

impl Default for ParamRanges {
    fn default() -> Self {
        Self {
            particles: ParticleRanges {
                area_h: Range::new(1.0, 50.0),
                area_w: Range::new(1.0, 50.0),
                size: Range::new(0.25, 2.0),
                spacing: Range::new(0.25, 0.75),
            },
            noise_color: NoiseRanges {
                level: Range::new(1.0, 1.0),
                scale: Range::new(0.0, 1.0),
                speed: Range::new(0.0, 1.0),
            },
            noise_a: NoiseRanges {
                level: Range::new(0.0, 2.0),
                scale: Range::new(0.0, 1.0),
                speed: Range::new(0.0, 1.0),
            },
            noise_b: NoiseRanges {
                level: Range::new(0.0, 2.0),
                scale: Range::new(0.0, 1.0),
                speed: Range::new(0.0, 1.0),
            },
        }
    }
}

impl Default for CameraRanges {
    fn default() -> Self {
        Self {
            x: Range::new(-20.0, 20.0),
            y: Range::new(-20.0, 20.0),
            z: Range::new(-20.0, 20.0),
            fov: Range::new(-20.0, 20.0),
        }
    }
}

/// Animation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Registry parameter ranges
    pub ranges: ParamRanges,
    /// Camera target ranges
    pub camera: CameraRanges,
    /// Delay between automatic scene transitions (ms)
    pub transition_delay_ms: Range,
    /// Advance scenes automatically on the randomized timer
    pub auto_advance: bool,
    /// Run seed; a time-based seed is used when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ranges: ParamRanges::default(),
            camera: CameraRanges::default(),
            transition_delay_ms: Range::new(3000.0, 9000.0),
            auto_advance: true,
            seed: None,
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check every declared range; the first bad one is reported
    pub fn validate(&self) -> Result<(), ConfigError> {
        for id in ParamId::ALL {
            self.ranges.range(id).validate(id.to_string())?;
        }
        let spacing = self.ranges.particles.spacing;
        if spacing.min <= 0.0 {
            return Err(ConfigError::NonPositive {
                name: ParamId::Spacing.to_string(),
                min: spacing.min,
            });
        }

        self.camera.x.validate("camera.x")?;
        self.camera.y.validate("camera.y")?;
        self.camera.z.validate("camera.z")?;
        self.camera.fov.validate("camera.fov")?;

        self.transition_delay_ms.validate("transitionDelayMs")?;
        if self.transition_delay_ms.min < 0.0 {
            return Err(ConfigError::NonPositive {
                name: "transitionDelayMs".to_string(),
                min: self.transition_delay_ms.min,
            });
        }
        Ok(())
    }

    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "noise_planes_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Result<Self, ConfigError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                let settings = Self::from_json(&json)?;
                log::info!("Loaded settings from LocalStorage");
                return Ok(settings);
            }
        }

        log::info!("Using default settings");
        Ok(Self::default())
    }

    /// Native: built-in defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Self::default();
        settings.validate()?;
        Ok(settings)
    }
}
