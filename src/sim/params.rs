//! Parameter registry
//!
//! Every tunable of the visualization has a current value and a target
//! value. Randomizing either snaps the current value or only moves the
//! target; eased parameters then close the gap one `tick` at a time.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ease::ease;
use crate::consts::{EASE_THRESHOLD, PARTICLE_SIZE_EASE};
use crate::settings::{ParamRanges, Range};

/// Semantic parameter groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamGroup {
    Particles,
    Colors,
    NoiseColor,
    NoiseA,
    NoiseB,
}

impl ParamGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamGroup::Particles => "particles",
            ParamGroup::Colors => "colors",
            ParamGroup::NoiseColor => "noiseColor",
            ParamGroup::NoiseA => "noiseA",
            ParamGroup::NoiseB => "noiseB",
        }
    }
}

/// Numeric registry parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamId {
    AreaH,
    AreaW,
    Size,
    Spacing,
    NoiseColorLevel,
    NoiseColorScale,
    NoiseColorSpeed,
    NoiseALevel,
    NoiseAScale,
    NoiseASpeed,
    NoiseBLevel,
    NoiseBScale,
    NoiseBSpeed,
}

impl ParamId {
    pub const COUNT: usize = 13;

    pub const ALL: [ParamId; Self::COUNT] = [
        ParamId::AreaH,
        ParamId::AreaW,
        ParamId::Size,
        ParamId::Spacing,
        ParamId::NoiseColorLevel,
        ParamId::NoiseColorScale,
        ParamId::NoiseColorSpeed,
        ParamId::NoiseALevel,
        ParamId::NoiseAScale,
        ParamId::NoiseASpeed,
        ParamId::NoiseBLevel,
        ParamId::NoiseBScale,
        ParamId::NoiseBSpeed,
    ];

    pub fn group(&self) -> ParamGroup {
        match self {
            ParamId::AreaH | ParamId::AreaW | ParamId::Size | ParamId::Spacing => {
                ParamGroup::Particles
            }
            ParamId::NoiseColorLevel | ParamId::NoiseColorScale | ParamId::NoiseColorSpeed => {
                ParamGroup::NoiseColor
            }
            ParamId::NoiseALevel | ParamId::NoiseAScale | ParamId::NoiseASpeed => {
                ParamGroup::NoiseA
            }
            ParamId::NoiseBLevel | ParamId::NoiseBScale | ParamId::NoiseBSpeed => {
                ParamGroup::NoiseB
            }
        }
    }

    /// Name within the group
    pub fn name(&self) -> &'static str {
        match self {
            ParamId::AreaH => "areaH",
            ParamId::AreaW => "areaW",
            ParamId::Size => "size",
            ParamId::Spacing => "spacing",
            ParamId::NoiseColorLevel | ParamId::NoiseALevel | ParamId::NoiseBLevel => "level",
            ParamId::NoiseColorScale | ParamId::NoiseAScale | ParamId::NoiseBScale => "scale",
            ParamId::NoiseColorSpeed | ParamId::NoiseASpeed | ParamId::NoiseBSpeed => "speed",
        }
    }

    /// How this parameter advances between randomizations.
    ///
    /// Only particle size eases; camera easing lives in the camera controller.
    pub fn mode(&self) -> EaseMode {
        match self {
            ParamId::Size => EaseMode::Eased {
                rate: PARTICLE_SIZE_EASE,
                threshold: EASE_THRESHOLD,
            },
            _ => EaseMode::Snap,
        }
    }

    /// Re-rolled as target (eased approach) on scene change
    pub fn rerolls_target(&self) -> bool {
        matches!(self.mode(), EaseMode::Eased { .. })
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.group().as_str(), self.name())
    }
}

/// Color slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorId {
    A,
    B,
}

impl ColorId {
    pub const ALL: [ColorId; 2] = [ColorId::A, ColorId::B];
}

/// Easing behaviour of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EaseMode {
    /// Value jumps straight to each new draw
    Snap,
    /// Value approaches its target by `rate` per tick
    Eased { rate: f32, threshold: f32 },
}

/// RGB color with channels in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            r: rng.random::<f32>(),
            g: rng.random::<f32>(),
            b: rng.random::<f32>(),
        }
    }

    /// Opaque RGBA for GPU upload
    pub fn to_rgba(self) -> [f32; 4] {
        [self.r, self.g, self.b, 1.0]
    }

    pub fn to_hex(self) -> String {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", c(self.r), c(self.g), c(self.b))
    }
}

/// A single tunable with current and target values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub id: ParamId,
    pub min: f32,
    pub max: f32,
    cur: f32,
    trgt: f32,
    pub mode: EaseMode,
}

impl Parameter {
    pub fn new(id: ParamId, range: Range) -> Self {
        Self {
            id,
            min: range.min,
            max: range.max,
            cur: range.min,
            trgt: range.min,
            mode: id.mode(),
        }
    }

    pub fn cur(&self) -> f32 {
        self.cur
    }

    pub fn trgt(&self) -> f32 {
        self.trgt
    }

    /// Draw a new value; either only the target moves or both snap to it
    pub fn randomize<R: Rng>(&mut self, rng: &mut R, apply_to_target: bool) -> f32 {
        let value = Range::new(self.min, self.max).lerp(rng.random::<f32>());
        self.trgt = value;
        if !apply_to_target {
            self.cur = value;
        }
        value
    }

    /// Advance one frame toward the target (eased parameters only)
    pub fn tick(&mut self) {
        if let EaseMode::Eased { rate, threshold } = self.mode {
            self.cur = ease(self.cur, self.trgt, rate, threshold);
        }
    }
}

/// Particle layout snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleParams {
    pub area_h: f32,
    pub area_w: f32,
    pub size: f32,
    pub spacing: f32,
}

/// One noise layer's snapshot
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NoiseParams {
    pub level: f32,
    pub scale: f32,
    pub speed: f32,
}

/// All named parameters and colors driving the visualization
#[derive(Debug, Clone)]
pub struct ParameterRegistry {
    params: Vec<Parameter>,
    colors: [Rgb; 2],
    rng: Pcg32,
}

impl ParameterRegistry {
    /// Build the registry and give every parameter an initial snapped draw
    pub fn new(ranges: &ParamRanges, seed: u64) -> Self {
        let params = ParamId::ALL
            .iter()
            .map(|&id| Parameter::new(id, ranges.range(id)))
            .collect();

        let mut registry = Self {
            params,
            colors: [Rgb::WHITE; 2],
            rng: Pcg32::seed_from_u64(seed),
        };
        for id in ParamId::ALL {
            registry.randomize(id, false);
        }
        for color in ColorId::ALL {
            registry.randomize_color(color);
        }
        registry
    }

    /// Draw a new value for `id` within its range
    pub fn randomize(&mut self, id: ParamId, apply_to_target: bool) -> f32 {
        let param = &mut self.params[id.index()];
        param.randomize(&mut self.rng, apply_to_target)
    }

    /// Re-roll a color atomically (colors never ease)
    pub fn randomize_color(&mut self, id: ColorId) -> Rgb {
        let color = Rgb::random(&mut self.rng);
        self.colors[id as usize] = color;
        color
    }

    /// Scene-change re-roll: colors, then every parameter. Eased parameters
    /// only receive a new target, all others snap.
    pub fn randomize_all(&mut self) {
        for color in ColorId::ALL {
            self.randomize_color(color);
        }
        for id in ParamId::ALL {
            self.randomize(id, id.rerolls_target());
        }
    }

    /// Advance eased parameters one frame
    pub fn tick(&mut self) {
        for param in &mut self.params {
            param.tick();
        }
    }

    /// Current value of `id`
    #[inline]
    pub fn get(&self, id: ParamId) -> f32 {
        self.params[id.index()].cur
    }

    pub fn param(&self, id: ParamId) -> &Parameter {
        &self.params[id.index()]
    }

    pub fn color(&self, id: ColorId) -> Rgb {
        self.colors[id as usize]
    }

    pub fn particles(&self) -> ParticleParams {
        ParticleParams {
            area_h: self.get(ParamId::AreaH),
            area_w: self.get(ParamId::AreaW),
            size: self.get(ParamId::Size),
            spacing: self.get(ParamId::Spacing),
        }
    }

    pub fn noise_a(&self) -> NoiseParams {
        self.noise_params(ParamId::NoiseALevel, ParamId::NoiseAScale, ParamId::NoiseASpeed)
    }

    pub fn noise_b(&self) -> NoiseParams {
        self.noise_params(ParamId::NoiseBLevel, ParamId::NoiseBScale, ParamId::NoiseBSpeed)
    }

    pub fn noise_color(&self) -> NoiseParams {
        self.noise_params(
            ParamId::NoiseColorLevel,
            ParamId::NoiseColorScale,
            ParamId::NoiseColorSpeed,
        )
    }

    fn noise_params(&self, level: ParamId, scale: ParamId, speed: ParamId) -> NoiseParams {
        NoiseParams {
            level: self.get(level),
            scale: self.get(scale),
            speed: self.get(speed),
        }
    }
}
