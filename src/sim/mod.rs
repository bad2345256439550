//! Procedural animation core
//!
//! Everything that decides what the field looks like on a given frame lives
//! here. This module never touches a graphics API:
//! - Seeded RNG and noise only
//! - In-place per-frame updates, no per-vertex allocation
//! - Renderer reached only through the `Renderer` trait passed in per call

pub mod camera;
pub mod ease;
pub mod field;
pub mod noise;
pub mod params;
pub mod scheduler;
pub mod state;
pub mod tick;

pub use camera::{CameraController, CameraState, Projection};
pub use ease::ease;
pub use field::{ParticleField, Vertex, grid_dims};
pub use self::noise::{NoiseChannel, NoiseChannels};
pub use params::{
    ColorId, EaseMode, NoiseParams, ParamGroup, ParamId, Parameter, ParameterRegistry,
    ParticleParams, Rgb,
};
pub use scheduler::{SceneScheduler, SchedulerPhase};
pub use state::{Material, SceneState};
pub use tick::{NoiseLayers, color_ratio, update_field};
