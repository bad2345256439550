//! Noise Planes - an animated, noise-driven particle field
//!
//! Core modules:
//! - `sim`: Procedural animation core (noise, easing, parameters, field, camera, scheduler)
//! - `driver`: Frame loop lifecycle (start/stop, frame requests)
//! - `renderer`: Renderer contract and the WebGPU point renderer
//! - `platform`: Viewport tracking and resize debouncing
//! - `settings`: Parameter ranges and transition timing

pub mod driver;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use driver::{
    AnimationDriver, Animatable, FrameHandle, FrameScheduler, ManualFrames, Renderable,
};
pub use settings::{ConfigError, Range, Settings};

/// Animation configuration constants
pub mod consts {
    /// Easing rate for the particle size parameter
    pub const PARTICLE_SIZE_EASE: f32 = 0.025;
    /// Easing rate for camera position and fov (10x slower than particle size)
    pub const CAMERA_EASE: f32 = 0.0025;
    /// Snap threshold used by every easing call site
    pub const EASE_THRESHOLD: f32 = 0.0;

    /// Camera defaults
    pub const CAMERA_BASE_FOV: f32 = 60.0;
    pub const CAMERA_MIN_FOV: f32 = 1.0;
    pub const CAMERA_MAX_FOV: f32 = 179.0;
    pub const CAMERA_NEAR: f32 = 0.1;
    pub const CAMERA_FAR: f32 = 1000.0;

    /// Color ratio assigned to freshly generated vertices (even blend)
    pub const NEUTRAL_COLOR_RATIO: f32 = 0.5;

    /// Viewport must exceed this many CSS pixels on both sides to count as sized
    pub const CANVAS_MIN_SIZED_LEN: u32 = 50;
    /// Device pixel ratio used for the drawing buffer
    pub const PIXEL_RATIO: f64 = 2.0;
    /// Resize notifications are coalesced over this window
    pub const RESIZE_DEBOUNCE_MS: f64 = 100.0;
}

/// Convert a frame timestamp delta in milliseconds to seconds
#[inline]
pub fn ms_to_secs(ms: f64) -> f32 {
    (ms / 1000.0) as f32
}
