//! Rendering
//!
//! The animation core only talks to a [`Renderer`]: it sets the viewport,
//! pushes a projection and hands over a borrowed view of the field once per
//! frame. The WebGPU implementation draws every vertex as an additive,
//! camera-facing sprite.

pub mod point_pipeline;
pub mod vertex;

pub use point_pipeline::PointRenderState;

use glam::Mat4;

use crate::sim::Material;

/// Borrowed, read-only view of one frame's drawable state
#[derive(Debug, Clone, Copy)]
pub struct SceneView<'a> {
    /// Field generation the buffers belong to
    pub generation: u64,
    /// Interleaved `x, y, z`
    pub positions: &'a [f32],
    /// One blend ratio per vertex
    pub color_ratios: &'a [f32],
    pub material: &'a Material,
    /// World-to-view transform
    pub view: Mat4,
}

impl SceneView<'_> {
    pub fn vertex_count(&self) -> usize {
        self.color_ratios.len()
    }
}

/// Rendering collaborator driven once per frame
pub trait Renderer {
    /// `false` once torn down; the frame is skipped
    fn is_alive(&self) -> bool {
        true
    }

    fn set_viewport_size(&mut self, width: u32, height: u32);

    /// Perspective inputs; `fov` in degrees
    fn update_projection(&mut self, fov: f32, aspect: f32, near: f32, far: f32);

    fn clear_and_draw(&mut self, view: &SceneView<'_>);

    /// Drop any resources held for a disposed field
    fn release_field(&mut self, _generation: u64) {}

    /// Release everything; `is_alive` reports `false` afterwards
    fn teardown(&mut self) {}
}

/// Headless renderer that only reports what it would draw
#[derive(Debug, Default)]
pub struct LogRenderer {
    pub frames: u64,
    pub size: (u32, u32),
    pub projection: Option<(f32, f32)>,
    alive: bool,
    last_generation: Option<u64>,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self {
            alive: true,
            ..Default::default()
        }
    }
}

impl Renderer for LogRenderer {
    fn is_alive(&self) -> bool {
        self.alive
    }

    fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        log::debug!("Viewport {}x{}", width, height);
    }

    fn update_projection(&mut self, fov: f32, aspect: f32, _near: f32, _far: f32) {
        self.projection = Some((fov, aspect));
    }

    fn clear_and_draw(&mut self, view: &SceneView<'_>) {
        self.frames += 1;
        if self.last_generation != Some(view.generation) {
            self.last_generation = Some(view.generation);
            log::info!(
                "Drawing field #{}: {} points, size {:.2}",
                view.generation,
                view.vertex_count(),
                view.material.particle_size
            );
        }
        log::trace!("Frame {} at {:.0} ms", self.frames, view.material.elapsed_ms);
    }

    fn release_field(&mut self, generation: u64) {
        log::debug!("Released field #{}", generation);
    }

    fn teardown(&mut self) {
        self.alive = false;
        log::info!("Log renderer torn down after {} frames", self.frames);
    }
}
