//! Scene state
//!
//! Owns everything the animation mutates: parameters, noise channels, the
//! active field, the camera and the transition scheduler. The renderer is
//! passed in per call; nothing here holds on to it.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::camera::{CameraController, CameraState};
use super::field::ParticleField;
use super::noise::NoiseChannels;
use super::params::{ColorId, ParamId, ParameterRegistry, Rgb};
use super::scheduler::SceneScheduler;
use super::tick::{NoiseLayers, update_field};
use crate::ms_to_secs;
use crate::platform::Viewport;
use crate::renderer::{Renderer, SceneView};
use crate::settings::Settings;

/// Per-field uniforms handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Milliseconds since the field was created
    pub elapsed_ms: f32,
    pub particle_size: f32,
    pub color_a: Rgb,
    pub color_b: Rgb,
}

/// Everything one running visualization owns
#[derive(Debug)]
pub struct SceneState {
    /// Run seed for reproducibility
    pub seed: u64,
    registry: ParameterRegistry,
    channels: NoiseChannels,
    field: ParticleField,
    camera: CameraController,
    scheduler: SceneScheduler,
    viewport: Viewport,
    material: Material,
    /// Frame timestamp the current field started at
    time_start: Option<f64>,
    elapsed_ms: f64,
    /// Number of fields built so far (also the field generation)
    scene_index: u64,
}

impl SceneState {
    /// Build the first scene from settings
    pub fn new(settings: &Settings, seed: u64) -> Self {
        // Independent streams per component, all derived from the run seed
        let mut seeds = Pcg32::seed_from_u64(seed);
        let registry = ParameterRegistry::new(&settings.ranges, seeds.random());
        let channels = NoiseChannels::from_seed(seeds.random());
        let mut camera = CameraController::new(settings.camera.clone(), seeds.random());
        let scheduler = SceneScheduler::new(
            settings.transition_delay_ms,
            settings.auto_advance,
            seeds.random(),
        );

        camera.randomize_target();
        let p = registry.particles();
        let field = ParticleField::generate(p.area_w, p.area_h, p.spacing, 0);
        let material = Material {
            elapsed_ms: 0.0,
            particle_size: p.size,
            color_a: registry.color(ColorId::A),
            color_b: registry.color(ColorId::B),
        };

        log::info!(
            "Scene 0: {}x{} grid ({} points)",
            field.rows(),
            field.cols(),
            field.len()
        );

        Self {
            seed,
            registry,
            channels,
            field,
            camera,
            scheduler,
            viewport: Viewport::default(),
            material,
            time_start: None,
            elapsed_ms: 0.0,
            scene_index: 0,
        }
    }

    pub fn registry(&self) -> &ParameterRegistry {
        &self.registry
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn camera(&self) -> &CameraState {
        self.camera.current()
    }

    pub fn camera_target(&self) -> &CameraState {
        self.camera.target()
    }

    pub fn scheduler(&self) -> &SceneScheduler {
        &self.scheduler
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn scene_index(&self) -> u64 {
        self.scene_index
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn set_auto_advance(&mut self, on: bool) {
        self.scheduler.set_auto_advance(on);
        log::info!("Auto advance: {}", on);
    }

    /// Drop the pending transition (driver stopped)
    pub fn cancel_pending(&mut self) {
        self.scheduler.cancel();
    }

    /// Tear the scene down: no pending transition, field released
    pub fn dispose(&mut self, renderer: &mut dyn Renderer) {
        self.scheduler.cancel();
        if self.field.is_disposed() {
            return;
        }
        let generation = self.field.generation();
        self.field.dispose();
        if renderer.is_alive() {
            renderer.release_field(generation);
        }
        log::info!("Scene {} disposed", self.scene_index);
    }

    /// Viewport changed; only the aspect ratio depends on it
    pub fn resize(&mut self, width: u32, height: u32, renderer: &mut dyn Renderer) {
        self.viewport.resize(width, height);
        if renderer.is_alive() {
            renderer.set_viewport_size(width, height);
        }
    }

    /// Replace the scene: dispose the field, re-roll every parameter and the
    /// camera target, build the new field and schedule the next transition.
    pub fn next_scene(&mut self, now_ms: f64, renderer: &mut dyn Renderer) {
        if !self.scheduler.begin_transition() {
            return;
        }

        let old_generation = self.field.generation();
        self.field.dispose();
        if renderer.is_alive() {
            renderer.release_field(old_generation);
        }

        self.registry.randomize_all();
        self.camera.randomize_target();

        self.scene_index += 1;
        let p = self.registry.particles();
        self.field = ParticleField::generate(p.area_w, p.area_h, p.spacing, self.scene_index);
        self.time_start = Some(now_ms);
        self.elapsed_ms = 0.0;

        self.scheduler.finish_transition(now_ms);

        log::info!(
            "Scene {}: {}x{} grid ({} points), colors {} / {}",
            self.scene_index,
            self.field.rows(),
            self.field.cols(),
            self.field.len(),
            self.registry.color(ColorId::A).to_hex(),
            self.registry.color(ColorId::B).to_hex(),
        );
    }

    /// Run one frame: transition check, easing, field update, camera, draw.
    ///
    /// Returns `false` when the frame was skipped because the renderer is gone.
    pub fn frame(&mut self, now_ms: f64, renderer: &mut dyn Renderer) -> bool {
        if !renderer.is_alive() {
            log::trace!("Renderer unavailable, frame skipped");
            return false;
        }

        let start = *self.time_start.get_or_insert(now_ms);
        self.elapsed_ms = (now_ms - start).max(0.0);

        if self.scheduler.poll(now_ms) {
            self.next_scene(now_ms, renderer);
        }

        self.registry.tick();
        let layers = NoiseLayers {
            a: self.registry.noise_a(),
            b: self.registry.noise_b(),
            color: self.registry.noise_color(),
        };
        update_field(
            &mut self.field,
            &self.channels,
            &layers,
            ms_to_secs(self.elapsed_ms),
        );
        self.material = Material {
            elapsed_ms: self.elapsed_ms as f32,
            particle_size: self.registry.get(ParamId::Size),
            color_a: self.registry.color(ColorId::A),
            color_b: self.registry.color(ColorId::B),
        };

        self.camera.ease();
        if !renderer.is_alive() {
            return false;
        }
        let projection = self.camera.projection(self.viewport.aspect());
        renderer.update_projection(
            projection.fov,
            projection.aspect,
            projection.near,
            projection.far,
        );
        renderer.clear_and_draw(&self.view());
        true
    }

    /// Borrowed view of the drawable state
    pub fn view(&self) -> SceneView<'_> {
        SceneView {
            generation: self.field.generation(),
            positions: self.field.positions(),
            color_ratios: self.field.color_ratios(),
            material: &self.material,
            view: self.camera.current().view_matrix(),
        }
    }
}
