//! Animation driver
//!
//! Owns the frame loop lifecycle. The platform supplies a [`FrameScheduler`]
//! (`requestAnimationFrame` in the browser, a manual clock natively); the
//! driver holds at most one outstanding frame request and forwards each
//! delivered frame to the scene.

use crate::platform::{ResizeDebouncer, Viewport};
use crate::renderer::Renderer;
use crate::settings::Settings;
use crate::sim::SceneState;

/// Opaque id of a requested frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// Source of display-synchronized frame callbacks
pub trait FrameScheduler {
    /// Ask for one callback on the next display refresh; `None` if the
    /// platform refused the request
    fn request_frame(&mut self) -> Option<FrameHandle>;
    /// Withdraw a request that has not fired yet
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Start/stop lifecycle plus per-frame entry point
pub trait Animatable {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
    /// Called by the platform when a requested frame fires
    fn on_frame(&mut self, now_ms: f64);
}

/// Something with a drawing surface that can be resized
pub trait Renderable {
    fn size(&self) -> (u32, u32);
    fn resize(&mut self, width: u32, height: u32);
}

/// Measures the drawing area in CSS pixels
pub type ViewportProbe = Box<dyn FnMut() -> Viewport>;

/// Drives a [`SceneState`] from frame callbacks
pub struct AnimationDriver<F: FrameScheduler, R: Renderer> {
    frames: F,
    renderer: R,
    scene: SceneState,
    resize: ResizeDebouncer,
    pending: Option<FrameHandle>,
    frame_count: u64,
    /// A usable viewport size has been applied
    sized: bool,
    measure: Option<ViewportProbe>,
}

impl<F: FrameScheduler, R: Renderer> AnimationDriver<F, R> {
    pub fn new(settings: &Settings, seed: u64, frames: F, renderer: R) -> Self {
        Self {
            frames,
            renderer,
            scene: SceneState::new(settings, seed),
            resize: ResizeDebouncer::default(),
            pending: None,
            frame_count: 0,
            sized: false,
            measure: None,
        }
    }

    /// Source re-measured every frame until the viewport is sized
    pub fn set_viewport_source(&mut self, measure: ViewportProbe) {
        self.measure = Some(measure);
    }

    pub fn is_sized(&self) -> bool {
        self.sized
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn frames(&self) -> &F {
        &self.frames
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Jump to a new scene right away
    pub fn next_scene(&mut self, now_ms: f64) {
        self.scene.next_scene(now_ms, &mut self.renderer);
    }

    pub fn set_auto_advance(&mut self, on: bool) {
        self.scene.set_auto_advance(on);
    }

    /// Raw resize event; applied once events settle
    pub fn notify_resize(&mut self, width: u32, height: u32, now_ms: f64) {
        self.resize.notify(width, height, now_ms);
    }

    /// Stop the loop, release the field and tear the renderer down.
    /// Later frames are skipped because the renderer is no longer alive.
    pub fn dispose(&mut self) {
        self.stop();
        self.scene.dispose(&mut self.renderer);
        if self.renderer.is_alive() {
            self.renderer.teardown();
        }
        self.measure = None;
        log::info!("Animation disposed");
    }

    fn apply_size(&mut self, viewport: Viewport) {
        self.scene
            .resize(viewport.width, viewport.height, &mut self.renderer);
        self.sized = viewport.is_sized();
    }

    /// Retry the size while the surface has no usable layout yet
    fn ensure_sized(&mut self) {
        if self.sized {
            return;
        }
        let Some(measure) = self.measure.as_mut() else {
            return;
        };
        let viewport = measure();
        if viewport.is_sized() {
            log::debug!("Viewport sized: {}x{}", viewport.width, viewport.height);
            self.apply_size(viewport);
        }
    }

    fn request(&mut self) {
        self.pending = self.frames.request_frame();
        if self.pending.is_none() {
            log::warn!("Frame request refused; animation halted");
        }
    }
}

impl<F: FrameScheduler, R: Renderer> Animatable for AnimationDriver<F, R> {
    fn start(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.frames.cancel_frame(handle);
        }
        self.request();
        log::info!("Animation started");
    }

    fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.frames.cancel_frame(handle);
        }
        self.scene.cancel_pending();
        log::info!("Animation stopped after {} frames", self.frame_count);
    }

    fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    fn on_frame(&mut self, now_ms: f64) {
        // A callback that slipped past a cancel
        if self.pending.take().is_none() {
            log::debug!("Frame after stop ignored");
            return;
        }

        if let Some(viewport) = self.resize.poll(now_ms) {
            self.apply_size(viewport);
        }
        self.ensure_sized();
        if self.scene.frame(now_ms, &mut self.renderer) {
            self.frame_count += 1;
        }

        self.request();
    }
}

impl<F: FrameScheduler, R: Renderer> Renderable for AnimationDriver<F, R> {
    fn size(&self) -> (u32, u32) {
        let v = self.scene.viewport();
        (v.width, v.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.apply_size(Viewport::new(width, height));
    }
}

/// Frame scheduler driven by hand: requests are queued and delivered when
/// the owner advances the clock. Used natively and in tests.
#[derive(Debug, Default)]
pub struct ManualFrames {
    next_id: i32,
    pending: Option<FrameHandle>,
    pub requested: u32,
    pub cancelled: u32,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outstanding request, if any
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Hand out the outstanding request for delivery
    pub fn take_due(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }
}

impl FrameScheduler for ManualFrames {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        self.next_id += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next_id);
        self.pending = Some(handle);
        Some(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}

impl<R: Renderer> AnimationDriver<ManualFrames, R> {
    /// Deliver the outstanding frame at `now_ms`; `false` if none was due
    pub fn pump(&mut self, now_ms: f64) -> bool {
        if self.frames.take_due().is_none() {
            return false;
        }
        self.on_frame(now_ms);
        true
    }
}
