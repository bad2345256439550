//! Noise Planes entry point
//!
//! Handles platform-specific initialization and runs the animation loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use noise_planes::consts::*;
    use noise_planes::platform::Viewport;
    use noise_planes::renderer::PointRenderState;
    use noise_planes::{
        Animatable, AnimationDriver, FrameHandle, FrameScheduler, Renderable, Settings,
    };

    type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;
    type App = AnimationDriver<RafFrames, PointRenderState>;

    /// `requestAnimationFrame` behind the driver's scheduler seam
    struct RafFrames {
        callback: FrameCallback,
    }

    impl FrameScheduler for RafFrames {
        fn request_frame(&mut self) -> Option<FrameHandle> {
            let Some(window) = web_sys::window() else {
                log::warn!("No window; frame request dropped");
                return None;
            };
            let callback = self.callback.borrow();
            let Some(cb) = callback.as_ref() else {
                log::warn!("Frame requested before the callback was installed");
                return None;
            };
            match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                Ok(id) => Some(FrameHandle(id)),
                Err(e) => {
                    log::warn!("requestAnimationFrame failed: {:?}", e);
                    None
                }
            }
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(handle.0);
            }
        }
    }

    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0)
    }

    fn css_size(canvas: &HtmlCanvasElement) -> Viewport {
        Viewport::new(
            canvas.client_width().max(0) as u32,
            canvas.client_height().max(0) as u32,
        )
    }

    /// Handle returned to the page for start/stop and manual control
    #[wasm_bindgen]
    pub struct NoisePlanes {
        app: Rc<RefCell<App>>,
    }

    #[wasm_bindgen]
    impl NoisePlanes {
        pub fn start(&self) {
            self.app.borrow_mut().start();
        }

        pub fn stop(&self) {
            self.app.borrow_mut().stop();
        }

        #[wasm_bindgen(js_name = isRunning)]
        pub fn is_running(&self) -> bool {
            self.app.borrow().is_running()
        }

        #[wasm_bindgen(js_name = nextScene)]
        pub fn next_scene(&self) {
            self.app.borrow_mut().next_scene(now_ms());
        }

        #[wasm_bindgen(js_name = setAutoAdvance)]
        pub fn set_auto_advance(&self, on: bool) {
            self.app.borrow_mut().set_auto_advance(on);
        }

        /// Stop for good and release the field and GPU resources
        pub fn dispose(&self) {
            self.app.borrow_mut().dispose();
        }
    }

    /// Re-measure the canvas and size its drawing buffer to match
    fn measure_canvas(canvas: &HtmlCanvasElement) -> Viewport {
        let css = css_size(canvas);
        if css.is_sized() {
            let (w, h) = css.physical(PIXEL_RATIO);
            canvas.set_width(w);
            canvas.set_height(h);
        }
        css
    }

    pub async fn run() -> Result<NoisePlanes, JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Noise Planes starting...");

        let settings = Settings::load().map_err(|e| {
            log::error!("Invalid settings: {}", e);
            JsValue::from_str(&e.to_string())
        })?;

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        // Drawing buffer at a fixed pixel ratio; retried per frame if the
        // canvas has no layout yet
        let css = measure_canvas(&canvas);
        let (width, height) = css.physical(PIXEL_RATIO);

        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        log::info!("Seed: {}", seed);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&format!("Failed to create surface: {}", e)))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("Failed to get adapter: {}", e)))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let mut renderer = PointRenderState::new(surface, &adapter, width, height).await;
        renderer.set_pixel_ratio(PIXEL_RATIO);

        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let frames = RafFrames {
            callback: callback.clone(),
        };
        let app = Rc::new(RefCell::new(App::new(&settings, seed, frames, renderer)));
        if css.is_sized() {
            app.borrow_mut().resize(css.width, css.height);
        }
        {
            let canvas = canvas.clone();
            app.borrow_mut()
                .set_viewport_source(Box::new(move || measure_canvas(&canvas)));
        }

        {
            let app = app.clone();
            *callback.borrow_mut() = Some(Closure::new(move |time: f64| {
                app.borrow_mut().on_frame(time);
            }));
        }

        setup_resize_handler(&canvas, app.clone());
        setup_key_handler(app.clone());

        app.borrow_mut().start();
        log::info!("Noise Planes running!");

        Ok(NoisePlanes { app })
    }

    fn setup_resize_handler(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let css = measure_canvas(&canvas);
            if !css.is_sized() {
                return;
            }
            app.borrow_mut().notify_resize(css.width, css.height, now_ms());
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Space toggles the loop, N jumps to the next scene, A toggles auto advance
    fn setup_key_handler(app: Rc<RefCell<App>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let mut app = app.borrow_mut();
            match event.key().as_str() {
                " " => {
                    if app.is_running() {
                        app.stop();
                    } else {
                        app.start();
                    }
                }
                "n" | "N" => app.next_scene(now_ms()),
                "a" | "A" => {
                    let on = !app.scene().scheduler().auto_advance();
                    app.set_auto_advance(on);
                }
                _ => {}
            }
        });
        let _ = document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn launch() -> Result<wasm_app::NoisePlanes, JsValue> {
    wasm_app::run().await
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use noise_planes::renderer::LogRenderer;
    use noise_planes::sim::ParamId;
    use noise_planes::{Animatable, AnimationDriver, ManualFrames, Renderable, Settings};

    /// Simulated run length
    const RUN_SECONDS: f64 = 30.0;
    const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Drive the animation against a logging renderer on a simulated clock
    pub fn run() -> Result<(), noise_planes::ConfigError> {
        let settings = Settings::load()?;
        let seed = settings.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });
        log::info!("Seed: {}", seed);

        let mut driver =
            AnimationDriver::new(&settings, seed, ManualFrames::new(), LogRenderer::new());
        driver.resize(1280, 720);
        driver.start();

        let frames = (RUN_SECONDS * 1000.0 / FRAME_MS) as u64;
        for i in 0..frames {
            driver.pump(i as f64 * FRAME_MS);
        }
        driver.stop();

        let scene = driver.scene();
        let camera = scene.camera();
        log::info!(
            "Ran {} frames: {} scenes, {} points, size {:.3}, camera ({:.2}, {:.2}, {:.2}) fov {:.1}",
            driver.frame_count(),
            scene.scene_index() + 1,
            scene.field().len(),
            scene.registry().get(ParamId::Size),
            camera.position.x,
            camera.position.y,
            camera.position.z,
            camera.effective_fov(),
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Noise Planes (native) starting...");
    log::info!("Rendering needs a browser - run with `trunk serve`; running headless");

    if let Err(e) = headless::run() {
        log::error!("Invalid settings: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is launch, this is just to satisfy the compiler
}
