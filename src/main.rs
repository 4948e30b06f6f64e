//! Gyro Ball entry point
//!
//! In the browser this runs the game loop. Natively it runs a scripted,
//! headless session and prints the final world as JSON.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, Window};

    use gyro_ball::platform::{DeviceMotionSensor, KeyboardTilt};
    use gyro_ball::renderer::{Label, LabelStyle, Scene, SdfRenderState, Theme};
    use gyro_ball::sim::World;
    use gyro_ball::tilt::{SensorSubscription, TiltCell};
    use gyro_ball::tuning::Tuning;

    /// Sensors held only while the page is visible
    struct Sensors {
        _gyro: SensorSubscription<DeviceMotionSensor>,
        _keys: SensorSubscription<KeyboardTilt>,
    }

    /// Game instance holding all state
    struct Game {
        world: World,
        theme: Theme,
        tilt: TiltCell,
        canvas: HtmlCanvasElement,
        render_state: Option<SdfRenderState>,
        sensors: Option<Sensors>,
    }

    impl Game {
        fn new(canvas: HtmlCanvasElement) -> Self {
            Self {
                world: World::new(&Tuning::default()),
                theme: Theme::default(),
                tilt: TiltCell::new(),
                canvas,
                render_state: None,
                sensors: None,
            }
        }

        /// Match the canvas backing store to its layout size and tell the world
        fn measure(&mut self) {
            let dpr = web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
            let width = (self.canvas.client_width() as f64 * dpr) as u32;
            let height = (self.canvas.client_height() as f64 * dpr) as u32;

            if width != self.canvas.width() || height != self.canvas.height() {
                self.canvas.set_width(width);
                self.canvas.set_height(height);
                if let Some(ref mut render_state) = self.render_state {
                    render_state.resize(width, height);
                }
            }
            self.world.set_bounds(width as f32, height as f32);
        }

        /// Acquire sensors on view entry
        fn attach_sensors(&mut self, window: &Window) {
            if self.sensors.is_none() {
                self.sensors = Some(Sensors {
                    _gyro: SensorSubscription::start(
                        DeviceMotionSensor::new(window.clone()),
                        self.tilt.clone(),
                    ),
                    _keys: SensorSubscription::start(
                        KeyboardTilt::new(window.clone()),
                        self.tilt.clone(),
                    ),
                });
            }
        }

        /// Release sensors on view exit
        fn detach_sensors(&mut self) {
            if self.sensors.take().is_some() {
                self.tilt.clear();
            }
        }

        fn update(&mut self, time: f64) {
            let report = self.world.frame(time, self.tilt.load());
            if report.walls.any() {
                log::trace!("Wall contact {:?}", report.walls);
            }
        }

        fn render(&mut self) {
            let scene = Scene::build(&self.world, &self.theme);
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&scene) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Gyro Ball starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let game = Rc::new(RefCell::new(Game::new(canvas.clone())));
        game.borrow_mut().measure();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        {
            let mut g = game.borrow_mut();
            let (width, height) = (canvas.width(), canvas.height());
            let render_state = SdfRenderState::new(surface, &adapter, width, height, g.theme.backdrop)
                .await
                .expect("Failed to create device");
            g.render_state = Some(render_state);

            let labels = Scene::build(&g.world, &g.theme).labels;
            show_labels(&document, &labels);
            g.attach_sensors(&window);
        }

        setup_resize(game.clone());
        setup_visibility(game.clone());

        request_animation_frame(game);

        log::info!("Gyro Ball running!");
    }

    /// Static instructions, overlaid top-centre
    fn show_labels(document: &Document, labels: &[Label]) {
        let Ok(container) = document.create_element("div") else {
            return;
        };
        let _ = container.set_attribute(
            "style",
            "position:absolute;top:24px;left:0;right:0;display:flex;flex-direction:column;\
             align-items:center;pointer-events:none;font-family:sans-serif;",
        );

        for label in labels {
            let Ok(el) = document.create_element("div") else {
                continue;
            };
            let font = match label.style {
                LabelStyle::Title => "font-size:22px;font-weight:600;",
                LabelStyle::Subtitle => "font-size:15px;",
            };
            let _ = el.set_attribute("style", &format!("color:{};{}", label.color.to_css(), font));
            el.set_text_content(Some(&label.text));
            let _ = container.append_child(&el);
        }

        if let Some(body) = document.body() {
            let _ = body.append_child(&container);
        }
    }

    fn setup_resize(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().measure();
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_visibility(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    g.detach_sensors();
                } else if let Some(window) = web_sys::window() {
                    g.attach_sensors(&window);
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().detach_sensors();
            });
            let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::process::ExitCode;

    use glam::Vec2;
    use gyro_ball::sim::World;
    use gyro_ball::tuning::{Tuning, TuningError};

    /// Arena size used when no surface exists
    const ARENA: (f32, f32) = (720.0, 1280.0);
    /// Ten seconds of 60 Hz frames
    const FRAMES: u32 = 600;
    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn load_tuning(path: Option<&str>) -> Result<Tuning, TuningError> {
        let Some(path) = path else {
            return Ok(Tuning::default());
        };
        let tuning = Tuning::from_file(path)?;
        log::info!("Loaded tuning from {}", path);
        Ok(tuning)
    }

    /// A slow circular sweep of the device
    fn scripted_tilt(frame: u32) -> Vec2 {
        let t = frame as f32 * 0.01;
        Vec2::new(t.cos(), t.sin()) * 0.8
    }

    pub fn run() -> ExitCode {
        let path = std::env::args().nth(1);
        let tuning = match load_tuning(path.as_deref()) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("{e}");
                return ExitCode::FAILURE;
            }
        };

        let mut world = World::new(&tuning);
        world.set_bounds(ARENA.0, ARENA.1);

        let mut wall_frames = 0u32;
        let mut obstacle_hits = 0u32;
        for frame in 0..FRAMES {
            let report = world.frame(frame as f64 * FRAME_MS, scripted_tilt(frame));
            if report.walls.any() {
                wall_frames += 1;
            }
            obstacle_hits += report.obstacle_hits;
        }

        log::info!(
            "Session done: {} frames, {} with wall contact, {} obstacle hits",
            FRAMES,
            wall_frames,
            obstacle_hits
        );

        match serde_json::to_string_pretty(&world) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("Failed to serialize world: {e}");
                ExitCode::FAILURE
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    env_logger::init();
    log::info!("Gyro Ball (native) starting...");
    log::info!("Native mode runs a headless session - run with `trunk serve` for the web version");
    headless::run()
}
