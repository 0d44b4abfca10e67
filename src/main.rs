//! Space Shooter entry point
//!
//! Handles platform-specific initialization and runs the game loop.
//! - Browser: WebGPU canvas, keyboard input, Web Audio, requestAnimationFrame.
//! - Native: headless demo run driven by the autopilot, summary on exit.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use space_shooter::audio::{AudioManager, AudioOut};
    use space_shooter::platform::{FrameClock, KeyTracker, key_from_code};
    use space_shooter::renderer::{Atlas, DrawList, RenderState};
    use space_shooter::sim::{TickInput, autopilot};
    use space_shooter::{Assets, Game, Settings};

    /// Largest atlas row width
    const ATLAS_WIDTH: u32 = 1024;

    /// Browser front end holding the game and everything around it
    struct Frontend {
        game: Game,
        render_state: Option<RenderState>,
        draw_list: DrawList,
        keys: KeyTracker,
        clock: FrameClock,
        audio: AudioManager,
        settings: Settings,
        /// Demo mode: the autopilot flies the ship
        autopilot: bool,
    }

    impl Frontend {
        fn new(game: Game, settings: &Settings) -> Self {
            Self {
                game,
                render_state: None,
                draw_list: DrawList::new(),
                keys: KeyTracker::new(),
                clock: FrameClock::new(settings.max_frame_dt),
                audio: AudioManager::new(settings),
                settings: settings.clone(),
                autopilot: false,
            }
        }

        /// Run one loop iteration; returns false once the game has ended
        fn frame(&mut self, now_ms: f64) -> bool {
            let time = self.clock.tick(now_ms);
            let mut input = self.keys.snapshot();
            if self.autopilot {
                input = TickInput {
                    close_requested: input.quit_requested(),
                    ..autopilot(self.game.state())
                };
            }

            self.game
                .frame(time, &input, &mut self.draw_list, &mut self.audio);
            self.render();

            self.game.is_running()
        }

        /// Flip mute, apply it to the audio and persist it
        fn toggle_mute(&mut self) {
            self.settings.muted = !self.settings.muted;
            self.audio.apply_settings(&self.settings);
            self.settings.save();
            log::info!("Muted: {}", self.settings.muted);
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.draw_list) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        let (w, h) = render_state.viewport.size;
                        render_state.resize(w, h);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        fn shutdown(&mut self) {
            self.audio.stop_music();
            let stats = self.game.stats();
            log::info!(
                "Game over: score {}, {} meteors destroyed, {} absorbed",
                self.game.score(),
                stats.meteors_destroyed,
                stats.meteors_absorbed
            );
            if let Some(el) = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id("game-over"))
            {
                let _ = el.set_attribute("class", "");
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Space Shooter starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // Initialize game
        let settings = Settings::load();
        let assets = Assets::procedural();
        let atlas = Atlas::build(assets.images(), ATLAS_WIDTH);
        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        let frontend = Rc::new(RefCell::new(Frontend::new(
            Game::new(assets, settings.clone(), seed),
            &settings,
        )));

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match RenderState::new(surface, &adapter, width, height, atlas).await {
            Ok(render_state) => frontend.borrow_mut().render_state = Some(render_state),
            Err(e) => log::error!("Failed to create device: {e}"),
        }

        setup_input_handlers(frontend.clone());
        setup_page_lifecycle(frontend.clone());

        frontend.borrow_mut().audio.start_music();

        // Start game loop
        request_animation_frame(frontend);

        log::info!("Space Shooter running!");
    }

    fn setup_input_handlers(frontend: Rc<RefCell<Frontend>>) {
        let window = web_sys::window().expect("no window");

        // Key down
        {
            let frontend = frontend.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut f = frontend.borrow_mut();
                // Browsers only allow audio after a user gesture
                f.audio.resume();

                let code = event.code();
                if code == "KeyI" && !event.repeat() {
                    f.autopilot = !f.autopilot;
                    log::info!("Autopilot: {}", f.autopilot);
                    return;
                }
                if code == "KeyM" && !event.repeat() {
                    f.toggle_mute();
                    return;
                }
                if let Some(key) = key_from_code(&code) {
                    event.prevent_default();
                    f.keys.key_down(key);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let frontend = frontend.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if let Some(key) = key_from_code(&event.code()) {
                    frontend.borrow_mut().keys.key_up(key);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur: key-up events will not arrive while unfocused
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                frontend.borrow_mut().keys.release_all();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_page_lifecycle(frontend: Rc<RefCell<Frontend>>) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Page hide is the browser's window-close request
        {
            let frontend = frontend.clone();
            let closure =
                Closure::<dyn FnMut(_)>::new(move |_event: web_sys::PageTransitionEvent| {
                    log::info!("Page hidden, closing");
                    frontend.borrow_mut().keys.request_close();
                });
            let _ = window
                .add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Tab switch: don't count the time spent hidden as one huge frame
        {
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Visible {
                    frontend.borrow_mut().clock.reset();
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }
    }

    fn request_animation_frame(frontend: Rc<RefCell<Frontend>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(frontend, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(frontend: Rc<RefCell<Frontend>>, time: f64) {
        let running = frontend.borrow_mut().frame(time);
        if running {
            request_animation_frame(frontend);
        } else {
            frontend.borrow_mut().shutdown();
        }
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
mod native {
    use std::path::PathBuf;
    use std::process::ExitCode;

    use clap::{Arg, Command};
    use serde::Serialize;

    use space_shooter::audio::{AudioOut, LogAudio};
    use space_shooter::platform::{FixedClock, FrameClock, FramePacer};
    use space_shooter::renderer::DrawList;
    use space_shooter::sim::{Stats, autopilot};
    use space_shooter::{Assets, Game, Settings};

    /// End-of-run report printed to stdout
    #[derive(Debug, Serialize)]
    struct RunSummary {
        seed: u64,
        score: u64,
        frames: u64,
        seconds: f64,
        stats: Stats,
    }

    fn cli() -> Command {
        Command::new("space-shooter")
            .about("Headless Space Shooter run flown by the autopilot")
            .arg(
                Arg::new("assets")
                    .long("assets")
                    .value_name("DIR")
                    .help("Asset directory (images/, fonts/, audio/); procedural assets if omitted"),
            )
            .arg(
                Arg::new("settings")
                    .long("settings")
                    .value_name("FILE")
                    .help("Settings JSON file"),
            )
            .arg(
                Arg::new("seconds")
                    .long("seconds")
                    .value_name("N")
                    .help("Length of the run in game seconds")
                    .value_parser(clap::value_parser!(f64))
                    .default_value("30"),
            )
            .arg(
                Arg::new("seed")
                    .long("seed")
                    .value_name("N")
                    .help("Run seed (overrides settings)")
                    .value_parser(clap::value_parser!(u64)),
            )
            .arg(
                Arg::new("realtime")
                    .long("realtime")
                    .help("Pace frames to the target frame rate and measure real deltas")
                    .action(clap::ArgAction::SetTrue),
            )
            .arg(
                Arg::new("audio")
                    .long("audio")
                    .help("Play the loaded sounds on the default output device (playback feature)")
                    .action(clap::ArgAction::SetTrue),
            )
            .arg(
                Arg::new("save-settings")
                    .long("save-settings")
                    .help("Write the effective settings back to the settings file")
                    .action(clap::ArgAction::SetTrue),
            )
    }

    /// Sound backend for the run: the device when asked for and available, else the log
    fn open_audio(wanted: bool, assets: &Assets, settings: &Settings) -> Box<dyn AudioOut> {
        #[cfg(feature = "playback")]
        if wanted {
            if let Some(out) = space_shooter::audio::RodioAudio::new(&assets.sounds, settings) {
                return Box::new(out);
            }
        }
        #[cfg(not(feature = "playback"))]
        if wanted {
            log::warn!(
                "Built without the playback feature; {} cues are logged only",
                assets.sounds.laser.name
            );
        }
        Box::new(LogAudio::new(settings))
    }

    pub fn run() -> ExitCode {
        env_logger::init();
        let matches = cli().get_matches();

        log::info!("Space Shooter (native) starting...");

        let settings_path = matches.get_one::<String>("settings").map(PathBuf::from);
        let mut settings = settings_path
            .as_deref()
            .map(Settings::load_from)
            .unwrap_or_default();
        if let Some(seed) = matches.get_one::<u64>("seed") {
            settings.seed = Some(*seed);
        }

        let assets = match matches.get_one::<String>("assets") {
            Some(dir) => match Assets::load_dir(dir) {
                Ok(assets) => {
                    log::info!("Loaded assets from {dir}");
                    assets
                }
                Err(e) => {
                    log::error!("Failed to load assets: {e}");
                    return ExitCode::FAILURE;
                }
            },
            None => Assets::procedural(),
        };

        let seed = settings.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or_default()
        });
        let seconds = matches.get_one::<f64>("seconds").copied().unwrap_or(30.0);
        let realtime = matches.get_flag("realtime");

        let mut game = Game::new(assets, settings.clone(), seed);
        let mut audio = open_audio(matches.get_flag("audio"), game.assets(), &settings);
        let mut draw_list = DrawList::new();

        let mut fixed = FixedClock::from_fps(settings.target_fps);
        let mut measured = FrameClock::new(settings.max_frame_dt);
        let mut pacer = FramePacer::from_fps(settings.target_fps);
        let start = std::time::Instant::now();

        audio.start_music();
        while game.is_running() {
            let time = if realtime {
                pacer.wait();
                measured.tick(start.elapsed().as_secs_f64() * 1000.0)
            } else {
                fixed.tick()
            };

            let mut input = autopilot(game.state());
            input.close_requested = game.state().elapsed >= seconds;
            game.frame(time, &input, &mut draw_list, audio.as_mut());
        }
        audio.stop_music();

        let summary = RunSummary {
            seed,
            score: game.score(),
            frames: game.state().frame,
            seconds: game.state().elapsed,
            stats: game.stats(),
        };
        log::info!(
            "Run finished: score {} after {} frames",
            summary.score,
            summary.frames
        );
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => log::warn!("Could not serialize summary: {e}"),
        }

        if matches.get_flag("save-settings") {
            match settings_path {
                Some(path) => {
                    if let Err(e) = settings.save_to(&path) {
                        log::warn!("Settings not saved: {e}");
                    }
                }
                None => log::warn!("--save-settings needs --settings FILE"),
            }
        }

        ExitCode::SUCCESS
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    native::run()
}
