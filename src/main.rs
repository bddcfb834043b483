//! Ink Blade entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement, HtmlElement, KeyboardEvent, PointerEvent};

    use ink_blade::audio::{AudioManager, SoundEffect, vibration_ms};
    use ink_blade::highscores::{HighScores, RunSummary};
    use ink_blade::platform::{Action, InputState, action_for_code};
    use ink_blade::renderer::{RenderState, View, scene};
    use ink_blade::settings::Settings;
    use ink_blade::sim::{FrameClock, GameEvent, GamePhase, GameState, Rank};

    /// Cached DOM handles for the HUD and overlay
    struct Hud {
        hp_fill: Option<HtmlElement>,
        sp_fill: Option<HtmlElement>,
        score_text: Option<Element>,
        hi_text: Option<Element>,
        kill_text: Option<Element>,
        combo_text: Option<Element>,
        fps_text: Option<HtmlElement>,
        overlay: Option<HtmlElement>,
        overlay_title: Option<Element>,
        knob: Option<HtmlElement>,
    }

    impl Hud {
        fn find(document: &Document) -> Self {
            let html = |id: &str| {
                document
                    .get_element_by_id(id)
                    .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            };
            Self {
                hp_fill: html("hpFill"),
                sp_fill: html("spFill"),
                score_text: document.get_element_by_id("scoreText"),
                hi_text: document.get_element_by_id("hiText"),
                kill_text: document.get_element_by_id("killText"),
                combo_text: document.get_element_by_id("comboText"),
                fps_text: html("fpsText"),
                overlay: html("overlay"),
                overlay_title: document.get_element_by_id("overlayTitle"),
                knob: html("knob"),
            }
        }
    }

    fn set_style(el: &Option<HtmlElement>, prop: &str, value: &str) {
        if let Some(el) = el {
            let _ = el.style().set_property(prop, value);
        }
    }

    fn set_text(el: &Option<Element>, text: &str) {
        if let Some(el) = el {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        clock: FrameClock,
        input: InputState,
        render_state: Option<RenderState>,
        audio: AudioManager,
        settings: Settings,
        highscores: HighScores,
        hud: Hud,
        last_time: f64,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
        last_phase: GamePhase,
    }

    impl Game {
        fn new(seed: u64, document: &Document) -> Self {
            let mut settings = Settings::load();
            let query = web_sys::window()
                .and_then(|w| w.location().search().ok())
                .unwrap_or_default();
            if settings.apply_query(&query) {
                settings.save();
            }
            let mut audio = AudioManager::new();
            audio.apply_settings(&settings);

            let mut game = Self {
                state: GameState::new(seed),
                clock: FrameClock::new(),
                input: InputState::new(),
                render_state: None,
                audio,
                settings,
                highscores: HighScores::load(),
                hud: Hud::find(document),
                last_time: 0.0,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
                last_phase: GamePhase::Title,
            };
            game.apply_settings();
            game
        }

        /// Push settings-derived caps into the simulation
        fn apply_settings(&mut self) {
            self.state.max_particles = self.settings.max_particles();
            self.state.juice.enabled = self.settings.effective_juice();
            self.audio.apply_settings(&self.settings);
        }

        /// Settings hotkey pressed; persist and apply any change
        fn settings_key(&mut self, code: &str) {
            if self.settings.handle_key(code) {
                self.settings.save();
                self.apply_settings();
            }
        }

        /// Run simulation ticks for one animation frame
        fn update(&mut self, dt: f32, time: f64) {
            let input = self.input.to_tick_input();
            self.clock.advance(&mut self.state, &input, dt);
            self.input.clear_one_shots();

            for event in self.state.drain_events() {
                self.handle_event(&event);
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            // Calculate FPS from oldest to newest frame
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }

            if self.state.phase != self.last_phase {
                log::debug!("Phase {:?} -> {:?}", self.last_phase, self.state.phase);
                self.last_phase = self.state.phase;
            }
        }

        /// Audio, vibration and score submission for one sim event
        fn handle_event(&mut self, event: &GameEvent) {
            if let Some(effect) = SoundEffect::for_event(event) {
                self.audio.play(effect);
            }

            if self.settings.vibration {
                if let Some(ms) = vibration_ms(event) {
                    if let Some(window) = web_sys::window() {
                        let _ = window.navigator().vibrate_with_duration(ms);
                    }
                }
            }

            if let GameEvent::GameOver { score, kills, wave } = *event {
                let run = RunSummary {
                    score,
                    kills,
                    wave,
                    rank: Rank::from_combo(self.state.combo.best),
                };
                if let Some(place) = self.highscores.add_run(run, js_sys::Date::now()) {
                    log::info!("High score #{} ({} points)", place, score);
                    self.highscores.save();
                    if place == 1 {
                        self.audio.play(SoundEffect::HighScore);
                    }
                }
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };

            let mut view = View::new(
                &self.state,
                render_state.aspect(),
                self.settings.effective_screen_shake(),
            );
            view.segments = self.settings.quality.circle_segments();
            view.paper_wash = self.settings.quality.paper_wash_enabled();
            view.flash = self.settings.effective_flash();

            let vertices = scene::build(&self.state, &view);
            match render_state.render(&vertices, &view) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    render_state.resize(render_state.size.0, render_state.size.1);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let p = &self.state.player;
            let hp_pct = (p.hp / p.hp_max).clamp(0.0, 1.0) * 100.0;
            let sp_pct = (p.sp / p.sp_max).clamp(0.0, 1.0) * 100.0;
            set_style(&self.hud.hp_fill, "width", &format!("{hp_pct}%"));
            set_style(&self.hud.sp_fill, "width", &format!("{sp_pct}%"));

            let score = self.state.display_score();
            set_text(&self.hud.score_text, &score.to_string());
            let hi = self.highscores.top_score().max(score);
            set_text(&self.hud.hi_text, &hi.to_string());
            set_text(&self.hud.kill_text, &self.state.kills.to_string());

            let combo = &self.state.combo;
            let combo_line = if combo.count > 1 {
                format!("{} HIT {}", combo.count, combo.rank().letter())
            } else {
                String::new()
            };
            set_text(&self.hud.combo_text, &combo_line);

            if self.settings.show_fps {
                set_style(&self.hud.fps_text, "display", "block");
                if let Some(el) = &self.hud.fps_text {
                    el.set_text_content(Some(&format!("{} FPS", self.fps)));
                }
            } else {
                set_style(&self.hud.fps_text, "display", "none");
            }

            let overlay_on = self.state.phase != GamePhase::Playing;
            set_style(
                &self.hud.overlay,
                "display",
                if overlay_on { "flex" } else { "none" },
            );
            let title = match self.state.phase {
                GamePhase::Title | GamePhase::Playing => "INK BLADE".to_string(),
                GamePhase::Paused => "PAUSED".to_string(),
                GamePhase::GameOver => format!(
                    "GAME OVER - {} (rank {})",
                    score,
                    Rank::from_combo(combo.best).letter()
                ),
            };
            set_text(&self.hud.overlay_title, &title);
            set_style(&self.hud.knob, "transform", &self.input.knob_transform());
        }

        /// Window lost focus or tab hidden
        fn auto_pause(&mut self, reason: &str) {
            self.input.release_all();
            if self.state.phase == GamePhase::Playing {
                self.input.press(Action::Pause);
                log::info!("Auto-paused ({})", reason);
            }
            if self.settings.mute_on_blur {
                self.audio.set_suspended(true);
            }
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("logger init failed: {e}").into());
        }

        log::info!("Ink Blade starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("c")
            .ok_or("no canvas")?
            .dyn_into()?;

        let (width, height) = fit_canvas(&window, &canvas);

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, &document)));
        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&format!("surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("adapter: {e}")))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height)
            .await
            .map_err(|e| JsValue::from_str(&format!("device: {e}")))?;
        game.borrow_mut().render_state = Some(render_state);

        setup_keyboard(&window, game.clone())?;
        setup_joystick(&document, game.clone())?;
        setup_buttons(&document, game.clone())?;
        setup_overlay(&document, game.clone())?;
        setup_auto_pause(&window, &document, game.clone())?;
        setup_resize(&window, canvas, game.clone())?;

        // Start game loop
        request_animation_frame(game);

        log::info!("Ink Blade running!");
        Ok(())
    }

    /// Match the canvas backing store to its CSS size
    fn fit_canvas(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let width = ((canvas.client_width() as f64 * dpr) as u32).max(1);
        let height = ((canvas.client_height() as f64 * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height)
    }

    fn setup_keyboard(window: &web_sys::Window, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let Some(action) = action_for_code(&event.code()) else {
                    if !event.repeat() {
                        game.borrow_mut().settings_key(&event.code());
                    }
                    return;
                };
                if action.prevents_default() {
                    event.prevent_default();
                }
                let mut g = game.borrow_mut();
                g.audio.resume();
                // Held keys repeat; only the first press counts as a one-shot
                if event.repeat() && !matches!(
                    action,
                    Action::Up | Action::Down | Action::Left | Action::Right | Action::Guard
                ) {
                    return;
                }
                g.input.press(action);
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if let Some(action) = action_for_code(&event.code()) {
                game.borrow_mut().input.release(action);
            }
        });
        window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_joystick(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let Some(stick) = document.get_element_by_id("stick") else {
            log::info!("No joystick element, touch controls disabled");
            return Ok(());
        };

        {
            let game = game.clone();
            let stick_el = stick.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                let _ = stick_el.set_pointer_capture(event.pointer_id());
                let rect = stick_el.get_bounding_client_rect();
                let center = Vec2::new(
                    (rect.left() + rect.width() * 0.5) as f32,
                    (rect.top() + rect.height() * 0.5) as f32,
                );
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.input.stick_begin(event.pointer_id(), center);
                let client = Vec2::new(event.client_x() as f32, event.client_y() as f32);
                g.input.stick_move(event.pointer_id(), client);
            });
            stick.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let client = Vec2::new(event.client_x() as f32, event.client_y() as f32);
                if game.borrow_mut().input.stick_move(event.pointer_id(), client) {
                    event.prevent_default();
                }
            });
            stick.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        for name in ["pointerup", "pointercancel"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                if g.input.stick_pointer == Some(event.pointer_id()) {
                    g.input.stick_end();
                }
            });
            stick.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let buttons = [
            ("btnSlash", Action::Slash),
            ("btnGuard", Action::Guard),
            ("btnDash", Action::Dash),
            ("btnSpecial", Action::Special),
        ];

        for (id, action) in buttons {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };

            {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                    event.prevent_default();
                    let mut g = game.borrow_mut();
                    g.audio.resume();
                    g.input.press(action);
                });
                btn.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
                closure.forget();
            }

            // Guard is held; everything else is a one-shot
            if action == Action::Guard {
                for name in ["pointerup", "pointercancel", "pointerleave"] {
                    let game = game.clone();
                    let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                        game.borrow_mut().input.release(Action::Guard);
                    });
                    btn.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
                    closure.forget();
                }
            }
        }
        Ok(())
    }

    fn setup_overlay(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        if let Some(btn) = document.get_element_by_id("startBtn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.audio.set_suspended(false);
                // Same button resumes from pause
                let action = if g.state.phase == GamePhase::Paused {
                    Action::Pause
                } else {
                    Action::Start
                };
                g.input.press(action);
            });
            btn.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("resetBtn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                g.audio.play(SoundEffect::Ui);
                g.input.press(Action::Reset);
            });
            btn.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn setup_auto_pause(
        window: &web_sys::Window,
        document: &Document,
        game: Rc<RefCell<Game>>,
    ) -> Result<(), JsValue> {
        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().auto_pause("tab hidden");
                }
            });
            document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().auto_pause("window blur");
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            game.borrow_mut().audio.set_suspended(false);
        });
        window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_resize(
        window: &web_sys::Window,
        canvas: HtmlCanvasElement,
        game: Rc<RefCell<Game>>,
    ) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let (w, h) = fit_canvas(&window, &canvas);
            if let Some(rs) = game.borrow_mut().render_state.as_mut() {
                rs.resize(w, h);
            }
        });
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time (FrameClock clamps long frames)
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            g.last_time = time;

            g.update(dt, time);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Ink Blade (native) starting...");
    log::info!("Native mode is a headless demo - serve the wasm build for the real game");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(7);
    headless::run(seed, 45.0);
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;

    use ink_blade::highscores::{HighScores, RunSummary};
    use ink_blade::sim::{FrameClock, GameEvent, GamePhase, GameState, Rank, TickInput};

    const FRAME_DT: f32 = 1.0 / 60.0;

    /// Scripted player: circle strafing, slashing the nearest enemy,
    /// guarding when something winds up close by
    fn script(state: &GameState, frame: u32) -> TickInput {
        let p = &state.player;
        let nearest = state
            .enemies
            .iter()
            .min_by(|a, b| {
                a.pos
                    .distance_squared(p.pos)
                    .total_cmp(&b.pos.distance_squared(p.pos))
            });

        let mut input = TickInput::default();
        let t = frame as f32 * FRAME_DT;
        input.move_dir = Vec2::from_angle(t * 0.8);

        if let Some(e) = nearest {
            let to = e.pos - p.pos;
            let dist = to.length();
            if dist < 220.0 {
                input.move_dir = to.normalize_or_zero();
            }
            input.guard = e.danger && dist < 160.0;
            input.slash = !input.guard && dist < 150.0 && frame % 12 == 0;
        }
        input.dash = frame % 150 == 75;
        input.special = p.special_ready();
        input
    }

    pub fn run(seed: u64, seconds: f32) {
        let mut state = GameState::new(seed);
        let mut clock = FrameClock::new();
        state.start();

        let frames = (seconds / FRAME_DT) as u32;
        let (mut slashes, mut parries, mut hits_taken) = (0u32, 0u32, 0u32);
        let mut highscores = HighScores::new();

        for frame in 0..frames {
            let input = script(&state, frame);
            clock.advance(&mut state, &input, FRAME_DT);

            for event in state.drain_events() {
                match event {
                    GameEvent::Slash => slashes += 1,
                    GameEvent::Parry => parries += 1,
                    GameEvent::PlayerHit { .. } => hits_taken += 1,
                    GameEvent::WaveUp { wave } => log::info!("Wave {}", wave),
                    GameEvent::EnemyKilled { kind, elite, combo } => {
                        log::debug!("Killed {:?} (elite {}) combo {}", kind, elite, combo)
                    }
                    GameEvent::GameOver { score, kills, wave } => {
                        let rank = Rank::from_combo(state.combo.best);
                        highscores.add_run(RunSummary { score, kills, wave, rank }, 0.0);
                    }
                    _ => {}
                }
            }

            if state.phase == GamePhase::GameOver {
                log::info!("Fell at {:.1}s", state.time);
                break;
            }
        }

        log::info!(
            "Score {} | kills {} | wave {} | best combo {} ({}) | hp {:.0}",
            state.display_score(),
            state.kills,
            state.wave,
            state.combo.best,
            Rank::from_combo(state.combo.best).letter(),
            state.player.hp
        );
        log::info!(
            "Slashes {} | parries {} | hits taken {} | enemies alive {}",
            slashes,
            parries,
            hits_taken,
            state.enemies.len()
        );
        if let Some(best) = highscores.entries.first() {
            log::info!("Recorded run: {} points", best.score);
        }
    }
}
