//! Questforge entry point
//!
//! Handles platform-specific initialization and runs the game loop. The
//! simulation itself is renderer-agnostic; each frame a `RenderSnapshot` is
//! handed to the host page's canvas renderer.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use questforge::assets::SpriteBundle;
    use questforge::consts::SIM_DT;
    use questforge::highscores::{HighScoreEntry, HighScores};
    use questforge::settings::Settings;
    use questforge::sim::{EncounterPhase, EncounterState, RenderSnapshot, TickInput, run_frame};
    use questforge::tuning::Tuning;

    // The page installs window.renderFrame; we push one snapshot per frame
    #[wasm_bindgen(inline_js = "
        export function render_frame(json) {
            if (window.renderFrame) window.renderFrame(JSON.parse(json));
        }
    ")]
    extern "C" {
        fn render_frame(json: String);
    }

    /// Game instance holding all state
    struct Game {
        state: EncounterState,
        bundle: SpriteBundle,
        settings: Settings,
        highscores: HighScores,
        accumulator: f32,
        last_time: f64,
        keys: HashSet<String>,
        /// One-shot commands queued by key handlers, consumed by one tick
        advance_queued: bool,
        restart_queued: bool,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
        // Track phase to record finished runs exactly once
        last_phase: EncounterPhase,
    }

    impl Game {
        fn new(seed: u64, bundle: SpriteBundle, settings: Settings, tuning: Tuning) -> Self {
            let state =
                EncounterState::new(seed, bundle.weapon_kind, tuning, settings.companion_mortal);
            Self {
                state,
                bundle,
                settings,
                highscores: HighScores::load(),
                accumulator: 0.0,
                last_time: 0.0,
                keys: HashSet::new(),
                advance_queued: false,
                restart_queued: false,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
                last_phase: EncounterPhase::Intro,
            }
        }

        fn pressed(&self, keys: &[&str]) -> bool {
            keys.iter().any(|k| self.keys.contains(*k))
        }

        /// Build the input snapshot for this tick from held keys
        fn input(&mut self) -> TickInput {
            let mut move_axis = 0.0;
            if self.pressed(&["ArrowLeft", "a"]) {
                move_axis -= 1.0;
            }
            if self.pressed(&["ArrowRight", "d"]) {
                move_axis += 1.0;
            }
            TickInput {
                move_axis,
                jump: self.pressed(&["ArrowUp", "w", " "]),
                crouch: self.pressed(&["ArrowDown", "s"]),
                melee: self.pressed(&["j", "x"]),
                shoot: self.pressed(&["k", "z"]),
                advance: std::mem::take(&mut self.advance_queued),
                restart: std::mem::take(&mut self.restart_queued),
            }
        }

        /// Run simulation ticks; the dt clamp and substep cap live in
        /// `run_frame`
        fn update(&mut self, dt: f32, time: f64) {
            let input = self.input();
            run_frame(&mut self.state, &input, &mut self.accumulator, dt);

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }

            let current_phase = self.state.phase;
            if current_phase != self.last_phase {
                if matches!(current_phase, EncounterPhase::Victory | EncounterPhase::GameOver) {
                    self.record_run(current_phase == EncounterPhase::Victory);
                }
                self.last_phase = current_phase;
            }
        }

        /// Push the frame snapshot to the page renderer
        fn render(&self) {
            let mut snapshot = RenderSnapshot::capture(&self.state, &self.bundle);
            if !self.settings.effective_screen_shake() {
                snapshot.camera_offset = glam::Vec2::ZERO;
            }
            if !self.settings.particles {
                snapshot.particles.clear();
            }
            if !self.settings.damage_numbers {
                snapshot.damage_numbers.clear();
            }
            if let Ok(json) = serde_json::to_string(&snapshot) {
                render_frame(json);
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(el) = document.get_element_by_id("hud-score") {
                el.set_text_content(Some(&self.state.score.to_string()));
            }
            if let Some(el) = document.get_element_by_id("hud-wave") {
                el.set_text_content(Some(&self.state.wave.to_string()));
            }
            if let Some(el) = document.get_element_by_id("hud-health") {
                el.set_text_content(Some(&format!(
                    "{:.0}/{:.0}",
                    self.state.player.health, self.state.player.max_health
                )));
            }
            if self.settings.show_fps {
                if let Some(el) = document.get_element_by_id("hud-fps") {
                    el.set_text_content(Some(&self.fps.to_string()));
                }
            }

            // Combo readout only shows once a chain is running
            if let Some(el) = document.get_element_by_id("hud-combo") {
                if self.state.combo > 1 {
                    let _ = el.set_attribute("class", "hud-item");
                    el.set_text_content(Some(&format!(
                        "{} x{:.1}",
                        self.state.combo,
                        self.state.multiplier()
                    )));
                } else {
                    let _ = el.set_attribute("class", "hud-item hidden");
                }
            }

            for (id, phase) in [
                ("victory-screen", EncounterPhase::Victory),
                ("game-over", EncounterPhase::GameOver),
            ] {
                if let Some(el) = document.get_element_by_id(id) {
                    if self.state.phase == phase {
                        let _ = el.set_attribute("class", "");
                    } else {
                        let _ = el.set_attribute("class", "hidden");
                    }
                }
            }
        }

        /// Record a finished run on the leaderboard
        fn record_run(&mut self, victory: bool) {
            let entry = HighScoreEntry {
                score: self.state.score,
                wave: self.state.wave,
                victory,
                weapon: self.state.player.weapon,
                timestamp: js_sys::Date::now(),
            };
            if let Some(rank) = self.highscores.add_score(entry) {
                log::info!("run finished at rank {rank}");
                self.highscores.save();
            }
        }
    }

    /// Sprite bundle and tuning overrides are inlined into the page by the
    /// generation pipeline as JSON script tags
    fn read_json_element(document: &web_sys::Document, id: &str) -> Option<String> {
        document.get_element_by_id(id).and_then(|el| el.text_content())
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"logger already initialized".into());
        }

        log::info!("Questforge starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        let bundle = read_json_element(&document, "sprite-bundle")
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_else(|| {
                log::warn!("no sprite bundle on page, using placeholders");
                SpriteBundle::default()
            });
        let tuning = read_json_element(&document, "tuning")
            .map(|json| Tuning::from_json(&json))
            .unwrap_or_default();
        let settings = Settings::load();

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, bundle, settings, tuning)));
        log::info!("Encounter initialized with seed: {seed}");

        setup_input_handlers(game.clone());
        request_animation_frame(game);

        log::info!("Questforge running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                let key = event.key();
                match key.as_str() {
                    "+" | "=" => g.advance_queued = true, // Debug: skip segment
                    "r" | "R" => g.restart_queued = true,
                    _ => {
                        // Lowercase letters; named keys (ArrowLeft) stay as-is
                        let key = if key.len() == 1 { key.to_lowercase() } else { key };
                        g.keys.insert(key);
                    }
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let key = event.key();
                let key = if key.len() == 1 { key.to_lowercase() } else { key };
                game.borrow_mut().keys.remove(&key);
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
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
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
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
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless demo: the debug skip walks the whole encounter chain so the
/// state machine can be exercised without a browser.
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use questforge::assets::WeaponKind;
    use questforge::consts::SIM_DT;
    use questforge::sim::{EncounterPhase, EncounterState, TickInput, tick};
    use questforge::tuning::Tuning;

    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0xC0FFEE);
    log::info!("Questforge (headless) starting with seed {seed}");

    let mut state = EncounterState::new(seed, WeaponKind::Melee, Tuning::default(), false);
    let skip = TickInput { advance: true, ..Default::default() };

    let mut last_phase = state.phase;
    for _ in 0..10_000 {
        tick(&mut state, &skip, SIM_DT);
        if state.phase != last_phase {
            println!(
                "tick {:>5}  {:?} -> {:?}  score {}",
                state.tick, last_phase, state.phase, state.score
            );
            last_phase = state.phase;
        }
        if matches!(state.phase, EncounterPhase::Victory | EncounterPhase::GameOver) {
            break;
        }
    }
    println!("final: {:?} at wave {} with score {}", state.phase, state.wave, state.score);
}
