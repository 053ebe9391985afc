//! Reflex Rush entry point
//!
//! In the browser this wires the canvas, the DOM HUD and the buttons to a
//! `Session`. Natively it plays one headless session with an autoplay bot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent, TouchEvent};

    use reflex_rush::Session;
    use reflex_rush::audio::{AudioManager, SoundEffect};
    use reflex_rush::persistence::LocalStorage;
    use reflex_rush::platform::web::{CanvasSurface, DomHud, now_ms, set_visible};
    use reflex_rush::tuning::Tuning;

    /// Game instance holding all state
    struct Game {
        session: Session<DomHud, LocalStorage>,
        surface: CanvasSurface,
        audio: AudioManager,
        /// An animation frame is already queued
        loop_running: bool,
    }

    impl Game {
        /// Route drained events to audio
        fn play_events(&mut self) {
            for event in self.session.drain_events() {
                if let Some(effect) = SoundEffect::for_event(&event) {
                    self.audio.play(effect);
                }
            }
        }

        fn pointer_at(&mut self, client_x: f32, client_y: f32) {
            let point = self.surface.rect().to_canvas(client_x, client_y);
            self.session.pointer_down(point, now_ms());
            self.play_events();
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Reflex Rush starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("game-canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let surface = CanvasSurface::new(canvas)?;

        let seed = (js_sys::Date::now() as u64) ^ ((js_sys::Math::random() * u32::MAX as f64) as u64);
        let mut session = Session::new(
            Tuning::default(),
            DomHud::new(document.clone()),
            LocalStorage::new(),
            seed,
            surface.bounds(),
        );
        let snapshot = session.hud_snapshot(now_ms());
        reflex_rush::HudSink::update(session.hud_mut(), &snapshot);

        let audio = AudioManager::new(session.settings());
        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            session,
            surface,
            audio,
            loop_running: false,
        }));

        setup_input_handlers(game.clone())?;
        setup_button("start-button", game.clone());
        setup_button("restart-button", game);

        set_visible(&document, "intro-screen", true);
        log::info!("Reflex Rush ready");
        Ok(())
    }

    /// (Re)start a session and make sure exactly one frame loop runs
    fn start_game(game: &Rc<RefCell<Game>>) {
        let start_loop = {
            let mut g = game.borrow_mut();
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                set_visible(&document, "intro-screen", false);
                set_visible(&document, "game-over-screen", false);
                set_visible(&document, "game-screen", true);
            }
            g.audio.resume();
            let bounds = g.surface.bounds();
            g.session.set_bounds(bounds);
            g.session.restart(now_ms());
            g.play_events();

            let idle = !g.loop_running;
            g.loop_running = true;
            idle
        };
        if start_loop {
            request_animation_frame(game.clone());
        }
    }

    fn setup_button(id: &str, game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(btn) = document.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                start_game(&game);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        } else {
            log::warn!("Missing #{id}");
        }
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let canvas = game.borrow().surface.canvas().clone();

        // Mouse press
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                game.borrow_mut()
                    .pointer_at(event.client_x() as f32, event.client_y() as f32);
            });
            canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch start
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                match event.touches().get(0) {
                    Some(touch) => g.pointer_at(touch.client_x() as f32, touch.client_y() as f32),
                    None => {
                        g.session.pointer_down(None, now_ms());
                    }
                }
            });
            canvas.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

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
        let keep_going = {
            let mut guard = game.borrow_mut();
            let g = &mut *guard;
            let keep_going = g.session.frame(time, &mut g.surface);
            g.play_events();
            g.loop_running = keep_going;
            keep_going
        };

        if keep_going {
            request_animation_frame(game);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use reflex_rush::consts::FRAME_MS;
    use reflex_rush::hud::{LogHud, SessionSummary};
    use reflex_rush::persistence::FileStorage;
    use reflex_rush::sim::{Bounds, GameEvent, SessionState};
    use reflex_rush::{Session, Tuning};

    /// Bot reaction time before it clicks a fresh entity
    const REACTION_MS: f64 = 350.0;
    /// Minimum gap between bot clicks
    const CLICK_GAP_MS: f64 = 180.0;
    /// Chance a click lands on empty space
    const MISCLICK_CHANCE: f64 = 0.04;

    /// Where the bot clicks next, if anywhere
    fn pick_click<R: Rng>(state: &SessionState, rng: &mut R, now: f64) -> Option<Vec2> {
        if rng.random_bool(MISCLICK_CHANCE) {
            return Some(state.bounds.random_inset(rng, 0.0));
        }
        let power_up = state
            .power_ups
            .iter()
            .find(|p| !p.is_hit() && now - p.created_at >= REACTION_MS)
            .map(|p| p.pos);
        power_up.or_else(|| {
            state
                .targets
                .iter()
                .filter(|t| !t.is_hit() && t.elapsed(now) >= REACTION_MS)
                .min_by(|a, b| a.created_at.total_cmp(&b.created_at))
                .map(|t| t.pos)
        })
    }

    /// Hits and misses the bot racked up
    #[derive(Debug, Default, Clone, Copy)]
    pub struct BotStats {
        pub hits: u32,
        pub misses: u32,
        pub expired: u32,
    }

    /// Play one full session without drawing anything
    pub fn play(tuning: Tuning, seed: u64, storage: FileStorage) -> (Option<SessionSummary>, BotStats) {
        let mut session = Session::new(tuning, LogHud::new(), storage, seed, Bounds::default());
        let mut bot = Pcg32::seed_from_u64(seed ^ 0xB07);
        let mut stats = BotStats::default();

        let mut now = 0.0;
        let mut last_click = f64::NEG_INFINITY;
        session.start(now);
        loop {
            now += FRAME_MS;
            if now - last_click >= CLICK_GAP_MS
                && let Some(point) = pick_click(session.state(), &mut bot, now)
            {
                session.pointer_down(Some(point), now);
                last_click = now;
            }
            let keep_going = session.step(now);
            for event in session.drain_events() {
                match event {
                    GameEvent::TargetHit { .. } => stats.hits += 1,
                    GameEvent::Missed => stats.misses += 1,
                    GameEvent::TargetExpired { .. } => stats.expired += 1,
                    _ => {}
                }
            }
            if !keep_going {
                break;
            }
        }
        (session.last_summary(), stats)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use reflex_rush::Tuning;
    use reflex_rush::persistence::FileStorage;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Reflex Rush (native) starting...");
    log::info!("Native mode runs a headless autoplay session - build for wasm32 to play");

    // Optional tuning override: first argument is a JSON file
    let tuning = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(tuning) => {
                log::info!("Loaded tuning from {path}");
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring tuning file {path}: {e}");
                Tuning::default()
            }
        },
        None => Tuning::default(),
    };

    let storage = FileStorage::new(std::env::temp_dir().join("reflex-rush"));
    log::info!("Saving to {}", storage.dir().display());

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let (summary, stats) = headless::play(tuning, seed, storage);

    match summary {
        Some(s) => println!(
            "Score {} | max combo {} | best {}{} | {} hits, {} misses, {} timed out",
            s.score,
            s.max_combo,
            s.high_score,
            if s.new_record { " (new record)" } else { "" },
            stats.hits,
            stats.misses,
            stats.expired
        ),
        None => println!("Session did not finish"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
