//! Endless Flyer entry point
//!
//! In the browser this wires input and the frame loop to a [`Game`] and hands
//! each frame's snapshot to the page for drawing. Natively it plays one
//! headless autopilot session and prints a summary.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use endless_flyer::persistence::{LocalStore, Store};
    use endless_flyer::platform::web::FrameLoop;
    use endless_flyer::platform::{Clock, SystemClock};
    use endless_flyer::sim::SessionPhase;
    use endless_flyer::{Game, GameEvent, RankPoller, Tuning, Viewport};

    /// Wallet address the surrounding page stores after sign-in
    const IDENTITY_KEY: &str = "endless_flyer_identity";

    // Drawing and audio belong to the page; it registers these hooks
    #[wasm_bindgen(inline_js = "
        export function present_frame(json) {
            if (window.flyerDraw) window.flyerDraw(JSON.parse(json));
        }
        export function emit_event(json) {
            if (window.flyerEvent) window.flyerEvent(JSON.parse(json));
        }
    ")]
    extern "C" {
        fn present_frame(json: &str);
        fn emit_event(json: &str);
    }

    thread_local! {
        static FRAME_LOOP: RefCell<Option<FrameLoop>> = const { RefCell::new(None) };
    }

    struct Host {
        game: Game,
        poller: RankPoller,
        clock: SystemClock,
        last_phase: SessionPhase,
    }

    impl Host {
        /// Returns false once the run is over and the loop should stop
        fn on_frame(&mut self) -> bool {
            if self.poller.due(self.clock.now_ms()) {
                if let Some(board) = self.game.fetch_leaderboard() {
                    self.game.on_leaderboard(&board);
                }
            }

            let running = self.game.frame();

            for event in self.game.drain_events() {
                if let GameEvent::SessionEnded { score, .. } = event {
                    log::info!("Game over at {}", score);
                }
                match serde_json::to_string(&event) {
                    Ok(json) => emit_event(&json),
                    Err(e) => log::warn!("Failed to encode event: {}", e),
                }
            }

            self.present();
            running
        }

        fn present(&mut self) {
            match serde_json::to_string(&self.game.snapshot()) {
                Ok(json) => present_frame(&json),
                Err(e) => log::warn!("Failed to encode snapshot: {}", e),
            }

            let phase = self.game.phase();
            if phase != self.last_phase {
                update_hud(&self.game);
                self.last_phase = phase;
            } else if phase == SessionPhase::Playing {
                update_score(&self.game);
            }
        }

        /// Tap, click or key: jump while playing, otherwise start a run.
        /// Returns true when a run was started.
        fn on_press(&mut self) -> bool {
            if self.game.phase() == SessionPhase::Playing {
                self.game.request_jump();
                false
            } else {
                self.game.start();
                true
            }
        }
    }

    /// Schedule frames for a new run, replacing (and cancelling) any old loop
    fn start_loop(host: &Rc<RefCell<Host>>) -> Result<(), JsValue> {
        let frame_loop = {
            let host = host.clone();
            FrameLoop::start(move |_time| {
                if !host.borrow_mut().on_frame() {
                    // Stopped, not dropped: this runs inside the loop's own callback
                    FRAME_LOOP.with(|slot| {
                        if let Some(frame_loop) = slot.borrow().as_ref() {
                            frame_loop.stop();
                        }
                    });
                }
            })?
        };
        FRAME_LOOP.with(|slot| *slot.borrow_mut() = Some(frame_loop));
        Ok(())
    }

    fn press(host: &Rc<RefCell<Host>>) {
        let started = host.borrow_mut().on_press();
        if started {
            if let Err(e) = start_loop(host) {
                log::warn!("Failed to start frame loop: {:?}", e);
            }
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn update_score(game: &Game) {
        if let Some(el) = document().and_then(|d| d.query_selector("#hud-score .hud-value").ok().flatten()) {
            el.set_text_content(Some(&game.state().score.to_string()));
        }
    }

    fn update_hud(game: &Game) {
        let Some(document) = document() else {
            return;
        };
        update_score(game);
        if let Some(el) = document.query_selector("#hud-coins .hud-value").ok().flatten() {
            el.set_text_content(Some(&game.coins().to_string()));
        }
        if let Some(el) = document.query_selector("#hud-level .hud-value").ok().flatten() {
            el.set_text_content(Some(&game.progression().level.to_string()));
        }
        if let Some(el) = document.get_element_by_id("game-over") {
            let class = if game.phase() == SessionPhase::Ended { "" } else { "hidden" };
            let _ = el.set_attribute("class", class);
        }
    }

    fn load_identity() -> Option<String> {
        let storage = web_sys::window()?.local_storage().ok()??;
        storage.get_item(IDENTITY_KEY).ok()?.filter(|s| !s.is_empty())
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger already set: {}", e).into());
        }

        log::info!("Endless Flyer starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let inner_w = window.inner_width()?.as_f64().unwrap_or(0.0) as f32;
        let inner_h = window.inner_height()?.as_f64().unwrap_or(0.0) as f32;
        let viewport = Viewport::for_window(inner_w, inner_h);

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        canvas.set_width(viewport.width as u32);
        canvas.set_height(viewport.height as u32);

        let identity = load_identity();
        if identity.is_none() {
            log::info!("No wallet connected, progress will not be saved");
        }
        let tuning = Tuning::load();
        let poller = RankPoller::new(tuning.rank_poll_ms);
        let store = Store::new(Box::new(LocalStore::new()), identity);
        let game = Game::new(tuning, viewport, store, Box::new(SystemClock::new()));

        let host = Rc::new(RefCell::new(Host {
            last_phase: game.phase(),
            game,
            poller,
            clock: SystemClock::new(),
        }));
        {
            let mut host = host.borrow_mut();
            update_hud(&host.game);
            host.present();
        }

        // Keyboard
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if matches!(event.key().as_str(), " " | "ArrowUp" | "w" | "W") {
                    event.prevent_default();
                    press(&host);
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Mouse and touch
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                press(&host);
            });
            canvas.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Tear the loop down with the page
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                FRAME_LOOP.with(|slot| slot.borrow_mut().take());
            });
            window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        log::info!(
            "Viewport {}x{}, waiting for first tap",
            viewport.width,
            viewport.height
        );
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use endless_flyer::persistence::{AccountRecord, MemoryStore, Store};
    use endless_flyer::platform::{Clock, ManualClock};
    use endless_flyer::sim::{SessionPhase, autopilot};
    use endless_flyer::{BoostKind, Game, GameEvent, RankPoller, Tuning, Viewport};

    const FRAME_MS: f64 = 1000.0 / 60.0;

    env_logger::init();
    log::info!("Endless Flyer (native) starting...");

    // Usage: endless-flyer [max_frames] [speed|shield]
    let args: Vec<String> = std::env::args().collect();
    let max_frames: u64 = args
        .get(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(60 * 60 * 5);
    let boost = args.get(2).and_then(|arg| match arg.parse::<BoostKind>() {
        Ok(kind) => Some(kind),
        Err(e) => {
            log::warn!("{}, running without a boost", e);
            None
        }
    });

    let tuning = Tuning::load();
    let mut poller = RankPoller::new(tuning.rank_poll_ms);
    let backend = MemoryStore::new();
    if boost.is_some() {
        // Enough to buy one boost
        backend.insert(
            "autopilot",
            AccountRecord {
                coins: tuning.boost_price,
                ..Default::default()
            },
        );
    }
    let clock = ManualClock::new(0.0);
    let store = Store::new(Box::new(backend.clone()), Some("autopilot".into()));
    let mut game = Game::new(tuning, Viewport::default(), store, Box::new(clock.clone()));

    if let Some(kind) = boost {
        if game.purchase_boost(kind) && game.activate_boost(kind) {
            log::info!("Running with the {} boost armed", kind.as_str());
        }
    }

    game.start();
    let mut frames = 0;
    while frames < max_frames && game.phase() == SessionPhase::Playing {
        clock.advance(FRAME_MS);
        if poller.due(clock.now_ms()) {
            if let Some(board) = game.fetch_leaderboard() {
                game.on_leaderboard(&board);
            }
        }
        if autopilot(game.state()) {
            game.request_jump();
        }
        game.frame();
        for event in game.drain_events() {
            match event {
                GameEvent::Jumped => {}
                other => log::debug!("{:?}", other),
            }
        }
        frames += 1;
    }

    let snapshot = game.snapshot();
    let counters = game.state().counters;
    println!("Frames:      {}", frames);
    println!("Phase:       {:?}", snapshot.phase);
    println!("Score:       {} (best {})", snapshot.score, snapshot.high_score);
    println!("Biome:       {}", snapshot.biome.as_str());
    println!("Jumps:       {}", counters.jumps);
    println!("Coins:       {} this run, {} banked", counters.coins, snapshot.coins);
    println!("Time:        {}s", counters.seconds_played);
    for task in game.task_views() {
        println!(
            "Task {:>2}:     {} [{}/{}]{}",
            task.id,
            task.label,
            task.progress,
            task.goal,
            if task.done { " done" } else { "" }
        );
    }
    if let Some(record) = backend.record("autopilot") {
        log::info!("Stored account: {:?}", record);
    }
}
