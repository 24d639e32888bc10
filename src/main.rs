//! Rail Drop entry point
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
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlInputElement, PointerEvent, Window};

    use rail_drop::driver::App;
    use rail_drop::input::PointerIntent;
    use rail_drop::router::{Screen, ViewRouter};
    use rail_drop::{FrameOutcome, FrameScheduler, GameStats, Session, Settings, Tuning};

    type WebApp = App<DomRouter, WebScheduler>;
    type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

    /// requestAnimationFrame-backed scheduler
    struct WebScheduler {
        window: Window,
        callback: FrameCallback,
    }

    impl FrameScheduler for WebScheduler {
        type Handle = i32;

        fn request(&mut self) -> Option<i32> {
            let callback = self.callback.borrow();
            let closure = callback.as_ref()?;
            match self
                .window
                .request_animation_frame(closure.as_ref().unchecked_ref())
            {
                Ok(handle) => Some(handle),
                Err(e) => {
                    log::error!("requestAnimationFrame failed: {:?}", e);
                    None
                }
            }
        }

        fn cancel(&mut self, handle: i32) {
            if let Err(e) = self.window.cancel_animation_frame(handle) {
                log::warn!("cancelAnimationFrame failed: {:?}", e);
            }
        }
    }

    /// Toggles the `hidden` attribute on screen root elements
    struct DomRouter {
        document: Document,
    }

    impl DomRouter {
        fn set_visible(&self, screen: Screen, visible: bool) {
            let Some(el) = self.document.query_selector(screen.selector()).ok().flatten() else {
                log::warn!("No element for screen {:?}", screen);
                return;
            };
            let _ = if visible {
                el.remove_attribute("hidden")
            } else {
                el.set_attribute("hidden", "")
            };
        }
    }

    impl ViewRouter for DomRouter {
        fn show(&mut self, screen: Screen) {
            self.set_visible(screen, true);
        }

        fn hide(&mut self, screen: Screen) {
            self.set_visible(screen, false);
        }
    }

    fn new_seed() -> u64 {
        js_sys::Date::now() as u64
    }

    /// `?variant=simple` selects the rail-less game
    fn load_tuning(window: &Window) -> Tuning {
        let search = window.location().search().unwrap_or_default();
        if search.contains("variant=simple") {
            log::info!("Using simplified variant (no rails)");
            Tuning::simplified()
        } else {
            Tuning::default()
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Rail Drop starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let canvas: HtmlCanvasElement = document
            .query_selector("#canvas")?
            .ok_or_else(|| JsValue::from_str("no canvas"))?
            .dyn_into()?;
        let context: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into()?;

        let stats = Rc::new(RefCell::new(GameStats::default()));
        let session = Session::new(load_tuning(&window), Settings::load(), new_seed(), stats);

        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let scheduler = WebScheduler {
            window: window.clone(),
            callback: callback.clone(),
        };
        let router = DomRouter {
            document: document.clone(),
        };
        let app = Rc::new(RefCell::new(App::new(session, scheduler, router)));

        {
            let app = app.clone();
            let canvas = canvas.clone();
            let mut context = context;
            *callback.borrow_mut() = Some(Closure::new(move |time: f64| {
                render_frame(&app, &canvas, &mut context, time);
            }));
        }

        setup_input_handlers(&canvas, app.clone())?;
        setup_play_button(&document, ".home button.play", app.clone())?;
        setup_play_button(&document, ".gameOver button.play", app.clone())?;
        setup_settings_toggles(&document, app.clone())?;

        app.borrow_mut().enter_home();
        log::info!("Rail Drop ready");
        Ok(())
    }

    /// Resize the canvas to the viewport and run one frame
    fn render_frame(
        app: &Rc<RefCell<WebApp>>,
        canvas: &HtmlCanvasElement,
        context: &mut CanvasRenderingContext2d,
        time: f64,
    ) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(body) = window.document().and_then(|d| d.body()) else {
            return;
        };

        let rect = body.get_bounding_client_rect();
        let (width, height) = (rect.width(), rect.height());
        let dpr = window.device_pixel_ratio();
        canvas.set_width((width * dpr) as u32);
        canvas.set_height((height * dpr) as u32);
        // Resizing resets the context; draw in CSS pixels
        let _ = context.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);

        let mut app = app.borrow_mut();
        let outcome = app.on_frame(time, context, Vec2::new(width as f32, height as f32));

        let cursor = app.session().cursor();
        let _ = canvas.style().set_property("cursor", cursor.as_css());

        if outcome == FrameOutcome::EnterGameOver {
            show_final_stats(&window, app.session().stats());
        }
    }

    fn show_final_stats(window: &Window, stats: GameStats) {
        let Some(document) = window.document() else {
            return;
        };
        if let Some(el) = document.get_element_by_id("final-level") {
            el.set_text_content(Some(&stats.display_level().to_string()));
        }
        if let Some(el) = document.get_element_by_id("final-ticks") {
            el.set_text_content(Some(&stats.total_ticks.to_string()));
        }
    }

    /// Pointer position relative to the canvas, in CSS pixels
    fn canvas_pos(canvas: &HtmlCanvasElement, event: &PointerEvent) -> Vec2 {
        let rect = canvas.get_bounding_client_rect();
        Vec2::new(
            (event.client_x() as f64 - rect.left()) as f32,
            (event.client_y() as f64 - rect.top()) as f32,
        )
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<WebApp>>) -> Result<(), JsValue> {
        // Pointer down
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let intent = PointerIntent::Down {
                    pos: canvas_pos(&canvas_clone, &event),
                    primary: event.is_primary(),
                };
                app.borrow_mut().session_mut().push_input(intent);
            });
            canvas.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Pointer move
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let intent = PointerIntent::Move {
                    pos: canvas_pos(&canvas_clone, &event),
                    primary: event.is_primary(),
                };
                app.borrow_mut().session_mut().push_input(intent);
            });
            canvas.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Pointer up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let intent = PointerIntent::Up {
                    primary: event.is_primary(),
                };
                app.borrow_mut().session_mut().push_input(intent);
            });
            canvas.add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn setup_play_button(document: &Document, selector: &str, app: Rc<RefCell<WebApp>>) -> Result<(), JsValue> {
        let Some(btn) = document.query_selector(selector)? else {
            log::warn!("Play button {} not found", selector);
            return Ok(());
        };

        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
            event.prevent_default();
            app.borrow_mut().enter_game(new_seed());
        });
        btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    /// Bind `input[name=<toggle>]` checkboxes to the stored settings
    fn setup_settings_toggles(document: &Document, app: Rc<RefCell<WebApp>>) -> Result<(), JsValue> {
        for name in Settings::TOGGLES {
            let Some(input) = document.query_selector(&format!("input[name=\"{}\"]", name))? else {
                continue;
            };
            let input: HtmlInputElement = input.dyn_into()?;
            let enabled = app.borrow().session().settings().get(name).unwrap_or(true);
            input.set_checked(enabled);

            let app = app.clone();
            let input_clone = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut()
                    .session_mut()
                    .set_setting(name, input_clone.checked());
            });
            input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
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
    env_logger::init();
    log::info!("Rail Drop (native) starting...");
    log::info!("Native mode runs a headless demo - build for wasm32 to play in the browser");

    headless::run_demo(0x5eed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted game without a browser
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;

    use rail_drop::driver::App;
    use rail_drop::input::{PointerIntent, ViewTransform};
    use rail_drop::renderer::CommandList;
    use rail_drop::router::{Screen, ViewRouter};
    use rail_drop::{FrameOutcome, FrameScheduler, GameStats, Session, Settings, Tuning};

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);
    const FRAME_MS: f64 = 1000.0 / 60.0;
    const MAX_FRAMES: u32 = 20_000;

    /// Hands out handles; the demo loop polls instead of waiting
    #[derive(Default)]
    struct ManualScheduler {
        next: u32,
    }

    impl FrameScheduler for ManualScheduler {
        type Handle = u32;

        fn request(&mut self) -> Option<u32> {
            self.next += 1;
            Some(self.next)
        }

        fn cancel(&mut self, _handle: u32) {}
    }

    struct LogRouter;

    impl ViewRouter for LogRouter {
        fn show(&mut self, screen: Screen) {
            log::info!("show {:?}", screen);
        }

        fn hide(&mut self, screen: Screen) {
            log::debug!("hide {:?}", screen);
        }
    }

    /// Sweep the first rail back and forth under the pointer
    fn scripted_input(frame: u32, rail_row: Vec2) -> Option<PointerIntent> {
        match frame % 240 {
            10 => Some(PointerIntent::Down {
                pos: rail_row,
                primary: true,
            }),
            f @ 11..=129 => {
                let sweep = ((f as f32) * 0.05).sin() * 200.0;
                Some(PointerIntent::Move {
                    pos: rail_row + Vec2::new(sweep, 0.0),
                    primary: true,
                })
            }
            130 => Some(PointerIntent::Up { primary: true }),
            _ => None,
        }
    }

    pub fn run_demo(seed: u64) {
        let stats = Rc::new(RefCell::new(GameStats::default()));
        let tuning = Tuning::default();
        let view = ViewTransform::new(VIEWPORT, &tuning);
        let rail_center = Vec2::new(tuning.board_size() / 2.0, tuning.rail_y(0) + tuning.cell_size / 2.0);
        let rail_row = (rail_center + Vec2::splat(view.board_margin)) * view.render_scale + view.origin;
        let session = Session::new(tuning, Settings::default(), seed, stats.clone());
        let mut app = App::new(session, ManualScheduler::default(), LogRouter);
        let mut surface = CommandList::new();

        app.enter_home();
        app.enter_game(seed);

        let mut frame = 0;
        while app.frames().is_running() && frame < MAX_FRAMES {
            if let Some(intent) = scripted_input(frame, rail_row) {
                app.session_mut().push_input(intent);
            }
            surface.clear();
            if app.on_frame(frame as f64 * FRAME_MS, &mut surface, VIEWPORT) == FrameOutcome::EnterGameOver {
                break;
            }
            frame += 1;
        }

        let stats = *stats.borrow();
        log::info!(
            "Demo finished after {} frames: level {}, {} ticks ({:.1}s), {} draw calls in last frame",
            frame,
            stats.display_level(),
            stats.total_ticks,
            stats.seconds_survived(app.session().tuning().tick_duration),
            surface.commands.len()
        );
    }
}
