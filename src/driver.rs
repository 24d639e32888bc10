//! Frame driver
//!
//! Turns display-frame callbacks into fixed simulation ticks and one render
//! per frame, and owns the start/stop lifecycle of the frame loop.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use crate::input::{Cursor, InputQueue, PointerIntent, ViewTransform};
use crate::renderer::{Renderer, Surface};
use crate::router::{Screen, ViewRouter};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameState, tick};
use crate::stats::GameStats;
use crate::tuning::Tuning;

/// Fixed-timestep accumulator
///
/// Reports at most one tick per frame; whole extra tick durations are
/// dropped rather than replayed.
#[derive(Debug, Clone)]
pub struct FrameClock {
    tick_duration: f64,
    accumulator: f64,
    last_time: Option<f64>,
}

impl FrameClock {
    pub fn new(tick_duration: f64) -> Self {
        Self {
            tick_duration,
            accumulator: 0.0,
            last_time: None,
        }
    }

    /// Forget timing history (the next sample has zero elapsed time)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_time = None;
    }

    /// Feed a frame timestamp in milliseconds; returns ticks to run (0 or 1)
    pub fn advance(&mut self, time_ms: f64) -> u32 {
        let dt = match self.last_time {
            Some(last) => ((time_ms - last) / 1000.0).max(0.0),
            None => 0.0,
        };
        self.last_time = Some(time_ms);

        self.accumulator += dt;
        if self.accumulator >= self.tick_duration {
            self.accumulator %= self.tick_duration;
            1
        } else {
            0
        }
    }

    /// Leftover time carried into the next frame, in seconds
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }
}

/// Host facility for per-frame callbacks
pub trait FrameScheduler {
    type Handle;

    /// Ask for one callback on the next display frame
    fn request(&mut self) -> Option<Self::Handle>;
    /// Revoke a pending request
    fn cancel(&mut self, handle: Self::Handle);
}

/// A start/stop-able frame loop with at most one pending request
pub struct FrameLoop<F: FrameScheduler> {
    scheduler: F,
    pending: Option<F::Handle>,
    running: bool,
}

impl<F: FrameScheduler> FrameLoop<F> {
    pub fn new(scheduler: F) -> Self {
        Self {
            scheduler,
            pending: None,
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn start(&mut self) {
        self.running = true;
        if self.pending.is_none() {
            self.pending = self.scheduler.request();
        }
    }

    /// Cancel the pending request; safe to call repeatedly
    pub fn stop(&mut self) {
        self.running = false;
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
    }

    /// Call at the top of each frame callback to queue the next one
    pub fn on_frame(&mut self) {
        self.pending = None;
        if self.running {
            self.pending = self.scheduler.request();
        }
    }
}

/// What the host should do after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    /// The game-over fade finished
    EnterGameOver,
}

/// One game in progress plus everything needed to drive it
pub struct Session {
    tuning: Tuning,
    settings: Settings,
    state: GameState,
    input: InputQueue,
    renderer: Renderer,
    clock: FrameClock,
    stats: Rc<RefCell<GameStats>>,
    cursor: Cursor,
}

impl Session {
    pub fn new(tuning: Tuning, settings: Settings, seed: u64, stats: Rc<RefCell<GameStats>>) -> Self {
        let state = GameState::new(&tuning, seed);
        let clock = FrameClock::new(tuning.tick_duration);
        Self {
            tuning,
            settings,
            state,
            input: InputQueue::new(),
            renderer: Renderer::new(seed.rotate_left(32)),
            clock,
            stats,
            cursor: Cursor::Default,
        }
    }

    /// Throw away the current game and start a fresh one
    pub fn restart(&mut self, seed: u64) {
        self.state = GameState::new(&self.tuning, seed);
        self.input = InputQueue::new();
        self.clock.reset();
        self.cursor = Cursor::Default;
        log::info!("New game with seed {}", seed);
    }

    /// Queue a pointer intent for the next frame
    pub fn push_input(&mut self, intent: PointerIntent) {
        self.input.push(intent);
    }

    /// Run one display frame: input, zero or one tick, then a full redraw
    pub fn frame<S: Surface + ?Sized>(&mut self, time_ms: f64, surface: &mut S, viewport: Vec2) -> FrameOutcome {
        let view = ViewTransform::new(viewport, &self.tuning);
        self.cursor = self.input.drain_into(&mut self.state, &self.tuning, &view);

        let mut outcome = FrameOutcome::Continue;
        for _ in 0..self.clock.advance(time_ms) {
            let result = tick(&mut self.state, &self.tuning, &mut self.stats);
            if result.events.contains(&GameEvent::FadeComplete) {
                outcome = FrameOutcome::EnterGameOver;
            }
        }

        self.renderer
            .draw(surface, &self.state, &self.tuning, &self.settings, viewport);
        outcome
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Flip one effect toggle and persist the result
    pub fn set_setting(&mut self, name: &str, enabled: bool) {
        if self.settings.set(name, enabled) {
            self.settings.save();
        }
    }

    /// Cursor affordance after the last frame's input
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Stats of the last finished game
    pub fn stats(&self) -> GameStats {
        *self.stats.borrow()
    }
}

/// Screen flow around a session: home -> game -> game over -> game ...
pub struct App<R: ViewRouter, F: FrameScheduler> {
    session: Session,
    frames: FrameLoop<F>,
    router: R,
}

impl<R: ViewRouter, F: FrameScheduler> App<R, F> {
    pub fn new(session: Session, scheduler: F, router: R) -> Self {
        Self {
            session,
            frames: FrameLoop::new(scheduler),
            router,
        }
    }

    pub fn enter_home(&mut self) {
        self.router.show(Screen::Home);
    }

    /// Reset the game, show its screen and start the frame loop
    pub fn enter_game(&mut self, seed: u64) {
        self.router.hide(Screen::Home);
        self.router.hide(Screen::GameOver);
        self.router.show(Screen::Game);
        self.session.restart(seed);
        self.frames.start();
    }

    /// Frame callback entry point
    pub fn on_frame<S: Surface + ?Sized>(&mut self, time_ms: f64, surface: &mut S, viewport: Vec2) -> FrameOutcome {
        self.frames.on_frame();
        let outcome = self.session.frame(time_ms, surface, viewport);
        if outcome == FrameOutcome::EnterGameOver {
            self.enter_game_over();
        }
        outcome
    }

    fn enter_game_over(&mut self) {
        self.frames.stop();
        self.router.hide(Screen::Game);
        self.router.show(Screen::GameOver);
        let stats = self.session.stats();
        log::info!(
            "Showing game over: level {}, {} ticks",
            stats.display_level(),
            stats.total_ticks
        );
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn frames(&self) -> &FrameLoop<F> {
        &self.frames
    }

    pub fn router(&self) -> &R {
        &self.router
    }
}
