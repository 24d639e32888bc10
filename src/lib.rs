//! Rail Drop - A drop-catcher arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (drops, rails, progress, collisions)
//! - `input`: Pointer hover/drag controller feeding the simulation
//! - `renderer`: Canvas 2D rendering of a game state snapshot
//! - `driver`: Fixed-timestep frame driver and session lifecycle
//! - `tuning`: Data-driven game balance

pub mod driver;
pub mod input;
pub mod renderer;
pub mod router;
pub mod settings;
pub mod sim;
pub mod stats;
pub mod tuning;

pub use driver::{App, FrameClock, FrameLoop, FrameOutcome, FrameScheduler, Session};
pub use settings::Settings;
pub use stats::{GameStats, StatsSink};
pub use tuning::{Tuning, TuningError};

/// Linear interpolation from `a` toward `b` by factor `t`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Wrap `value` into `[0, period)`
#[inline]
pub fn wrap(value: f32, period: f32) -> f32 {
    let wrapped = value.rem_euclid(period);
    // rem_euclid can round up to `period` for tiny negative inputs
    if wrapped >= period { 0.0 } else { wrapped }
}
