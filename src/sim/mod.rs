//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (drops in spawn order, rails top to bottom)
//! - No rendering or platform dependencies

pub mod collision;
pub mod random;
pub mod state;
pub mod tick;

pub use collision::{Rect, first_rail_hit, rail_hit};
pub use random::GameRng;
pub use state::{DragSession, Drop, GameState, Progress, Rail, RailSection};
pub use tick::{GameEvent, TickOutcome, apply_level_progress, mark_game_over, spawn_drop, tick};
