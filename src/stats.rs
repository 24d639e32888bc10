//! End-of-run statistics
//!
//! The simulation publishes the final level and tick count here when the
//! progress meter runs dry; the game-over screen reads them back.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Final numbers of a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    /// Level reached (0-based)
    pub level: u32,
    /// Ticks survived
    pub total_ticks: u64,
}

impl GameStats {
    /// Level as shown to the player
    pub fn display_level(&self) -> u32 {
        self.level + 1
    }

    /// Seconds survived at the given tick rate
    pub fn seconds_survived(&self, tick_duration: f64) -> f64 {
        self.total_ticks as f64 * tick_duration
    }
}

/// Receiver of end-of-run statistics
pub trait StatsSink {
    fn record(&mut self, stats: GameStats);
}

impl StatsSink for GameStats {
    fn record(&mut self, stats: GameStats) {
        *self = stats;
    }
}

/// Shared record, so the driver and the game-over screen see the same stats
impl StatsSink for Rc<RefCell<GameStats>> {
    fn record(&mut self, stats: GameStats) {
        *self.borrow_mut() = stats;
    }
}
