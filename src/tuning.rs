//! Data-driven game balance
//!
//! Every gameplay constant lives in [`Tuning`]. The defaults reproduce the
//! shipped game; overrides can be loaded from JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A scoring tier a drop can be spawned with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropTier {
    /// Signed progress delta applied when the drop lands
    pub score: i32,
    /// Glyph drawn for the drop
    pub symbol: String,
}

impl DropTier {
    pub fn new(score: i32, symbol: &str) -> Self {
        Self {
            score,
            symbol: symbol.to_string(),
        }
    }
}

/// Inclusive integer range `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRange {
    pub min: i32,
    pub max: i32,
}

impl IntRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }
}

/// Rejected tuning values
#[derive(Debug, Error, PartialEq)]
pub enum TuningError {
    #[error("board geometry must be positive: {columns} columns of {cell}px on a {full}px canvas")]
    BadGeometry { columns: u32, cell: f32, full: f32 },
    #[error("board ({board}px) does not fit inside the full canvas ({full}px)")]
    BoardTooLarge { board: f32, full: f32 },
    #[error("rail rows {start}..{end} exceed the board's {rows} rows")]
    RailsOutOfBoard { start: u32, end: u32, rows: u32 },
    #[error("{name} range is inverted or negative: {min}..={max}")]
    BadRange { name: &'static str, min: i32, max: i32 },
    #[error("rail section of up to {max}px cannot tile a {board}px board")]
    SectionTooLong { max: i32, board: f32 },
    #[error("max progress ({max}) must exceed start progress ({start})")]
    ProgressBounds { start: f32, max: f32 },
    #[error("tick duration must be positive, got {0}")]
    TickDuration(f64),
    #[error("at least one bonus tier is required")]
    NoBonusTiers,
    #[error("invalid tuning JSON: {0}")]
    Json(String),
}

/// Game balance and board geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Board geometry ===
    pub column_count: u32,
    pub row_count: u32,
    pub cell_size: f32,
    /// Side of the square logical canvas the board is centered in
    pub full_size: f32,

    // === Rails ===
    /// When false the game runs without rails or rail collision
    pub rails_enabled: bool,
    pub rail_count: u32,
    pub rail_start_row: u32,
    /// Length range of a generated rail section
    pub rail_section_size: IntRange,

    // === Progress ===
    pub start_progress_value: f32,
    pub max_progress_value: f32,
    pub base_decay_speed: f32,
    pub decay_speed_per_level: f32,
    pub max_decay_speed: f32,
    /// Fraction of the remaining distance `lerp_value` closes per tick
    pub lerp_factor: f32,

    // === Drops ===
    /// Ticks between spawns
    pub spawn_delay: IntRange,
    /// Side of the square drop hitbox
    pub drop_size: f32,
    pub fall_speed: f32,
    pub retract_speed: f32,
    /// Bonus odds: a roll of `0..=bonus_roll_max` is a bonus when `<= bonus_roll_threshold`
    pub bonus_roll_max: i32,
    pub bonus_roll_threshold: i32,
    pub bonus_tiers: Vec<DropTier>,
    pub penalty_tier: DropTier,

    // === Effects (per-tick decay) ===
    pub bad_shake_decay: f32,
    pub good_flash_decay: f32,
    pub level_up_flash_decay: f32,
    pub collect_pop_decay: f32,
    pub game_over_fade_ticks: f32,
    pub game_over_shake: f32,

    // === Timing ===
    /// Seconds of wall time per simulation tick
    pub tick_duration: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            column_count: 10,
            row_count: 10,
            cell_size: 50.0,
            full_size: 600.0,

            rails_enabled: true,
            rail_count: 4,
            rail_start_row: 5,
            rail_section_size: IntRange::new(80, 160),

            start_progress_value: 5000.0,
            max_progress_value: 10000.0,
            base_decay_speed: 3.0,
            decay_speed_per_level: 2.0,
            max_decay_speed: 100.0,
            lerp_factor: 0.25,

            spawn_delay: IntRange::new(10, 30),
            drop_size: 20.0,
            fall_speed: 5.0,
            retract_speed: 10.0,
            bonus_roll_max: 2,
            bonus_roll_threshold: 1,
            bonus_tiers: vec![
                DropTier::new(500, "🍒"),
                DropTier::new(800, "🍓"),
                DropTier::new(1000, "🍊"),
                DropTier::new(1200, "🍍"),
                DropTier::new(1600, "🍉"),
                DropTier::new(2000, "🌌"),
                DropTier::new(3000, "🔔"),
                DropTier::new(5000, "🔑"),
            ],
            penalty_tier: DropTier::new(-500, "💀"),

            bad_shake_decay: 100.0,
            good_flash_decay: 20.0,
            level_up_flash_decay: 15.0,
            collect_pop_decay: 25.0,
            game_over_fade_ticks: 30.0,
            game_over_shake: 1000.0,

            tick_duration: 1.0 / 30.0,
        }
    }
}

impl Tuning {
    /// The rail-less variant: drops only resolve at the bottom
    pub fn simplified() -> Self {
        Self {
            rails_enabled: false,
            ..Self::default()
        }
    }

    /// Parse overrides from JSON; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self =
            serde_json::from_str(json).map_err(|e| TuningError::Json(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Width (and height) of the square play board
    #[inline]
    pub fn board_size(&self) -> f32 {
        self.cell_size * self.column_count as f32
    }

    /// Gap between the full canvas edge and the board
    #[inline]
    pub fn board_margin(&self) -> f32 {
        (self.full_size - self.board_size()) / 2.0
    }

    /// Top edge of the rail at `index`, in board space
    #[inline]
    pub fn rail_y(&self, index: usize) -> f32 {
        (self.rail_start_row as f32 + index as f32) * self.cell_size
    }

    /// Number of rails actually placed on the board
    #[inline]
    pub fn active_rail_count(&self) -> usize {
        if self.rails_enabled {
            self.rail_count as usize
        } else {
            0
        }
    }

    /// Points drained per tick at `level`
    pub fn decay_speed_for_level(&self, level: u32) -> f32 {
        (self.base_decay_speed + level as f32 * self.decay_speed_per_level)
            .min(self.max_decay_speed)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if self.column_count == 0 || !(self.cell_size > 0.0) || !(self.full_size > 0.0) {
            return Err(TuningError::BadGeometry {
                columns: self.column_count,
                cell: self.cell_size,
                full: self.full_size,
            });
        }

        let board = self.board_size();
        if board > self.full_size {
            return Err(TuningError::BoardTooLarge {
                board,
                full: self.full_size,
            });
        }

        let rails_end = self.rail_start_row.checked_add(self.rail_count);
        if self.rails_enabled && rails_end.is_none_or(|end| end > self.row_count) {
            return Err(TuningError::RailsOutOfBoard {
                start: self.rail_start_row,
                end: rails_end.unwrap_or(u32::MAX),
                rows: self.row_count,
            });
        }

        for (name, range) in [
            ("spawn delay", self.spawn_delay),
            ("rail section size", self.rail_section_size),
        ] {
            if range.min > range.max || range.min < 0 {
                return Err(TuningError::BadRange {
                    name,
                    min: range.min,
                    max: range.max,
                });
            }
        }

        if self.rail_section_size.max as f32 > board {
            return Err(TuningError::SectionTooLong {
                max: self.rail_section_size.max,
                board,
            });
        }

        if self.max_progress_value <= self.start_progress_value {
            return Err(TuningError::ProgressBounds {
                start: self.start_progress_value,
                max: self.max_progress_value,
            });
        }

        if self.tick_duration <= 0.0 {
            return Err(TuningError::TickDuration(self.tick_duration));
        }

        if self.bonus_tiers.is_empty() {
            return Err(TuningError::NoBonusTiers);
        }

        Ok(())
    }
}
