//! Game state and core simulation types
//!
//! Everything the tick and the renderer read lives here. Input may only
//! write `drag` and `hovered_rail`; everything else belongs to the tick.

use glam::Vec2;

use super::random::GameRng;
use super::tick::apply_level_progress;
use crate::tuning::{DropTier, Tuning};
use crate::wrap;

/// The level-completion meter
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Progress {
    /// Current fill in points
    pub value: f32,
    /// Points drained per tick
    pub decay_speed: f32,
    /// Smoothed copy of `value`, for the bar animation only
    pub lerp_value: f32,
}

/// One blocking segment followed by an open gap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RailSection {
    pub size: f32,
    pub gap: f32,
}

impl RailSection {
    pub fn new(size: f32, gap: f32) -> Self {
        Self { size, gap }
    }

    /// Horizontal distance this section occupies on the track
    #[inline]
    pub fn span(&self) -> f32 {
        self.size + self.gap
    }
}

/// A horizontally scrolling row of blocking segments
///
/// Sections tile the track: their spans sum to the board width, and the
/// whole pattern repeats modulo that width.
#[derive(Debug, Clone, PartialEq)]
pub struct Rail {
    /// Scroll position, always in `[0, board_size)`
    pub offset: f32,
    pub sections: Vec<RailSection>,
}

impl Rail {
    pub fn new(offset: f32, sections: Vec<RailSection>, board_size: f32) -> Self {
        Self {
            offset: wrap(offset, board_size),
            sections,
        }
    }

    /// Total span of all sections (equals the board width when tiled)
    pub fn period(&self) -> f32 {
        self.sections.iter().map(RailSection::span).sum()
    }

    /// Set the scroll position, wrapping it back onto the track
    pub fn set_offset(&mut self, offset: f32, board_size: f32) {
        self.offset = wrap(offset, board_size);
    }

    /// Left edge and length of each blocking segment, starting at `offset`
    pub fn segments(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.sections.iter().scan(self.offset, |x, section| {
            let start = *x;
            *x += section.span();
            Some((start, section.size))
        })
    }
}

/// A falling scoring token
#[derive(Debug, Clone, PartialEq)]
pub struct Drop {
    /// Center of the token; `x` is fixed at spawn
    pub pos: Vec2,
    /// Progress delta applied when the drop reaches the bottom
    pub score: i32,
    pub symbol: String,
    /// Set once the drop is resolved (landed or blocked)
    pub collected: bool,
    /// Collect animation counter, 100 down to 0
    pub collect_pop: f32,
}

impl Drop {
    /// A new unresolved drop centered at `pos`
    pub fn new(pos: Vec2, tier: &DropTier) -> Self {
        Self {
            pos,
            score: tier.score,
            symbol: tier.symbol.clone(),
            collected: false,
            collect_pop: 0.0,
        }
    }

    /// Resolve the drop and start its pop animation
    pub fn collect(&mut self) {
        self.collected = true;
        self.collect_pop = 100.0;
    }

    /// Resolved and fully animated, ready to be pruned
    #[inline]
    pub fn is_spent(&self) -> bool {
        self.collected && self.collect_pop <= 0.0
    }

    #[inline]
    pub fn is_bonus(&self) -> bool {
        self.score > 0
    }
}

/// An active pointer drag on a rail
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    /// Rail being dragged (the hovered rail at pointer-down)
    pub rail: usize,
    pub start_offset: f32,
    pub start_x: f32,
    pub current_x: f32,
}

impl DragSession {
    /// Rail offset implied by the latest pointer sample (not wrapped)
    #[inline]
    pub fn target_offset(&self) -> f32 {
        self.start_offset - self.start_x + self.current_x
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Current level (0-based)
    pub level: u32,
    pub is_game_over: bool,
    pub progress: Progress,
    /// Ticks played, frozen once the game is over
    pub total_ticks: u64,
    /// Live drops in spawn order
    pub drops: Vec<Drop>,
    /// One rail per track row, top to bottom
    pub rails: Vec<Rail>,
    /// Ticks until the next spawn
    pub spawn_drop_delay: i32,

    // === Effect counters (decay toward 0 each tick) ===
    pub game_over_fade: f32,
    pub bad_shake: f32,
    pub good_flash: f32,
    pub level_up_flash: f32,

    // === Input-owned ===
    pub hovered_rail: Option<usize>,
    pub drag: Option<DragSession>,

    /// Whether the end-of-fade transition has already been reported
    pub fade_signaled: bool,
    /// Gameplay randomness
    pub rng: GameRng,
}

impl GameState {
    /// Start a fresh game with the given seed
    pub fn new(tuning: &Tuning, seed: u64) -> Self {
        let mut state = Self {
            level: 0,
            is_game_over: false,
            progress: Progress {
                value: tuning.start_progress_value,
                ..Progress::default()
            },
            total_ticks: 0,
            drops: Vec::new(),
            rails: Vec::new(),
            spawn_drop_delay: 0,
            game_over_fade: 0.0,
            bad_shake: 0.0,
            good_flash: 0.0,
            level_up_flash: 0.0,
            hovered_rail: None,
            drag: None,
            fade_signaled: false,
            rng: GameRng::new(seed),
        };

        apply_level_progress(&mut state, tuning);
        // No level-up celebration on the first frame
        state.level_up_flash = 0.0;

        state.generate_rails(tuning);
        state
    }

    /// Lay out one single-section rail per track row
    fn generate_rails(&mut self, tuning: &Tuning) {
        let board_size = tuning.board_size();
        for _ in 0..tuning.active_rail_count() {
            let offset = self.rng.random_int(0, board_size as i32 - 1) as f32;
            let size = self
                .rng
                .random_int(tuning.rail_section_size.min, tuning.rail_section_size.max)
                as f32;
            let sections = vec![RailSection::new(size, board_size - size)];
            self.rails.push(Rail::new(offset, sections, board_size));
        }
    }
}
