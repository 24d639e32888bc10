//! Pointer input: rail hover and drag
//!
//! Browser callbacks only enqueue [`PointerIntent`]s. The frame driver drains
//! the queue before ticking, and applying an intent writes nothing but
//! `GameState::hovered_rail` and `GameState::drag`. The rail offset itself is
//! recomputed from the drag session inside the tick.

use std::collections::VecDeque;

use glam::Vec2;

use crate::sim::{DragSession, GameState};
use crate::tuning::Tuning;

/// A pointer event, in viewport (CSS pixel) coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerIntent {
    Down { pos: Vec2, primary: bool },
    Move { pos: Vec2, primary: bool },
    Up { primary: bool },
}

impl PointerIntent {
    fn is_primary(&self) -> bool {
        match *self {
            PointerIntent::Down { primary, .. }
            | PointerIntent::Move { primary, .. }
            | PointerIntent::Up { primary } => primary,
        }
    }
}

/// Pointer affordance to show over the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Grab,
    Grabbing,
}

impl Cursor {
    /// CSS `cursor` value
    pub fn as_css(&self) -> &'static str {
        match self {
            Cursor::Default => "",
            Cursor::Grab => "grab",
            Cursor::Grabbing => "grabbing",
        }
    }
}

/// Mapping between viewport pixels and the logical square canvas
///
/// The logical canvas (`full_size` on a side) is scaled uniformly to fit the
/// shorter viewport side and centered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Viewport pixels per logical unit
    pub render_scale: f32,
    /// Viewport position of the logical canvas' top-left corner
    pub origin: Vec2,
    /// Logical offset of the board inside the canvas
    pub board_margin: f32,
}

impl ViewTransform {
    pub fn new(viewport: Vec2, tuning: &Tuning) -> Self {
        let render_scale = (viewport.x.min(viewport.y) / tuning.full_size).max(f32::EPSILON);
        let origin = viewport / 2.0 - Vec2::splat(tuning.full_size * render_scale / 2.0);
        Self {
            render_scale,
            origin,
            board_margin: tuning.board_margin(),
        }
    }

    /// Viewport point to logical canvas coordinates
    pub fn to_canvas(&self, pos: Vec2) -> Vec2 {
        (pos - self.origin) / self.render_scale
    }

    /// Viewport point to board-local coordinates
    pub fn to_board(&self, pos: Vec2) -> Vec2 {
        self.to_canvas(pos) - Vec2::splat(self.board_margin)
    }
}

/// Pointer intents waiting for the next frame
#[derive(Debug, Default)]
pub struct InputQueue {
    pending: VecDeque<PointerIntent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, intent: PointerIntent) {
        self.pending.push_back(intent);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Apply every pending intent in arrival order; returns the resulting cursor
    pub fn drain_into(&mut self, state: &mut GameState, tuning: &Tuning, view: &ViewTransform) -> Cursor {
        while let Some(intent) = self.pending.pop_front() {
            apply_intent(state, tuning, view, intent);
        }
        cursor(state)
    }
}

/// Apply one pointer intent to the input-owned part of the state
pub fn apply_intent(state: &mut GameState, tuning: &Tuning, view: &ViewTransform, intent: PointerIntent) {
    if !intent.is_primary() {
        return;
    }

    match intent {
        PointerIntent::Down { pos, .. } => on_pointer_down(state, tuning, view.to_board(pos)),
        PointerIntent::Move { pos, .. } => on_pointer_move(state, tuning, view.to_board(pos)),
        PointerIntent::Up { .. } => on_pointer_up(state),
    }
}

/// Hover the rail whose row contains `board_y`, or none
pub fn update_hovered_rail(state: &mut GameState, tuning: &Tuning, board_y: f32) {
    let row = (board_y / tuning.cell_size).floor() - tuning.rail_start_row as f32;
    state.hovered_rail = if row >= 0.0 && (row as usize) < state.rails.len() {
        Some(row as usize)
    } else {
        None
    };
}

/// Start dragging the rail under the pointer
pub fn on_pointer_down(state: &mut GameState, tuning: &Tuning, board_pos: Vec2) {
    if state.is_game_over {
        return;
    }

    update_hovered_rail(state, tuning, board_pos.y);
    let Some(index) = state.hovered_rail else {
        return;
    };

    let start_offset = state.rails[index].offset;
    state.drag = Some(DragSession {
        rail: index,
        start_offset,
        start_x: board_pos.x,
        current_x: board_pos.x,
    });
    log::debug!("Drag start on rail {} at offset {}", index, start_offset);
}

/// Update hover, or the drag sample while dragging
pub fn on_pointer_move(state: &mut GameState, tuning: &Tuning, board_pos: Vec2) {
    match state.drag.as_mut() {
        Some(drag) => drag.current_x = board_pos.x,
        None => update_hovered_rail(state, tuning, board_pos.y),
    }
}

/// End any drag session
pub fn on_pointer_up(state: &mut GameState) {
    state.drag = None;
}

/// Cursor affordance for the current hover/drag state
pub fn cursor(state: &GameState) -> Cursor {
    match (state.hovered_rail, state.drag) {
        (Some(_), Some(_)) => Cursor::Grabbing,
        (Some(_), None) => Cursor::Grab,
        (None, _) => Cursor::Default,
    }
}
