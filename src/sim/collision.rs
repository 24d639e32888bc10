//! Collision detection between drops and rail segments
//!
//! Everything is axis-aligned: drops are square hitboxes, rail segments are
//! one cell tall. Rails wrap horizontally, so each segment is also tested one
//! board width to the left to cover the seam.

use glam::Vec2;

use super::state::Rail;
use crate::tuning::Tuning;

/// Axis-aligned rectangle (edges inclusive)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            left: x,
            top: y,
            right: x + width,
            bottom: y + height,
        }
    }

    /// Square of side `size` centered on `center`
    pub fn centered(center: Vec2, size: f32) -> Self {
        let half = size / 2.0;
        Self::new(center.x - half, center.y - half, size, size)
    }

    /// Same rectangle moved horizontally by `dx`
    pub fn shifted_x(&self, dx: f32) -> Self {
        Self {
            left: self.left + dx,
            right: self.right + dx,
            ..*self
        }
    }

    /// Overlap test; touching edges count as intersecting
    pub fn intersects(&self, other: &Rect) -> bool {
        !(other.left > self.right
            || other.right < self.left
            || other.top > self.bottom
            || other.bottom < self.top)
    }
}

/// Whether `hitbox` touches any segment of `rail`, whose top edge is at `rail_y`
pub fn rail_hit(hitbox: &Rect, rail: &Rail, rail_y: f32, board_size: f32, cell_size: f32) -> bool {
    rail.segments().any(|(x, size)| {
        let segment = Rect::new(x, rail_y, size, cell_size);
        hitbox.intersects(&segment) || hitbox.intersects(&segment.shifted_x(-board_size))
    })
}

/// Index of the first rail (top to bottom) that blocks `hitbox`
pub fn first_rail_hit(hitbox: &Rect, rails: &[Rail], tuning: &Tuning) -> Option<usize> {
    let board_size = tuning.board_size();
    rails
        .iter()
        .enumerate()
        .find(|(i, rail)| rail_hit(hitbox, rail, tuning.rail_y(*i), board_size, tuning.cell_size))
        .map(|(i, _)| i)
}
