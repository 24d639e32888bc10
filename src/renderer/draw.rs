//! Frame rendering
//!
//! Draws a full frame from a game state snapshot. Nothing here writes to the
//! game state; the only state the renderer keeps is its own shake RNG.

use std::f32::consts::TAU;

use glam::Vec2;

use super::palette;
use super::surface::{Surface, TextAlign};
use crate::input::ViewTransform;
use crate::settings::Settings;
use crate::sim::{GameRng, GameState};
use crate::tuning::Tuning;

const FONT: &str = "bold 36px Arial";
const LEVEL_BAR_HEIGHT: f32 = 50.0;
const TEXT_OUTLINE_WIDTH: f32 = 4.0;
/// Vertical inset of rail segments inside their row
const RAIL_INSET: f32 = 2.0;
const MAX_SHAKE_RADIUS: f32 = 10.0;

/// Canvas renderer for the game
#[derive(Debug, Clone)]
pub struct Renderer {
    /// Jitter source for screen shake, separate from gameplay randomness
    rng: GameRng,
}

impl Renderer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: GameRng::new(seed),
        }
    }

    /// Redraw the whole viewport; returns the transform used
    pub fn draw<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        state: &GameState,
        tuning: &Tuning,
        settings: &Settings,
        viewport: Vec2,
    ) -> ViewTransform {
        let view = ViewTransform::new(viewport, tuning);

        let full = tuning.full_size;
        let margin = tuning.board_margin();

        surface.set_fill_color(palette::VIEWPORT);
        surface.fill_rect(0.0, 0.0, viewport.x, viewport.y);

        surface.save();
        surface.translate(view.origin.x, view.origin.y);
        surface.scale(view.render_scale, view.render_scale);

        surface.set_fill_color(palette::BACKGROUND);
        surface.fill_rect(0.0, 0.0, full, full);

        surface.set_text_align(TextAlign::Center);
        surface.set_font(FONT);

        if settings.flash_effects && state.good_flash > 0.0 {
            surface.set_fill_color(palette::GOOD_FLASH.with_alpha(state.good_flash / 200.0));
            surface.fill_rect(0.0, 0.0, full, full);
        }

        surface.save();
        surface.translate(margin, margin);

        if settings.screen_shake && state.bad_shake > 0.0 {
            let angle = self.rng.random_float(0.0, TAU);
            let radius = (state.bad_shake / 50.0).min(MAX_SHAKE_RADIUS);
            surface.translate(angle.cos() * radius, angle.sin() * radius);
        }

        self.draw_board(surface, state, tuning);

        surface.restore();

        self.draw_progress_bar(surface, state, tuning);
        draw_outlined_text(
            surface,
            &format!("{:.1}%", state.progress.value / 100.0),
            full / 2.0,
            full - LEVEL_BAR_HEIGHT / 2.0,
        );

        surface.set_text_align(TextAlign::Left);
        draw_outlined_text(
            surface,
            &format!("LVL {}", state.level + 1),
            margin,
            margin / 2.0,
        );

        if state.level_up_flash > 0.0 {
            self.draw_level_up(surface, state, tuning, settings);
        }

        if state.is_game_over {
            let alpha = (100.0 - state.game_over_fade) / 100.0;
            surface.set_fill_color(palette::GAME_OVER.with_alpha(alpha));
            surface.fill_rect(0.0, 0.0, full, full);
        }

        surface.restore();
        view
    }

    /// Board panel, hovered rail, rails and drops (board-local space)
    fn draw_board<S: Surface + ?Sized>(&self, surface: &mut S, state: &GameState, tuning: &Tuning) {
        let board = tuning.board_size();
        let cell = tuning.cell_size;

        surface.save();
        if state.level_up_flash > 0.0 {
            let scale = 1.0 + state.level_up_flash / 1000.0;
            surface.translate(board / 2.0, board / 2.0);
            surface.scale(scale, scale);
            surface.translate(-board / 2.0, -board / 2.0);
        }
        surface.set_fill_color(palette::BOARD);
        surface.fill_rect(0.0, 0.0, board, board);
        surface.restore();

        surface.clip_rect(0.0, 0.0, board, board);

        if let Some(index) = state.hovered_rail.filter(|i| *i < state.rails.len()) {
            surface.set_fill_color(palette::RAIL_HOVER);
            surface.fill_rect(0.0, tuning.rail_y(index), board, cell);
        }

        surface.set_fill_color(palette::RAIL);
        for (i, rail) in state.rails.iter().enumerate() {
            let y = tuning.rail_y(i) + RAIL_INSET;
            let height = cell - RAIL_INSET * 2.0;
            for (x, size) in rail.segments() {
                surface.fill_rect(x, y, size, height);
                surface.fill_rect(x - board, y, size, height);
            }
        }

        surface.set_fill_color(palette::DROP);
        for drop in &state.drops {
            surface.save();
            surface.translate(drop.pos.x, drop.pos.y);
            if drop.collected {
                let scale = 2.0 - drop.collect_pop / 100.0;
                surface.scale(scale, scale);
                surface.set_global_alpha(drop.collect_pop / 100.0);
            }
            surface.fill_text(&drop.symbol, 0.0, 0.0);
            surface.restore();
        }
    }

    /// Two-tone meter: solid up to the lower of value/lerp, colored gap above
    fn draw_progress_bar<S: Surface + ?Sized>(&self, surface: &mut S, state: &GameState, tuning: &Tuning) {
        let full = tuning.full_size;
        let margin = tuning.board_margin();
        let board = tuning.board_size();
        let top = full - LEVEL_BAR_HEIGHT;

        surface.set_fill_color(palette::BAR_TRACK);
        surface.fill_rect(margin, top, board, LEVEL_BAR_HEIGHT);

        let to_x = |v: f32| (board * v / tuning.max_progress_value).clamp(0.0, board);
        let value_x = to_x(state.progress.value);
        let lerp_x = to_x(state.progress.lerp_value);

        let (solid, gap, gap_color) = if lerp_x < value_x {
            (lerp_x, value_x - lerp_x, palette::BAR_GAIN)
        } else {
            (value_x, lerp_x - value_x, palette::BAR_LOSS)
        };

        surface.set_fill_color(palette::BAR_FILL);
        surface.fill_rect(margin, top, solid, LEVEL_BAR_HEIGHT);
        surface.set_fill_color(gap_color);
        surface.fill_rect(margin + solid, top, gap, LEVEL_BAR_HEIGHT);
    }

    /// White-out plus the scaling "LEVEL UP!" banner
    fn draw_level_up<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        state: &GameState,
        tuning: &Tuning,
        settings: &Settings,
    ) {
        let full = tuning.full_size;
        let flash = state.level_up_flash;

        if settings.flash_effects {
            surface.set_fill_color(palette::LEVEL_UP_FLASH.with_alpha(flash / 400.0));
            surface.fill_rect(0.0, 0.0, full, full);
        }

        if settings.level_up_banner {
            surface.save();
            surface.translate(full / 2.0, full / 2.0);
            let scale = 2.0 - flash / 200.0;
            surface.scale(scale, scale);
            surface.set_text_align(TextAlign::Center);
            surface.set_global_alpha(flash / 100.0);
            draw_outlined_text(surface, "LEVEL UP!", 0.0, 0.0);
            surface.restore();
        }
    }
}

/// Black-outlined white text
fn draw_outlined_text<S: Surface + ?Sized>(surface: &mut S, text: &str, x: f32, y: f32) {
    surface.set_fill_color(palette::TEXT_FILL);
    surface.set_stroke_color(palette::TEXT_OUTLINE);
    surface.set_line_width(TEXT_OUTLINE_WIDTH);
    surface.stroke_text(text, x, y);
    surface.fill_text(text, x, y);
}
