//! Colors for game elements

use super::surface::Color;

pub const VIEWPORT: Color = Color::hex(0x000000);
pub const BACKGROUND: Color = Color::hex(0x696a6a);
pub const BOARD: Color = Color::hex(0x3f3f74);
pub const RAIL: Color = Color::hex(0x222034);
pub const RAIL_HOVER: Color = Color {
    r: 255,
    g: 255,
    b: 255,
    a: 0.1,
};
pub const DROP: Color = Color::hex(0xffffff);
pub const GOOD_FLASH: Color = Color::hex(0x99e550);
pub const LEVEL_UP_FLASH: Color = Color::hex(0xffffff);
pub const GAME_OVER: Color = Color::hex(0x000000);

// Progress bar
pub const BAR_TRACK: Color = Color::hex(0x323c39);
pub const BAR_FILL: Color = Color::hex(0xfbf236);
/// Meter rising: gap between the lagging bar and the value
pub const BAR_GAIN: Color = Color::hex(0x37946e);
/// Meter falling: gap between the value and the lagging bar
pub const BAR_LOSS: Color = Color::hex(0xac3232);

pub const TEXT_FILL: Color = Color::hex(0xffffff);
pub const TEXT_OUTLINE: Color = Color::hex(0x000000);
