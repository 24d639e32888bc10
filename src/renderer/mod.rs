//! Canvas 2D rendering module
//!
//! The renderer is a pure reader of game state, drawing through the
//! [`Surface`] abstraction.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod draw;
pub mod palette;
pub mod surface;

pub use draw::Renderer;
pub use surface::{Color, CommandList, DrawCommand, Surface, TextAlign};
