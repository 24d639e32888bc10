//! Browser canvas backend
//!
//! Fallible context calls only fail on invalid arguments; failures are logged
//! and the frame continues.

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::surface::{Color, Surface, TextAlign};

impl Surface for CanvasRenderingContext2d {
    fn save(&mut self) {
        CanvasRenderingContext2d::save(self);
    }

    fn restore(&mut self) {
        CanvasRenderingContext2d::restore(self);
    }

    fn translate(&mut self, x: f32, y: f32) {
        log_failure(CanvasRenderingContext2d::translate(self, x as f64, y as f64));
    }

    fn scale(&mut self, x: f32, y: f32) {
        log_failure(CanvasRenderingContext2d::scale(self, x as f64, y as f64));
    }

    fn set_fill_color(&mut self, color: Color) {
        self.set_fill_style_str(&color.to_css());
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.set_stroke_style_str(&color.to_css());
    }

    fn set_line_width(&mut self, width: f32) {
        CanvasRenderingContext2d::set_line_width(self, width as f64);
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        CanvasRenderingContext2d::set_global_alpha(self, alpha.clamp(0.0, 1.0) as f64);
    }

    fn set_font(&mut self, font: &str) {
        CanvasRenderingContext2d::set_font(self, font);
    }

    fn set_text_align(&mut self, align: TextAlign) {
        CanvasRenderingContext2d::set_text_align(self, align.as_str());
        self.set_text_baseline("middle");
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        CanvasRenderingContext2d::fill_rect(self, x as f64, y as f64, width as f64, height as f64);
    }

    fn clip_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.begin_path();
        self.rect(x as f64, y as f64, width as f64, height as f64);
        self.clip();
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        log_failure(CanvasRenderingContext2d::fill_text(self, text, x as f64, y as f64));
    }

    fn stroke_text(&mut self, text: &str, x: f32, y: f32) {
        log_failure(CanvasRenderingContext2d::stroke_text(self, text, x as f64, y as f64));
    }
}

fn log_failure(result: Result<(), JsValue>) {
    if let Err(e) = result {
        log::warn!("Canvas call failed: {:?}", e);
    }
}
