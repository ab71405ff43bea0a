//! Word-wrapped node labels, one rounded background per line.

use super::render::{CARD_ASPECT, CARD_SCALE, RenderMode};
use super::surface::Surface;

pub const BASE_FONT_SIZE: f64 = 12.0;
pub const MAX_FONT_SIZE: f64 = 16.0;
pub const LINE_HEIGHT: f64 = 1.2;
pub const LABEL_PADDING: f64 = 2.0;
pub const MAX_LABEL_WIDTH: f64 = 100.0;
pub const CORNER_RADIUS: f64 = 3.0;
const BACKGROUND: &str = "rgba(255, 255, 255, 0.85)";
const TEXT: &str = "#000";

/// Greedy wrap: each word joins the current line while the result measures
/// under `max_width`, otherwise it starts a new line.
pub fn wrap_label(text: &str, max_width: f64, measure: impl Fn(&str) -> f64) -> Vec<String> {
	let mut words = text.split_whitespace();
	let Some(first) = words.next() else {
		return Vec::new();
	};
	let mut lines = Vec::new();
	let mut current = first.to_owned();
	for word in words {
		let candidate = format!("{current} {word}");
		if measure(&candidate) < max_width {
			current = candidate;
		} else {
			lines.push(std::mem::replace(&mut current, word.to_owned()));
		}
	}
	lines.push(current);
	lines
}

pub fn font_size(scale: f64) -> f64 {
	(BASE_FONT_SIZE / scale).min(MAX_FONT_SIZE)
}

/// Vertical centre of the first label line below a marker of `size` at `y`.
pub fn label_y(mode: RenderMode, y: f64, size: f64, font_size: f64) -> f64 {
	match mode {
		RenderMode::Overview => y + size + font_size / 2.0,
		RenderMode::Detail => {
			let card_height = size * CARD_SCALE / CARD_ASPECT;
			y + card_height / 2.0 + font_size / 2.0
		}
	}
}

fn round_rect<S: Surface + ?Sized>(surface: &S, x: f64, y: f64, w: f64, h: f64, r: f64) {
	surface.begin_path();
	surface.move_to(x + r, y);
	surface.line_to(x + w - r, y);
	surface.quadratic_curve_to(x + w, y, x + w, y + r);
	surface.line_to(x + w, y + h - r);
	surface.quadratic_curve_to(x + w, y + h, x + w - r, y + h);
	surface.line_to(x + r, y + h);
	surface.quadratic_curve_to(x, y + h, x, y + h - r);
	surface.line_to(x, y + r);
	surface.quadratic_curve_to(x, y, x + r, y);
	surface.close_path();
	surface.fill();
}

/// Draws `text` centred under a marker of `size` at (`x`, `y`).
pub fn draw_label<S: Surface + ?Sized>(
	surface: &S,
	text: &str,
	x: f64,
	y: f64,
	size: f64,
	scale: f64,
	mode: RenderMode,
) {
	let font_size = font_size(scale);
	surface.set_font(&format!("{font_size}px Sans-Serif"));
	let lines = wrap_label(text, MAX_LABEL_WIDTH / scale, |s| surface.measure_text(s));
	let (line_height, padding) = (font_size * LINE_HEIGHT, LABEL_PADDING / scale);
	let top = label_y(mode, y, size, font_size);

	surface.set_text_align("center");
	surface.set_text_baseline("middle");
	for (i, line) in lines.iter().enumerate() {
		let line_y = top + i as f64 * line_height;
		let bg_width = surface.measure_text(line) + padding * 2.0;
		let bg_height = font_size + padding * 2.0;

		surface.set_fill_style(BACKGROUND);
		round_rect(
			surface,
			x - bg_width / 2.0,
			line_y - bg_height / 2.0,
			bg_width,
			bg_height,
			CORNER_RADIUS / scale,
		);

		surface.set_fill_style(TEXT);
		surface.fill_text(line, x, line_y);
	}
}
