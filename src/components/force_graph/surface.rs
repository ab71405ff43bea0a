use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

/// The subset of the 2D canvas API the renderer draws with.
pub trait Surface {
	type Image;

	fn save(&self);
	fn restore(&self);
	fn translate(&self, x: f64, y: f64);
	fn scale(&self, k: f64);

	fn set_fill_style(&self, color: &str);
	fn set_stroke_style(&self, color: &str);
	fn set_line_width(&self, width: f64);
	fn set_font(&self, font: &str);
	fn set_text_align(&self, align: &str);
	fn set_text_baseline(&self, baseline: &str);

	fn begin_path(&self);
	fn close_path(&self);
	fn move_to(&self, x: f64, y: f64);
	fn line_to(&self, x: f64, y: f64);
	fn quadratic_curve_to(&self, cpx: f64, cpy: f64, x: f64, y: f64);
	fn arc(&self, x: f64, y: f64, radius: f64, start: f64, end: f64);
	fn fill(&self);
	fn stroke(&self);
	fn fill_rect(&self, x: f64, y: f64, w: f64, h: f64);
	fn stroke_rect(&self, x: f64, y: f64, w: f64, h: f64);

	fn fill_text(&self, text: &str, x: f64, y: f64);
	/// Width of `text` in the current font.
	fn measure_text(&self, text: &str) -> f64;

	fn draw_image(&self, image: &Self::Image, x: f64, y: f64, w: f64, h: f64);
}

impl Surface for CanvasRenderingContext2d {
	type Image = HtmlImageElement;

	fn save(&self) {
		CanvasRenderingContext2d::save(self);
	}

	fn restore(&self) {
		CanvasRenderingContext2d::restore(self);
	}

	fn translate(&self, x: f64, y: f64) {
		let _ = CanvasRenderingContext2d::translate(self, x, y);
	}

	fn scale(&self, k: f64) {
		let _ = CanvasRenderingContext2d::scale(self, k, k);
	}

	fn set_fill_style(&self, color: &str) {
		self.set_fill_style_str(color);
	}

	fn set_stroke_style(&self, color: &str) {
		self.set_stroke_style_str(color);
	}

	fn set_line_width(&self, width: f64) {
		CanvasRenderingContext2d::set_line_width(self, width);
	}

	fn set_font(&self, font: &str) {
		CanvasRenderingContext2d::set_font(self, font);
	}

	fn set_text_align(&self, align: &str) {
		CanvasRenderingContext2d::set_text_align(self, align);
	}

	fn set_text_baseline(&self, baseline: &str) {
		CanvasRenderingContext2d::set_text_baseline(self, baseline);
	}

	fn begin_path(&self) {
		CanvasRenderingContext2d::begin_path(self);
	}

	fn close_path(&self) {
		CanvasRenderingContext2d::close_path(self);
	}

	fn move_to(&self, x: f64, y: f64) {
		CanvasRenderingContext2d::move_to(self, x, y);
	}

	fn line_to(&self, x: f64, y: f64) {
		CanvasRenderingContext2d::line_to(self, x, y);
	}

	fn quadratic_curve_to(&self, cpx: f64, cpy: f64, x: f64, y: f64) {
		CanvasRenderingContext2d::quadratic_curve_to(self, cpx, cpy, x, y);
	}

	fn arc(&self, x: f64, y: f64, radius: f64, start: f64, end: f64) {
		let _ = CanvasRenderingContext2d::arc(self, x, y, radius, start, end);
	}

	fn fill(&self) {
		CanvasRenderingContext2d::fill(self);
	}

	fn stroke(&self) {
		CanvasRenderingContext2d::stroke(self);
	}

	fn fill_rect(&self, x: f64, y: f64, w: f64, h: f64) {
		CanvasRenderingContext2d::fill_rect(self, x, y, w, h);
	}

	fn stroke_rect(&self, x: f64, y: f64, w: f64, h: f64) {
		CanvasRenderingContext2d::stroke_rect(self, x, y, w, h);
	}

	fn fill_text(&self, text: &str, x: f64, y: f64) {
		let _ = CanvasRenderingContext2d::fill_text(self, text, x, y);
	}

	fn measure_text(&self, text: &str) -> f64 {
		CanvasRenderingContext2d::measure_text(self, text)
			.map(|m| m.width())
			.unwrap_or(0.0)
	}

	fn draw_image(&self, image: &HtmlImageElement, x: f64, y: f64, w: f64, h: f64) {
		let _ = self.draw_image_with_html_image_element_and_dw_and_dh(image, x, y, w, h);
	}
}
