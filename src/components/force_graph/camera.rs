//! Pan/zoom view over the world plane with animated navigation.
//!
//! The camera keeps the world point shown at the middle of the canvas plus a
//! scale `k`. Animated moves ease towards their target; any direct user
//! pan or zoom cancels them.

use super::forces::Point;
use super::selection::Navigator;

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Screen = world * k + (x, y).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

/// Timing of the pan-then-zoom move issued when a node is selected.
#[derive(Clone, Debug, PartialEq)]
pub struct NavigationConstants {
	pub pan_duration: f64,
	/// Delay between starting the pan and starting the zoom.
	pub settle_delay: f64,
	pub zoom_scale: f64,
	pub zoom_duration: f64,
}

impl Default for NavigationConstants {
	fn default() -> Self {
		Self {
			pan_duration: 1.0,
			settle_delay: 0.05,
			zoom_scale: 4.0,
			zoom_duration: 1.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
struct Tween<T> {
	from: T,
	to: T,
	elapsed: f64,
	duration: f64,
}

impl<T: Copy> Tween<T> {
	fn new(from: T, to: T, duration: f64) -> Self {
		Self {
			from,
			to,
			elapsed: 0.0,
			duration,
		}
	}

	/// Advances and returns the eased progress in `[0, 1]`.
	fn advance(&mut self, dt: f64) -> f64 {
		self.elapsed += dt;
		if self.duration <= 0.0 {
			1.0
		} else {
			ease_out_cubic((self.elapsed / self.duration).min(1.0))
		}
	}

	fn done(&self) -> bool {
		self.elapsed >= self.duration
	}
}

#[derive(Clone, Debug, PartialEq)]
struct PendingZoom {
	remaining: f64,
	scale: f64,
	duration: f64,
}

#[derive(Clone, Debug)]
pub struct Camera {
	center: Point,
	k: f64,
	width: f64,
	height: f64,
	pan: Option<Tween<Point>>,
	zoom: Option<Tween<f64>>,
	pending_zoom: Option<PendingZoom>,
	navigation: NavigationConstants,
}

impl Camera {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			center: Point::default(),
			k: 1.0,
			width,
			height,
			pan: None,
			zoom: None,
			pending_zoom: None,
			navigation: NavigationConstants::default(),
		}
	}

	pub fn scale(&self) -> f64 {
		self.k
	}

	pub fn center(&self) -> Point {
		self.center
	}

	pub fn width(&self) -> f64 {
		self.width
	}

	pub fn height(&self) -> f64 {
		self.height
	}

	pub fn transform(&self) -> ViewTransform {
		ViewTransform {
			x: self.width / 2.0 - self.center.x * self.k,
			y: self.height / 2.0 - self.center.y * self.k,
			k: self.k,
		}
	}

	pub fn screen_to_world(&self, sx: f64, sy: f64) -> Point {
		let t = self.transform();
		Point::new((sx - t.x) / t.k, (sy - t.y) / t.k)
	}

	#[cfg(test)]
	pub fn world_to_screen(&self, p: Point) -> (f64, f64) {
		let t = self.transform();
		(p.x * t.k + t.x, p.y * t.k + t.y)
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	pub fn is_animating(&self) -> bool {
		self.pan.is_some() || self.zoom.is_some() || self.pending_zoom.is_some()
	}

	fn cancel_animations(&mut self) {
		self.pan = None;
		self.zoom = None;
		self.pending_zoom = None;
	}

	/// Moves the view by a screen-space delta.
	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.cancel_animations();
		self.center.x -= dx / self.k;
		self.center.y -= dy / self.k;
	}

	/// Multiplies the scale by `factor`, keeping the world point under the cursor fixed.
	pub fn zoom_at(&mut self, factor: f64, sx: f64, sy: f64) {
		self.cancel_animations();
		let anchor = self.screen_to_world(sx, sy);
		self.k = (self.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		self.center.x = anchor.x - (sx - self.width / 2.0) / self.k;
		self.center.y = anchor.y - (sy - self.height / 2.0) / self.k;
	}

	pub fn center_at(&mut self, target: Point, duration: f64) {
		self.pan = Some(Tween::new(self.center, target, duration));
	}

	pub fn zoom_to(&mut self, k: f64, duration: f64) {
		self.zoom = Some(Tween::new(self.k, k.clamp(MIN_ZOOM, MAX_ZOOM), duration));
	}

	/// Advances animations by `dt` seconds.
	pub fn update(&mut self, dt: f64) {
		if let Some(pending) = &mut self.pending_zoom {
			pending.remaining -= dt;
			if pending.remaining <= 0.0 {
				let (scale, duration) = (pending.scale, pending.duration);
				self.pending_zoom = None;
				self.zoom_to(scale, duration);
			}
		}

		if let Some(pan) = &mut self.pan {
			let t = pan.advance(dt);
			self.center = Point::new(
				pan.from.x + (pan.to.x - pan.from.x) * t,
				pan.from.y + (pan.to.y - pan.from.y) * t,
			);
			if pan.done() {
				self.center = pan.to;
				self.pan = None;
			}
		}

		if let Some(zoom) = &mut self.zoom {
			let t = zoom.advance(dt);
			self.k = zoom.from + (zoom.to - zoom.from) * t;
			if zoom.done() {
				self.k = zoom.to;
				self.zoom = None;
			}
		}
	}
}

impl Navigator for Camera {
	/// Pans to `target`, then zooms in once the settle delay has passed.
	/// A newer call replaces any move still in flight.
	fn navigate_to(&mut self, target: Point) {
		self.center_at(target, self.navigation.pan_duration);
		self.zoom = None;
		self.pending_zoom = Some(PendingZoom {
			remaining: self.navigation.settle_delay,
			scale: self.navigation.zoom_scale,
			duration: self.navigation.zoom_duration,
		});
	}
}
