use log::{debug, info};

use super::camera::Camera;
use super::config::GraphConfig;
use super::forces::{LayoutForceConfigurator, PhysicsIntegrator, Point};
use super::images::{ImageCache, ImageFetcher};
use super::integrator::ForceGraphIntegrator;
use super::render::{Frame, RenderMode, card_size, marker_radius};
use super::selection::{SelectionController, SelectionSummary};
use super::types::{GraphData, NodeId};

/// Minimum pick radius around a node centre, in screen pixels once zoomed in.
pub const HIT_RADIUS: f64 = 12.0;
/// Screen pixels a press may travel and still count as a click.
pub const CLICK_TOLERANCE: f64 = 3.0;

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<NodeId>,
	pub start_x: f64,
	pub start_y: f64,
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub last_x: f64,
	pub last_y: f64,
}

pub struct ForceGraphState<F: ImageFetcher> {
	pub data: GraphData,
	pub config: GraphConfig,
	pub integrator: ForceGraphIntegrator,
	pub forces: LayoutForceConfigurator,
	pub selection: SelectionController,
	pub camera: Camera,
	pub images: ImageCache<F>,
	pub drag: DragState,
	pub pan: PanState,
	pub animation_running: bool,
}

impl<F: ImageFetcher> ForceGraphState<F> {
	pub fn new(config: GraphConfig, images: ImageCache<F>, width: f64, height: f64) -> Self {
		Self {
			data: GraphData::default(),
			config,
			integrator: ForceGraphIntegrator::new(),
			forces: LayoutForceConfigurator::default(),
			selection: SelectionController::default(),
			camera: Camera::new(width, height),
			images,
			drag: DragState::default(),
			pan: PanState::default(),
			animation_running: true,
		}
	}

	/// Swaps in a new dataset and rebuilds forces for it.
	pub fn load(&mut self, data: GraphData) {
		info!(
			"Loading graph: {} nodes, {} edges, max rank {}",
			data.nodes().len(),
			data.links().len(),
			data.max_rank()
		);
		self.selection.retain(&data);
		self.integrator.load(&data);
		self.data = data;
		if self.drag.node.as_ref().is_some_and(|id| !self.data.contains(id)) {
			self.drag = DragState::default();
		}
		self.rebuild_forces();
	}

	/// Applies new settings. Returns whether forces were rebuilt for a new metric.
	pub fn set_config(&mut self, config: GraphConfig) -> bool {
		let metric_changed = self
			.forces
			.current()
			.is_some_and(|f| f.metric != config.metric);
		self.config = config;
		if metric_changed {
			self.rebuild_forces();
		}
		metric_changed
	}

	fn rebuild_forces(&mut self) {
		let attached = self
			.forces
			.rebuild(&self.data, self.config.metric, &mut self.integrator);
		debug!("Layout restarted (forces generation {})", attached.generation);
	}

	pub fn tick(&mut self, dt: f64) {
		self.integrator.tick(dt as f32);
		self.camera.update(dt);
	}

	/// Whether another frame would change anything on screen.
	pub fn is_active(&self) -> bool {
		self.integrator.is_running() || self.camera.is_animating() || self.drag.moved
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.camera.resize(width, height);
	}

	pub fn frame(&self) -> Frame<'_, F> {
		Frame {
			graph: &self.data,
			positions: &self.integrator,
			selection: &self.selection,
			images: &self.images,
			scale: self.camera.scale(),
			size_by_popularity: self.config.size_by_popularity,
			selected_tribe: self.config.selected_tribe.as_deref(),
		}
	}

	fn hit_radius(&self, id: &NodeId) -> f64 {
		match RenderMode::from_scale(self.camera.scale()) {
			RenderMode::Overview => {
				let rank = self.data.node(id).map_or(1, |n| n.rank);
				marker_radius(rank, self.data.max_rank(), self.config.size_by_popularity)
					.max(HIT_RADIUS / self.camera.scale().max(1.0))
			}
			RenderMode::Detail => card_size().1 / 2.0,
		}
	}

	/// The node nearest to the screen point, if it lies within its pick radius.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<NodeId> {
		let world = self.camera.screen_to_world(sx, sy);
		let mut best: Option<(NodeId, f64)> = None;
		self.integrator.visit_positions(&mut |id, p| {
			let (dx, dy) = (p.x - world.x, p.y - world.y);
			let dist = (dx * dx + dy * dy).sqrt();
			if dist < self.hit_radius(id) && best.as_ref().is_none_or(|(_, d)| dist < *d) {
				best = Some((id.clone(), dist));
			}
		});
		best.map(|(id, _)| id)
	}

	/// Toggles selection of `id` and returns the new summary (`None` when idle).
	pub fn click_node(&mut self, id: &NodeId) -> Option<SelectionSummary> {
		self.selection.click(
			id,
			&self.data,
			self.config.metric,
			&self.integrator,
			&mut self.camera,
		);
		self.selection.summary(&self.data)
	}

	/// Selects `id` without toggling it off. Ids outside the current dataset
	/// leave the selection alone.
	pub fn select_node(&mut self, id: &NodeId) -> Option<SelectionSummary> {
		if self.data.contains(id) && self.selection.selected() != Some(id) {
			return self.click_node(id);
		}
		self.selection_summary()
	}

	pub fn selection_summary(&self) -> Option<SelectionSummary> {
		self.selection.summary(&self.data)
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		match self.node_at_position(sx, sy) {
			Some(node) => {
				self.drag = DragState {
					node: Some(node),
					start_x: sx,
					start_y: sy,
					moved: false,
				};
			}
			None => {
				self.pan = PanState {
					active: true,
					last_x: sx,
					last_y: sy,
				};
			}
		}
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if let Some(node) = self.drag.node.clone() {
			let (dx, dy) = (sx - self.drag.start_x, sy - self.drag.start_y);
			if !self.drag.moved && (dx * dx + dy * dy).sqrt() < CLICK_TOLERANCE {
				return;
			}
			if !self.drag.moved {
				self.drag.moved = true;
				self.integrator.reheat();
			}
			let at: Point = self.camera.screen_to_world(sx, sy);
			self.integrator.drag_node(&node, at);
		} else if self.pan.active {
			self.camera
				.pan_by(sx - self.pan.last_x, sy - self.pan.last_y);
			self.pan.last_x = sx;
			self.pan.last_y = sy;
		}
	}

	/// Ends a press. A dragged node is released where it was dropped; a click on a
	/// node returns the new selection summary.
	pub fn pointer_up(&mut self) -> Option<Option<SelectionSummary>> {
		self.pan.active = false;
		let drag = std::mem::take(&mut self.drag);
		let node = drag.node?;
		if drag.moved {
			debug!("Dropped {node}");
			self.integrator.release_node(&node);
			return None;
		}
		Some(self.click_node(&node))
	}
}
