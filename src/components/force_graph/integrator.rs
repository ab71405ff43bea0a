//! [`PhysicsIntegrator`] backed by the `force_graph` crate.
//!
//! The crate integrates positions and the many-body repulsion. It has no
//! per-edge rest length, centring or collision, so those terms are applied
//! here as position corrections after every step, scaled by a cooling `alpha`
//! the way d3-force does. `charge_distance_max` has no equivalent in the crate
//! and is not applied.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, ForceGraph, NodeData, SimulationParameters};
use log::debug;

use super::forces::{ForceSet, ForcesAttached, PhysicsIntegrator, Point, PositionSource};
use super::types::{GraphData, NodeId};

const NODE_MASS: f32 = 10.0;
/// Crate charge units per unit of d3-style charge strength.
const CHARGE_SCALE: f64 = 3.0;
const DEFAULT_ALPHA_DECAY: f64 = 0.0228;
const DEFAULT_ALPHA_MIN: f64 = 0.001;

#[derive(Clone, Copy, Debug)]
struct ResolvedLink {
	source: usize,
	target: usize,
	distance: f64,
	strength: f64,
}

pub struct ForceGraphIntegrator {
	graph: ForceGraph<NodeId, ()>,
	ids: Vec<NodeId>,
	slots: HashMap<NodeId, usize>,
	node_slots: HashMap<DefaultNodeIdx, usize>,
	positions: Vec<Point>,
	pinned: Vec<bool>,
	links: Vec<ResolvedLink>,
	forces: Option<ForceSet>,
	alpha: f64,
	ticks: u32,
	generation: u64,
}

impl Default for ForceGraphIntegrator {
	fn default() -> Self {
		Self {
			graph: ForceGraph::new(parameters(None)),
			ids: Vec::new(),
			slots: HashMap::new(),
			node_slots: HashMap::new(),
			positions: Vec::new(),
			pinned: Vec::new(),
			links: Vec::new(),
			forces: None,
			alpha: 0.0,
			ticks: 0,
			generation: 0,
		}
	}
}

fn parameters(forces: Option<&ForceSet>) -> SimulationParameters {
	let (charge, damping) = forces
		.map(|f| (f.charge.strength.abs() * CHARGE_SCALE, 1.0 - f.velocity_decay))
		.unwrap_or((150.0, 0.9));
	SimulationParameters {
		force_charge: charge as f32,
		force_spring: 0.05,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: damping as f32,
	}
}

/// Sunflower spiral around the origin for nodes without a known position.
fn initial_position(i: usize) -> Point {
	let radius = 10.0 * (0.5 + i as f64).sqrt();
	let angle = i as f64 * PI * (3.0 - 5f64.sqrt());
	Point::new(radius * angle.cos(), radius * angle.sin())
}

/// Unit direction from `b` to `a`, with a deterministic fallback when they coincide.
fn direction(a: Point, b: Point, salt: usize) -> (f64, f64, f64) {
	let (dx, dy) = (a.x - b.x, a.y - b.y);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist > 1e-6 {
		(dx / dist, dy / dist, dist)
	} else {
		let angle = salt as f64 * 0.618_034 * 2.0 * PI;
		(angle.cos(), angle.sin(), 0.0)
	}
}

impl ForceGraphIntegrator {
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces the node set. Retained ids keep their position; pins are released.
	pub fn load(&mut self, data: &GraphData) {
		let previous: HashMap<NodeId, Point> = self
			.ids
			.drain(..)
			.zip(self.positions.drain(..))
			.collect();

		self.slots.clear();
		for (i, node) in data.nodes().iter().enumerate() {
			let p = previous
				.get(&node.id)
				.copied()
				.unwrap_or_else(|| initial_position(i));
			self.slots.insert(node.id.clone(), i);
			self.ids.push(node.id.clone());
			self.positions.push(p);
		}
		self.pinned = vec![false; self.ids.len()];
		self.links.clear();
		self.forces = None;
		self.rebuild_graph();
		debug!("Integrator loaded {} nodes", self.ids.len());
	}

	fn rebuild_graph(&mut self) {
		let mut graph = ForceGraph::new(parameters(self.forces.as_ref()));
		self.node_slots.clear();
		for (slot, id) in self.ids.iter().enumerate() {
			let p = self.positions[slot];
			let idx = graph.add_node(NodeData {
				x: p.x as f32,
				y: p.y as f32,
				mass: NODE_MASS,
				is_anchor: self.pinned[slot],
				user_data: id.clone(),
			});
			self.node_slots.insert(idx, slot);
		}
		self.graph = graph;
	}

	fn pull_positions(&mut self) {
		let (slots, positions) = (&self.node_slots, &mut self.positions);
		self.graph.visit_nodes(|node| {
			if let Some(&slot) = slots.get(&node.index()) {
				positions[slot] = Point::new(node.x() as f64, node.y() as f64);
			}
		});
	}

	fn push_positions(&mut self) {
		let (slots, positions) = (&self.node_slots, &self.positions);
		self.graph.visit_nodes_mut(|node| {
			if let Some(&slot) = slots.get(&node.index()) {
				node.data.x = positions[slot].x as f32;
				node.data.y = positions[slot].y as f32;
			}
		});
	}

	fn set_pinned(&mut self, slot: usize, at: Option<Point>) {
		let pinned = at.is_some();
		self.pinned[slot] = pinned;
		if let Some(at) = at {
			self.positions[slot] = at;
		}
		let (node_slots, p) = (&self.node_slots, self.positions[slot]);
		self.graph.visit_nodes_mut(|node| {
			if node_slots.get(&node.index()) == Some(&slot) {
				node.data.x = p.x as f32;
				node.data.y = p.y as f32;
				node.data.is_anchor = pinned;
			}
		});
	}

	fn nudge(&mut self, slot: usize, dx: f64, dy: f64) {
		if !self.pinned[slot] {
			self.positions[slot].x += dx;
			self.positions[slot].y += dy;
		}
	}

	fn apply_links(&mut self) {
		for i in 0..self.links.len() {
			let link = self.links[i];
			if link.strength <= 0.0 || link.source == link.target {
				continue;
			}
			let (ux, uy, dist) = direction(
				self.positions[link.target],
				self.positions[link.source],
				link.source + link.target,
			);
			let limit = dist.max(1.0);
			let k = ((dist - link.distance) * self.alpha * link.strength).clamp(-limit, limit) * 0.5;
			self.nudge(link.source, ux * k, uy * k);
			self.nudge(link.target, -ux * k, -uy * k);
		}
	}

	fn apply_collisions(&mut self, radius: f64, strength: f64) {
		let min_dist = radius * 2.0;
		let n = self.positions.len();
		for i in 0..n {
			for j in (i + 1)..n {
				let (ux, uy, dist) = direction(self.positions[i], self.positions[j], i * 31 + j);
				if dist >= min_dist {
					continue;
				}
				let push = (min_dist - dist) * strength * 0.5;
				self.nudge(i, ux * push, uy * push);
				self.nudge(j, -ux * push, -uy * push);
			}
		}
	}

	fn apply_centering(&mut self, strength: f64) {
		let n = self.positions.len();
		if n == 0 {
			return;
		}
		let (sx, sy) = self
			.positions
			.iter()
			.fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
		let (mx, my) = (sx / n as f64, sy / n as f64);
		for slot in 0..n {
			self.nudge(slot, -mx * strength, -my * strength);
		}
	}
}

impl PositionSource for ForceGraphIntegrator {
	fn position_of(&self, id: &NodeId) -> Option<Point> {
		self.slots.get(id).map(|&slot| self.positions[slot])
	}
}

impl PhysicsIntegrator for ForceGraphIntegrator {
	fn replace_forces(&mut self, forces: ForceSet) -> ForcesAttached {
		self.links = forces
			.links
			.iter()
			.filter_map(|link| {
				Some(ResolvedLink {
					source: *self.slots.get(&link.source)?,
					target: *self.slots.get(&link.target)?,
					distance: link.distance,
					strength: link.strength,
				})
			})
			.collect();
		self.forces = Some(forces);
		self.rebuild_graph();
		self.generation += 1;
		ForcesAttached {
			generation: self.generation,
		}
	}

	fn reheat(&mut self) {
		self.alpha = 1.0;
		self.ticks = 0;
	}

	fn tick(&mut self, dt: f32) {
		if !self.is_running() {
			return;
		}
		let (decay, collide, center) = match &self.forces {
			Some(f) => (f.alpha_decay, Some(f.collide), f.center.strength),
			None => (DEFAULT_ALPHA_DECAY, None, 0.0),
		};

		self.graph.update(dt);
		self.pull_positions();
		self.apply_links();
		if let Some(collide) = collide {
			self.apply_collisions(collide.radius, collide.strength);
		}
		self.apply_centering(center);
		self.push_positions();

		self.ticks += 1;
		self.alpha -= self.alpha * decay;
	}

	fn is_running(&self) -> bool {
		let (alpha_min, cooldown) = self
			.forces
			.as_ref()
			.map(|f| (f.alpha_min, f.cooldown_ticks))
			.unwrap_or((DEFAULT_ALPHA_MIN, u32::MAX));
		self.alpha >= alpha_min && self.ticks < cooldown
	}

	fn drag_node(&mut self, id: &NodeId, at: Point) {
		if let Some(&slot) = self.slots.get(id) {
			self.set_pinned(slot, Some(at));
		}
	}

	fn release_node(&mut self, id: &NodeId) {
		if let Some(&slot) = self.slots.get(id) {
			self.set_pinned(slot, None);
		}
	}

	fn visit_positions(&self, visit: &mut dyn FnMut(&NodeId, Point)) {
		for (id, p) in self.ids.iter().zip(&self.positions) {
			visit(id, *p);
		}
	}
}
