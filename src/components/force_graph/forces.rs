//! Turns a dataset and metric into the named force terms of the physics
//! integrator.
//!
//! Only each node's strongest few edges ("top connections") pull; every other
//! edge is kept in the link term at a fixed far distance with zero strength.

use std::collections::HashSet;

use log::{debug, info};

use super::neighbors::rank_neighbors;
use super::types::{EdgeIdx, GraphData, NodeId};
use super::weight::{WeightMetric, WeightShaping, resolve};

/// Physics configuration. Values are independent of any single edge.
#[derive(Clone, Debug, PartialEq)]
pub struct ForceConstants {
	pub charge_strength: f64,
	pub charge_distance_max: f64,
	pub link_min_distance: f64,
	pub link_max_distance: f64,
	/// Rest distance of edges that are not a top connection.
	pub detached_distance: f64,
	pub strength_multiplier: f64,
	/// Weights below this get zero strength.
	pub min_weight: f64,
	/// Neighbours per node that take part in attraction.
	pub top_connections: usize,
	pub center_strength: f64,
	pub collide_radius: f64,
	pub collide_strength: f64,
	pub velocity_decay: f64,
	pub alpha_decay: f64,
	pub alpha_min: f64,
	pub cooldown_ticks: u32,
	pub shaping: WeightShaping,
}

impl Default for ForceConstants {
	fn default() -> Self {
		Self {
			charge_strength: -50.0,
			charge_distance_max: 400.0,
			link_min_distance: 30.0,
			link_max_distance: 300.0,
			detached_distance: 400.0,
			strength_multiplier: 3.0,
			min_weight: 0.0,
			top_connections: 4,
			center_strength: 0.03,
			collide_radius: 10.0,
			collide_strength: 0.1,
			velocity_decay: 0.3,
			alpha_decay: 0.01,
			alpha_min: 0.001,
			cooldown_ticks: 1000,
			shaping: WeightShaping::Identity,
		}
	}
}

impl ForceConstants {
	/// Quadratic easing: strong links sit near `link_min_distance`, weak ones
	/// approach `link_max_distance + link_min_distance`.
	pub fn link_distance(&self, weight: f64) -> f64 {
		self.link_max_distance * (1.0 - weight).powi(2) + self.link_min_distance
	}

	pub fn link_strength(&self, weight: f64) -> f64 {
		if weight < self.min_weight {
			0.0
		} else {
			weight * self.strength_multiplier
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ManyBody {
	pub strength: f64,
	pub distance_max: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Centering {
	pub strength: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collision {
	pub radius: f64,
	pub strength: f64,
}

/// Per-edge parameters of the link term.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkForce {
	pub edge: EdgeIdx,
	pub source: NodeId,
	pub target: NodeId,
	pub top_connection: bool,
	pub distance: f64,
	pub strength: f64,
}

/// The complete set of named forces; always replaced as a whole.
#[derive(Clone, Debug, PartialEq)]
pub struct ForceSet {
	pub metric: WeightMetric,
	pub charge: ManyBody,
	pub links: Vec<LinkForce>,
	pub center: Centering,
	pub collide: Collision,
	pub velocity_decay: f64,
	pub alpha_decay: f64,
	pub alpha_min: f64,
	pub cooldown_ticks: u32,
}

/// Fired by an integrator once a [`ForceSet`] is fully attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use = "the simulation only restarts when the attachment is acknowledged"]
pub struct ForcesAttached {
	pub generation: u64,
}

/// 2D world-space point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Read access to integrator-owned node positions.
pub trait PositionSource {
	fn position_of(&self, id: &NodeId) -> Option<Point>;
}

/// The external simulation that advances node positions.
pub trait PhysicsIntegrator: PositionSource {
	/// Tears down every named force and attaches `forces` in one step.
	fn replace_forces(&mut self, forces: ForceSet) -> ForcesAttached;

	/// Restarts the cooling schedule.
	fn reheat(&mut self);

	fn tick(&mut self, dt: f32);

	fn is_running(&self) -> bool;

	/// Pins `id` at `at` until it is released or the dataset reloads.
	fn drag_node(&mut self, id: &NodeId, at: Point);

	/// Hands a dragged node back to the simulation where it was dropped.
	fn release_node(&mut self, id: &NodeId);

	fn visit_positions(&self, visit: &mut dyn FnMut(&NodeId, Point));
}

/// Edges that are among the `top_connections` strongest for at least one endpoint.
pub fn top_connections(graph: &GraphData, metric: WeightMetric, limit: usize) -> HashSet<EdgeIdx> {
	graph
		.nodes()
		.iter()
		.flat_map(|node| rank_neighbors(graph, &node.id, metric, limit))
		.map(|entry| entry.edge)
		.collect()
}

/// Derives the full force set. Pure: the same inputs give the same set.
pub fn configure(graph: &GraphData, metric: WeightMetric, constants: &ForceConstants) -> ForceSet {
	let top = top_connections(graph, metric, constants.top_connections);

	let links = graph
		.links()
		.iter()
		.enumerate()
		.filter(|(_, link)| graph.contains(&link.source) && graph.contains(&link.target))
		.map(|(i, link)| {
			let edge = EdgeIdx(i);
			let top_connection = top.contains(&edge);
			let (distance, strength) = if top_connection {
				let weight = constants.shaping.apply(resolve(link, metric));
				(constants.link_distance(weight), constants.link_strength(weight))
			} else {
				(constants.detached_distance, 0.0)
			};
			LinkForce {
				edge,
				source: link.source.clone(),
				target: link.target.clone(),
				top_connection,
				distance,
				strength,
			}
		})
		.collect();

	ForceSet {
		metric,
		charge: ManyBody {
			strength: constants.charge_strength,
			distance_max: constants.charge_distance_max,
		},
		links,
		center: Centering {
			strength: constants.center_strength,
		},
		collide: Collision {
			radius: constants.collide_radius,
			strength: constants.collide_strength,
		},
		velocity_decay: constants.velocity_decay,
		alpha_decay: constants.alpha_decay,
		alpha_min: constants.alpha_min,
		cooldown_ticks: constants.cooldown_ticks,
	}
}

/// Keeps the integrator's forces in sync with the active metric and dataset.
#[derive(Clone, Debug, Default)]
pub struct LayoutForceConfigurator {
	constants: ForceConstants,
	current: Option<ForceSet>,
}

impl LayoutForceConfigurator {
	/// The set most recently handed to the integrator.
	pub fn current(&self) -> Option<&ForceSet> {
		self.current.as_ref()
	}

	/// Rebuilds every force for `graph` under `metric`, attaches them, then reheats.
	pub fn rebuild<I: PhysicsIntegrator + ?Sized>(
		&mut self,
		graph: &GraphData,
		metric: WeightMetric,
		integrator: &mut I,
	) -> ForcesAttached {
		if self.current.as_ref().is_some_and(|f| f.metric != metric) {
			info!("Weight metric changed to {metric}");
		}
		let forces = configure(graph, metric, &self.constants);
		debug!(
			"Rebuilt forces: {} links, {} top connections",
			forces.links.len(),
			forces.links.iter().filter(|l| l.top_connection).count()
		);
		self.current = Some(forces.clone());
		let attached = integrator.replace_forces(forces);
		Self::on_forces_attached(attached, integrator)
	}

	fn on_forces_attached<I: PhysicsIntegrator + ?Sized>(
		attached: ForcesAttached,
		integrator: &mut I,
	) -> ForcesAttached {
		debug!("Forces attached (generation {})", attached.generation);
		integrator.reheat();
		attached
	}
}

#[cfg(test)]
pub(crate) mod testing {
	use std::collections::HashMap;

	use super::*;

	/// Records calls in order; positions are set by hand.
	#[derive(Default)]
	pub struct RecordingIntegrator {
		pub calls: Vec<&'static str>,
		pub forces: Option<ForceSet>,
		pub positions: HashMap<NodeId, Point>,
		generation: u64,
	}

	impl PositionSource for RecordingIntegrator {
		fn position_of(&self, id: &NodeId) -> Option<Point> {
			self.positions.get(id).copied()
		}
	}

	impl PhysicsIntegrator for RecordingIntegrator {
		fn replace_forces(&mut self, forces: ForceSet) -> ForcesAttached {
			self.calls.push("replace");
			self.forces = Some(forces);
			self.generation += 1;
			ForcesAttached {
				generation: self.generation,
			}
		}

		fn reheat(&mut self) {
			self.calls.push("reheat");
		}

		fn tick(&mut self, _dt: f32) {
			self.calls.push("tick");
		}

		fn is_running(&self) -> bool {
			true
		}

		fn drag_node(&mut self, id: &NodeId, at: Point) {
			self.positions.insert(id.clone(), at);
		}

		fn release_node(&mut self, _id: &NodeId) {
			self.calls.push("release");
		}

		fn visit_positions(&self, visit: &mut dyn FnMut(&NodeId, Point)) {
			for (id, p) in &self.positions {
				visit(id, *p);
			}
		}
	}
}
