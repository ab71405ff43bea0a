//! Click-driven selection: `Idle` or one selected node with its highlighted
//! edges. Every transition replaces the whole [`Selection`] value.

use std::collections::HashMap;

use log::debug;

use super::forces::{Point, PositionSource};
use super::neighbors::{NeighborEntry, rank_neighbors};
use super::types::{EdgeIdx, GraphData, NodeId};
use super::weight::WeightMetric;

/// Receives the fire-and-forget "look at this node" side effect.
pub trait Navigator {
	fn navigate_to(&mut self, target: Point);
}

#[derive(Clone, Debug, PartialEq)]
pub struct SelectionConstants {
	/// Neighbours shown when a node is selected.
	pub highlight_limit: usize,
	pub max_width: f64,
	pub min_width: f64,
}

impl Default for SelectionConstants {
	fn default() -> Self {
		Self {
			highlight_limit: 20,
			max_width: 4.0,
			min_width: 0.2,
		}
	}
}

impl SelectionConstants {
	/// Width for the neighbour at `rank` (0-based), decaying linearly over the
	/// `highlight_limit` slots.
	pub fn width_at(&self, rank: usize) -> f64 {
		if self.highlight_limit <= 1 {
			return self.max_width;
		}
		let t = rank.min(self.highlight_limit - 1) as f64 / (self.highlight_limit - 1) as f64;
		self.max_width - (self.max_width - self.min_width) * t
	}
}

/// Edge → display width of the currently highlighted edges.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HighlightSet(HashMap<EdgeIdx, f64>);

impl HighlightSet {
	pub fn width(&self, edge: EdgeIdx) -> Option<f64> {
		self.0.get(&edge).copied()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct SelectedNode {
	pub node: NodeId,
	pub neighbors: Vec<NeighborEntry>,
	pub highlight: HighlightSet,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Selection {
	#[default]
	Idle,
	NodeSelected(SelectedNode),
}

/// A selected node's ranked neighbours, flattened for a detail panel.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionSummary {
	pub node: NodeId,
	pub name: String,
	pub neighbors: Vec<NeighborSummary>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NeighborSummary {
	pub node: NodeId,
	pub name: String,
	pub weight: f64,
}

#[derive(Clone, Debug, Default)]
pub struct SelectionController {
	constants: SelectionConstants,
	selection: Selection,
}

impl SelectionController {
	pub fn selection(&self) -> &Selection {
		&self.selection
	}

	pub fn selected(&self) -> Option<&NodeId> {
		match &self.selection {
			Selection::Idle => None,
			Selection::NodeSelected(s) => Some(&s.node),
		}
	}

	pub fn highlight_width(&self, edge: EdgeIdx) -> Option<f64> {
		match &self.selection {
			Selection::Idle => None,
			Selection::NodeSelected(s) => s.highlight.width(edge),
		}
	}

	/// Toggles `id`: deselects when it is already selected, selects it otherwise.
	pub fn click(
		&mut self,
		id: &NodeId,
		graph: &GraphData,
		metric: WeightMetric,
		positions: &dyn PositionSource,
		navigator: &mut dyn Navigator,
	) -> &Selection {
		if self.selected() == Some(id) {
			debug!("Deselected {id}");
			self.selection = Selection::Idle;
			return &self.selection;
		}

		let neighbors = rank_neighbors(graph, id, metric, self.constants.highlight_limit);
		let highlight = HighlightSet(
			neighbors
				.iter()
				.enumerate()
				.map(|(rank, entry)| (entry.edge, self.constants.width_at(rank)))
				.collect(),
		);
		debug!("Selected {id} with {} highlighted edges", highlight.len());
		self.selection = Selection::NodeSelected(SelectedNode {
			node: id.clone(),
			neighbors,
			highlight,
		});

		match positions.position_of(id) {
			Some(p) if p.x.is_finite() && p.y.is_finite() => navigator.navigate_to(p),
			_ => debug!("No position for {id} yet, skipping navigation"),
		}
		&self.selection
	}

	pub fn clear(&mut self) {
		self.selection = Selection::Idle;
	}

	/// Drops the selection when `graph` no longer contains the selected node.
	pub fn retain(&mut self, graph: &GraphData) {
		if self.selected().is_some_and(|id| !graph.contains(id)) {
			self.clear();
		}
	}

	pub fn summary(&self, graph: &GraphData) -> Option<SelectionSummary> {
		let Selection::NodeSelected(selected) = &self.selection else {
			return None;
		};
		let name_of = |id: &NodeId| {
			graph
				.node(id)
				.map(|n| n.label().to_owned())
				.unwrap_or_else(|| id.to_string())
		};
		Some(SelectionSummary {
			node: selected.node.clone(),
			name: name_of(&selected.node),
			neighbors: selected
				.neighbors
				.iter()
				.map(|entry| NeighborSummary {
					node: entry.neighbor.clone(),
					name: name_of(&entry.neighbor),
					weight: entry.weight,
				})
				.collect(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::forces::testing::RecordingIntegrator;
	use crate::components::force_graph::types::fixtures::triangle;

	#[derive(Default)]
	struct RecordingNavigator(Vec<Point>);

	impl Navigator for RecordingNavigator {
		fn navigate_to(&mut self, target: Point) {
			self.0.push(target);
		}
	}

	fn placed() -> RecordingIntegrator {
		let mut integrator = RecordingIntegrator::default();
		integrator.positions.insert("A".into(), Point::new(1.0, 2.0));
		integrator.positions.insert("B".into(), Point::new(3.0, 4.0));
		integrator
	}

	#[test]
	fn selecting_highlights_ranked_edges() {
		let graph = triangle();
		let mut controller = SelectionController::default();
		let mut nav = RecordingNavigator::default();
		controller.click(&"A".into(), &graph, WeightMetric::Raw, &placed(), &mut nav);

		let ab = controller.highlight_width(EdgeIdx(0)).unwrap();
		let ac = controller.highlight_width(EdgeIdx(1)).unwrap();
		assert!(ab > ac);
		assert_eq!(ab, 4.0);
		assert_eq!(controller.highlight_width(EdgeIdx(2)), None);
		assert_eq!(nav.0, vec![Point::new(1.0, 2.0)]);
	}

	#[test]
	fn reselecting_returns_to_idle() {
		let graph = triangle();
		let mut controller = SelectionController::default();
		let mut nav = RecordingNavigator::default();
		let positions = placed();
		controller.click(&"A".into(), &graph, WeightMetric::Raw, &positions, &mut nav);
		controller.click(&"A".into(), &graph, WeightMetric::Raw, &positions, &mut nav);
		assert_eq!(controller.selection(), &Selection::Idle);
		assert_eq!(controller.highlight_width(EdgeIdx(0)), None);
		assert_eq!(nav.0.len(), 1, "deselecting does not navigate");
	}

	#[test]
	fn switching_replaces_selection() {
		let graph = triangle();
		let mut controller = SelectionController::default();
		let mut nav = RecordingNavigator::default();
		let positions = placed();
		controller.click(&"A".into(), &graph, WeightMetric::Raw, &positions, &mut nav);
		controller.click(&"B".into(), &graph, WeightMetric::Raw, &positions, &mut nav);
		assert_eq!(controller.selected(), Some(&NodeId::from("B")));
		assert_eq!(controller.highlight_width(EdgeIdx(0)), Some(4.0));
		assert!(controller.highlight_width(EdgeIdx(2)).is_some());
		assert_eq!(controller.highlight_width(EdgeIdx(1)), None);
		assert_eq!(nav.0, vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)]);
	}

	#[test]
	fn missing_position_skips_navigation() {
		let graph = triangle();
		let mut controller = SelectionController::default();
		let mut nav = RecordingNavigator::default();
		controller.click(&"C".into(), &graph, WeightMetric::Raw, &placed(), &mut nav);
		assert_eq!(controller.selected(), Some(&NodeId::from("C")));
		assert!(nav.0.is_empty());
	}

	#[test]
	fn width_decays_linearly() {
		let c = SelectionConstants::default();
		assert_eq!(c.width_at(0), 4.0);
		assert!((c.width_at(19) - 0.2).abs() < 1e-12);
		assert!((c.width_at(1) - 3.8).abs() < 1e-12);
		let single = SelectionConstants {
			highlight_limit: 1,
			..Default::default()
		};
		assert_eq!(single.width_at(0), 4.0);
	}

	#[test]
	fn summary_lists_neighbors_in_rank_order() {
		let graph = triangle();
		let mut controller = SelectionController::default();
		assert!(controller.summary(&graph).is_none());
		controller.click(
			&"A".into(),
			&graph,
			WeightMetric::Raw,
			&placed(),
			&mut RecordingNavigator::default(),
		);
		let summary = controller.summary(&graph).unwrap();
		let names: Vec<_> = summary.neighbors.iter().map(|n| n.name.as_str()).collect();
		assert_eq!(names, vec!["B", "C"]);
		assert_eq!(summary.neighbors[0].weight, 0.8);
	}

	#[test]
	fn retain_clears_vanished_selection() {
		let graph = triangle();
		let mut controller = SelectionController::default();
		controller.click(
			&"A".into(),
			&graph,
			WeightMetric::Raw,
			&placed(),
			&mut RecordingNavigator::default(),
		);
		controller.retain(&graph);
		assert!(controller.selected().is_some());
		controller.retain(&GraphData::default());
		assert!(controller.selected().is_none());
	}
}
