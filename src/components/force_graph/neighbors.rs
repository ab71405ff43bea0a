use std::cmp::Ordering;

use super::types::{EdgeIdx, GraphData, NodeId};
use super::weight::{WeightMetric, resolve};

/// One ranked neighbour of a node.
#[derive(Clone, Debug, PartialEq)]
pub struct NeighborEntry {
	pub neighbor: NodeId,
	pub weight: f64,
	pub edge: EdgeIdx,
}

/// Neighbours of `id` ordered by descending weight under `metric`, ties by
/// ascending neighbour id, truncated to `limit`.
///
/// Self-loops and edges whose far endpoint is not in `graph` are skipped.
pub fn rank_neighbors(
	graph: &GraphData,
	id: &NodeId,
	metric: WeightMetric,
	limit: usize,
) -> Vec<NeighborEntry> {
	let mut entries: Vec<NeighborEntry> = graph
		.incident(id)
		.iter()
		.filter_map(|&edge| {
			let link = graph.link(edge)?;
			let other = link.other(id)?;
			if other == id || !graph.contains(other) {
				return None;
			}
			Some(NeighborEntry {
				neighbor: other.clone(),
				weight: resolve(link, metric),
				edge,
			})
		})
		.collect();

	entries.sort_by(compare);
	entries.truncate(limit);
	entries
}

fn compare(a: &NeighborEntry, b: &NeighborEntry) -> Ordering {
	b.weight
		.total_cmp(&a.weight)
		.then_with(|| a.neighbor.cmp(&b.neighbor))
}
