//! Name lookup behind the search box.

use super::force_graph::{GraphData, GraphNode};

/// Shorter terms suggest nothing.
pub const MIN_SEARCH_LEN: usize = 2;
pub const MAX_SUGGESTIONS: usize = 10;

/// Nodes whose label contains `term`, ignoring case, in dataset order.
pub fn search_matches<'a>(data: &'a GraphData, term: &str) -> Vec<&'a GraphNode> {
	let term = term.trim().to_lowercase();
	if term.chars().count() < MIN_SEARCH_LEN {
		return Vec::new();
	}
	data.nodes()
		.iter()
		.filter(|node| node.label().to_lowercase().contains(&term))
		.take(MAX_SUGGESTIONS)
		.collect()
}
