//! Page-side pre-filter applied before data reaches the graph.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use super::force_graph::{ColorTag, GraphConfig, GraphData, GraphNode, NodeId};

/// Tribes counted within the first three of a node's tribes.
const TOP_TRIBES: usize = 3;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphFilter {
	/// Allowed colour tags. Empty allows every node.
	pub colors: Vec<ColorTag>,
	/// Inclusive release-date window.
	pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl From<&GraphConfig> for GraphFilter {
	fn from(config: &GraphConfig) -> Self {
		Self {
			colors: config.colors.clone(),
			date_range: config.date_range,
		}
	}
}

impl GraphFilter {
	fn colors_allow(&self, node: &GraphNode) -> bool {
		if self.colors.is_empty() {
			return true;
		}
		let tags: Vec<ColorTag> = node
			.colors
			.iter()
			.copied()
			.filter(|&c| c != ColorTag::Colorless)
			.collect();
		if tags.is_empty() {
			return self.colors.contains(&ColorTag::Colorless);
		}
		tags.iter().all(|c| self.colors.contains(c))
	}

	fn date_allows(&self, node: &GraphNode) -> bool {
		self.date_range
			.is_none_or(|(from, to)| (from..=to).contains(&node.released_at))
	}

	pub fn accepts(&self, node: &GraphNode) -> bool {
		self.colors_allow(node) && self.date_allows(node)
	}

	/// Surviving nodes and the links whose endpoints both survive.
	pub fn apply(&self, data: &GraphData) -> GraphData {
		let nodes: Vec<GraphNode> = data
			.nodes()
			.iter()
			.filter(|n| self.accepts(n))
			.cloned()
			.collect();
		let kept: HashSet<&NodeId> = nodes.iter().map(|n| &n.id).collect();
		let links = data
			.links()
			.iter()
			.filter(|l| kept.contains(&l.source) && kept.contains(&l.target))
			.cloned()
			.collect();
		GraphData::new(nodes, links)
	}
}

/// Release window from two optional bounds; an open end is unbounded.
pub fn date_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Option<(NaiveDate, NaiveDate)> {
	match (from, to) {
		(None, None) => None,
		(from, to) => Some((from.unwrap_or(NaiveDate::MIN), to.unwrap_or(NaiveDate::MAX))),
	}
}

/// Parses the value of an `<input type="date">`; empty or malformed is `None`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
	NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TribePopularity {
	pub name: String,
	/// Nodes listing the tribe at all.
	pub total: usize,
	/// Nodes listing it among their first three.
	pub top_three: usize,
}

/// Tribes of `data`, most widespread first. Ties break by name.
pub fn tribe_popularity(data: &GraphData) -> Vec<TribePopularity> {
	let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
	for node in data.nodes() {
		for (i, tribe) in node.tribes.iter().enumerate() {
			let entry = counts.entry(tribe.name.as_str()).or_default();
			entry.0 += 1;
			if i < TOP_TRIBES {
				entry.1 += 1;
			}
		}
	}
	let mut tribes: Vec<TribePopularity> = counts
		.into_iter()
		.map(|(name, (total, top_three))| TribePopularity {
			name: name.to_owned(),
			total,
			top_three,
		})
		.collect();
	tribes.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
	tribes
}
