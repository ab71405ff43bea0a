use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable node identifier. Edges refer to nodes only through this.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for NodeId {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}

/// Position of an edge in [`GraphData::links`]; valid for the lifetime of one dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeIdx(pub usize);

/// Mana colour identity of a commander.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColorTag {
	#[serde(rename = "W")]
	White,
	#[serde(rename = "U")]
	Blue,
	#[serde(rename = "B")]
	Black,
	#[serde(rename = "R")]
	Red,
	#[serde(rename = "G")]
	Green,
	#[serde(rename = "C")]
	Colorless,
}

impl ColorTag {
	pub const ALL: [ColorTag; 6] = [
		ColorTag::White,
		ColorTag::Blue,
		ColorTag::Black,
		ColorTag::Red,
		ColorTag::Green,
		ColorTag::Colorless,
	];

	/// Fill colour used for markers and pie wedges.
	pub fn color(self) -> &'static str {
		match self {
			ColorTag::White => "#F3EACB",
			ColorTag::Blue => "#0E68AB",
			ColorTag::Black => "#150B00",
			ColorTag::Red => "#D3202A",
			ColorTag::Green => "#00733E",
			ColorTag::Colorless => "#CCCCCC",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			ColorTag::White => "White",
			ColorTag::Blue => "Blue",
			ColorTag::Black => "Black",
			ColorTag::Red => "Red",
			ColorTag::Green => "Green",
			ColorTag::Colorless => "Colorless",
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageUris {
	#[serde(default)]
	pub small: Option<String>,
	pub normal: String,
}

/// A creature type the commander's decks build around, in order of prominence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tribe {
	pub name: String,
	#[serde(default)]
	pub count: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	pub id: NodeId,
	#[serde(default)]
	pub name: Option<String>,
	/// Popularity rank, 1 = most popular.
	pub rank: u32,
	#[serde(default)]
	pub deck_count: u32,
	#[serde(default)]
	pub colors: Vec<ColorTag>,
	pub released_at: NaiveDate,
	#[serde(default)]
	pub card_counts: BTreeMap<String, u32>,
	#[serde(default)]
	pub tribes: Vec<Tribe>,
	pub image_uris: ImageUris,
}

impl GraphNode {
	/// Text shown under the marker.
	pub fn label(&self) -> &str {
		self.name.as_deref().unwrap_or(self.id.as_str())
	}

	/// Position of `tribe` among this node's tribes, most prominent first.
	pub fn tribe_rank(&self, tribe: &str) -> Option<usize> {
		self.tribes.iter().position(|t| t.name == tribe)
	}
}

/// The six independently precomputed affinity scores of an edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeWeights {
	#[serde(rename = "raw_weight")]
	pub raw: f64,
	#[serde(rename = "normalized_weight")]
	pub normalized: f64,
	#[serde(rename = "composite_weight")]
	pub composite: f64,
	#[serde(rename = "uniqueness_weight")]
	pub uniqueness: f64,
	#[serde(rename = "tribes_weight")]
	pub tribes: f64,
	#[serde(rename = "tribes_simplified_weight")]
	pub tribes_simplified: f64,
}

impl EdgeWeights {
	/// Same score under every metric.
	#[cfg(test)]
	pub fn uniform(weight: f64) -> Self {
		Self {
			raw: weight,
			normalized: weight,
			composite: weight,
			uniqueness: weight,
			tribes: weight,
			tribes_simplified: weight,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	pub source: NodeId,
	pub target: NodeId,
	pub weights: EdgeWeights,
}

impl GraphLink {
	pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>, weights: EdgeWeights) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			weights,
		}
	}

	/// The endpoint opposite `id`, or `None` when `id` is not an endpoint.
	pub fn other(&self, id: &NodeId) -> Option<&NodeId> {
		if &self.source == id {
			Some(&self.target)
		} else if &self.target == id {
			Some(&self.source)
		} else {
			None
		}
	}
}

impl From<String> for NodeId {
	fn from(value: String) -> Self {
		Self(value)
	}
}

/// Edge endpoint as it may appear in source documents.
#[derive(Deserialize)]
#[serde(untagged)]
enum EndpointRef {
	Id(NodeId),
	Node { id: NodeId },
}

impl From<EndpointRef> for NodeId {
	fn from(value: EndpointRef) -> Self {
		match value {
			EndpointRef::Id(id) | EndpointRef::Node { id } => id,
		}
	}
}

#[derive(Deserialize)]
struct RawLink {
	source: EndpointRef,
	target: EndpointRef,
	#[serde(flatten)]
	weights: EdgeWeights,
}

#[derive(Debug, Error)]
pub enum DataError {
	#[error("failed to parse {document} document: {source}")]
	Parse {
		document: &'static str,
		#[source]
		source: serde_json::Error,
	},
	#[error("duplicate node id {0}")]
	DuplicateNode(NodeId),
}

/// One loaded (and possibly pre-filtered) dataset.
///
/// Endpoints are plain [`NodeId`]s; edges whose endpoints are missing from
/// `nodes` are allowed and are skipped by the consumers that care.
#[derive(Clone, Debug, Default)]
pub struct GraphData {
	nodes: Vec<GraphNode>,
	links: Vec<GraphLink>,
	by_id: HashMap<NodeId, usize>,
	incident: HashMap<NodeId, Vec<EdgeIdx>>,
	max_rank: u32,
}

impl PartialEq for GraphData {
	fn eq(&self, other: &Self) -> bool {
		self.nodes == other.nodes && self.links == other.links
	}
}

impl GraphData {
	pub fn new(nodes: Vec<GraphNode>, links: Vec<GraphLink>) -> Self {
		let by_id = nodes
			.iter()
			.enumerate()
			.map(|(i, node)| (node.id.clone(), i))
			.collect();
		let mut incident: HashMap<NodeId, Vec<EdgeIdx>> = HashMap::new();
		for (i, link) in links.iter().enumerate() {
			incident.entry(link.source.clone()).or_default().push(EdgeIdx(i));
			if link.target != link.source {
				incident.entry(link.target.clone()).or_default().push(EdgeIdx(i));
			}
		}
		let max_rank = nodes.iter().map(|n| n.rank).max().unwrap_or(1).max(1);

		Self {
			nodes,
			links,
			by_id,
			incident,
			max_rank,
		}
	}

	/// Parses the keyed node (`{ id: node }`) and edge (`{ key: edge }`) documents.
	pub fn from_json(nodes_json: &str, edges_json: &str) -> Result<Self, DataError> {
		let nodes: BTreeMap<String, GraphNode> =
			serde_json::from_str(nodes_json).map_err(|source| DataError::Parse {
				document: "nodes",
				source,
			})?;
		let edges: BTreeMap<String, RawLink> =
			serde_json::from_str(edges_json).map_err(|source| DataError::Parse {
				document: "edges",
				source,
			})?;

		let mut seen = HashSet::new();
		for node in nodes.values() {
			if !seen.insert(&node.id) {
				return Err(DataError::DuplicateNode(node.id.clone()));
			}
		}

		let links = edges
			.into_values()
			.map(|raw| GraphLink::new(raw.source, raw.target, raw.weights))
			.collect();

		Ok(Self::new(nodes.into_values().collect(), links))
	}

	pub fn nodes(&self) -> &[GraphNode] {
		&self.nodes
	}

	pub fn links(&self) -> &[GraphLink] {
		&self.links
	}

	pub fn link(&self, idx: EdgeIdx) -> Option<&GraphLink> {
		self.links.get(idx.0)
	}

	pub fn node(&self, id: &NodeId) -> Option<&GraphNode> {
		self.by_id.get(id).map(|&i| &self.nodes[i])
	}

	pub fn contains(&self, id: &NodeId) -> bool {
		self.by_id.contains_key(id)
	}

	/// Edges with `id` as either endpoint, in dataset order.
	pub fn incident(&self, id: &NodeId) -> &[EdgeIdx] {
		self.incident.get(id).map(Vec::as_slice).unwrap_or(&[])
	}

	/// Largest rank in the current node set; 1 for empty or single-node sets.
	pub fn max_rank(&self) -> u32 {
		self.max_rank.max(1)
	}
}

#[cfg(test)]
pub(crate) mod fixtures {
	use super::*;

	pub fn node(id: &str, rank: u32, colors: &[ColorTag]) -> GraphNode {
		GraphNode {
			id: id.into(),
			name: None,
			rank,
			deck_count: 0,
			colors: colors.to_vec(),
			released_at: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
			card_counts: BTreeMap::new(),
			tribes: Vec::new(),
			image_uris: ImageUris {
				small: None,
				normal: format!("https://img.test/{id}.jpg"),
			},
		}
	}

	/// `node` carrying `tribes`, most prominent first.
	pub fn with_tribes(node: GraphNode, tribes: &[&str]) -> GraphNode {
		GraphNode {
			tribes: tribes
				.iter()
				.map(|&name| Tribe {
					name: name.to_owned(),
					count: 1,
				})
				.collect(),
			..node
		}
	}

	pub fn link(source: &str, target: &str, weight: f64) -> GraphLink {
		GraphLink::new(source, target, EdgeWeights::uniform(weight))
	}

	/// Nodes A, B, C ranked 1..=3 with A–B 0.8, A–C 0.2, B–C 0.5.
	pub fn triangle() -> GraphData {
		GraphData::new(
			vec![
				node("A", 1, &[ColorTag::White]),
				node("B", 2, &[ColorTag::Blue, ColorTag::Red]),
				node("C", 3, &[]),
			],
			vec![link("A", "B", 0.8), link("A", "C", 0.2), link("B", "C", 0.5)],
		)
	}
}

#[cfg(test)]
mod tests {
	use super::fixtures::*;
	use super::*;

	const NODES: &str = r#"{
		"Atraxa": {
			"id": "Atraxa",
			"rank": 1,
			"colors": ["W", "U", "B", "G"],
			"released_at": "2016-11-11",
			"card_counts": {"Creatures": 30},
			"tribes": [{"name": "Phyrexian", "count": 812}, {"name": "Angel", "count": 40}],
			"image_uris": {"small": "s.jpg", "normal": "n.jpg"}
		},
		"Krenko": {
			"id": "Krenko",
			"name": "Krenko, Mob Boss",
			"rank": 7,
			"colors": ["R"],
			"released_at": "2012-07-13",
			"image_uris": {"normal": "k.jpg"}
		}
	}"#;

	#[test]
	fn ingestion_normalizes_object_endpoints() {
		let edges = r#"{
			"e1": {
				"source": {"id": "Atraxa", "rank": 1},
				"target": "Krenko",
				"raw_weight": 0.4,
				"normalized_weight": 0.5,
				"composite_weight": 0.6,
				"uniqueness_weight": 0.1,
				"tribes_weight": 0.2,
				"tribes_simplified_weight": 0.3
			}
		}"#;
		let data = GraphData::from_json(NODES, edges).unwrap();
		assert_eq!(data.nodes().len(), 2);
		let link = &data.links()[0];
		assert_eq!(link.source, NodeId::from("Atraxa"));
		assert_eq!(link.target, NodeId::from("Krenko"));
		assert_eq!(link.weights.composite, 0.6);
		assert_eq!(data.max_rank(), 7);
		assert_eq!(data.node(&"Krenko".into()).unwrap().label(), "Krenko, Mob Boss");
	}

	#[test]
	fn tribes_are_optional_and_ordered() {
		let data = GraphData::from_json(NODES, "{}").unwrap();
		let atraxa = data.node(&"Atraxa".into()).unwrap();
		assert_eq!(atraxa.tribe_rank("Phyrexian"), Some(0));
		assert_eq!(atraxa.tribe_rank("Angel"), Some(1));
		assert_eq!(atraxa.tribe_rank("Goblin"), None);
		assert!(data.node(&"Krenko".into()).unwrap().tribes.is_empty());
	}

	#[test]
	fn malformed_edges_report_document() {
		let err = GraphData::from_json(NODES, "[1, 2]").unwrap_err();
		assert!(matches!(err, DataError::Parse { document: "edges", .. }));
	}

	#[test]
	fn incident_edges_cover_both_endpoints() {
		let data = triangle();
		assert_eq!(data.incident(&"A".into()), &[EdgeIdx(0), EdgeIdx(1)]);
		assert_eq!(data.incident(&"C".into()), &[EdgeIdx(1), EdgeIdx(2)]);
		assert!(data.incident(&"Z".into()).is_empty());
	}

	#[test]
	fn max_rank_is_never_zero() {
		assert_eq!(GraphData::default().max_rank(), 1);
		let single = GraphData::new(vec![node("A", 1, &[])], vec![]);
		assert_eq!(single.max_rank(), 1);
	}
}
