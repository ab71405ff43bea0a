//! Level-of-detail drawing. Zoomed out, nodes are colour-coded circles; from
//! [`DETAIL_THRESHOLD`] they become card images.

use std::f64::consts::PI;

use super::forces::PositionSource;
use super::images::{ImageCache, ImageFetcher};
use super::label::draw_label;
use super::selection::SelectionController;
use super::state::ForceGraphState;
use super::surface::Surface;
use super::types::{EdgeIdx, GraphData, GraphNode};

pub const DETAIL_THRESHOLD: f64 = 5.5;
pub const CIRCLE_RADIUS: f64 = 5.0;
pub const RANK_MIN_RADIUS: f64 = 3.0;
pub const RANK_MAX_RADIUS: f64 = 6.0;
pub const CARD_BASE_SIZE: f64 = 25.0;
pub const CARD_SCALE: f64 = 0.8;
/// Width over height of a card image.
pub const CARD_ASPECT: f64 = 63.0 / 88.0;

const BACKGROUND: &str = "#ffffff";
const EDGE_COLOR: &str = "#666";
const NEUTRAL_COLOR: &str = "#666";
const OUTLINE: &str = "#ffffff";
const CARD_BORDER: f64 = 2.0;
const TRIBE_BORDER_COLOR: &str = "#228be6";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
	Overview,
	Detail,
}

impl RenderMode {
	pub fn from_scale(k: f64) -> Self {
		if k >= DETAIL_THRESHOLD {
			Self::Detail
		} else {
			Self::Overview
		}
	}
}

/// Overview circle radius. Rank 1 is the most popular and draws largest.
pub fn marker_radius(rank: u32, max_rank: u32, size_by_popularity: bool) -> f64 {
	if !size_by_popularity {
		return CIRCLE_RADIUS;
	}
	if max_rank <= 1 {
		return RANK_MAX_RADIUS;
	}
	let norm = (rank.clamp(1, max_rank) - 1) as f64 / (max_rank - 1) as f64;
	RANK_MAX_RADIUS - (RANK_MAX_RADIUS - RANK_MIN_RADIUS) * norm
}

/// Ring width for a node whose tribes include `tribe`: 3, 2 and 1 for its first
/// three tribes, nothing further down or when no tribe is selected.
pub fn tribe_border_width(node: &GraphNode, tribe: Option<&str>) -> f64 {
	match tribe.and_then(|t| node.tribe_rank(t)) {
		Some(0) => 3.0,
		Some(1) => 2.0,
		Some(2) => 1.0,
		_ => 0.0,
	}
}

pub fn card_size() -> (f64, f64) {
	let width = CARD_BASE_SIZE * CARD_SCALE;
	(width, width / CARD_ASPECT)
}

/// Everything one frame reads. Borrowed from the state for the duration of a draw.
pub struct Frame<'a, F: ImageFetcher> {
	pub graph: &'a GraphData,
	pub positions: &'a dyn PositionSource,
	pub selection: &'a SelectionController,
	pub images: &'a ImageCache<F>,
	pub scale: f64,
	pub size_by_popularity: bool,
	pub selected_tribe: Option<&'a str>,
}

pub fn render<F, S>(state: &ForceGraphState<F>, surface: &S)
where
	F: ImageFetcher,
	S: Surface<Image = F::Image>,
{
	let t = state.camera.transform();
	surface.set_fill_style(BACKGROUND);
	surface.fill_rect(0.0, 0.0, state.camera.width(), state.camera.height());
	surface.save();
	surface.translate(t.x, t.y);
	surface.scale(t.k);
	draw_frame(&state.frame(), surface);
	surface.restore();
}

pub fn draw_frame<F, S>(frame: &Frame<'_, F>, surface: &S)
where
	F: ImageFetcher,
	S: Surface<Image = F::Image>,
{
	draw_edges(frame, surface);
	let mode = RenderMode::from_scale(frame.scale);
	for node in frame.graph.nodes() {
		draw_node(frame, surface, node, mode);
	}
}

/// Only the selected node's highlighted edges are visible.
fn draw_edges<F, S>(frame: &Frame<'_, F>, surface: &S)
where
	F: ImageFetcher,
	S: Surface<Image = F::Image>,
{
	surface.set_stroke_style(EDGE_COLOR);
	for (i, link) in frame.graph.links().iter().enumerate() {
		let Some(width) = frame.selection.highlight_width(EdgeIdx(i)) else {
			continue;
		};
		let (Some(a), Some(b)) = (
			frame.positions.position_of(&link.source),
			frame.positions.position_of(&link.target),
		) else {
			continue;
		};
		surface.set_line_width(width / frame.scale);
		surface.begin_path();
		surface.move_to(a.x, a.y);
		surface.line_to(b.x, b.y);
		surface.stroke();
	}
}

fn draw_node<F, S>(frame: &Frame<'_, F>, surface: &S, node: &GraphNode, mode: RenderMode)
where
	F: ImageFetcher,
	S: Surface<Image = F::Image>,
{
	let Some(p) = frame.positions.position_of(&node.id) else {
		return;
	};
	if !(p.x.is_finite() && p.y.is_finite()) {
		return;
	}

	match mode {
		RenderMode::Overview => {
			let radius = marker_radius(node.rank, frame.graph.max_rank(), frame.size_by_popularity);
			draw_label(surface, node.label(), p.x, p.y, radius, frame.scale, mode);
			let border = tribe_border_width(node, frame.selected_tribe);
			draw_circle_marker(surface, node, p.x, p.y, radius, border);
		}
		RenderMode::Detail => {
			draw_label(surface, node.label(), p.x, p.y, CARD_BASE_SIZE, frame.scale, mode);
			// The card itself waits for the image.
			let Some(image) = frame.images.poll(&node.id, &node.image_uris.normal) else {
				return;
			};
			let (w, h) = card_size();
			let (x, y) = (p.x - w / 2.0, p.y - h / 2.0);
			surface.draw_image(&image, x, y, w, h);
			surface.set_stroke_style(OUTLINE);
			surface.set_line_width(CARD_BORDER / frame.scale);
			surface.stroke_rect(x, y, w, h);
		}
	}
}

/// One tag fills the circle; several split it into equal wedges clockwise from
/// twelve o'clock in tag order. A tribe ring sits underneath.
fn draw_circle_marker<S: Surface + ?Sized>(
	surface: &S,
	node: &GraphNode,
	x: f64,
	y: f64,
	r: f64,
	border: f64,
) {
	if border > 0.0 {
		surface.begin_path();
		surface.arc(x, y, r + border, 0.0, 2.0 * PI);
		surface.set_fill_style(TRIBE_BORDER_COLOR);
		surface.fill();
	}
	surface.set_stroke_style(OUTLINE);
	surface.set_line_width(1.0);
	match node.colors.as_slice() {
		[] | [_] => {
			let color = node.colors.first().map_or(NEUTRAL_COLOR, |c| c.color());
			surface.begin_path();
			surface.arc(x, y, r, 0.0, 2.0 * PI);
			surface.set_fill_style(color);
			surface.fill();
			surface.stroke();
		}
		tags => {
			let slice = 2.0 * PI / tags.len() as f64;
			for (i, tag) in tags.iter().enumerate() {
				let start = i as f64 * slice - PI / 2.0;
				surface.begin_path();
				surface.move_to(x, y);
				surface.arc(x, y, r, start, start + slice);
				surface.close_path();
				surface.set_fill_style(tag.color());
				surface.fill();
				surface.stroke();
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::forces::Point;
	use crate::components::force_graph::forces::testing::RecordingIntegrator;
	use crate::components::force_graph::images::testing::{CountingFetcher, ManualSpawner};
	use crate::components::force_graph::selection::Navigator;
	use crate::components::force_graph::surface::recording::{Op, RecordingSurface};
	use crate::components::force_graph::types::ColorTag;
	use crate::components::force_graph::types::fixtures::{node, triangle, with_tribes};
	use crate::components::force_graph::weight::WeightMetric;

	struct Fixture {
		graph: GraphData,
		positions: RecordingIntegrator,
		selection: SelectionController,
		images: ImageCache<CountingFetcher>,
		fetcher: CountingFetcher,
		spawner: ManualSpawner,
	}

	impl Fixture {
		fn new(graph: GraphData) -> Self {
			let mut positions = RecordingIntegrator::default();
			for (i, n) in graph.nodes().iter().enumerate() {
				positions.positions.insert(n.id.clone(), Point::new(i as f64 * 10.0, 0.0));
			}
			let fetcher = CountingFetcher::default();
			let spawner = ManualSpawner::default();
			Self {
				graph,
				positions,
				selection: SelectionController::default(),
				images: ImageCache::new(fetcher.clone(), spawner.spawner()),
				fetcher,
				spawner,
			}
		}

		fn draw(&self, scale: f64) -> Vec<Op> {
			self.draw_with_tribe(scale, None)
		}

		fn draw_with_tribe(&self, scale: f64, tribe: Option<&str>) -> Vec<Op> {
			let surface = RecordingSurface::new(1.0);
			let frame = Frame {
				graph: &self.graph,
				positions: &self.positions,
				selection: &self.selection,
				images: &self.images,
				scale,
				size_by_popularity: false,
				selected_tribe: tribe,
			};
			draw_frame(&frame, &surface);
			surface.ops()
		}
	}

	struct Still;

	impl Navigator for Still {
		fn navigate_to(&mut self, _target: Point) {}
	}

	#[test]
	fn mode_switches_at_threshold() {
		assert_eq!(RenderMode::from_scale(1.0), RenderMode::Overview);
		assert_eq!(RenderMode::from_scale(5.49), RenderMode::Overview);
		assert_eq!(RenderMode::from_scale(DETAIL_THRESHOLD), RenderMode::Detail);
		assert_eq!(RenderMode::from_scale(5.6), RenderMode::Detail);
	}

	#[test]
	fn radius_shrinks_with_rank() {
		let radii: Vec<_> = (1..=10).map(|r| marker_radius(r, 10, true)).collect();
		assert_eq!(radii[0], RANK_MAX_RADIUS);
		assert_eq!(radii[9], RANK_MIN_RADIUS);
		assert!(radii.windows(2).all(|w| w[0] >= w[1]));
		assert_eq!(marker_radius(7, 10, false), CIRCLE_RADIUS);
	}

	#[test]
	fn degenerate_max_rank_is_finite() {
		assert_eq!(marker_radius(1, 1, true), RANK_MAX_RADIUS);
		assert_eq!(marker_radius(0, 0, true), RANK_MAX_RADIUS);
		assert!(marker_radius(50, 10, true).is_finite());
	}

	#[test]
	fn multicolor_nodes_draw_wedges_from_the_top() {
		let graph = GraphData::new(
			vec![node("A", 1, &[ColorTag::White, ColorTag::Blue, ColorTag::Black])],
			vec![],
		);
		let ops = Fixture::new(graph).draw(1.0);
		let arcs: Vec<_> = ops
			.iter()
			.filter_map(|op| match op {
				Op::Arc { start, end, .. } => Some((*start, *end)),
				_ => None,
			})
			.collect();
		assert_eq!(arcs.len(), 3);
		assert!((arcs[0].0 + PI / 2.0).abs() < 1e-12);
		for pair in arcs.windows(2) {
			assert!((pair[0].1 - pair[1].0).abs() < 1e-12);
		}
		let fills: Vec<_> = ops
			.iter()
			.filter_map(|op| match op {
				Op::Fill(c) => Some(c.as_str()),
				_ => None,
			})
			.collect();
		assert_eq!(
			fills,
			vec![ColorTag::White.color(), ColorTag::Blue.color(), ColorTag::Black.color()]
		);
	}

	#[test]
	fn colorless_nodes_are_neutral_and_outlined() {
		let graph = GraphData::new(vec![node("A", 1, &[])], vec![]);
		let ops = Fixture::new(graph).draw(1.0);
		assert!(ops.contains(&Op::Fill(NEUTRAL_COLOR.to_owned())));
		assert!(ops.contains(&Op::Stroke(OUTLINE.to_owned(), 1.0)));
	}

	#[test]
	fn label_is_drawn_before_marker() {
		let graph = GraphData::new(vec![node("A", 1, &[ColorTag::Red])], vec![]);
		let ops = Fixture::new(graph).draw(1.0);
		let text = ops.iter().position(|op| matches!(op, Op::Text { .. })).unwrap();
		let marker = ops.iter().position(|op| matches!(op, Op::Arc { .. })).unwrap();
		assert!(text < marker);
	}

	#[test]
	fn detail_mode_labels_while_image_loads() {
		let graph = GraphData::new(vec![node("A", 1, &[ColorTag::Red])], vec![]);
		let fixture = Fixture::new(graph);
		let first = fixture.draw(8.0);
		assert!(first.iter().any(|op| matches!(op, Op::Text { .. })));
		assert!(!first.iter().any(|op| matches!(op, Op::Image { .. } | Op::Stroke(..))));
		assert_eq!(fixture.fetcher.calls.get(), 1);

		// A second frame while loading does not refetch.
		fixture.draw(8.0);
		assert_eq!(fixture.fetcher.calls.get(), 1);

		fixture.fetcher.complete_all(true);
		fixture.spawner.run_all();
		let ops = fixture.draw(8.0);
		let (w, h) = card_size();
		let image = ops.iter().find_map(|op| match op {
			Op::Image { image, w, h, .. } => Some((image.clone(), *w, *h)),
			_ => None,
		});
		assert_eq!(image, Some(("img:https://img.test/A.jpg".to_owned(), w, h)));
		let text = ops.iter().position(|op| matches!(op, Op::Text { .. })).unwrap();
		let card = ops.iter().position(|op| matches!(op, Op::Image { .. })).unwrap();
		assert!(text < card);
	}

	fn tribal(id: &str, tribes: &[&str]) -> GraphNode {
		with_tribes(node(id, 1, &[ColorTag::Green]), tribes)
	}

	#[test]
	fn tribe_border_narrows_with_position() {
		let elf = tribal("Lathril", &["Elf", "Warrior", "Druid", "Shaman"]);
		assert_eq!(tribe_border_width(&elf, Some("Elf")), 3.0);
		assert_eq!(tribe_border_width(&elf, Some("Warrior")), 2.0);
		assert_eq!(tribe_border_width(&elf, Some("Druid")), 1.0);
		assert_eq!(tribe_border_width(&elf, Some("Shaman")), 0.0);
		assert_eq!(tribe_border_width(&elf, Some("Goblin")), 0.0);
		assert_eq!(tribe_border_width(&elf, None), 0.0);
	}

	#[test]
	fn tribe_ring_is_drawn_under_the_marker() {
		let graph = GraphData::new(vec![tribal("Lathril", &["Elf"])], vec![]);
		let fixture = Fixture::new(graph);

		let plain = fixture.draw(1.0);
		assert!(!plain.contains(&Op::Fill(TRIBE_BORDER_COLOR.to_owned())));

		let ops = fixture.draw_with_tribe(1.0, Some("Elf"));
		let arcs: Vec<_> = ops
			.iter()
			.filter_map(|op| match op {
				Op::Arc { r, .. } => Some(*r),
				_ => None,
			})
			.collect();
		assert_eq!(arcs, vec![CIRCLE_RADIUS + 3.0, CIRCLE_RADIUS]);
		let ring = ops
			.iter()
			.position(|op| *op == Op::Fill(TRIBE_BORDER_COLOR.to_owned()))
			.unwrap();
		let marker = ops
			.iter()
			.position(|op| *op == Op::Fill(ColorTag::Green.color().to_owned()))
			.unwrap();
		assert!(ring < marker);
	}

	#[test]
	fn only_highlighted_edges_are_drawn() {
		let mut fixture = Fixture::new(triangle());
		assert!(!fixture.draw(1.0).iter().any(|op| matches!(op, Op::Line { .. })));

		fixture.selection.click(
			&"A".into(),
			&fixture.graph,
			WeightMetric::Raw,
			&fixture.positions,
			&mut Still,
		);
		let ops = fixture.draw(2.0);
		let lines = ops.iter().filter(|op| matches!(op, Op::Line { .. })).count();
		assert_eq!(lines, 2);
		assert!(ops.contains(&Op::Stroke(EDGE_COLOR.to_owned(), 2.0)));
	}
}
