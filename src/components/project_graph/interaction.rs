//! Hover/click selection, neighbour highlighting, and the resulting opacities.
//!
//! [`AppState`] is the single owner of filter and selection state. Input
//! adapters call its transition methods; it never touches the DOM, so every
//! transition can be exercised directly.
//!
//! Opacity composition: filtering and highlighting each yield a factor in
//! `0..=1` and a node shows the minimum of the two. The focused node itself is
//! always fully opaque, as is every edge touching it; any other edge takes the
//! minimum of its endpoints.

use std::collections::HashSet;

use log::debug;

use super::filter::{FilterState, Visibility};
use crate::dataset::{Edge, ProjectGraph, ProjectNode, graph::adjacency};

/// Where a click or tap landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickTarget {
	Node(usize),
	/// Empty canvas.
	Background,
	Popup,
	/// Filter panel, buttons and other chrome.
	Controls,
	/// Anywhere else on the page.
	Outside,
}

/// Which node, if any, currently owns the popup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
	Idle,
	Hovering(usize),
	Clicked(usize),
}

impl Selection {
	pub fn node(self) -> Option<usize> {
		match self {
			Self::Idle => None,
			Self::Hovering(n) | Self::Clicked(n) => Some(n),
		}
	}
}

/// Dataset, filters, selection and the opacities derived from them.
#[derive(Clone, Debug)]
pub struct AppState {
	graph: ProjectGraph,
	adjacency: Vec<Vec<usize>>,
	types: Vec<String>,
	fields: Vec<String>,
	filter: FilterState,
	hovered: Option<usize>,
	clicked: Option<usize>,
	dimmed_opacity: f64,
	node_opacity: Vec<f64>,
	edge_opacity: Vec<f64>,
}

impl AppState {
	pub fn new(graph: ProjectGraph, dimmed_opacity: f64) -> Self {
		let mut state = Self {
			adjacency: adjacency(graph.nodes.len(), &graph.edges),
			types: graph.types(),
			fields: graph.fields(),
			node_opacity: vec![1.0; graph.nodes.len()],
			edge_opacity: vec![1.0; graph.edges.len()],
			graph,
			filter: FilterState::default(),
			hovered: None,
			clicked: None,
			dimmed_opacity,
		};
		state.recompute();
		state
	}

	pub fn graph(&self) -> &ProjectGraph {
		&self.graph
	}

	pub fn nodes(&self) -> &[ProjectNode] {
		&self.graph.nodes
	}

	pub fn edges(&self) -> &[Edge] {
		&self.graph.edges
	}

	pub fn node(&self, idx: usize) -> Option<&ProjectNode> {
		self.graph.nodes.get(idx)
	}

	/// Distinct project types in first-seen order.
	pub fn types(&self) -> &[String] {
		&self.types
	}

	/// Distinct field tags in first-seen order.
	pub fn fields(&self) -> &[String] {
		&self.fields
	}

	pub fn filter(&self) -> &FilterState {
		&self.filter
	}

	pub fn node_opacity(&self, idx: usize) -> f64 {
		self.node_opacity.get(idx).copied().unwrap_or(1.0)
	}

	pub fn edge_opacity(&self, idx: usize) -> f64 {
		self.edge_opacity.get(idx).copied().unwrap_or(1.0)
	}

	pub fn selection(&self) -> Selection {
		match (self.clicked, self.hovered) {
			(Some(n), _) => Selection::Clicked(n),
			(None, Some(n)) => Selection::Hovering(n),
			(None, None) => Selection::Idle,
		}
	}

	/// The node whose popup is shown.
	pub fn focused(&self) -> Option<usize> {
		self.selection().node()
	}

	/// `idx` together with every node sharing an edge with it.
	pub fn neighbors(&self, idx: usize) -> HashSet<usize> {
		let mut set: HashSet<usize> = self.adjacency.get(idx).into_iter().flatten().copied().collect();
		set.insert(idx);
		set
	}

	pub fn toggle_type(&mut self, kind: &str) {
		self.filter.toggle_type(kind);
		self.recompute();
	}

	pub fn toggle_field(&mut self, field: &str) {
		self.filter.toggle_field(field);
		self.recompute();
	}

	pub fn set_search(&mut self, query: &str) {
		self.filter.set_search(query);
		self.recompute();
	}

	/// Clears every predicate in one step.
	pub fn reset_filters(&mut self) {
		self.filter.reset();
		self.recompute();
	}

	/// Pointer entered node `idx`. Ignored while another node is clicked.
	pub fn pointer_enter(&mut self, idx: usize) -> bool {
		if idx >= self.graph.nodes.len() || self.hovered == Some(idx) {
			return false;
		}
		if self.clicked.is_some_and(|c| c != idx) {
			return false;
		}
		self.hovered = Some(idx);
		self.recompute();
		true
	}

	/// Pointer left whatever node it was over.
	pub fn pointer_leave(&mut self) -> bool {
		if self.hovered.take().is_none() {
			return false;
		}
		self.recompute();
		true
	}

	/// Applies a click. Returns whether the selection changed.
	pub fn click(&mut self, target: ClickTarget) -> bool {
		let before = self.selection();
		match target {
			ClickTarget::Node(idx) if idx < self.graph.nodes.len() => {
				self.clicked = Some(idx);
				self.hovered = None;
			}
			ClickTarget::Background | ClickTarget::Outside => {
				self.clicked = None;
				self.hovered = None;
			}
			ClickTarget::Node(_) | ClickTarget::Popup | ClickTarget::Controls => {}
		}
		let after = self.selection();
		if before == after {
			return false;
		}
		debug!("selection {:?} -> {:?}", before, after);
		self.recompute();
		true
	}

	fn filter_factor(&self, node: &ProjectNode) -> f64 {
		match self.filter.visibility(node) {
			Visibility::Visible => 1.0,
			Visibility::Dimmed => self.dimmed_opacity,
		}
	}

	fn highlight_factor(&self, idx: usize, selection: Selection, focus: &HashSet<usize>) -> f64 {
		let lit = match selection {
			Selection::Idle => true,
			Selection::Clicked(_) => focus.contains(&idx),
			Selection::Hovering(n) => {
				focus.contains(&idx) || {
					let kind = self.graph.nodes[n].kind.as_ref();
					kind.is_some() && self.graph.nodes[idx].kind.as_ref() == kind
				}
			}
		};
		if lit { 1.0 } else { self.dimmed_opacity }
	}

	/// Full recomputation over every node and edge.
	fn recompute(&mut self) {
		let selection = self.selection();
		let focus = selection.node().map(|n| self.neighbors(n)).unwrap_or_default();

		let node_opacity: Vec<f64> = self
			.graph
			.nodes
			.iter()
			.enumerate()
			.map(|(i, node)| {
				if selection.node() == Some(i) {
					1.0
				} else {
					self.filter_factor(node)
						.min(self.highlight_factor(i, selection, &focus))
				}
			})
			.collect();

		self.edge_opacity = self
			.graph
			.edges
			.iter()
			.map(|e| match selection.node() {
				Some(n) if e.touches(n) => 1.0,
				_ => node_opacity[e.a].min(node_opacity[e.b]),
			})
			.collect();
		self.node_opacity = node_opacity;
		debug!("opacities recomputed for {:?}", selection);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dataset::graph::build_edges;

	const DIM: f64 = 0.15;

	fn node(name: &str, kind: &str, fields: &[&str], peers: &[&str]) -> ProjectNode {
		let mut n = ProjectNode::named(name);
		n.kind = Some(kind.to_string());
		n.fields = fields.iter().map(|f| f.to_string()).collect();
		n.connected_project_names = peers.iter().map(|p| p.to_string()).collect();
		n
	}

	/// A-B, B-C plus a lone D.
	fn state() -> AppState {
		let nodes = vec![
			node("A", "Art", &["paint", "sculpture"], &["B"]),
			node("B", "Music", &["paint"], &["A", "C"]),
			node("C", "Music", &["dance"], &[]),
			node("D", "Art", &["film"], &[]),
		];
		let edges = build_edges(&nodes);
		AppState::new(ProjectGraph { nodes, edges }, DIM)
	}

	fn opacities(s: &AppState) -> Vec<f64> {
		(0..s.nodes().len()).map(|i| s.node_opacity(i)).collect()
	}

	#[test]
	fn starts_idle_and_fully_visible() {
		let s = state();
		assert_eq!(s.selection(), Selection::Idle);
		assert_eq!(opacities(&s), vec![1.0; 4]);
		assert_eq!(s.types(), ["Art", "Music"]);
	}

	#[test]
	fn field_filter_dims_only_nodes_without_it() {
		let mut s = state();
		s.toggle_field("paint");
		assert_eq!(opacities(&s), vec![1.0, 1.0, DIM, DIM]);
		// A-B visible, B-C takes the dimmer endpoint.
		assert_eq!(s.edge_opacity(0), 1.0);
		assert_eq!(s.edge_opacity(1), DIM);
	}

	#[test]
	fn field_toggle_round_trip_restores_opacity() {
		let mut s = state();
		s.set_search("a");
		let before = opacities(&s);
		s.toggle_field("dance");
		assert_ne!(opacities(&s), before);
		s.toggle_field("dance");
		assert_eq!(opacities(&s), before);
	}

	#[test]
	fn reset_restores_full_visibility() {
		let mut s = state();
		s.toggle_type("Art");
		s.toggle_field("film");
		s.set_search("d");
		s.reset_filters();
		assert!(s.filter().is_empty());
		assert_eq!(opacities(&s), vec![1.0; 4]);
		assert!((0..s.edges().len()).all(|e| s.edge_opacity(e) == 1.0));
	}

	#[test]
	fn click_highlights_neighbours_regardless_of_type() {
		let mut s = state();
		assert!(s.click(ClickTarget::Node(0)));
		assert_eq!(s.selection(), Selection::Clicked(0));
		// D shares A's type but is not a neighbour.
		assert_eq!(opacities(&s), vec![1.0, 1.0, DIM, DIM]);
		assert_eq!(s.edge_opacity(0), 1.0);
		assert_eq!(s.edge_opacity(1), DIM);
	}

	#[test]
	fn hover_also_keeps_same_type_nodes_lit() {
		let mut s = state();
		assert!(s.pointer_enter(0));
		assert_eq!(s.selection(), Selection::Hovering(0));
		assert_eq!(opacities(&s), vec![1.0, 1.0, DIM, 1.0]);
		assert!(s.pointer_leave());
		assert_eq!(s.selection(), Selection::Idle);
		assert_eq!(opacities(&s), vec![1.0; 4]);
	}

	#[test]
	fn click_suppresses_hover_on_other_nodes() {
		let mut s = state();
		s.click(ClickTarget::Node(1));
		assert!(!s.pointer_enter(3));
		assert_eq!(s.focused(), Some(1));
	}

	#[test]
	fn click_survives_pointer_leave() {
		let mut s = state();
		s.pointer_enter(2);
		s.click(ClickTarget::Node(2));
		s.pointer_leave();
		assert_eq!(s.selection(), Selection::Clicked(2));
	}

	#[test]
	fn background_click_returns_to_filtered_idle() {
		let mut s = state();
		s.toggle_type("Music");
		s.click(ClickTarget::Node(0));
		assert_eq!(s.node_opacity(0), 1.0);
		assert!(s.click(ClickTarget::Background));
		assert_eq!(s.selection(), Selection::Idle);
		assert_eq!(opacities(&s), vec![DIM, 1.0, 1.0, DIM]);
	}

	#[test]
	fn popup_and_controls_clicks_keep_the_selection() {
		let mut s = state();
		s.click(ClickTarget::Node(3));
		assert!(!s.click(ClickTarget::Popup));
		assert!(!s.click(ClickTarget::Controls));
		assert_eq!(s.selection(), Selection::Clicked(3));
		assert!(s.click(ClickTarget::Outside));
		assert_eq!(s.selection(), Selection::Idle);
	}

	#[test]
	fn filter_still_dims_neighbours_of_the_focus() {
		let mut s = state();
		s.toggle_field("sculpture");
		s.click(ClickTarget::Node(1));
		// B is focused, A is a lit neighbour, C is a neighbour that the filter dims.
		assert_eq!(opacities(&s), vec![1.0, 1.0, DIM, DIM]);
		// Both edges touch the focus.
		assert_eq!(s.edge_opacity(1), 1.0);
	}

	#[test]
	fn out_of_range_indices_are_ignored() {
		let mut s = state();
		assert!(!s.pointer_enter(99));
		assert!(!s.click(ClickTarget::Node(99)));
		assert_eq!(s.selection(), Selection::Idle);
	}
}
