//! Layout driving on top of a pluggable physics backend.
//!
//! The backend supplies many-body repulsion and integration. [`LayoutDriver`]
//! layers the positional forces on top: link rest length, the season-based
//! horizontal bias, a weak vertical bias and centering. It also owns the
//! simulation energy ("alpha"), which cools after each tick and is reheated
//! by drags and viewport resizes.

use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;
use serde::Deserialize;

use crate::dataset::{Edge, ProjectGraph, Season};

/// Uniform node mass handed to the backend.
const NODE_MASS: f32 = 10.0;
/// Converts a d3-style charge into the backend's mass-weighted repulsion.
const CHARGE_SCALE: f64 = 20.0;
/// Fraction of the width left empty on each side of the season axis.
const SEASON_MARGIN: f64 = 0.15;

/// Force parameters. `charge` follows the usual sign convention: negative repels.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForceConfig {
	pub link_distance: f64,
	pub link_strength: f64,
	pub charge: f64,
	pub x_strength: f64,
	pub y_strength: f64,
	pub center_strength: f64,
	pub alpha_decay: f64,
	pub alpha_min: f64,
	/// Energy held while a node is dragged.
	pub drag_alpha_target: f64,
	/// Energy a resize raises the simulation to.
	pub resize_alpha: f64,
	/// Seconds advanced per animation frame.
	pub time_step: f64,
	pub max_force: f64,
	pub node_speed: f64,
	pub damping: f64,
}

impl Default for ForceConfig {
	fn default() -> Self {
		Self {
			link_distance: 90.0,
			link_strength: 0.3,
			charge: -150.0,
			x_strength: 0.3,
			y_strength: 0.04,
			center_strength: 1.0,
			alpha_decay: 0.0228,
			alpha_min: 0.001,
			drag_alpha_target: 0.3,
			resize_alpha: 0.3,
			time_step: 0.016,
			max_force: 100.0,
			node_speed: 3000.0,
			damping: 0.9,
		}
	}
}

/// The physics engine seam: nodes are addressed by insertion order.
pub trait PhysicsBackend {
	fn add_node(&mut self, x: f64, y: f64) -> usize;
	fn add_edge(&mut self, a: usize, b: usize);
	fn configure(&mut self, config: &ForceConfig);
	/// `Some` fixes the node at a position until cleared with `None`.
	fn set_pin(&mut self, idx: usize, pin: Option<(f64, f64)>);
	fn step(&mut self, dt: f64);
	fn positions(&self) -> Vec<(f64, f64)>;
	/// Overwrites positions of every node that is not pinned.
	fn set_positions(&mut self, positions: &[(f64, f64)]);
}

/// [`PhysicsBackend`] over the `force_graph` crate.
///
/// Its spring has no rest length, so the spring is disabled here and the
/// driver applies the link force instead.
pub struct ForceGraphBackend {
	graph: ForceGraph<usize, ()>,
	indices: Vec<DefaultNodeIdx>,
}

impl ForceGraphBackend {
	pub fn new() -> Self {
		Self {
			graph: ForceGraph::new(SimulationParameters::default()),
			indices: Vec::new(),
		}
	}
}

impl Default for ForceGraphBackend {
	fn default() -> Self {
		Self::new()
	}
}

impl PhysicsBackend for ForceGraphBackend {
	fn add_node(&mut self, x: f64, y: f64) -> usize {
		let idx = self.indices.len();
		let node = self.graph.add_node(NodeData {
			x: x as f32,
			y: y as f32,
			mass: NODE_MASS,
			is_anchor: false,
			user_data: idx,
		});
		self.indices.push(node);
		idx
	}

	fn add_edge(&mut self, a: usize, b: usize) {
		if let (Some(&a), Some(&b)) = (self.indices.get(a), self.indices.get(b)) {
			self.graph.add_edge(a, b, EdgeData::default());
		}
	}

	fn configure(&mut self, config: &ForceConfig) {
		self.graph.parameters = SimulationParameters {
			force_charge: (-config.charge * CHARGE_SCALE) as f32,
			force_spring: 0.0,
			force_max: config.max_force as f32,
			node_speed: config.node_speed as f32,
			damping_factor: config.damping as f32,
		};
	}

	fn set_pin(&mut self, idx: usize, pin: Option<(f64, f64)>) {
		self.graph.visit_nodes_mut(|node| {
			if node.data.user_data == idx {
				match pin {
					Some((x, y)) => {
						node.data.x = x as f32;
						node.data.y = y as f32;
						node.data.is_anchor = true;
					}
					None => node.data.is_anchor = false,
				}
			}
		});
	}

	fn step(&mut self, dt: f64) {
		self.graph.update(dt as f32);
	}

	fn positions(&self) -> Vec<(f64, f64)> {
		let raw = self.graph.get_graph();
		self.indices
			.iter()
			.map(|&i| (raw[i].x() as f64, raw[i].y() as f64))
			.collect()
	}

	fn set_positions(&mut self, positions: &[(f64, f64)]) {
		self.graph.visit_nodes_mut(|node| {
			if node.data.is_anchor {
				return;
			}
			if let Some(&(x, y)) = positions.get(node.data.user_data) {
				node.data.x = x as f32;
				node.data.y = y as f32;
			}
		});
	}
}

/// Linear point scale placing the four seasons evenly across the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeasonScale {
	pub start: f64,
	pub end: f64,
}

impl SeasonScale {
	pub fn for_width(width: f64) -> Self {
		Self {
			start: width * SEASON_MARGIN,
			end: width * (1.0 - SEASON_MARGIN),
		}
	}

	pub fn x(&self, season: Season) -> f64 {
		let step = (self.end - self.start) / (Season::ALL.len() - 1) as f64;
		self.start + step * season.ordinal() as f64
	}

	pub fn midpoint(&self) -> f64 {
		(self.start + self.end) / 2.0
	}

	/// Target for a node's first season, or the midpoint when it has none.
	pub fn target(&self, season: Option<Season>) -> f64 {
		season.map_or_else(|| self.midpoint(), |s| self.x(s))
	}
}

/// Runs the backend and applies the positional forces each tick.
pub struct LayoutDriver<B: PhysicsBackend> {
	backend: B,
	config: ForceConfig,
	seasons: Vec<Option<Season>>,
	edges: Vec<Edge>,
	pins: Vec<Option<(f64, f64)>>,
	positions: Vec<(f64, f64)>,
	scale: SeasonScale,
	center: (f64, f64),
	alpha: f64,
	alpha_target: f64,
}

impl<B: PhysicsBackend> LayoutDriver<B> {
	pub fn new(mut backend: B, graph: &ProjectGraph, config: ForceConfig, width: f64, height: f64) -> Self {
		backend.configure(&config);
		let n = graph.nodes.len();
		for i in 0..n {
			let angle = (i as f64) * 2.0 * PI / n as f64;
			backend.add_node(width / 2.0 + 100.0 * angle.cos(), height / 2.0 + 100.0 * angle.sin());
		}
		for edge in &graph.edges {
			backend.add_edge(edge.a, edge.b);
		}
		let positions = backend.positions();

		Self {
			backend,
			config,
			seasons: graph.nodes.iter().map(|n| n.first_season()).collect(),
			edges: graph.edges.clone(),
			pins: vec![None; n],
			positions,
			scale: SeasonScale::for_width(width),
			center: (width / 2.0, height / 2.0),
			alpha: 1.0,
			alpha_target: 0.0,
		}
	}

	pub fn positions(&self) -> &[(f64, f64)] {
		&self.positions
	}

	pub fn position(&self, idx: usize) -> Option<(f64, f64)> {
		self.positions.get(idx).copied()
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn is_settled(&self) -> bool {
		self.alpha < self.config.alpha_min && self.alpha_target < self.config.alpha_min
	}

	pub fn center(&self) -> (f64, f64) {
		self.center
	}

	pub fn season_scale(&self) -> SeasonScale {
		self.scale
	}

	/// Horizontal bias target of node `idx`.
	pub fn target_x(&self, idx: usize) -> f64 {
		self.scale
			.target(self.seasons.get(idx).copied().flatten())
	}

	pub fn is_pinned(&self, idx: usize) -> bool {
		self.pins.get(idx).is_some_and(Option::is_some)
	}

	/// Recomputes the season axis and center target, then reheats in place.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.scale = SeasonScale::for_width(width);
		self.center = (width / 2.0, height / 2.0);
		self.alpha = self.alpha.max(self.config.resize_alpha);
		debug!("layout resized to {}x{}", width, height);
	}

	/// Pins `idx` where it stands and holds the simulation warm.
	pub fn start_drag(&mut self, idx: usize) {
		let Some(pos) = self.position(idx) else {
			return;
		};
		self.pin(idx, Some(pos));
		self.alpha_target = self.config.drag_alpha_target;
		self.alpha = self.alpha.max(self.config.drag_alpha_target);
	}

	pub fn drag_to(&mut self, idx: usize, x: f64, y: f64) {
		if self.is_pinned(idx) {
			self.pin(idx, Some((x, y)));
		}
	}

	/// Releases the pin and lets the energy decay back to rest.
	pub fn end_drag(&mut self, idx: usize) {
		self.pin(idx, None);
		self.alpha_target = 0.0;
	}

	fn pin(&mut self, idx: usize, pin: Option<(f64, f64)>) {
		let Some(slot) = self.pins.get_mut(idx) else {
			return;
		};
		*slot = pin;
		self.backend.set_pin(idx, pin);
		if let Some(p) = pin {
			self.positions[idx] = p;
		}
	}

	/// Advances one frame. Returns `false` once the layout has come to rest.
	pub fn tick(&mut self) -> bool {
		if self.is_settled() {
			return false;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		self.backend.step(self.config.time_step);
		let mut positions = self.backend.positions();
		self.apply_link_force(&mut positions);
		self.apply_position_bias(&mut positions);
		self.apply_centering(&mut positions);
		self.backend.set_positions(&positions);
		self.positions = positions;
		true
	}

	fn free(&self, idx: usize) -> bool {
		self.pins[idx].is_none()
	}

	fn apply_link_force(&self, positions: &mut [(f64, f64)]) {
		let k = self.config.link_strength * self.alpha;
		for edge in &self.edges {
			let (ax, ay) = positions[edge.a];
			let (bx, by) = positions[edge.b];
			let (dx, dy) = (bx - ax, by - ay);
			let dist = (dx * dx + dy * dy).sqrt().max(1e-6);
			let l = (dist - self.config.link_distance) / dist * k;
			let (mx, my) = (dx * l * 0.5, dy * l * 0.5);
			if self.free(edge.a) {
				positions[edge.a].0 += mx;
				positions[edge.a].1 += my;
			}
			if self.free(edge.b) {
				positions[edge.b].0 -= mx;
				positions[edge.b].1 -= my;
			}
		}
	}

	fn apply_position_bias(&self, positions: &mut [(f64, f64)]) {
		let (kx, ky) = (self.config.x_strength * self.alpha, self.config.y_strength * self.alpha);
		for (i, p) in positions.iter_mut().enumerate() {
			if !self.free(i) {
				continue;
			}
			p.0 += (self.target_x(i) - p.0) * kx;
			p.1 += (self.center.1 - p.1) * ky;
		}
	}

	fn apply_centering(&self, positions: &mut [(f64, f64)]) {
		let free: Vec<usize> = (0..positions.len()).filter(|&i| self.free(i)).collect();
		if free.is_empty() {
			return;
		}
		let n = free.len() as f64;
		let (sx, sy) = free.iter().fold((0.0, 0.0), |(sx, sy), &i| {
			(sx + positions[i].0, sy + positions[i].1)
		});
		let (dx, dy) = (
			(self.center.0 - sx / n) * self.config.center_strength,
			(self.center.1 - sy / n) * self.config.center_strength,
		);
		for i in free {
			positions[i].0 += dx;
			positions[i].1 += dy;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dataset::ProjectNode;

	#[derive(Default)]
	struct RecordingBackend {
		positions: Vec<(f64, f64)>,
		pinned: Vec<bool>,
		edges: Vec<(usize, usize)>,
		steps: usize,
		configured: Option<ForceConfig>,
	}

	impl PhysicsBackend for RecordingBackend {
		fn add_node(&mut self, x: f64, y: f64) -> usize {
			self.positions.push((x, y));
			self.pinned.push(false);
			self.positions.len() - 1
		}
		fn add_edge(&mut self, a: usize, b: usize) {
			self.edges.push((a, b));
		}
		fn configure(&mut self, config: &ForceConfig) {
			self.configured = Some(config.clone());
		}
		fn set_pin(&mut self, idx: usize, pin: Option<(f64, f64)>) {
			self.pinned[idx] = pin.is_some();
			if let Some(p) = pin {
				self.positions[idx] = p;
			}
		}
		fn step(&mut self, _dt: f64) {
			self.steps += 1;
		}
		fn positions(&self) -> Vec<(f64, f64)> {
			self.positions.clone()
		}
		fn set_positions(&mut self, positions: &[(f64, f64)]) {
			for (i, p) in positions.iter().enumerate() {
				if !self.pinned[i] {
					self.positions[i] = *p;
				}
			}
		}
	}

	fn graph(schedules: &[&str]) -> ProjectGraph {
		ProjectGraph {
			nodes: schedules
				.iter()
				.enumerate()
				.map(|(i, s)| {
					let mut node = ProjectNode::named(format!("n{i}"));
					node.schedule = crate::dataset::split_list(s);
					node
				})
				.collect(),
			edges: Vec::new(),
		}
	}

	fn driver(g: &ProjectGraph) -> LayoutDriver<RecordingBackend> {
		LayoutDriver::new(RecordingBackend::default(), g, ForceConfig::default(), 1000.0, 600.0)
	}

	#[test]
	fn seasons_are_spaced_evenly_in_order() {
		let scale = SeasonScale::for_width(1000.0);
		let xs: Vec<f64> = Season::ALL.iter().map(|&s| scale.x(s)).collect();
		assert_eq!(xs[0], 150.0);
		assert_eq!(xs[3], 850.0);
		assert!(xs.windows(2).all(|w| w[0] < w[1]));
		assert_eq!(scale.midpoint(), 500.0);
	}

	#[test]
	fn only_first_schedule_entry_drives_the_target() {
		let g = graph(&["Fall, Winter", "", "Monsoon"]);
		let d = driver(&g);
		assert_eq!(d.target_x(0), d.season_scale().x(Season::Fall));
		assert_eq!(d.target_x(1), d.season_scale().midpoint());
		assert_eq!(d.target_x(2), d.season_scale().midpoint());
	}

	#[test]
	fn backend_receives_nodes_edges_and_config() {
		let mut g = graph(&["", "", ""]);
		g.edges = vec![Edge { a: 0, b: 2 }];
		let d = driver(&g);
		assert_eq!(d.backend.positions.len(), 3);
		assert_eq!(d.backend.edges, vec![(0, 2)]);
		assert_eq!(d.backend.configured, Some(ForceConfig::default()));
	}

	#[test]
	fn bias_pulls_towards_the_season_column() {
		let g = graph(&["Winter"]);
		let mut d = driver(&g);
		d.positions[0] = (900.0, 300.0);
		d.backend.positions[0] = (900.0, 300.0);
		let before = (d.target_x(0) - 900.0).abs();
		// A lone node is re-centred each tick, so compare against the bias alone.
		let mut p = vec![(900.0, 300.0)];
		d.apply_position_bias(&mut p);
		assert!((d.target_x(0) - p[0].0).abs() < before);
		assert!(d.tick());
		assert_eq!(d.backend.steps, 1);
	}

	#[test]
	fn link_force_moves_endpoints_towards_rest_length() {
		let mut g = graph(&["", ""]);
		g.edges = vec![Edge { a: 0, b: 1 }];
		let d = driver(&g);
		let mut p = vec![(0.0, 0.0), (400.0, 0.0)];
		d.apply_link_force(&mut p);
		let dist = p[1].0 - p[0].0;
		assert!(dist < 400.0 && dist > d.config.link_distance);
	}

	#[test]
	fn resize_reheats_without_resetting_positions() {
		let g = graph(&["Summer", ""]);
		let mut d = driver(&g);
		while d.tick() {}
		assert!(d.is_settled());
		let before = d.positions().to_vec();

		d.resize(2000.0, 1000.0);
		assert_eq!(d.positions(), before.as_slice());
		assert_eq!(d.center(), (1000.0, 500.0));
		assert_eq!(d.target_x(1), 1000.0);
		assert!(d.alpha() >= ForceConfig::default().resize_alpha);
		assert!(d.tick());
	}

	#[test]
	fn dragged_node_stays_pinned_until_release() {
		let g = graph(&["Spring", "Fall"]);
		let mut d = driver(&g);
		d.start_drag(0);
		d.drag_to(0, 42.0, 24.0);
		for _ in 0..50 {
			d.tick();
		}
		assert_eq!(d.position(0), Some((42.0, 24.0)));
		assert!(d.is_pinned(0));
		assert!(!d.is_settled());

		d.end_drag(0);
		assert!(!d.is_pinned(0));
		d.tick();
		assert_ne!(d.position(0), Some((42.0, 24.0)));
	}

	#[test]
	fn drag_reheat_decays_after_release() {
		let g = graph(&[""]);
		let mut d = driver(&g);
		while d.tick() {}
		d.start_drag(0);
		assert!(d.alpha() >= ForceConfig::default().drag_alpha_target);
		d.end_drag(0);
		let mut frames = 0;
		while d.tick() {
			frames += 1;
		}
		assert!(frames > 0);
		assert!(d.is_settled());
	}

	#[test]
	fn drag_to_ignores_unpinned_nodes() {
		let g = graph(&[""]);
		let mut d = driver(&g);
		let before = d.position(0);
		d.drag_to(0, 1.0, 1.0);
		assert_eq!(d.position(0), before);
	}

	#[test]
	fn force_graph_backend_holds_pinned_nodes() {
		let mut backend = ForceGraphBackend::new();
		backend.configure(&ForceConfig::default());
		let a = backend.add_node(0.0, 0.0);
		let b = backend.add_node(5.0, 0.0);
		backend.add_edge(a, b);
		backend.set_pin(a, Some((10.0, 10.0)));
		for _ in 0..10 {
			backend.step(0.016);
		}
		let p = backend.positions();
		assert_eq!(p[a], (10.0, 10.0));
		assert_ne!(p[b], (5.0, 0.0));

		backend.set_positions(&[(0.0, 0.0), (1.0, 2.0)]);
		let p = backend.positions();
		assert_eq!(p[a], (10.0, 10.0));
		assert_eq!(p[b], (1.0, 2.0));
	}
}
