use super::interaction::ClickTarget;
use super::layout::{ForceConfig, ForceGraphBackend, LayoutDriver, PhysicsBackend};
use super::scale::{ScaleConfig, ScaledValues};
use crate::config::GraphConfig;
use crate::dataset::ProjectGraph;

/// Screen distance a press may travel and still count as a click.
pub const CLICK_SLOP: f64 = 4.0;

#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<usize>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
	pub moved: bool,
}

/// Canvas-side state: the running layout plus pan/zoom and pointer gestures.
pub struct CanvasState<B: PhysicsBackend = ForceGraphBackend> {
	pub layout: LayoutDriver<B>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
	/// Node under the pointer while no gesture is running.
	pub hovered: Option<usize>,
	pub scale: ScaleConfig,
	radii: Vec<f64>,
	config: GraphConfig,
}

impl CanvasState {
	pub fn new(graph: &ProjectGraph, config: &GraphConfig, width: f64, height: f64) -> Self {
		Self::with_backend(ForceGraphBackend::new(), graph, config, width, height)
	}
}

impl<B: PhysicsBackend> CanvasState<B> {
	pub fn with_backend(backend: B, graph: &ProjectGraph, config: &GraphConfig, width: f64, height: f64) -> Self {
		let force: ForceConfig = config.force.clone();
		Self {
			layout: LayoutDriver::new(backend, graph, force, width, height),
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			width,
			height,
			hovered: None,
			radii: graph.nodes.iter().map(|n| config.scale.radius(n.scale)).collect(),
			scale: config.scale.clone(),
			config: config.clone(),
		}
	}

	pub fn radius(&self, idx: usize) -> f64 {
		self.radii.get(idx).copied().unwrap_or(self.scale.node_radius)
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(
			gx * self.transform.k + self.transform.x,
			gy * self.transform.k + self.transform.y,
		)
	}

	/// Screen position of a node, used to anchor its popup.
	pub fn screen_position(&self, idx: usize) -> Option<(f64, f64)> {
		self.layout
			.position(idx)
			.map(|(x, y)| self.graph_to_screen(x, y))
	}

	/// The topmost node under a screen point. Later nodes draw on top.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let slop = ScaledValues::new(&self.scale, self.transform.k).hit_slop;
		self.layout
			.positions()
			.iter()
			.enumerate()
			.rev()
			.find(|&(i, &(x, y))| {
				let (dx, dy) = (x - gx, y - gy);
				(dx * dx + dy * dy).sqrt() < self.radius(i) + slop
			})
			.map(|(i, _)| i)
	}

	pub fn is_gesture_active(&self) -> bool {
		self.drag.active || self.pan.active
	}

	/// Starts a node drag or a background pan. Returns the pressed node.
	///
	/// The node is only pinned, and the layout reheated, once the pointer
	/// travels past [`CLICK_SLOP`].
	pub fn press(&mut self, sx: f64, sy: f64) -> Option<usize> {
		let hit = self.node_at_position(sx, sy);
		if let Some(idx) = hit {
			let (nx, ny) = self.layout.position(idx).unwrap_or_default();
			self.drag = DragState {
				active: true,
				node_idx: Some(idx),
				start_x: sx,
				start_y: sy,
				node_start_x: nx,
				node_start_y: ny,
				moved: false,
			};
		} else {
			self.pan = PanState {
				active: true,
				start_x: sx,
				start_y: sy,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
				moved: false,
			};
		}
		hit
	}

	pub fn move_pointer(&mut self, sx: f64, sy: f64) {
		if self.drag.active {
			let (dx, dy) = (sx - self.drag.start_x, sy - self.drag.start_y);
			if !self.drag.moved && dx.hypot(dy) > CLICK_SLOP {
				self.drag.moved = true;
				if let Some(idx) = self.drag.node_idx {
					self.layout.start_drag(idx);
				}
			}
			if let Some(idx) = self.drag.node_idx {
				let k = self.transform.k;
				self.layout
					.drag_to(idx, self.drag.node_start_x + dx / k, self.drag.node_start_y + dy / k);
			}
		} else if self.pan.active {
			let (dx, dy) = (sx - self.pan.start_x, sy - self.pan.start_y);
			self.pan.moved |= dx.hypot(dy) > CLICK_SLOP;
			self.transform.x = self.pan.transform_start_x + dx;
			self.transform.y = self.pan.transform_start_y + dy;
		}
	}

	/// Ends the gesture. A press that barely moved is reported as a click.
	pub fn release(&mut self) -> Option<ClickTarget> {
		let mut click = None;
		if self.drag.active {
			if let Some(idx) = self.drag.node_idx {
				if self.drag.moved {
					self.layout.end_drag(idx);
				} else {
					click = Some(ClickTarget::Node(idx));
				}
			}
		} else if self.pan.active && !self.pan.moved {
			click = Some(ClickTarget::Background);
		}
		self.drag = DragState::default();
		self.pan = PanState::default();
		click
	}

	/// Zooms by `factor` about a screen point, within the configured bounds.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = self.config.clamp_zoom(self.transform.k * factor);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn tick(&mut self) -> bool {
		self.layout.tick()
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.layout.resize(width, height);
	}
}
