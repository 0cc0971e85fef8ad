//! Visual sizing and opacity constants, and their zoom-adjusted values.

use serde::Deserialize;

/// Sizes in graph units and opacity levels used when drawing.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScaleConfig {
	/// Radius of a node with `scale == 1`.
	pub node_radius: f64,
	/// Extra pick tolerance around each node, in screen pixels.
	pub hit_slop: f64,
	/// Label font size in screen pixels at zoom 1.
	pub label_size: f64,
	/// Opacity of a dimmed node.
	pub dimmed_opacity: f64,
	/// Opacity of an edge between two fully visible nodes.
	pub edge_opacity: f64,
	/// Edge stroke width in screen pixels.
	pub edge_width: f64,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node_radius: 10.0,
			hit_slop: 4.0,
			label_size: 11.0,
			dimmed_opacity: 0.15,
			edge_opacity: 0.6,
			edge_width: 1.5,
		}
	}
}

impl ScaleConfig {
	/// Radius of a node with the given dataset `scale`.
	pub fn radius(&self, scale: f64) -> f64 {
		self.node_radius * scale
	}
}

/// [`ScaleConfig`] values converted for the current zoom factor `k`.
pub struct ScaledValues {
	pub label_font_px: f64,
	pub edge_width: f64,
	pub hit_slop: f64,
	pub ring_width: f64,
}

impl ScaledValues {
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		Self {
			label_font_px: config.label_size / k.max(0.5),
			edge_width: config.edge_width / k,
			hit_slop: config.hit_slop / k,
			ring_width: 2.0 / k,
		}
	}
}
