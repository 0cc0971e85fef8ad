//! Startup configuration read from the host page.

use log::{info, warn};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, UrlSearchParams};

use crate::components::project_graph::{ForceConfig, ScaleConfig};

/// Id of the optional `<script type="application/json">` element holding overrides.
pub const CONFIG_ELEMENT_ID: &str = "graph-config";

/// Application settings. Every field has a default, so partial JSON is fine.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GraphConfig {
	/// Where the project CSV is fetched from.
	pub dataset_url: String,
	pub min_zoom: f64,
	pub max_zoom: f64,
	pub force: ForceConfig,
	pub scale: ScaleConfig,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			dataset_url: "data/projects.csv".to_string(),
			min_zoom: 0.2,
			max_zoom: 5.0,
			force: ForceConfig::default(),
			scale: ScaleConfig::default(),
		}
	}
}

impl GraphConfig {
	/// Parses a JSON override document, falling back to defaults when malformed.
	pub fn from_json(text: &str) -> Self {
		match serde_json::from_str::<GraphConfig>(text) {
			Ok(mut config) => {
				if config.min_zoom <= 0.0 || config.min_zoom > config.max_zoom {
					warn!(
						"zoom bounds {}..{} rejected, using defaults",
						config.min_zoom, config.max_zoom
					);
					let defaults = Self::default();
					config.min_zoom = defaults.min_zoom;
					config.max_zoom = defaults.max_zoom;
				}
				config
			}
			Err(e) => {
				warn!("failed to parse graph config: {}", e);
				Self::default()
			}
		}
	}

	pub fn clamp_zoom(&self, k: f64) -> f64 {
		k.clamp(self.min_zoom, self.max_zoom)
	}
}

fn config_script_text() -> Option<String> {
	let document = web_sys::window()?.document()?;
	let element = document.get_element_by_id(CONFIG_ELEMENT_ID)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

fn dataset_url_param() -> Option<String> {
	let search = web_sys::window()?.location().search().ok()?;
	UrlSearchParams::new_with_str(&search).ok()?.get("data")
}

/// Reads the config element and the `?data=` query parameter.
pub fn load_config() -> GraphConfig {
	let mut config = config_script_text()
		.map(|text| GraphConfig::from_json(&text))
		.unwrap_or_default();
	if let Some(url) = dataset_url_param().filter(|u| !u.is_empty()) {
		config.dataset_url = url;
	}
	info!("dataset url: {}", config.dataset_url);
	config
}
