//! Turns the project spreadsheet export into a [`ProjectGraph`].

use log::{error, info, warn};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use super::error::{LoadError, Result};
use super::graph::build_edges;
use super::model::{FALLBACK_COLOR, ProjectGraph, ProjectNode};

const DRIVE_FILE_PREFIX: &str = "https://drive.google.com/file/d/";

/// One spreadsheet row, keyed by the export's column headers.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProjectRow {
	#[serde(rename = "project name")]
	name: String,
	#[serde(rename = "type")]
	kind: String,
	fields: String,
	schedule: String,
	#[serde(rename = "connected projects")]
	connected: String,
	color: String,
	scale: String,
	description: String,
	#[serde(rename = "previous event")]
	previous_event: String,
	#[serde(rename = "photo link")]
	photo: String,
}

impl ProjectRow {
	fn into_node(self) -> ProjectNode {
		let name = self.name.trim().to_string();
		let color = self.color.trim();
		ProjectNode {
			id: name.clone(),
			name,
			kind: non_empty(&self.kind),
			fields: split_list(&self.fields),
			schedule: split_list(&self.schedule),
			color: if color.is_empty() {
				FALLBACK_COLOR.to_string()
			} else {
				color.to_string()
			},
			scale: parse_scale(&self.scale),
			description: non_empty(&self.description),
			previous_event_url: non_empty(&self.previous_event),
			photo_url: non_empty(&normalize_photo_url(self.photo.trim())),
			connected_project_names: split_list(&self.connected),
		}
	}
}

fn non_empty(raw: &str) -> Option<String> {
	let trimmed = raw.trim();
	(!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Splits a comma separated cell, trimming tokens and dropping empty ones.
pub fn split_list(raw: &str) -> Vec<String> {
	raw.split(',')
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.map(str::to_string)
		.collect()
}

/// Parses the `scale` cell. Missing, unparsable, or non-positive values become `1`.
pub fn parse_scale(raw: &str) -> f64 {
	match raw.trim().parse::<f64>() {
		Ok(v) if v.is_finite() && v > 0.0 => v,
		_ => 1.0,
	}
}

/// Rewrites a Drive share link into a direct thumbnail URL. Other URLs pass through.
pub fn normalize_photo_url(url: &str) -> String {
	let Some(rest) = url.strip_prefix(DRIVE_FILE_PREFIX) else {
		return url.to_string();
	};
	match rest.split(['/', '?', '#']).next() {
		Some(id) if !id.is_empty() => format!("https://drive.google.com/thumbnail?id={id}&sz=w400"),
		_ => url.to_string(),
	}
}

/// Parses CSV text into nodes and their deduplicated edges.
///
/// Rows that fail to decode are skipped with a warning, as are rows without a
/// project name. Only an unreadable header row fails the whole parse.
pub fn parse_dataset(text: &str) -> Result<ProjectGraph> {
	let mut reader = csv::ReaderBuilder::new()
		.flexible(true)
		.trim(csv::Trim::Headers)
		.from_reader(text.as_bytes());

	// Header casing in exported sheets is inconsistent.
	let headers = reader.headers()?.clone();
	let lowered: csv::StringRecord = headers.iter().map(|h| h.to_ascii_lowercase()).collect();
	reader.set_headers(lowered);

	let mut nodes = Vec::new();
	for (line, row) in reader.deserialize::<ProjectRow>().enumerate() {
		match row {
			Ok(row) if row.name.trim().is_empty() => {
				warn!("row {}: no project name, skipped", line + 1);
			}
			Ok(row) => nodes.push(row.into_node()),
			Err(e) => warn!("row {}: {}", line + 1, e),
		}
	}

	let edges = build_edges(&nodes);
	Ok(ProjectGraph { nodes, edges })
}

async fn fetch_text(url: &str) -> Result<String> {
	let fetch_err = |message: String| LoadError::Fetch {
		url: url.to_string(),
		message,
	};
	let window = web_sys::window().ok_or_else(|| fetch_err("no window".into()))?;
	let response = JsFuture::from(window.fetch_with_str(url))
		.await
		.map_err(|e| fetch_err(format!("{e:?}")))?;
	let response: Response = response
		.dyn_into()
		.map_err(|_| fetch_err("not a Response".into()))?;
	if !response.ok() {
		return Err(LoadError::Status {
			url: url.to_string(),
			status: response.status(),
		});
	}
	let body = response.text().map_err(|e| fetch_err(format!("{e:?}")))?;
	JsFuture::from(body)
		.await
		.ok()
		.and_then(|v| v.as_string())
		.ok_or_else(|| LoadError::Body {
			url: url.to_string(),
		})
}

/// Fetches and parses the dataset at `url`.
///
/// Never fails: any fetch or parse error is logged and yields an empty graph.
pub async fn load_dataset(url: &str) -> ProjectGraph {
	let parsed = match fetch_text(url).await {
		Ok(text) => parse_dataset(&text),
		Err(e) => Err(e),
	};
	graph_or_empty(url, parsed)
}

/// Logs a failed load and substitutes an empty graph.
fn graph_or_empty(url: &str, parsed: Result<ProjectGraph>) -> ProjectGraph {
	match parsed {
		Ok(graph) => {
			info!(
				"loaded {} projects, {} connections from {}",
				graph.nodes.len(),
				graph.edges.len(),
				url
			);
			graph
		}
		Err(e) => {
			error!("dataset unavailable: {}", e);
			ProjectGraph::default()
		}
	}
}
