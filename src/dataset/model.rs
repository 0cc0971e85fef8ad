//! Project records and the undirected connections between them.

use std::fmt;

/// Fill colour used when a row has no `color` value.
pub const FALLBACK_COLOR: &str = "#69b3a2";

/// The fixed, ordered season enumeration used for horizontal layout bias.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Season {
	Winter,
	Spring,
	Summer,
	Fall,
}

impl Season {
	/// All seasons in layout order.
	pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Fall];

	/// Position of this season within [`Season::ALL`].
	pub fn ordinal(self) -> usize {
		self as usize
	}

	/// Case-insensitive parse of a schedule token. "Autumn" is accepted for `Fall`.
	pub fn parse(token: &str) -> Option<Self> {
		match token.trim().to_ascii_lowercase().as_str() {
			"winter" => Some(Self::Winter),
			"spring" => Some(Self::Spring),
			"summer" => Some(Self::Summer),
			"fall" | "autumn" => Some(Self::Fall),
			_ => None,
		}
	}
}

impl fmt::Display for Season {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Winter => "Winter",
			Self::Spring => "Spring",
			Self::Summer => "Summer",
			Self::Fall => "Fall",
		})
	}
}

/// One visualised project record.
///
/// `name` doubles as the identity; the layout position lives in the physics
/// backend, not here.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectNode {
	pub id: String,
	pub name: String,
	pub kind: Option<String>,
	/// Tags in declaration order.
	pub fields: Vec<String>,
	/// Raw schedule tokens in declaration order.
	pub schedule: Vec<String>,
	pub color: String,
	pub scale: f64,
	pub description: Option<String>,
	pub previous_event_url: Option<String>,
	pub photo_url: Option<String>,
	pub connected_project_names: Vec<String>,
}

impl ProjectNode {
	/// A node with the given name and every optional attribute unset.
	pub fn named(name: impl Into<String>) -> Self {
		let name = name.into();
		Self {
			id: name.clone(),
			name,
			kind: None,
			fields: Vec::new(),
			schedule: Vec::new(),
			color: FALLBACK_COLOR.to_string(),
			scale: 1.0,
			description: None,
			previous_event_url: None,
			photo_url: None,
			connected_project_names: Vec::new(),
		}
	}

	/// The season that drives layout: the first schedule entry, if it names one.
	pub fn first_season(&self) -> Option<Season> {
		self.schedule.first().and_then(|s| Season::parse(s))
	}

	/// Exact, case-sensitive tag membership.
	pub fn has_field(&self, field: &str) -> bool {
		self.fields.iter().any(|f| f == field)
	}
}

/// An undirected connection stored by node index, `a < b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
	pub a: usize,
	pub b: usize,
}

impl Edge {
	/// Builds the canonical form of the pair, or `None` for a self-loop.
	pub fn new(x: usize, y: usize) -> Option<Self> {
		match x.cmp(&y) {
			std::cmp::Ordering::Less => Some(Self { a: x, b: y }),
			std::cmp::Ordering::Greater => Some(Self { a: y, b: x }),
			std::cmp::Ordering::Equal => None,
		}
	}

	pub fn touches(&self, idx: usize) -> bool {
		self.a == idx || self.b == idx
	}
}

/// The loaded dataset: nodes in row order plus their deduplicated edges.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjectGraph {
	pub nodes: Vec<ProjectNode>,
	pub edges: Vec<Edge>,
}

impl ProjectGraph {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Distinct non-empty types in first-seen order.
	pub fn types(&self) -> Vec<String> {
		let mut out: Vec<String> = Vec::new();
		for kind in self.nodes.iter().filter_map(|n| n.kind.as_ref()) {
			if !out.contains(kind) {
				out.push(kind.clone());
			}
		}
		out
	}

	/// Distinct fields in first-seen order.
	pub fn fields(&self) -> Vec<String> {
		let mut out: Vec<String> = Vec::new();
		for field in self.nodes.iter().flat_map(|n| n.fields.iter()) {
			if !out.contains(field) {
				out.push(field.clone());
			}
		}
		out
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn season_parse_is_case_insensitive() {
		assert_eq!(Season::parse(" summer "), Some(Season::Summer));
		assert_eq!(Season::parse("AUTUMN"), Some(Season::Fall));
		assert_eq!(Season::parse("monsoon"), None);
	}

	#[test]
	fn edge_is_canonical_and_rejects_self_loops() {
		assert_eq!(Edge::new(3, 1), Edge::new(1, 3));
		assert_eq!(Edge::new(2, 2), None);
		let edge = Edge::new(4, 0).unwrap();
		assert_eq!((edge.a, edge.b), (0, 4));
		assert!(edge.touches(4) && !edge.touches(7));
	}

	#[test]
	fn field_membership_is_exact() {
		let mut node = ProjectNode::named("A");
		node.fields = vec!["paint".into(), "dance".into()];
		assert!(node.has_field("dance"));
		assert!(!node.has_field("Dance"));
		assert!(!node.has_field("pain"));
	}

	#[test]
	fn tag_catalogues_keep_first_seen_order() {
		let mut a = ProjectNode::named("A");
		a.kind = Some("Music".into());
		a.fields = vec!["dance".into(), "paint".into()];
		let mut b = ProjectNode::named("B");
		b.kind = Some("Art".into());
		b.fields = vec!["paint".into()];
		let mut c = ProjectNode::named("C");
		c.kind = Some("Music".into());
		let graph = ProjectGraph {
			nodes: vec![a, b, c],
			edges: Vec::new(),
		};
		assert_eq!(graph.types(), vec!["Music", "Art"]);
		assert_eq!(graph.fields(), vec!["dance", "paint"]);
	}
}
