//! Derives the undirected edge list from each node's declared connections.

use std::collections::{HashMap, HashSet};

use log::debug;

use super::model::{Edge, ProjectNode};

/// Maps each node name to its index. A repeated name resolves to its last row.
pub fn name_index(nodes: &[ProjectNode]) -> HashMap<&str, usize> {
	nodes
		.iter()
		.enumerate()
		.map(|(i, node)| (node.name.as_str(), i))
		.collect()
}

/// Resolves every declared connection into a deduplicated, self-loop free edge list.
///
/// Emission follows node order then peer order. A connection declared from
/// one side, the other, or both yields exactly one edge. Pairs are keyed by
/// project name, so rows repeating a name never add a second edge between
/// the same two projects or an edge from a project to itself.
pub fn build_edges(nodes: &[ProjectNode]) -> Vec<Edge> {
	let index = name_index(nodes);
	let mut seen: HashSet<(&str, &str)> = HashSet::new();
	let mut edges = Vec::new();

	for (i, node) in nodes.iter().enumerate() {
		for peer in &node.connected_project_names {
			let Some(&j) = index.get(peer.as_str()) else {
				debug!("{}: connection to unknown project {:?} dropped", node.name, peer);
				continue;
			};
			let (own, other) = (node.name.as_str(), nodes[j].name.as_str());
			if own == other {
				continue;
			}
			let Some(edge) = Edge::new(i, j) else {
				continue;
			};
			if seen.insert(if own < other { (own, other) } else { (other, own) }) {
				edges.push(edge);
			}
		}
	}
	edges
}

/// Per-node neighbour lists for an edge set over `node_count` nodes.
pub fn adjacency(node_count: usize, edges: &[Edge]) -> Vec<Vec<usize>> {
	let mut adj = vec![Vec::new(); node_count];
	for edge in edges {
		adj[edge.a].push(edge.b);
		adj[edge.b].push(edge.a);
	}
	adj
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(name: &str, peers: &[&str]) -> ProjectNode {
		let mut n = ProjectNode::named(name);
		n.connected_project_names = peers.iter().map(|p| p.to_string()).collect();
		n
	}

	#[test]
	fn mutual_declarations_yield_one_edge() {
		let nodes = vec![node("A", &["B"]), node("B", &["A", "C"]), node("C", &[])];
		let edges = build_edges(&nodes);
		assert_eq!(edges, vec![Edge { a: 0, b: 1 }, Edge { a: 1, b: 2 }]);
	}

	#[test]
	fn unknown_names_and_self_references_are_dropped() {
		let nodes = vec![node("A", &["A", "Ghost", "B"]), node("B", &["B"])];
		assert_eq!(build_edges(&nodes), vec![Edge { a: 0, b: 1 }]);
	}

	#[test]
	fn repeated_peer_in_one_row_is_deduplicated() {
		let nodes = vec![node("A", &["B", "B"]), node("B", &["A", "A"])];
		assert_eq!(build_edges(&nodes).len(), 1);
	}

	#[test]
	fn no_duplicate_pairs_over_a_dense_declaration() {
		let names = ["P", "Q", "R", "S"];
		let nodes: Vec<_> = names.iter().map(|n| node(n, &names)).collect();
		let edges = build_edges(&nodes);
		assert_eq!(edges.len(), 6);
		let unique: HashSet<_> = edges.iter().collect();
		assert_eq!(unique.len(), edges.len());
		assert!(edges.iter().all(|e| e.a < e.b));
	}

	#[test]
	fn repeated_names_add_no_duplicate_pair_or_self_loop() {
		// "A" resolves to its last row, index 2.
		let nodes = vec![node("A", &["B", "A"]), node("B", &[]), node("A", &["B"])];
		let edges = build_edges(&nodes);
		assert_eq!(edges, vec![Edge { a: 0, b: 1 }]);
		let pairs: HashSet<(&str, &str)> = edges
			.iter()
			.map(|e| (nodes[e.a].name.as_str(), nodes[e.b].name.as_str()))
			.collect();
		assert_eq!(pairs.len(), edges.len());
		assert!(edges.iter().all(|e| nodes[e.a].name != nodes[e.b].name));
	}

	#[test]
	fn adjacency_is_symmetric() {
		let edges = vec![Edge { a: 0, b: 2 }, Edge { a: 1, b: 2 }];
		let adj = adjacency(3, &edges);
		assert_eq!(adj[2], vec![0, 1]);
		assert_eq!(adj[0], vec![2]);
		assert_eq!(adj[1], vec![2]);
	}
}
