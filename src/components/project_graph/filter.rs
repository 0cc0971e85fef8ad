use std::collections::HashSet;

use crate::dataset::ProjectNode;

/// Whether a node passes the active filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
	Visible,
	Dimmed,
}

/// The active type, field and search predicates. Empty means unrestricted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterState {
	selected_types: HashSet<String>,
	selected_fields: HashSet<String>,
	search_query: String,
}

impl FilterState {
	pub fn toggle_type(&mut self, kind: &str) {
		toggle(&mut self.selected_types, kind);
	}

	pub fn toggle_field(&mut self, field: &str) {
		toggle(&mut self.selected_fields, field);
	}

	pub fn set_search(&mut self, query: &str) {
		self.search_query = query.to_string();
	}

	pub fn reset(&mut self) {
		self.selected_types.clear();
		self.selected_fields.clear();
		self.search_query.clear();
	}

	pub fn is_type_selected(&self, kind: &str) -> bool {
		self.selected_types.contains(kind)
	}

	pub fn is_field_selected(&self, field: &str) -> bool {
		self.selected_fields.contains(field)
	}

	pub fn search_query(&self) -> &str {
		&self.search_query
	}

	pub fn is_empty(&self) -> bool {
		self.selected_types.is_empty() && self.selected_fields.is_empty() && self.search_query.is_empty()
	}

	/// Checks type, then fields, then the name search; the first failing check dims.
	pub fn visibility(&self, node: &ProjectNode) -> Visibility {
		if !self.selected_types.is_empty()
			&& !node.kind.as_ref().is_some_and(|k| self.selected_types.contains(k))
		{
			return Visibility::Dimmed;
		}
		if !self.selected_fields.is_empty()
			&& !self.selected_fields.iter().any(|f| node.has_field(f))
		{
			return Visibility::Dimmed;
		}
		if !self.search_query.is_empty()
			&& !node
				.name
				.to_lowercase()
				.contains(&self.search_query.to_lowercase())
		{
			return Visibility::Dimmed;
		}
		Visibility::Visible
	}
}

fn toggle(set: &mut HashSet<String>, value: &str) {
	if !set.remove(value) {
		set.insert(value.to_string());
	}
}
