use leptos::prelude::*;

use super::component::ProjectGraphCanvas;
use super::interaction::AppState;
use super::panel::{FilterPanel, GraphControls};
use super::popup::ProjectPopup;
use crate::config::GraphConfig;
use crate::dataset::ProjectGraph;

/// Canvas, filter panel, controls and popup sharing one [`AppState`].
#[component]
pub fn ProjectExplorer(graph: ProjectGraph, config: GraphConfig) -> impl IntoView {
	let app = RwSignal::new(AppState::new(graph, config.scale.dimmed_opacity));
	let anchor = RwSignal::new(None::<(f64, f64)>);
	let viewport = RwSignal::new((0.0, 0.0));

	view! {
		<div class="fullscreen-graph">
			<ProjectGraphCanvas app=app config=config anchor=anchor viewport=viewport />
			<FilterPanel app=app />
			<GraphControls />
			<ProjectPopup app=app anchor=anchor viewport=viewport />
		</div>
	}
}
