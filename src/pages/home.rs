use leptos::prelude::*;

use crate::components::project_graph::ProjectExplorer;
use crate::config::load_config;
use crate::dataset::load_dataset;

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let config = load_config();
	let url = config.dataset_url.clone();
	let dataset = LocalResource::new(move || {
		let url = url.clone();
		async move { load_dataset(&url).await }
	});

	view! {
		<Suspense fallback=|| view! { <p class="status">"Loading projects…"</p> }>
			{move || {
				dataset
					.get()
					.map(|graph| {
						if graph.is_empty() {
							view! { <p class="status">"No projects could be loaded."</p> }.into_any()
						} else {
							view! { <ProjectExplorer graph=graph config=config.clone() /> }.into_any()
						}
					})
			}}
		</Suspense>
	}
}
