use leptos::prelude::*;
use log::warn;

use super::interaction::AppState;
use super::popup::field_tag;

/// Side panel with type tags, field tags, name search and reset.
#[component]
pub fn FilterPanel(app: RwSignal<AppState>) -> impl IntoView {
	let search = RwSignal::new(String::new());
	let (types, fields) = app.with_untracked(|s| (s.types().to_vec(), s.fields().to_vec()));

	let on_input = move |ev: leptos::ev::Event| {
		let value = event_target_value(&ev);
		app.update(|s| s.set_search(&value));
		search.set(value);
	};
	let on_reset = move |_: leptos::ev::MouseEvent| {
		search.set(String::new());
		app.update(|s| s.reset_filters());
	};

	view! {
		<aside class="filter-panel">
			<input
				class="filter-search"
				type="search"
				placeholder="Search projects"
				prop:value=move || search.get()
				on:input=on_input
			/>
			<h3>"Type"</h3>
			<div class="filter-tags">
				{types.into_iter().map(|kind| type_tag(app, kind)).collect_view()}
			</div>
			<h3>"Fields"</h3>
			<div class="filter-tags">
				{fields.into_iter().map(|field| field_tag(app, field)).collect_view()}
			</div>
			<button class="filter-reset" on:click=on_reset>"Reset filters"</button>
		</aside>
	}
}

fn type_tag(app: RwSignal<AppState>, kind: String) -> impl IntoView {
	let (key, label) = (kind.clone(), kind.clone());
	let class = move || {
		if app.with(|s| s.filter().is_type_selected(&key)) {
			"tag selected"
		} else {
			"tag"
		}
	};
	view! {
		<button class=class on:click=move |_| app.update(|s| s.toggle_type(&kind))>
			{label}
		</button>
	}
}

/// Enters fullscreen on the document, or leaves it if already there.
pub fn toggle_fullscreen() {
	let Some(document) = web_sys::window().and_then(|w| w.document()) else {
		return;
	};
	if document.fullscreen_element().is_some() {
		document.exit_fullscreen();
	} else if let Some(root) = document.document_element() {
		if let Err(e) = root.request_fullscreen() {
			warn!("fullscreen refused: {:?}", e);
		}
	}
}

/// Floating buttons over the canvas.
#[component]
pub fn GraphControls() -> impl IntoView {
	view! {
		<div class="graph-controls">
			<button title="Toggle fullscreen" on:click=move |_| toggle_fullscreen()>"⛶"</button>
		</div>
	}
}
