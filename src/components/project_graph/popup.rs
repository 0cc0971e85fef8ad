use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use super::interaction::AppState;
use crate::dataset::ProjectNode;

/// Viewports narrower than this get a popup docked to the bottom edge.
pub const MOBILE_BREAKPOINT: f64 = 600.0;
/// Gap between the node and the popup, and between the popup and the viewport edge.
const OFFSET: f64 = 16.0;
const MARGIN: f64 = 8.0;
/// Assumed popup size before it has been measured.
const DEFAULT_POPUP_SIZE: (f64, f64) = (300.0, 240.0);

/// What the popup shows for a node. Empty pieces are `None` or empty and not rendered.
#[derive(Clone, Debug, PartialEq)]
pub struct PopupContent {
	pub photo_url: Option<String>,
	pub name: String,
	/// Type and first schedule value, e.g. "Music · Spring".
	pub subtitle: Option<String>,
	pub description: Option<String>,
	pub fields: Vec<String>,
	pub previous_event_url: Option<String>,
}

impl PopupContent {
	pub fn from_node(node: &ProjectNode) -> Self {
		let parts: Vec<&str> = node
			.kind
			.as_deref()
			.into_iter()
			.chain(node.schedule.first().map(String::as_str))
			.collect();
		Self {
			photo_url: node.photo_url.clone(),
			name: node.name.clone(),
			subtitle: (!parts.is_empty()).then(|| parts.join(" · ")),
			description: node.description.clone(),
			fields: node.fields.clone(),
			previous_event_url: node.previous_event_url.clone(),
		}
	}
}

/// Where the popup goes on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PopupPlacement {
	Floating { left: f64, top: f64 },
	Docked,
}

impl PopupPlacement {
	pub fn to_css(self) -> String {
		match self {
			Self::Floating { left, top } => format!("left: {left}px; top: {top}px;"),
			Self::Docked => "left: 0; right: 0; bottom: 0; width: auto;".to_string(),
		}
	}
}

/// Places a popup of `size` beside `anchor`, flipping to stay inside `viewport`.
pub fn place_popup(anchor: (f64, f64), size: (f64, f64), viewport: (f64, f64)) -> PopupPlacement {
	let ((ax, ay), (w, h), (vw, vh)) = (anchor, size, viewport);
	if vw < MOBILE_BREAKPOINT {
		return PopupPlacement::Docked;
	}
	let mut left = ax + OFFSET;
	if left + w + MARGIN > vw {
		left = ax - OFFSET - w;
	}
	let top = (ay - h / 2.0).min(vh - h - MARGIN);
	PopupPlacement::Floating {
		left: left.max(MARGIN),
		top: top.max(MARGIN),
	}
}

/// Popup for the hovered or clicked project.
#[component]
pub fn ProjectPopup(
	app: RwSignal<AppState>,
	/// Screen position of the focused node, updated every frame.
	anchor: RwSignal<Option<(f64, f64)>>,
	viewport: RwSignal<(f64, f64)>,
) -> impl IntoView {
	let popup_ref = NodeRef::<leptos::html::Div>::new();
	let content = Memo::new(move |_| {
		app.with(|s| s.focused().and_then(|i| s.node(i)).map(PopupContent::from_node))
	});

	let style = move || {
		let (Some(anchor), true) = (anchor.get(), content.with(Option::is_some)) else {
			return "display: none;".to_string();
		};
		let size = popup_ref
			.get()
			.map(|el| (el.offset_width() as f64, el.offset_height() as f64))
			.filter(|&(w, h)| w > 0.0 && h > 0.0)
			.unwrap_or(DEFAULT_POPUP_SIZE);
		place_popup(anchor, size, viewport.get()).to_css()
	};

	view! {
		<div node_ref=popup_ref class="project-popup" style=style>
			{move || content.get().map(|c| popup_body(app, c))}
		</div>
	}
}

fn popup_body(app: RwSignal<AppState>, c: PopupContent) -> impl IntoView {
	let hide_broken = |ev: leptos::ev::ErrorEvent| {
		if let Some(el) = ev.target().and_then(|t| t.dyn_into::<HtmlElement>().ok()) {
			let _ = el.style().set_property("display", "none");
		}
	};

	view! {
		{c.photo_url.map(|url| view! { <img class="popup-photo" src=url alt="" on:error=hide_broken /> })}
		<h2 class="popup-name">{c.name}</h2>
		{c.subtitle.map(|s| view! { <p class="popup-subtitle">{s}</p> })}
		{c.description.map(|d| view! { <p class="popup-description">{d}</p> })}
		{(!c.fields.is_empty()).then(|| view! {
			<div class="popup-fields">
				{c.fields.into_iter().map(|field| field_tag(app, field)).collect_view()}
			</div>
		})}
		{c.previous_event_url.map(|url| view! {
			<a class="popup-link" href=url target="_blank" rel="noopener noreferrer">"Previous event"</a>
		})}
	}
}

/// A field tag that doubles as a field-filter toggle.
pub fn field_tag(app: RwSignal<AppState>, field: String) -> impl IntoView {
	let (key, label) = (field.clone(), field.clone());
	let class = move || {
		if app.with(|s| s.filter().is_field_selected(&key)) {
			"tag selected"
		} else {
			"tag"
		}
	};
	view! {
		<button class=class on:click=move |_| app.update(|s| s.toggle_field(&field))>
			{label}
		</button>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn content_omits_empty_pieces() {
		let node = ProjectNode::named("Bare");
		let c = PopupContent::from_node(&node);
		assert_eq!(c.name, "Bare");
		assert!(c.photo_url.is_none());
		assert!(c.subtitle.is_none());
		assert!(c.description.is_none());
		assert!(c.fields.is_empty());
		assert!(c.previous_event_url.is_none());
	}

	#[test]
	fn subtitle_joins_type_and_first_season() {
		let mut node = ProjectNode::named("Full");
		node.kind = Some("Music".into());
		node.schedule = vec!["Spring".into(), "Fall".into()];
		assert_eq!(PopupContent::from_node(&node).subtitle.as_deref(), Some("Music · Spring"));

		node.kind = None;
		assert_eq!(PopupContent::from_node(&node).subtitle.as_deref(), Some("Spring"));
	}

	#[test]
	fn popup_sits_right_of_the_node_when_it_fits() {
		let placed = place_popup((100.0, 300.0), (200.0, 100.0), (1200.0, 800.0));
		assert_eq!(placed, PopupPlacement::Floating { left: 116.0, top: 250.0 });
	}

	#[test]
	fn popup_flips_left_near_the_right_edge() {
		let placed = place_popup((1100.0, 300.0), (200.0, 100.0), (1200.0, 800.0));
		assert_eq!(placed, PopupPlacement::Floating { left: 884.0, top: 250.0 });
	}

	#[test]
	fn popup_is_kept_inside_vertically() {
		let PopupPlacement::Floating { top, .. } = place_popup((100.0, 790.0), (200.0, 100.0), (1200.0, 800.0)) else {
			panic!("expected a floating popup");
		};
		assert_eq!(top, 692.0);
		let PopupPlacement::Floating { top, .. } = place_popup((100.0, 0.0), (200.0, 100.0), (1200.0, 800.0)) else {
			panic!("expected a floating popup");
		};
		assert_eq!(top, MARGIN);
	}

	#[test]
	fn narrow_viewports_dock_the_popup() {
		assert_eq!(place_popup((10.0, 10.0), (200.0, 100.0), (400.0, 800.0)), PopupPlacement::Docked);
	}
}
