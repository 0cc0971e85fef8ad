use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error, info};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Element, HtmlCanvasElement, MouseEvent, TouchEvent, WheelEvent, Window,
};

use super::interaction::{AppState, ClickTarget};
use super::render::{self, PhotoCache};
use super::state::CanvasState;
use crate::config::GraphConfig;

/// Selectors whose clicks the document-level listener must not treat as outside clicks.
const POPUP_SELECTOR: &str = ".project-popup";
const CONTROLS_SELECTOR: &str = ".filter-panel, .graph-controls";
const CANVAS_SELECTOR: &str = ".project-graph-canvas";

type Shared<T> = Rc<RefCell<Option<T>>>;

fn window_size(window: &Window) -> (f64, f64) {
	let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
	(dim(window.inner_width()), dim(window.inner_height()))
}

fn local_point(canvas: &HtmlCanvasElement, client_x: f64, client_y: f64) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(client_x - rect.left(), client_y - rect.top())
}

/// Classifies a document click. `None` means the canvas already handled it.
fn classify_click(target: Option<Element>) -> Option<ClickTarget> {
	let Some(el) = target else {
		return Some(ClickTarget::Outside);
	};
	let matches = |selector: &str| el.closest(selector).ok().flatten().is_some();
	if matches(CANVAS_SELECTOR) {
		None
	} else if matches(POPUP_SELECTOR) {
		Some(ClickTarget::Popup)
	} else if matches(CONTROLS_SELECTOR) {
		Some(ClickTarget::Controls)
	} else {
		Some(ClickTarget::Outside)
	}
}

/// Full-window canvas drawing the project graph and translating pointer input
/// into selection transitions on `app`.
#[component]
pub fn ProjectGraphCanvas(
	app: RwSignal<AppState>,
	config: GraphConfig,
	/// Receives the focused node's screen position every frame.
	anchor: RwSignal<Option<(f64, f64)>>,
	viewport: RwSignal<(f64, f64)>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Shared<CanvasState> = Rc::new(RefCell::new(None));
	let animate: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let resize_cb: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let outside_cb: Shared<Closure<dyn FnMut(MouseEvent)>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init, outside_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone(), outside_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if state_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("no window, graph not started");
			return;
		};
		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("2d canvas context unavailable, graph not started");
			return;
		};

		let graph = app.with_untracked(|s| s.graph().clone());
		if graph.is_empty() {
			info!("no projects to lay out");
			return;
		}

		let (w, h) = window_size(&window);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		viewport.set((w, h));
		*state_init.borrow_mut() = Some(CanvasState::new(&graph, &config, w, h));
		let photos = app.with_untracked(PhotoCache::new);

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			let (nw, nh) = window_size(&win);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
			}
			viewport.set((nw, nh));
			debug!("viewport resized to {}x{}", nw, nh);
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		*outside_cb_init.borrow_mut() = Some(Closure::new(move |ev: MouseEvent| {
			let target = ev.target().and_then(|t| t.dyn_into::<Element>().ok());
			if let Some(click) = classify_click(target) {
				app.maybe_update(|s| s.click(click));
			}
		}));
		if let (Some(document), Some(cb)) = (window.document(), outside_cb_init.borrow().as_ref()) {
			let _ = document.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick();
				app.with_untracked(|a| {
					render::render(s, a, &photos, &ctx);
					let pos = a.focused().and_then(|i| s.screen_position(i));
					if anchor.get_untracked() != pos {
						anchor.set(pos);
					}
				});
			}
			if let (Some(win), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let point = move |x: i32, y: i32| {
		canvas_ref
			.get()
			.map(|c| local_point(&c, x as f64, y as f64))
	};

	let state_md = state.clone();
	let press = move |(x, y): (f64, f64)| {
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.press(x, y);
		}
	};

	let state_mm = state.clone();
	let pointer_move = move |(x, y): (f64, f64)| {
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.is_gesture_active() {
				s.move_pointer(x, y);
				return;
			}
			let hovered = s.node_at_position(x, y);
			if hovered == s.hovered {
				return;
			}
			s.hovered = hovered;
			app.maybe_update(|a| {
				let left = a.pointer_leave();
				let entered = hovered.is_some_and(|n| a.pointer_enter(n));
				left || entered
			});
		}
	};

	let state_mu = state.clone();
	let release = move || {
		let click = state_mu.borrow_mut().as_mut().and_then(|s| s.release());
		if let Some(click) = click {
			app.maybe_update(|a| a.click(click));
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.release();
			s.hovered = None;
		}
		app.maybe_update(|a| a.pointer_leave());
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = point(ev.client_x(), ev.client_y()) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			s.zoom_at(x, y, factor);
		}
	};

	let first_touch = move |ev: &TouchEvent, changed: bool| {
		let list = if changed { ev.changed_touches() } else { ev.touches() };
		list.get(0).and_then(|t| point(t.client_x(), t.client_y()))
	};

	let (press_m, move_m, release_m) = (press.clone(), pointer_move.clone(), release.clone());
	let on_mousedown = move |ev: MouseEvent| {
		if let Some(p) = point(ev.client_x(), ev.client_y()) {
			press_m(p);
		}
	};
	let on_mousemove = move |ev: MouseEvent| {
		if let Some(p) = point(ev.client_x(), ev.client_y()) {
			move_m(p);
		}
	};
	let on_mouseup = move |_: MouseEvent| release_m();

	// Touch input is handled here rather than through emulated mouse events.
	let on_touchstart = move |ev: TouchEvent| {
		ev.prevent_default();
		if ev.touches().length() == 1 {
			if let Some(p) = first_touch(&ev, false) {
				press(p);
			}
		}
	};
	let on_touchmove = move |ev: TouchEvent| {
		ev.prevent_default();
		if let Some(p) = first_touch(&ev, false) {
			pointer_move(p);
		}
	};
	let on_touchend = move |ev: TouchEvent| {
		ev.prevent_default();
		if first_touch(&ev, true).is_some() {
			release();
		}
	};

	let cursor = move || {
		if app.with(|a| a.focused().is_some()) {
			"display: block; cursor: pointer; touch-action: none;"
		} else {
			"display: block; cursor: grab; touch-action: none;"
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="project-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:touchstart=on_touchstart
			on:touchmove=on_touchmove
			on:touchend=on_touchend
			style=cursor
		/>
	}
}
