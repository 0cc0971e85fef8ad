use std::f64::consts::PI;

use log::debug;
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::interaction::{AppState, Selection};
use super::scale::ScaledValues;
use super::state::CanvasState;

const BACKGROUND: &str = "#fbfaf7";
const EDGE_RGB: &str = "120, 120, 120";

/// Photo elements per node, loaded once up front.
pub struct PhotoCache {
	images: Vec<Option<HtmlImageElement>>,
}

impl PhotoCache {
	pub fn new(app: &AppState) -> Self {
		let images = app
			.nodes()
			.iter()
			.map(|node| {
				let url = node.photo_url.as_ref()?;
				let img = HtmlImageElement::new().ok()?;
				img.set_src(url);
				Some(img)
			})
			.collect();
		Self { images }
	}

	/// The photo for `idx` once it has loaded. Broken images are never returned.
	fn ready(&self, idx: usize) -> Option<&HtmlImageElement> {
		self.images
			.get(idx)?
			.as_ref()
			.filter(|img| img.complete() && img.natural_width() > 0)
	}
}

pub fn render(state: &CanvasState, app: &AppState, photos: &PhotoCache, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, app, ctx);
	draw_nodes(state, app, photos, ctx);
	ctx.restore();
}

fn draw_edges(state: &CanvasState, app: &AppState, ctx: &CanvasRenderingContext2d) {
	let scaled = ScaledValues::new(&state.scale, state.transform.k);
	let positions = state.layout.positions();
	ctx.set_line_width(scaled.edge_width);

	for (i, edge) in app.edges().iter().enumerate() {
		let ((x1, y1), (x2, y2)) = (positions[edge.a], positions[edge.b]);
		let alpha = state.scale.edge_opacity * app.edge_opacity(i);
		ctx.set_stroke_style_str(&format!("rgba({EDGE_RGB}, {alpha})"));
		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(x2, y2);
		ctx.stroke();
	}
}

fn draw_nodes(state: &CanvasState, app: &AppState, photos: &PhotoCache, ctx: &CanvasRenderingContext2d) {
	let scaled = ScaledValues::new(&state.scale, state.transform.k);
	let selection = app.selection();
	ctx.set_font(&format!("{}px sans-serif", scaled.label_font_px));

	for (idx, (node, &(x, y))) in app.nodes().iter().zip(state.layout.positions()).enumerate() {
		let radius = state.radius(idx);
		ctx.set_global_alpha(app.node_opacity(idx));

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&node.color);
		ctx.fill();

		if let Some(img) = photos.ready(idx) {
			ctx.save();
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
			ctx.clip();
			if ctx
				.draw_image_with_html_image_element_and_dw_and_dh(
					img,
					x - radius,
					y - radius,
					radius * 2.0,
					radius * 2.0,
				)
				.is_err()
			{
				debug!("photo for {} could not be drawn", node.name);
			}
			ctx.restore();
		}

		if selection.node() == Some(idx) {
			draw_ring(ctx, x, y, radius, scaled.ring_width, matches!(selection, Selection::Hovering(_)));
		}

		ctx.set_fill_style_str("#333");
		let _ = ctx.fill_text(&node.name, x + radius + 3.0, y + 3.0);
	}
	ctx.set_global_alpha(1.0);
}

/// Solid ring for a clicked node, dashed while only hovered.
fn draw_ring(ctx: &CanvasRenderingContext2d, x: f64, y: f64, radius: f64, width: f64, dashed: bool) {
	if dashed {
		let dash = JsValue::from_f64(width * 2.0);
		let _ = ctx.set_line_dash(&js_sys::Array::of2(&dash, &dash));
	}
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius + width, 0.0, 2.0 * PI);
	ctx.set_stroke_style_str("#222");
	ctx.set_line_width(width);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}
