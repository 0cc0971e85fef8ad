//! Trunk entry point; every dependency is used through the library crate.
#![allow(unused_crate_dependencies)]

use project_graph_canvas::{App, init_logging};

fn main() {
	init_logging();
	leptos::mount::mount_to_body(App);
}
