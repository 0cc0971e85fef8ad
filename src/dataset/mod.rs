//! Dataset loading and the project graph model.

mod error;
pub mod graph;
mod loader;
mod model;

pub use error::LoadError;
pub use loader::{load_dataset, normalize_photo_url, parse_dataset, parse_scale, split_list};
pub use model::{Edge, FALLBACK_COLOR, ProjectGraph, ProjectNode, Season};
