mod component;
mod explorer;
mod filter;
mod interaction;
mod layout;
mod panel;
mod popup;
mod render;
pub mod scale;
mod state;

pub use explorer::ProjectExplorer;
pub use filter::{FilterState, Visibility};
pub use interaction::{AppState, ClickTarget, Selection};
pub use layout::{ForceConfig, ForceGraphBackend, LayoutDriver, PhysicsBackend, SeasonScale};
pub use popup::{PopupContent, PopupPlacement, place_popup};
pub use scale::ScaleConfig;
pub use state::CanvasState;
