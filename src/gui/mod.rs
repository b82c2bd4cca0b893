//! GUI module - User interface components

mod app;
mod dashboard;
mod filter_panel;

pub use app::ExplorerApp;
pub use dashboard::DashboardView;
pub use filter_panel::{FilterPanel, FilterPanelAction};
