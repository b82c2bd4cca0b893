//! Charts module - interactive plots and static PNG figures

pub mod palette;
mod plotter;
mod renderer;

pub use plotter::ChartPlotter;
pub use renderer::{RenderError, StaticChartRenderer, FIGURE_SIZE};
