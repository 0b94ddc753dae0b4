//! Charts module - chart configuration, drawing surfaces and rendering

mod config;
mod plotter;
mod renderer;
mod surface;

pub use config::{axis_label, ChartConfig, ChartType, Dataset, Rgba};
pub use plotter::ChartPlotter;
pub use renderer::{RenderError, StaticChartRenderer};
pub use surface::{
    render_charts, MountedChart, SurfaceError, SurfaceRegistry, PREDICTED_SAVINGS_CHART,
    SAVINGS_CHART, STANDARD_SURFACES,
};
