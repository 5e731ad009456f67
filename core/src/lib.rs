mod aggregate;
pub mod api;
mod chart;
mod config;
mod error;
mod model;
mod selection;

pub use aggregate::{ChartRow, ChartTable, pivot};
pub use chart::{AxisTick, ChartGeometry, ChartLayout, LinePath, Margin, PALETTE, PlotArea};
pub use config::{API_KEY_VAR, ApiConfig, ENDPOINT_VAR};
pub use error::{ConfigError, FetchError};
pub use model::{PopulationPoint, PrefCode, Prefecture, PrefectureSeries, find_prefecture};
pub use selection::{Completion, FetchTicket, SelectionTracker};
