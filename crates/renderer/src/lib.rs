//! Presentation for the dashboard.
//!
//! - [`chart`]: the `{labels, datasets}` document handed to a charting front end
//! - [`text`]: the terminal dashboard
//! - [`markdown`]: composition reports

pub mod chart;
pub mod markdown;
pub mod text;

pub use chart::{chart_data, ChartData, Dataset};
pub use markdown::{composition_markdown, unescape};
pub use text::{render_composition_summary, render_dashboard, ViewOptions};
