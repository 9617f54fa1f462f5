//! Visualization: render the aquifer map and the depletion chart to **PNG** or **SVG**.
//!
//! - Sizes in points, scaled to the figure DPI
//! - Text through plotters' `ab_glyph` path with fonts registered at runtime
//! - PNG output cropped to content; all output written atomically

pub mod arrow;
pub mod chart;
pub mod fonts;
pub mod legend;
pub mod map;
pub mod output;
pub mod style;
pub mod text;

pub use chart::{BarPair, ChartOptions, bar_layout, plot_depletion_chart};
pub use map::{MapOptions, plot_map};
pub use style::{FigureSize, FigureStyle, FontWeight};
