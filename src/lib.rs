//! aquifer_plot
//!
//! Maps the world's major depleting aquifers and charts their groundwater loss.
//! Pairs with the `aquifer-plot` CLI.
//!
//! ### Features
//! - Extract a boundary archive and locate the shapefile inside it
//! - Annotated world map: markers, curved call-out arrows, colour legend
//! - Dual-axis grouped bar chart of depletion in mm/year and km³/year
//! - PNG (cropped to content) or SVG output, written atomically
//! - Reference tables built in, replaceable by a JSON dataset
//!
//! ### Example
//! ```no_run
//! use aquifer_plot::{Config, Dataset, pipeline};
//!
//! let config = Config::default().with_dpi(150.0);
//! let summary = pipeline::run(&config, &Dataset::default())?;
//! println!("Map saved successfully at: {}", summary.map.display());
//! # Ok::<(), aquifer_plot::Error>(())
//! ```

pub mod archive;
pub mod config;
pub mod error;
pub mod features;
pub mod models;
pub mod pipeline;
pub mod storage;
pub mod viz;

pub use config::Config;
pub use error::{Error, Result};
pub use models::{Dataset, DepletionRecord, Region};
