//! Run configuration: input/output paths, figure settings and the shared text style.
//!
//! Every field has a default equal to the reference run, so an empty JSON object
//! (or no config file at all) reproduces it. Partial files override only what they name:
//!
//! ```json
//! { "map": { "dpi": 300 }, "paths": { "map_output": "out/map.png" } }
//! ```

use crate::error::{Error, Result};
use crate::models::Dataset;
use crate::viz::chart::ChartOptions;
use crate::viz::map::MapOptions;
use crate::viz::style::FigureStyle;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where inputs are read from and figures are written to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    /// Zip archive holding the world boundary shapefile.
    pub archive: PathBuf,
    /// Directory the archive is extracted into.
    pub extract_dir: PathBuf,
    pub map_output: PathBuf,
    pub chart_output: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            archive: "Data/world-administrative-boundaries.zip".into(),
            extract_dir: "Data/wb_countries_extracted".into(),
            map_output: "Data/global_aquifers_map_900dpi.png".into(),
            chart_output: "Data/aquifer_depletion_dual_axis_corrected.png".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: Paths,
    pub style: FigureStyle,
    pub map: MapOptions,
    pub chart: ChartOptions,
    /// Optional JSON dataset replacing the built-in reference tables.
    pub dataset: Option<PathBuf>,
}

impl Config {
    /// Load and validate a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let cfg: Config = serde_json::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply one DPI to both figures.
    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.map.dpi = dpi;
        self.chart.dpi = dpi;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(Error::Config(format!("{name} must be a positive number, got {v}")))
            }
        };
        positive("map.dpi", self.map.dpi)?;
        positive("chart.dpi", self.chart.dpi)?;
        positive("map.size.width_in", self.map.size.width_in)?;
        positive("map.size.height_in", self.map.size.height_in)?;
        positive("chart.size.width_in", self.chart.size.width_in)?;
        positive("chart.size.height_in", self.chart.size.height_in)?;
        positive("map.marker_size_pt", self.map.marker_size_pt)?;
        positive("map.label_font_pt", self.map.label_font_pt)?;
        positive("chart.tick_font_pt", self.chart.tick_font_pt)?;
        positive("chart.axis_label_font_pt", self.chart.axis_label_font_pt)?;
        positive("chart.legend_font_pt", self.chart.legend_font_pt)?;
        positive("map.legend_font_pt", self.map.legend_font_pt)?;
        positive("map.legend_title_pt", self.map.legend_title_pt)?;
        positive("map.arrow_line_pt", self.map.arrow_line_pt)?;
        positive("map.land_line_pt", self.map.land_line_pt)?;
        let non_negative = |name: &str, v: f64| {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(Error::Config(format!("{name} must be zero or more, got {v}")))
            }
        };
        non_negative("map.data_margin", self.map.data_margin)?;
        non_negative("map.pad_in", self.map.pad_in)?;
        non_negative("chart.pad_in", self.chart.pad_in)?;
        if !(self.chart.bar_width > 0.0 && self.chart.bar_width <= 0.5) {
            return Err(Error::Config(format!(
                "chart.bar_width must be in (0, 0.5], got {}",
                self.chart.bar_width
            )));
        }
        if self.style.font_family.trim().is_empty() {
            return Err(Error::Config("style.font_family must not be empty".into()));
        }
        Ok(())
    }

    /// The configured dataset file, or the built-in reference tables.
    pub fn dataset(&self) -> Result<Dataset> {
        match &self.dataset {
            Some(path) => Dataset::load(path),
            None => Ok(Dataset::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_default() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, Config::default());
        cfg.validate().unwrap();
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let cfg: Config =
            serde_json::from_str(r#"{ "map": { "dpi": 300 }, "paths": { "map_output": "m.png" } }"#)
                .unwrap();
        assert_eq!(cfg.map.dpi, 300.0);
        assert_eq!(cfg.map.marker_size_pt, 30.0);
        assert_eq!(cfg.chart.dpi, 900.0);
        assert_eq!(cfg.paths.map_output, PathBuf::from("m.png"));
        assert_eq!(cfg.paths.archive, Paths::default().archive);
    }

    #[test]
    fn json_round_trip() {
        let cfg = Config::default().with_dpi(72.0);
        let text = serde_json::to_string_pretty(&cfg).unwrap();
        let back: Config = serde_json::from_str(&text).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(Config::default().with_dpi(0.0).validate().is_err());
        let mut cfg = Config::default();
        cfg.chart.bar_width = 0.7;
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));

        let mut cfg = Config::default();
        cfg.map.legend_font_pt = -12.0;
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
        let mut cfg = Config::default();
        cfg.chart.pad_in = -0.1;
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
        let mut cfg = Config::default();
        cfg.map.data_margin = f64::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_margins_are_allowed() {
        let mut cfg = Config::default();
        cfg.map.data_margin = 0.0;
        cfg.map.pad_in = 0.0;
        cfg.chart.pad_in = 0.0;
        cfg.validate().unwrap();
    }
}
