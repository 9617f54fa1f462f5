//! The end-to-end run: resolve the shapefile, draw the map, draw the chart.

use crate::archive::resolve_shapefile;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::features::FeatureCollection;
use crate::models::Dataset;
use crate::viz::chart::{BarPair, plot_depletion_chart};
use crate::viz::map::plot_map;
use log::info;
use std::path::{Path, PathBuf};

/// Paths produced by [`run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub shapefile: PathBuf,
    pub map: PathBuf,
    pub chart: PathBuf,
}

/// Extract the configured archive and return the shapefile inside it.
pub fn resolve(config: &Config) -> Result<PathBuf> {
    resolve_shapefile(&config.paths.archive, &config.paths.extract_dir)?
        .require(&config.paths.extract_dir)
}

/// Load `shapefile` and render the annotated map to `out`.
pub fn render_map(config: &Config, dataset: &Dataset, shapefile: &Path, out: &Path) -> Result<()> {
    let regions = dataset.joined_regions()?;
    let features = FeatureCollection::load(shapefile)?;
    if features.is_empty() {
        return Err(Error::EmptyFeatures(shapefile.to_path_buf()));
    }
    plot_map(
        &features,
        &regions,
        &dataset.legend_entries(),
        &config.style,
        &config.map,
        out,
    )
}

/// Render the depletion chart to `out`.
pub fn render_chart(config: &Config, dataset: &Dataset, out: &Path) -> Result<Vec<BarPair>> {
    let records = dataset.depletion.records()?;
    plot_depletion_chart(&records, &config.style, &config.chart, out)
}

/// Open a saved figure in the system's default image viewer. Returns once the
/// viewer has been launched.
pub fn show(path: &Path) -> Result<()> {
    info!("opening {}", path.display());
    opener::open(path).map_err(|source| Error::Viewer {
        path: path.to_path_buf(),
        source,
    })
}

/// Full run with the configured paths.
pub fn run(config: &Config, dataset: &Dataset) -> Result<RunSummary> {
    config.validate()?;
    dataset.validate()?;
    let shapefile = resolve(config)?;
    render_map(config, dataset, &shapefile, &config.paths.map_output)?;
    render_chart(config, dataset, &config.paths.chart_output)?;
    Ok(RunSummary {
        shapefile,
        map: config.paths.map_output.clone(),
        chart: config.paths.chart_output.clone(),
    })
}
