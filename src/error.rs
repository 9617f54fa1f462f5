//! Error type shared by the library modules.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong between opening the archive and writing an image.
#[derive(Debug, Error)]
pub enum Error {
    #[error("archive not found: {}", .0.display())]
    ArchiveNotFound(PathBuf),

    #[error("cannot read zip archive {}: {source}", path.display())]
    InvalidArchive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("no .shp file found under {}", .0.display())]
    ShapefileNotFound(PathBuf),

    #[error("cannot read shapefile {}: {source}", path.display())]
    Shapefile {
        path: PathBuf,
        #[source]
        source: shapefile::Error,
    },

    #[error("invalid geometry in {}: {detail}", path.display())]
    Geometry { path: PathBuf, detail: String },

    #[error("no drawable features for {}", .0.display())]
    EmptyFeatures(PathBuf),

    #[error("invalid dataset: {0}")]
    Dataset(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cannot open {} in a viewer: {source}", path.display())]
    Viewer {
        path: PathBuf,
        #[source]
        source: opener::OpenError,
    },

    #[error("render failed: {0}")]
    Render(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Plotters errors are generic over the backend; keep their debug text.
pub(crate) fn render_err<E: std::fmt::Debug>(e: E) -> Error {
    Error::Render(format!("{:?}", e))
}
