//! Unpacking the boundary archive and locating the shapefile inside it.
//!
//! Extraction runs on every call and overwrites what is already there. The
//! search walks the extracted tree top-down (a directory's files before its
//! subdirectories) in directory-listing order, which is not sorted and differs
//! between platforms. The last `.shp` seen wins; when there is more than one,
//! the choice is reported but not corrected.

use crate::error::{Error, Result};
use log::{info, warn};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Outcome of a shapefile search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapefileSearch {
    /// Last match in traversal order; `None` when nothing matched.
    pub shapefile: Option<PathBuf>,
    /// Every match, in traversal order.
    pub candidates: Vec<PathBuf>,
}

impl ShapefileSearch {
    /// More than one `.shp` was found, so the pick depends on listing order.
    pub fn is_ambiguous(&self) -> bool {
        self.candidates.len() > 1
    }

    /// The resolved path, or `ShapefileNotFound` for `root`.
    pub fn require(self, root: &Path) -> Result<PathBuf> {
        self.shapefile
            .ok_or_else(|| Error::ShapefileNotFound(root.to_path_buf()))
    }
}

/// Extract every entry of `archive` into `dest`, creating `dest` if needed.
/// Returns the number of entries in the archive.
pub fn extract_archive<P: AsRef<Path>, Q: AsRef<Path>>(archive: P, dest: Q) -> Result<usize> {
    let archive = archive.as_ref();
    let dest = dest.as_ref();
    if !archive.is_file() {
        return Err(Error::ArchiveNotFound(archive.to_path_buf()));
    }
    let invalid = |source| Error::InvalidArchive {
        path: archive.to_path_buf(),
        source,
    };

    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(BufReader::new(file)).map_err(invalid)?;
    fs::create_dir_all(dest)?;
    let entries = zip.len();
    zip.extract(dest).map_err(invalid)?;
    info!(
        "extracted {} entries from {} into {}",
        entries,
        archive.display(),
        dest.display()
    );
    Ok(entries)
}

fn is_shapefile(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".shp"))
}

fn walk(dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
    let mut subdirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            subdirs.push(path);
        } else if is_shapefile(&path) {
            found.push(path);
        }
    }
    for sub in subdirs {
        walk(&sub, found)?;
    }
    Ok(())
}

/// Search `root` recursively for files ending in `.shp`.
pub fn find_shapefile<P: AsRef<Path>>(root: P) -> Result<ShapefileSearch> {
    let root = root.as_ref();
    let mut candidates = Vec::new();
    if root.is_dir() {
        walk(root, &mut candidates)?;
    }
    let search = ShapefileSearch {
        shapefile: candidates.last().cloned(),
        candidates,
    };
    if search.is_ambiguous() {
        warn!(
            "{} shapefiles found under {}; using the last one listed ({}). Candidates: {:?}",
            search.candidates.len(),
            root.display(),
            search
                .shapefile
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            search.candidates
        );
    }
    Ok(search)
}

/// Extract `archive` into `dest` and look for the shapefile in it.
pub fn resolve_shapefile<P: AsRef<Path>, Q: AsRef<Path>>(
    archive: P,
    dest: Q,
) -> Result<ShapefileSearch> {
    extract_archive(archive, dest.as_ref())?;
    let search = find_shapefile(dest.as_ref())?;
    match &search.shapefile {
        Some(p) => info!("resolved shapefile {}", p.display()),
        None => warn!("no .shp file in {}", dest.as_ref().display()),
    }
    Ok(search)
}
