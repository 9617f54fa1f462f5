#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;

/// Minimal single-polygon `.shp` file. The ring is clockwise, as outer rings must be.
pub fn polygon_shp(ring: &[(f64, f64)]) -> Vec<u8> {
    let (xmin, xmax) = ring
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.0), hi.max(p.0)));
    let (ymin, ymax) = ring
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.1), hi.max(p.1)));
    let bbox = [xmin, ymin, xmax, ymax];

    let mut content = Vec::new();
    content.extend_from_slice(&5i32.to_le_bytes());
    for v in bbox {
        content.extend_from_slice(&v.to_le_bytes());
    }
    content.extend_from_slice(&1i32.to_le_bytes());
    content.extend_from_slice(&(ring.len() as i32).to_le_bytes());
    content.extend_from_slice(&0i32.to_le_bytes());
    for (x, y) in ring {
        content.extend_from_slice(&x.to_le_bytes());
        content.extend_from_slice(&y.to_le_bytes());
    }

    let total = 100 + 8 + content.len();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&9994i32.to_be_bytes());
    out.extend_from_slice(&[0u8; 20]);
    out.extend_from_slice(&((total / 2) as i32).to_be_bytes());
    out.extend_from_slice(&1000i32.to_le_bytes());
    out.extend_from_slice(&5i32.to_le_bytes());
    for v in bbox {
        out.extend_from_slice(&v.to_le_bytes());
    }
    for _ in 0..4 {
        out.extend_from_slice(&0f64.to_le_bytes());
    }
    out.extend_from_slice(&1i32.to_be_bytes());
    out.extend_from_slice(&((content.len() / 2) as i32).to_be_bytes());
    out.extend_from_slice(&content);
    out
}

/// A rough "world" rectangle covering every default region.
pub fn world_shp() -> Vec<u8> {
    polygon_shp(&[
        (-170.0, -60.0),
        (-170.0, 75.0),
        (170.0, 75.0),
        (170.0, -60.0),
        (-170.0, -60.0),
    ])
}

pub fn write_shp(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, bytes).unwrap();
}

/// Write a zip archive holding `entries` (name, bytes).
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let opts = SimpleFileOptions::default();
    for (name, bytes) in entries {
        zip.start_file(*name, opts).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
}
