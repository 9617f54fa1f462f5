mod common;

use aquifer_plot::features::FeatureCollection;
use aquifer_plot::viz::{FigureStyle, MapOptions, plot_map};
use aquifer_plot::{Dataset, Error};
use common::{world_shp, write_shp};
use std::fs;
use tempfile::tempdir;

fn low_res() -> MapOptions {
    MapOptions {
        dpi: 20.0,
        ..MapOptions::default()
    }
}

#[test]
fn loads_polygon_shapefile() {
    let dir = tempdir().unwrap();
    let shp = dir.path().join("world.shp");
    write_shp(&shp, &world_shp());
    let fc = FeatureCollection::load(&shp).unwrap();
    assert_eq!(fc.len(), 1);
    let b = fc.bounds().unwrap();
    assert_eq!(b.min().x, -170.0);
    assert_eq!(b.max().y, 75.0);
}

#[test]
fn renders_map_png() {
    let dir = tempdir().unwrap();
    let shp = dir.path().join("world.shp");
    write_shp(&shp, &world_shp());
    let out = dir.path().join("map.png");

    let ds = Dataset::default();
    let fc = FeatureCollection::load(&shp).unwrap();
    let regions = ds.joined_regions().unwrap();
    plot_map(
        &fc,
        &regions,
        &ds.legend_entries(),
        &FigureStyle::default(),
        &low_res(),
        &out,
    )
    .unwrap();

    let img = image::open(&out).unwrap();
    assert!(img.width() <= 20 * 20 && img.height() <= 10 * 20);
}

#[test]
fn empty_feature_collection_is_rejected() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("map.png");
    let ds = Dataset::default();
    let err = plot_map(
        &FeatureCollection::default(),
        &ds.joined_regions().unwrap(),
        &ds.legend_entries(),
        &FigureStyle::default(),
        &low_res(),
        &out,
    )
    .unwrap_err();
    assert!(matches!(err, Error::EmptyFeatures(_)));
    assert!(!out.exists());
}

#[test]
fn garbage_shapefile_is_an_error() {
    let dir = tempdir().unwrap();
    let shp = dir.path().join("broken.shp");
    fs::write(&shp, b"not a shapefile").unwrap();
    assert!(FeatureCollection::load(&shp).is_err());
}
