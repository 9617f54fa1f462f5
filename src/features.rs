//! Background geometry loaded from a shapefile.
//!
//! Only the shapes are read; attribute tables (`.dbf`) are ignored, so a bare
//! `.shp` is enough.

use crate::error::{Error, Result};
use geo::{BoundingRect, Coord, LineString, MultiLineString, MultiPolygon, Rect};
use log::{debug, info};
use shapefile::Shape;
use std::path::Path;

/// A drawable background feature.
#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    Area(MultiPolygon<f64>),
    Line(MultiLineString<f64>),
}

impl Feature {
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        match self {
            Feature::Area(mp) => mp.bounding_rect(),
            Feature::Line(ml) => ml.bounding_rect(),
        }
    }
}

/// All features of one shapefile, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Read every polygon and polyline shape of `path`. Point shapes are skipped.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() || !path.is_file() {
            return Err(Error::ShapefileNotFound(path.to_path_buf()));
        }
        let shapes = shapefile::read_shapes(path).map_err(|source| Error::Shapefile {
            path: path.to_path_buf(),
            source,
        })?;

        let geometry_err = |e: &dyn std::fmt::Debug| Error::Geometry {
            path: path.to_path_buf(),
            detail: format!("{:?}", e),
        };

        let mut features = Vec::with_capacity(shapes.len());
        let mut skipped = 0usize;
        for shape in shapes {
            let feature = match shape {
                Shape::Polygon(polygon) => {
                    let mp: MultiPolygon<f64> = polygon.try_into().map_err(|e| geometry_err(&e))?;
                    Feature::Area(mp)
                }
                Shape::PolygonM(polygon) => {
                    let mp: MultiPolygon<f64> = polygon.try_into().map_err(|e| geometry_err(&e))?;
                    Feature::Area(mp)
                }
                Shape::PolygonZ(polygon) => {
                    let mp: MultiPolygon<f64> = polygon.try_into().map_err(|e| geometry_err(&e))?;
                    Feature::Area(mp)
                }
                Shape::Polyline(polyline) => {
                    let lines = polyline
                        .parts()
                        .iter()
                        .map(|part| {
                            LineString::new(
                                part.iter().map(|p| Coord { x: p.x, y: p.y }).collect(),
                            )
                        })
                        .collect();
                    Feature::Line(MultiLineString::new(lines))
                }
                _ => {
                    skipped += 1;
                    continue;
                }
            };
            features.push(feature);
        }
        if skipped > 0 {
            debug!("skipped {} non-drawable shapes in {}", skipped, path.display());
        }
        info!("loaded {} features from {}", features.len(), path.display());
        Ok(Self { features })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Union of all feature bounding boxes.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.features
            .iter()
            .filter_map(Feature::bounding_rect)
            .reduce(|a, b| {
                Rect::new(
                    Coord {
                        x: a.min().x.min(b.min().x),
                        y: a.min().y.min(b.min().y),
                    },
                    Coord {
                        x: a.max().x.max(b.max().x),
                        y: a.max().y.max(b.max().y),
                    },
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Polygon, polygon};

    #[test]
    fn bounds_cover_all_features() {
        let a: Polygon<f64> = polygon![
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 5.0),
            (x: 0.0, y: 0.0),
        ];
        let b: Polygon<f64> = polygon![
            (x: -20.0, y: -3.0),
            (x: -15.0, y: -3.0),
            (x: -15.0, y: 1.0),
            (x: -20.0, y: -3.0),
        ];
        let fc = FeatureCollection {
            features: vec![
                Feature::Area(MultiPolygon::new(vec![a])),
                Feature::Area(MultiPolygon::new(vec![b])),
            ],
        };
        let r = fc.bounds().unwrap();
        assert_eq!(r.min(), Coord { x: -20.0, y: -3.0 });
        assert_eq!(r.max(), Coord { x: 10.0, y: 5.0 });
    }

    #[test]
    fn empty_collection_has_no_bounds() {
        assert!(FeatureCollection::default().bounds().is_none());
        assert!(FeatureCollection::default().is_empty());
    }

    #[test]
    fn missing_path_is_not_found() {
        assert!(matches!(
            FeatureCollection::load(""),
            Err(Error::ShapefileNotFound(_))
        ));
    }
}
