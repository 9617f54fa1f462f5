//! World outline map with annotated aquifer regions.
//!
//! Drawing order: country outlines, call-out arrows, region markers, region
//! names, legend. Markers sit above the arrows and the arrow tips stop at the
//! marker rim.

use super::arrow::{Arc3, PxBox, exit_point, open_head, to_pixels, trim_polyline};
use super::fonts::ensure_registered;
use super::legend::{Corner, Legend, draw_legend};
use super::output::{Figure, save_figure};
use super::style::{BLACK_HEX, FigureSize, FigureStyle, WHITE_HEX, pt_to_px, rgb, stroke_px};
use super::text::measure;
use crate::error::{Error, Result, render_err};
use crate::features::{Feature, FeatureCollection};
use crate::models::{HexColor, Region};
use geo::{Coord, LineString};
use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Map figure settings. Defaults reproduce the reference figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    pub size: FigureSize,
    pub dpi: f64,
    pub land_fill: HexColor,
    pub land_edge: HexColor,
    pub land_line_pt: f64,
    /// Marker diameter.
    pub marker_size_pt: f64,
    pub label_font_pt: f64,
    pub arrow_line_pt: f64,
    /// `arc3` curvature of the call-out arrows.
    pub arrow_rad: f64,
    pub legend_title: String,
    pub legend_font_pt: f64,
    pub legend_title_pt: f64,
    /// Fraction of the data extent added on every side.
    pub data_margin: f64,
    /// White border kept around the cropped content.
    pub pad_in: f64,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            size: FigureSize::new(20.0, 10.0),
            dpi: 900.0,
            land_fill: WHITE_HEX,
            land_edge: BLACK_HEX,
            land_line_pt: 0.8,
            marker_size_pt: 30.0,
            label_font_pt: 14.0,
            arrow_line_pt: 1.5,
            arrow_rad: 0.2,
            legend_title: "Major Aquifer Regions".into(),
            legend_font_pt: 12.0,
            legend_title_pt: 14.0,
            data_margin: 0.05,
            pad_in: 0.1,
        }
    }
}

/// Map ready to draw on any backend.
pub struct MapFigure<'a> {
    pub features: &'a FeatureCollection,
    /// Markers and labels, drawn in this order.
    pub regions: &'a [Region],
    /// Legend rows, in this order.
    pub legend: &'a [(String, HexColor)],
    pub style: &'a FigureStyle,
    pub opts: &'a MapOptions,
}

/// Plotting rectangle that keeps one degree of longitude as wide as one degree
/// of latitude, centred on a `w`×`h` canvas. Returns `[left, top, right, bottom]`.
pub fn equal_aspect_rect(w: u32, h: u32, dx: f64, dy: f64) -> (i32, i32, i32, i32) {
    let scale = (w as f64 / dx).min(h as f64 / dy);
    let pw = (dx * scale).round() as i32;
    let ph = (dy * scale).round() as i32;
    let left = (w as i32 - pw) / 2;
    let top = (h as i32 - ph) / 2;
    (left, top, left + pw, top + ph)
}

/// Depth of a serif font's descenders below the baseline, in ems.
const DESCENT_EM: f64 = 0.22;

/// Pixel y for a bottom-anchored text box so that its baseline lands on `baseline_y`.
pub fn baseline_to_bottom(baseline_y: i32, font_px: f64) -> i32 {
    baseline_y + (DESCENT_EM * font_px).round() as i32
}

fn ring(ls: &LineString<f64>) -> Vec<(f64, f64)> {
    ls.coords().map(|Coord { x, y }| (*x, *y)).collect()
}

impl Figure for MapFigure<'_> {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        let opts = self.opts;
        let dpi = opts.dpi;
        let text_on = ensure_registered(self.style);

        let bounds = self
            .features
            .bounds()
            .ok_or_else(|| Error::Render("feature collection has no extent".into()))?;
        let (pad_x, pad_y) = (
            bounds.width() * opts.data_margin,
            bounds.height() * opts.data_margin,
        );
        let (x0, x1) = (bounds.min().x - pad_x, bounds.max().x + pad_x);
        let (y0, y1) = (bounds.min().y - pad_y, bounds.max().y + pad_y);
        let (dx, dy) = ((x1 - x0).max(f64::EPSILON), (y1 - y0).max(f64::EPSILON));

        let (w, h) = root.dim_in_pixel();
        let plot = equal_aspect_rect(w, h, dx, dy);
        let (left, top, right, bottom) = plot;
        let area = root.margin(top, h as i32 - bottom, left, w as i32 - right);

        let mut chart = ChartBuilder::on(&area)
            .build_cartesian_2d(x0..x0 + dx, y0..y0 + dy)
            .map_err(render_err)?;

        // 1) Base map
        let fill = rgb(opts.land_fill);
        let hole = rgb(WHITE_HEX);
        let edge = rgb(opts.land_edge).stroke_width(stroke_px(opts.land_line_pt, dpi));
        for feature in &self.features.features {
            match feature {
                Feature::Area(mp) => {
                    for poly in mp.iter() {
                        // Holes show the background, not land.
                        chart
                            .draw_series(
                                std::iter::once(Polygon::new(
                                    ring(poly.exterior()),
                                    fill.filled(),
                                ))
                                .chain(
                                    poly.interiors()
                                        .iter()
                                        .map(|r| Polygon::new(ring(r), hole.filled())),
                                ),
                            )
                            .map_err(render_err)?;
                        chart
                            .draw_series(
                                std::iter::once(poly.exterior())
                                    .chain(poly.interiors().iter())
                                    .map(|r| PathElement::new(ring(r), edge)),
                            )
                            .map_err(render_err)?;
                    }
                }
                Feature::Line(ml) => {
                    chart
                        .draw_series(ml.iter().map(|l| PathElement::new(ring(l), edge)))
                        .map_err(render_err)?;
                }
            }
        }

        let marker_r = pt_to_px(opts.marker_size_pt, dpi) / 2.0;
        let label_px = pt_to_px(opts.label_font_pt, dpi);
        let label_font = self.style.font(opts.label_font_pt, dpi).color(&BLACK);

        // 2) Arrows from each label box to its marker rim
        let arrow_style = BLACK.stroke_width(stroke_px(opts.arrow_line_pt, dpi));
        let head_len = 0.4 * label_px;
        let head_half = 0.2 * label_px;
        let shrink = pt_to_px(2.0, dpi);
        for region in self.regions {
            let (mx, my) = chart.backend_coord(&(region.coord.lon, region.coord.lat));
            let (lx, ly) = chart.backend_coord(&(region.label.lon, region.label.lat));
            let (tw, th) = measure(root, &region.name, &label_font, label_px);
            let bottom = baseline_to_bottom(ly, label_px) as f64;
            let text_box = PxBox {
                left: lx as f64 - tw as f64 / 2.0,
                top: bottom - th as f64,
                right: lx as f64 + tw as f64 / 2.0,
                bottom,
            }
            .grow(0.2 * label_px);

            let target = (mx as f64, my as f64);
            let start = exit_point(&text_box, target);
            let curve = Arc3::new(start, target, opts.arrow_rad).polyline(48);
            let path = trim_polyline(&curve, shrink, marker_r + shrink);
            if path.len() < 2 {
                continue;
            }
            root.draw(&PathElement::new(to_pixels(&path), arrow_style))
                .map_err(render_err)?;
            if let Some(head) = open_head(&path, head_len, head_half) {
                root.draw(&PathElement::new(to_pixels(&head), arrow_style))
                    .map_err(render_err)?;
            }
        }

        // 3) Markers
        chart
            .draw_series(self.regions.iter().map(|r| {
                Circle::new(
                    (r.coord.lon, r.coord.lat),
                    marker_r.round() as i32,
                    rgb(r.color).filled(),
                )
            }))
            .map_err(render_err)?;

        // 4) Region names, centred on the label anchor with the baseline on it
        if text_on {
            for region in self.regions {
                let (lx, ly) = chart.backend_coord(&(region.label.lon, region.label.lat));
                root.draw(&Text::new(
                    region.name.as_str(),
                    (lx, baseline_to_bottom(ly, label_px)),
                    label_font.clone().pos(Pos::new(HPos::Center, VPos::Bottom)),
                ))
                .map_err(render_err)?;
            }
        }

        // 5) Legend
        let items: Vec<(String, RGBColor)> = self
            .legend
            .iter()
            .map(|(name, c)| (name.clone(), rgb(*c)))
            .collect();
        let legend = Legend {
            title: Some(opts.legend_title.as_str()).filter(|t| !t.is_empty()),
            items: &items,
            label_font: self.style.font(opts.legend_font_pt, dpi).color(&BLACK),
            label_px: pt_to_px(opts.legend_font_pt, dpi),
            title_font: Some(self.style.font(opts.legend_title_pt, dpi).color(&BLACK)),
            title_px: pt_to_px(opts.legend_title_pt, dpi),
            edged_swatches: true,
            line_px: stroke_px(0.8, dpi),
        };
        draw_legend(root, plot, Corner::LowerLeft, &legend, text_on)?;

        Ok(())
    }
}

/// Render the annotated map to `out_path` (PNG, or SVG by extension).
pub fn plot_map<P: AsRef<Path>>(
    features: &FeatureCollection,
    regions: &[Region],
    legend: &[(String, HexColor)],
    style: &FigureStyle,
    opts: &MapOptions,
    out_path: P,
) -> Result<()> {
    if features.is_empty() {
        return Err(Error::EmptyFeatures(out_path.as_ref().to_path_buf()));
    }
    if !opts.dpi.is_finite() || opts.dpi <= 0.0 {
        return Err(Error::Config(format!("map dpi must be positive, got {}", opts.dpi)));
    }
    let out_path = out_path.as_ref();
    let figure = MapFigure {
        features,
        regions,
        legend,
        style,
        opts,
    };
    let pad = pt_to_px(opts.pad_in * 72.0, opts.dpi).round() as u32;
    save_figure(&figure, out_path, opts.size.pixels(opts.dpi), pad)?;
    info!(
        "map with {} regions written to {}",
        regions.len(),
        out_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_aspect_fits_width_or_height() {
        // 360x180 degrees on a 2:1 canvas fills it exactly.
        assert_eq!(equal_aspect_rect(2000, 1000, 360.0, 180.0), (0, 0, 2000, 1000));
        // Square extent on a wide canvas is centred horizontally.
        assert_eq!(equal_aspect_rect(2000, 1000, 10.0, 10.0), (500, 0, 1500, 1000));
        // Wide extent on a square canvas is centred vertically.
        assert_eq!(equal_aspect_rect(1000, 1000, 20.0, 10.0), (0, 250, 1000, 750));
    }

    #[test]
    fn baseline_sits_above_box_bottom() {
        assert_eq!(baseline_to_bottom(100, 0.0), 100);
        assert_eq!(baseline_to_bottom(100, 50.0), 111);
        assert!(baseline_to_bottom(100, 175.0) > baseline_to_bottom(100, 14.0));
    }

    #[test]
    fn holes_are_not_filled_as_land() {
        use geo::{MultiPolygon, polygon};
        let land: geo::Polygon<f64> = polygon!(
            exterior: [
                (x: 0.0, y: 0.0),
                (x: 10.0, y: 0.0),
                (x: 10.0, y: 10.0),
                (x: 0.0, y: 10.0),
                (x: 0.0, y: 0.0),
            ],
            interiors: [[
                (x: 4.0, y: 4.0),
                (x: 6.0, y: 4.0),
                (x: 6.0, y: 6.0),
                (x: 4.0, y: 6.0),
                (x: 4.0, y: 4.0),
            ]],
        );
        let features = FeatureCollection {
            features: vec![Feature::Area(MultiPolygon::new(vec![land]))],
        };
        let opts = MapOptions {
            dpi: 72.0,
            land_fill: HexColor::rgb(200, 200, 0),
            legend_title: String::new(),
            ..MapOptions::default()
        };
        let style = FigureStyle::default();
        let figure = MapFigure {
            features: &features,
            regions: &[],
            legend: &[],
            style: &style,
            opts: &opts,
        };

        let (w, h) = (200u32, 200u32);
        let mut buf = vec![255u8; (w * h * 3) as usize];
        {
            let root = plotters_bitmap::BitMapBackend::with_buffer(&mut buf, (w, h))
                .into_drawing_area();
            figure.draw(&root).unwrap();
            root.present().unwrap();
        }
        let img = image::RgbImage::from_raw(w, h, buf).unwrap();
        // (5, 5) is the middle of the hole; (2, 5) is land.
        assert_eq!(*img.get_pixel(100, 100), image::Rgb([255, 255, 255]));
        assert_eq!(*img.get_pixel(45, 100), image::Rgb([200, 200, 0]));
    }

    #[test]
    fn defaults_match_reference_figure() {
        let o = MapOptions::default();
        assert_eq!(o.size.pixels(o.dpi), (18000, 9000));
        assert_eq!(o.marker_size_pt, 30.0);
        assert_eq!(o.arrow_rad, 0.2);
        assert_eq!(o.legend_title, "Major Aquifer Regions");
    }
}
