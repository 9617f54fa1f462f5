//! Figure-wide text style and the fixed colours used by both figures.
//!
//! Sizes are given in typographic points and converted to pixels for the
//! figure's DPI, so a figure renders with the same proportions at any resolution.

use crate::models::HexColor;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ROYAL_BLUE: HexColor = HexColor::rgb(65, 105, 225);
pub const INDIAN_RED: HexColor = HexColor::rgb(205, 92, 92);
pub const BROWN: HexColor = HexColor::rgb(165, 42, 42);
pub const BLACK_HEX: HexColor = HexColor::rgb(0, 0, 0);
pub const WHITE_HEX: HexColor = HexColor::rgb(255, 255, 255);

/// Weight applied to every text element of a figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    Bold,
}

/// Text settings shared by the map and the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureStyle {
    /// Family name fonts are registered under (`serif`, `sans-serif`, ...).
    pub font_family: String,
    pub font_weight: FontWeight,
    /// Regular face; when unset, well-known system locations are searched.
    pub font_regular: Option<PathBuf>,
    /// Bold face; falls back to the regular face.
    pub font_bold: Option<PathBuf>,
}

impl Default for FigureStyle {
    fn default() -> Self {
        Self {
            font_family: "serif".into(),
            font_weight: FontWeight::Bold,
            font_regular: None,
            font_bold: None,
        }
    }
}

impl FigureStyle {
    /// Font at `size_pt` points for a figure rendered at `dpi`.
    pub fn font(&self, size_pt: f64, dpi: f64) -> FontDesc<'_> {
        let style = match self.font_weight {
            FontWeight::Normal => FontStyle::Normal,
            FontWeight::Bold => FontStyle::Bold,
        };
        FontDesc::new(
            FontFamily::Name(&self.font_family),
            pt_to_px(size_pt, dpi),
            style,
        )
    }
}

/// Convert points (1/72 in) to pixels.
#[inline]
pub fn pt_to_px(pt: f64, dpi: f64) -> f64 {
    pt * dpi / 72.0
}

/// Same as [`pt_to_px`], rounded to a whole stroke width of at least one pixel.
#[inline]
pub fn stroke_px(pt: f64, dpi: f64) -> u32 {
    pt_to_px(pt, dpi).round().max(1.0) as u32
}

/// Plotters colour for a dataset colour.
#[inline]
pub fn rgb(c: HexColor) -> RGBColor {
    RGBColor(c.r, c.g, c.b)
}

/// Physical size of a figure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FigureSize {
    pub width_in: f64,
    pub height_in: f64,
}

impl FigureSize {
    pub const fn new(width_in: f64, height_in: f64) -> Self {
        Self {
            width_in,
            height_in,
        }
    }

    /// Canvas dimensions in pixels at `dpi`.
    pub fn pixels(&self, dpi: f64) -> (u32, u32) {
        (
            (self.width_in * dpi).round().max(1.0) as u32,
            (self.height_in * dpi).round().max(1.0) as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_scale_with_dpi() {
        assert_eq!(pt_to_px(72.0, 900.0), 900.0);
        assert_eq!(pt_to_px(14.0, 72.0), 14.0);
        assert_eq!(stroke_px(0.8, 72.0), 1);
        assert_eq!(stroke_px(1.5, 900.0), 19);
    }

    #[test]
    fn figure_pixels() {
        assert_eq!(FigureSize::new(20.0, 10.0).pixels(900.0), (18000, 9000));
        assert_eq!(FigureSize::new(14.0, 6.0).pixels(50.0), (700, 300));
    }

    #[test]
    fn default_style_is_bold_serif() {
        let s = FigureStyle::default();
        assert_eq!(s.font_family, "serif");
        assert_eq!(s.font_weight, FontWeight::Bold);
    }
}
