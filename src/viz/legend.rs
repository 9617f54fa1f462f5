//! Framed legend boxes anchored to a corner of the plotting rectangle.
//!
//! Layout is expressed in multiples of the entry font size, so a legend keeps its
//! proportions at any DPI:
//! - border padding 0.4, gap to the plot edge 0.5
//! - swatch 2.0 wide × 0.7 tall, 0.8 between swatch and text
//! - 0.5 between rows

use super::text::measure;
use crate::error::{Result, render_err};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

/// Corner of the plotting rectangle the legend is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
}

/// Pixel rectangle `[left, top, right, bottom]`.
pub type PxRect = (i32, i32, i32, i32);

/// What to draw and at which sizes.
pub struct Legend<'a> {
    pub title: Option<&'a str>,
    pub items: &'a [(String, RGBColor)],
    pub label_font: TextStyle<'a>,
    pub label_px: f64,
    pub title_font: Option<TextStyle<'a>>,
    pub title_px: f64,
    /// Draw a black outline around each swatch.
    pub edged_swatches: bool,
    pub line_px: u32,
}

/// Draw the legend inside `plot`, pinned to `corner`. When `text_on` is false only
/// the frame and swatches are drawn.
pub fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    plot: PxRect,
    corner: Corner,
    legend: &Legend,
    text_on: bool,
) -> Result<()> {
    let fs = legend.label_px;
    let pad = (0.4 * fs).round() as i32;
    let gap = (0.5 * fs).round() as i32;
    let swatch_w = (2.0 * fs).round() as i32;
    let swatch_h = (0.7 * fs).round().max(1.0) as i32;
    let swatch_gap = (0.8 * fs).round() as i32;
    let row_gap = (0.5 * fs).round() as i32;

    let label_sizes: Vec<(u32, u32)> = legend
        .items
        .iter()
        .map(|(label, _)| measure(area, label, &legend.label_font, fs))
        .collect();
    let title_size = match (legend.title, legend.title_font.as_ref()) {
        (Some(t), Some(font)) if text_on => Some(measure(area, t, font, legend.title_px)),
        _ => None,
    };

    let row_h: Vec<i32> = label_sizes
        .iter()
        .map(|(_, h)| (*h as i32).max(swatch_h))
        .collect();
    let rows_w = label_sizes
        .iter()
        .map(|(w, _)| swatch_w + swatch_gap + *w as i32)
        .max()
        .unwrap_or(swatch_w);
    let title_w = title_size.map(|(w, _)| w as i32).unwrap_or(0);
    let title_h = title_size.map(|(_, h)| h as i32 + row_gap).unwrap_or(0);

    let box_w = 2 * pad + rows_w.max(title_w);
    let box_h = 2 * pad
        + title_h
        + row_h.iter().sum::<i32>()
        + row_gap * (row_h.len() as i32 - 1).max(0);

    let (left, top, right, bottom) = plot;
    let x0 = match corner {
        Corner::UpperLeft | Corner::LowerLeft => left + gap,
        Corner::UpperRight | Corner::LowerRight => right - gap - box_w,
    };
    let y0 = match corner {
        Corner::UpperLeft | Corner::UpperRight => top + gap,
        Corner::LowerLeft | Corner::LowerRight => bottom - gap - box_h,
    };

    area.draw(&Rectangle::new(
        [(x0, y0), (x0 + box_w, y0 + box_h)],
        WHITE.mix(0.8).filled(),
    ))
    .map_err(render_err)?;
    area.draw(&Rectangle::new(
        [(x0, y0), (x0 + box_w, y0 + box_h)],
        RGBColor(204, 204, 204).stroke_width(legend.line_px),
    ))
    .map_err(render_err)?;

    let mut y = y0 + pad;
    if let (Some(title), Some(font), Some(_)) =
        (legend.title, legend.title_font.as_ref(), title_size)
    {
        area.draw(&Text::new(
            title,
            (x0 + box_w / 2, y),
            font.clone().pos(Pos::new(HPos::Center, VPos::Top)),
        ))
        .map_err(render_err)?;
        y += title_h;
    }

    for ((label, color), h) in legend.items.iter().zip(row_h.iter()) {
        let cy = y + h / 2;
        let sx = x0 + pad;
        let swatch = [(sx, cy - swatch_h / 2), (sx + swatch_w, cy + swatch_h / 2)];
        area.draw(&Rectangle::new(swatch, color.filled()))
            .map_err(render_err)?;
        if legend.edged_swatches {
            area.draw(&Rectangle::new(swatch, BLACK.stroke_width(legend.line_px)))
                .map_err(render_err)?;
        }
        if text_on {
            area.draw(&Text::new(
                label.as_str(),
                (sx + swatch_w + swatch_gap, cy),
                legend.label_font.clone().pos(Pos::new(HPos::Left, VPos::Center)),
            ))
            .map_err(render_err)?;
        }
        y += h + row_gap;
    }
    Ok(())
}
