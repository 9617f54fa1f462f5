//! Grouped dual-axis bar chart of depletion rates.
//!
//! Each region is one category on the shared x axis. The depth rate (mm/year) is
//! drawn left of the category centre against the left axis; the volume rate
//! (km³/year) right of it against an independently scaled right axis.

use super::fonts::ensure_registered;
use super::legend::{Corner, Legend, draw_legend};
use super::output::{Figure, save_figure};
use super::style::{
    BROWN, FigureSize, FigureStyle, INDIAN_RED, ROYAL_BLUE, pt_to_px, rgb, stroke_px,
};
use super::text::{estimate_text_width_px, measure};
use crate::error::{Error, Result, render_err};
use crate::models::{DepletionRecord, HexColor};
use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontTransform;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;

/// Chart figure settings. Defaults reproduce the reference figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub size: FigureSize,
    pub dpi: f64,
    /// Bar width as a fraction of one category; at most 0.5.
    pub bar_width: f64,
    pub primary_color: HexColor,
    pub secondary_color: HexColor,
    /// Colour of the right axis title and tick labels.
    pub secondary_axis_color: HexColor,
    pub primary_axis_label: String,
    pub secondary_axis_label: String,
    pub primary_legend: String,
    pub secondary_legend: String,
    pub tick_font_pt: f64,
    pub axis_label_font_pt: f64,
    pub legend_font_pt: f64,
    pub pad_in: f64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            size: FigureSize::new(14.0, 6.0),
            dpi: 900.0,
            bar_width: 0.35,
            primary_color: ROYAL_BLUE,
            secondary_color: INDIAN_RED,
            secondary_axis_color: BROWN,
            primary_axis_label: "Depletion Rate (mm/year)".into(),
            secondary_axis_label: "Depletion Rate (km³/year)".into(),
            primary_legend: "mm/year".into(),
            secondary_legend: "km³/year".into(),
            tick_font_pt: 12.0,
            axis_label_font_pt: 14.0,
            legend_font_pt: 12.0,
            pad_in: 0.1,
        }
    }
}

/// One bar in category units (x) and data units (height).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub x0: f64,
    pub x1: f64,
    pub height: f64,
}

/// The two bars of one category.
#[derive(Debug, Clone, PartialEq)]
pub struct BarPair {
    pub index: usize,
    pub label: String,
    /// mm/year, left of centre.
    pub primary: Bar,
    /// km³/year, right of centre.
    pub secondary: Bar,
}

/// Place both bar series. Category `i` is centred on `x = i`; each bar is `width`
/// wide and offset by half its width to either side.
pub fn bar_layout(records: &[DepletionRecord], width: f64) -> Result<Vec<BarPair>> {
    if !(width > 0.0 && width <= 0.5) {
        return Err(Error::Config(format!(
            "bar width must be in (0, 0.5] so neighbouring groups do not overlap, got {}",
            width
        )));
    }
    Ok(records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let c = i as f64;
            BarPair {
                index: i,
                label: r.label.clone(),
                primary: Bar {
                    x0: c - width,
                    x1: c,
                    height: r.mm_per_year,
                },
                secondary: Bar {
                    x0: c,
                    x1: c + width,
                    height: r.km3_per_year,
                },
            }
        })
        .collect())
}

/// Axis range with 5 % headroom above the data, always including zero.
pub fn value_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if hi - lo < f64::EPSILON {
        return 0.0..1.0;
    }
    let span = hi - lo;
    let lo = if lo < 0.0 { lo - 0.05 * span } else { 0.0 };
    let hi = if hi > 0.0 { hi + 0.05 * span } else { 0.0 };
    lo..hi
}

/// Compact tick label: up to two decimals, trailing zeros trimmed.
fn tick_label(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// Width of the y label area: widest tick label plus tick marks and axis title.
fn y_label_area_px(range: &Range<f64>, ticks: usize, tick_px: f64, desc_px: f64) -> u32 {
    let widest = (0..=ticks)
        .map(|i| range.start + (range.end - range.start) * i as f64 / ticks.max(1) as f64)
        .map(|v| estimate_text_width_px(&tick_label(v), tick_px))
        .max()
        .unwrap_or(0);
    widest + (desc_px * 1.6).ceil() as u32 + (tick_px * 0.8).ceil() as u32
}

/// Axis text for the tick at `x`: the label of category `x` when `x` is a whole
/// category index, empty otherwise.
pub fn category_label(labels: &[String], x: f64) -> String {
    let i = x.round();
    if (x - i).abs() < 1e-6 && i >= 0.0 && (i as usize) < labels.len() {
        labels[i as usize].clone()
    } else {
        String::new()
    }
}

/// Tick marks below the x axis with the category labels under them, rotated to
/// read downwards. `ticks` are the points on the axis; nothing is drawn above them.
/// `label_style` is `None` when text is unavailable.
pub fn draw_category_labels<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    ticks: &[(i32, i32)],
    labels: &[String],
    label_style: Option<&TextStyle>,
    tick_len: i32,
    line: ShapeStyle,
) -> Result<()> {
    for (i, &(x, y)) in ticks.iter().enumerate() {
        area.draw(&PathElement::new(vec![(x, y), (x, y + tick_len)], line))
            .map_err(render_err)?;
        let Some(style) = label_style else {
            continue;
        };
        let text = category_label(labels, i as f64);
        if text.is_empty() {
            continue;
        }
        // Rotated text starts at the anchor and runs down, centred on the tick.
        area.draw(&Text::new(
            text,
            (x, y + 2 * tick_len),
            style.clone().pos(Pos::new(HPos::Left, VPos::Center)),
        ))
        .map_err(render_err)?;
    }
    Ok(())
}

/// Chart ready to draw on any backend.
pub struct ChartFigure<'a> {
    pub bars: &'a [BarPair],
    pub style: &'a FigureStyle,
    pub opts: &'a ChartOptions,
}

impl Figure for ChartFigure<'_> {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        let opts = self.opts;
        let dpi = opts.dpi;
        let text_on = ensure_registered(self.style);
        let n = self.bars.len();

        let tick_px = pt_to_px(opts.tick_font_pt, dpi);
        let desc_px = pt_to_px(opts.axis_label_font_pt, dpi);
        let tick_font = self.style.font(opts.tick_font_pt, dpi);
        let desc_font = self.style.font(opts.axis_label_font_pt, dpi);
        let sec_color = rgb(opts.secondary_axis_color);

        let x_range = -0.5..(n as f64 - 0.5);
        let y1 = value_range(self.bars.iter().map(|b| b.primary.height));
        let y2 = value_range(self.bars.iter().map(|b| b.secondary.height));
        let y_ticks = 8usize;

        let labels: Vec<String> = self
            .bars
            .iter()
            .map(|b| b.label.lines().map(str::trim).collect::<Vec<_>>().join(" "))
            .collect();
        let x_area = if text_on {
            labels
                .iter()
                .map(|l| measure(root, l, &tick_font.clone().into(), tick_px).0)
                .max()
                .unwrap_or(0)
                + (tick_px * 1.5).ceil() as u32
        } else {
            (tick_px * 1.5).ceil() as u32
        };
        let left_area = y_label_area_px(&y1, y_ticks, tick_px, desc_px);
        let right_area = y_label_area_px(&y2, y_ticks, tick_px, desc_px);
        let margin = pt_to_px(14.0, dpi).round() as u32;

        let mut chart = ChartBuilder::on(root)
            .margin(margin)
            .x_label_area_size(x_area)
            .y_label_area_size(left_area)
            .right_y_label_area_size(right_area)
            .build_cartesian_2d(x_range.clone(), y1.clone())
            .map_err(render_err)?
            .set_secondary_coord(x_range, y2.clone());

        let y_fmt = |v: &f64| tick_label(*v);
        let axis_px = stroke_px(0.8, dpi);

        {
            let mut mesh = chart.configure_mesh();
            // Category ticks and labels are drawn separately below.
            mesh.disable_mesh()
                .axis_style(BLACK.stroke_width(axis_px))
                .x_labels(0)
                .y_labels(y_ticks)
                .y_label_formatter(&y_fmt);
            if text_on {
                mesh.y_label_style(tick_font.clone())
                    .y_desc(opts.primary_axis_label.as_str())
                    .axis_desc_style(desc_font.clone());
            } else {
                mesh.y_labels(0);
            }
            mesh.draw().map_err(render_err)?;
        }

        {
            let mut secondary = chart.configure_secondary_axes();
            secondary
                .axis_style(sec_color.stroke_width(axis_px))
                .y_labels(y_ticks)
                .y_label_formatter(&y_fmt);
            if text_on {
                secondary
                    .label_style(tick_font.clone().color(&sec_color))
                    .y_desc(opts.secondary_axis_label.as_str())
                    .axis_desc_style(desc_font.color(&sec_color));
            } else {
                secondary.y_labels(0);
            }
            secondary.draw().map_err(render_err)?;
        }

        let primary = rgb(opts.primary_color);
        let secondary = rgb(opts.secondary_color);
        chart
            .draw_series(self.bars.iter().map(|b| {
                let p = b.primary;
                Rectangle::new(
                    [(p.x0, p.height.min(0.0)), (p.x1, p.height.max(0.0))],
                    primary.filled(),
                )
            }))
            .map_err(render_err)?;
        chart
            .draw_secondary_series(self.bars.iter().map(|b| {
                let s = b.secondary;
                Rectangle::new(
                    [(s.x0, s.height.min(0.0)), (s.x1, s.height.max(0.0))],
                    secondary.filled(),
                )
            }))
            .map_err(render_err)?;

        // Close the frame along the top edge.
        let (xs, ys) = chart.plotting_area().get_pixel_range();
        let plot = (xs.start, ys.start, xs.end, ys.end);
        root.draw(&PathElement::new(
            vec![(xs.start, ys.start), (xs.end, ys.start)],
            BLACK.stroke_width(axis_px),
        ))
        .map_err(render_err)?;

        let ticks: Vec<(i32, i32)> = (0..n)
            .map(|i| (chart.backend_coord(&(i as f64, y1.start)).0, ys.end))
            .collect();
        let label_style = tick_font
            .transform(FontTransform::Rotate90)
            .color(&BLACK);
        draw_category_labels(
            root,
            &ticks,
            &labels,
            text_on.then_some(&label_style),
            (tick_px * 0.4).ceil().max(1.0) as i32,
            BLACK.stroke_width(axis_px),
        )?;

        let legend_px = pt_to_px(opts.legend_font_pt, dpi);
        let legend_font = self.style.font(opts.legend_font_pt, dpi).color(&BLACK);
        let line_px = stroke_px(0.8, dpi);
        let left_items = [(opts.primary_legend.clone(), primary)];
        let right_items = [(opts.secondary_legend.clone(), secondary)];
        for (items, corner) in [
            (&left_items, Corner::UpperLeft),
            (&right_items, Corner::UpperRight),
        ] {
            let legend = Legend {
                title: None,
                items,
                label_font: legend_font.clone(),
                label_px: legend_px,
                title_font: None,
                title_px: legend_px,
                edged_swatches: false,
                line_px,
            };
            draw_legend(root, plot, corner, &legend, text_on)?;
        }

        Ok(())
    }
}

/// Render the dual-axis depletion chart to `out_path` (PNG, or SVG by extension).
pub fn plot_depletion_chart<P: AsRef<Path>>(
    records: &[DepletionRecord],
    style: &FigureStyle,
    opts: &ChartOptions,
    out_path: P,
) -> Result<Vec<BarPair>> {
    if records.is_empty() {
        return Err(Error::Dataset("no depletion records to plot".into()));
    }
    if !opts.dpi.is_finite() || opts.dpi <= 0.0 {
        return Err(Error::Config(format!("chart dpi must be positive, got {}", opts.dpi)));
    }
    let out_path = out_path.as_ref();
    let bars = bar_layout(records, opts.bar_width)?;
    let figure = ChartFigure {
        bars: &bars,
        style,
        opts,
    };
    let pad = (opts.pad_in * opts.dpi).round() as u32;
    save_figure(&figure, out_path, opts.size.pixels(opts.dpi), pad)?;
    info!(
        "depletion chart with {} regions written to {}",
        bars.len(),
        out_path.display()
    );
    Ok(bars)
}
