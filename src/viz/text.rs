//! Text measurement helpers.

use plotters::coord::Shift;
use plotters::prelude::*;

/// Heuristic: estimate pixel width of text when no font metrics are available.
pub fn estimate_text_width_px(text: &str, font_px: f64) -> u32 {
    ((text.chars().count() as f64) * font_px * 0.60).ceil() as u32
}

/// Width and height of (possibly multi-line) text, using font metrics when the
/// font is registered and the width heuristic otherwise.
pub fn measure<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    text: &str,
    style: &TextStyle,
    font_px: f64,
) -> (u32, u32) {
    let line_h = (font_px * 1.2).ceil() as u32;
    let mut w = 0u32;
    let mut lines = 0u32;
    for line in text.lines() {
        let lw = area
            .estimate_text_size(line, style)
            .map(|(w, _)| w)
            .unwrap_or_else(|_| estimate_text_width_px(line, font_px));
        w = w.max(lw);
        lines += 1;
    }
    (w, line_h * lines.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_scales_with_length_and_size() {
        assert_eq!(estimate_text_width_px("", 12.0), 0);
        assert_eq!(estimate_text_width_px("abcde", 10.0), 30);
        assert!(estimate_text_width_px("abcde", 20.0) > estimate_text_width_px("abcde", 10.0));
    }
}
