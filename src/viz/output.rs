//! Rendering figures to disk.
//!
//! PNG figures are drawn into an in-memory buffer, cropped to their content plus
//! a margin, encoded and then moved into place in one rename. SVG figures are
//! written the same way without cropping. Either way a failed render never leaves
//! a partial file at the target path.

use crate::error::{Error, Result, render_err};
use image::{ImageFormat, Rgb, RgbImage};
use log::debug;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use std::io::{Cursor, Write};
use std::path::Path;

/// Something that can draw itself onto any plotters backend.
pub trait Figure {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>;
}

/// File format chosen from the output path's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Svg,
}

impl OutputFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => OutputFormat::Svg,
            _ => OutputFormat::Png,
        }
    }
}

/// Render `figure` on a white canvas of `size` pixels and save it to `path`.
/// PNG output is cropped to the drawn content with `pad_px` of white around it.
pub fn save_figure<F: Figure>(
    figure: &F,
    path: &Path,
    size: (u32, u32),
    pad_px: u32,
) -> Result<()> {
    if size.0 == 0 || size.1 == 0 {
        return Err(Error::Config(format!("empty canvas {}x{}", size.0, size.1)));
    }
    let bytes = match OutputFormat::for_path(path) {
        OutputFormat::Png => render_png(figure, size, pad_px)?,
        OutputFormat::Svg => render_svg(figure, size)?,
    };
    write_atomically(path, &bytes)
}

fn render_png<F: Figure>(figure: &F, (w, h): (u32, u32), pad_px: u32) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; w as usize * h as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        figure.draw(&root)?;
        root.present().map_err(render_err)?;
    }
    let img = RgbImage::from_raw(w, h, buf)
        .ok_or_else(|| Error::Render("pixel buffer does not match canvas size".into()))?;
    let cropped = crop_to_content(&img, Rgb([255, 255, 255]), pad_px);
    debug!(
        "canvas {}x{} cropped to {}x{}",
        w,
        h,
        cropped.width(),
        cropped.height()
    );

    let mut out = Vec::new();
    cropped.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
    Ok(out)
}

fn render_svg<F: Figure>(figure: &F, size: (u32, u32)) -> Result<Vec<u8>> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        figure.draw(&root)?;
        root.present().map_err(render_err)?;
    }
    Ok(svg.into_bytes())
}

/// Bounding box `(x, y, w, h)` of pixels that differ from `background`.
pub fn content_bounds(img: &RgbImage, background: Rgb<u8>) -> Option<(u32, u32, u32, u32)> {
    let (mut x0, mut y0, mut x1, mut y1) = (u32::MAX, u32::MAX, 0u32, 0u32);
    for (x, y, px) in img.enumerate_pixels() {
        if *px != background {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
    }
    (x0 != u32::MAX).then(|| (x0, y0, x1 - x0 + 1, y1 - y0 + 1))
}

/// Crop to the content bounds grown by `pad` on each side (clamped to the image).
/// A blank image is returned unchanged.
pub fn crop_to_content(img: &RgbImage, background: Rgb<u8>, pad: u32) -> RgbImage {
    let Some((x, y, w, h)) = content_bounds(img, background) else {
        return img.clone();
    };
    let left = x.saturating_sub(pad);
    let top = y.saturating_sub(pad);
    let right = (x + w).saturating_add(pad).min(img.width());
    let bottom = (y + h).saturating_add(pad).min(img.height());
    image::imageops::crop_imm(img, left, top, right - left, bottom - top).to_image()
}

/// Write `bytes` to a temporary file next to `path`, then rename it over `path`.
/// The parent directory has to exist already. The file gets the same mode a plain
/// create would give it (0666 less the umask), not the temp-file default of 0600.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    #[cfg_attr(not(unix), allow(unused_mut))]
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(OutputFormat::for_path(Path::new("a/b.svg")), OutputFormat::Svg);
        assert_eq!(OutputFormat::for_path(Path::new("a/b.SVG")), OutputFormat::Svg);
        assert_eq!(OutputFormat::for_path(Path::new("a/b.png")), OutputFormat::Png);
        assert_eq!(OutputFormat::for_path(Path::new("a/b")), OutputFormat::Png);
    }

    #[test]
    fn crop_keeps_content_and_padding() {
        let mut img = RgbImage::from_pixel(100, 50, Rgb([255, 255, 255]));
        for x in 40..60 {
            for y in 20..30 {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        assert_eq!(content_bounds(&img, Rgb([255, 255, 255])), Some((40, 20, 20, 10)));
        let cropped = crop_to_content(&img, Rgb([255, 255, 255]), 5);
        assert_eq!(cropped.dimensions(), (30, 20));
        assert_eq!(*cropped.get_pixel(5, 5), Rgb([0, 0, 0]));
        assert_eq!(*cropped.get_pixel(0, 0), Rgb([255, 255, 255]));
    }

    #[test]
    fn crop_padding_is_clamped() {
        let mut img = RgbImage::from_pixel(10, 10, Rgb([255, 255, 255]));
        img.put_pixel(0, 9, Rgb([1, 2, 3]));
        let cropped = crop_to_content(&img, Rgb([255, 255, 255]), 4);
        assert_eq!(cropped.dimensions(), (5, 5));
    }

    #[test]
    fn blank_image_is_untouched() {
        let img = RgbImage::from_pixel(8, 4, Rgb([255, 255, 255]));
        assert_eq!(content_bounds(&img, Rgb([255, 255, 255])), None);
        assert_eq!(crop_to_content(&img, Rgb([255, 255, 255]), 2).dimensions(), (8, 4));
    }

    #[test]
    fn atomic_write_needs_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let ok = dir.path().join("out.bin");
        write_atomically(&ok, b"abc").unwrap();
        assert_eq!(std::fs::read(&ok).unwrap(), b"abc");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&ok).unwrap().permissions().mode();
            // readable beyond the owner, as with an ordinary create under umask 022
            assert_eq!(mode & 0o644, 0o644, "mode {:o}", mode);
        }

        let missing = dir.path().join("nope").join("out.bin");
        assert!(write_atomically(&missing, b"abc").is_err());
        assert!(!missing.exists());
    }
}
