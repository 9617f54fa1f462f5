//! Font registration for the `ab_glyph` text path.
//!
//! `ab_glyph` does not discover OS fonts, so font data has to be registered with
//! plotters before any text is drawn. Registration happens once per family name.
//! When no usable font is found, text elements are skipped and everything else
//! still renders.

use super::style::FigureStyle;
use log::{debug, warn};
use plotters::style::FontStyle;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

static REGISTERED: OnceLock<Mutex<HashMap<String, bool>>> = OnceLock::new();

const SERIF_REGULAR: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
    "/usr/share/fonts/dejavu/DejaVuSerif.ttf",
    "/usr/share/fonts/TTF/DejaVuSerif.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSerif-Regular.ttf",
    "/usr/share/fonts/liberation-serif/LiberationSerif-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Times New Roman.ttf",
    "C:\\Windows\\Fonts\\times.ttf",
];

const SERIF_BOLD: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSerif-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSerif-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSerif-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSerif-Bold.ttf",
    "/usr/share/fonts/liberation/LiberationSerif-Bold.ttf",
    "/usr/share/fonts/liberation-serif/LiberationSerif-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Times New Roman Bold.ttf",
    "C:\\Windows\\Fonts\\timesbd.ttf",
];

const SANS_REGULAR: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const SANS_BOLD: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Make sure the style's font family is registered. Returns `false` when no font
/// could be loaded, in which case callers skip drawing text.
pub fn ensure_registered(style: &FigureStyle) -> bool {
    let registry = REGISTERED.get_or_init(|| Mutex::new(HashMap::new()));
    let mut guard = match registry.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Some(&ok) = guard.get(&style.font_family) {
        return ok;
    }
    let ok = register_family(style);
    if !ok {
        warn!(
            "no font found for family '{}'; text will be omitted \
             (set style.font_regular in the config)",
            style.font_family
        );
    }
    guard.insert(style.font_family.clone(), ok);
    ok
}

fn register_family(style: &FigureStyle) -> bool {
    let serif_first = style.font_family.eq_ignore_ascii_case("serif");
    let (regular_list, bold_list) = if serif_first {
        ([SERIF_REGULAR, SANS_REGULAR].concat(), [SERIF_BOLD, SANS_BOLD].concat())
    } else {
        ([SANS_REGULAR, SERIF_REGULAR].concat(), [SANS_BOLD, SERIF_BOLD].concat())
    };

    let regular = style
        .font_regular
        .as_deref()
        .and_then(load_font)
        .or_else(|| first_loadable(&regular_list));
    let bold = style
        .font_bold
        .as_deref()
        .and_then(load_font)
        .or_else(|| first_loadable(&bold_list));

    // Either face stands in for the other.
    let (regular, bold) = match (regular, bold) {
        (Some(r), Some(b)) => (r, b),
        (Some(r), None) => (r, r),
        (None, Some(b)) => (b, b),
        (None, None) => return false,
    };

    let family = style.font_family.as_str();
    let ok_regular = plotters::style::register_font(family, FontStyle::Normal, regular).is_ok();
    let ok_bold = plotters::style::register_font(family, FontStyle::Bold, bold).is_ok();
    ok_regular && ok_bold
}

fn first_loadable(candidates: &[&str]) -> Option<&'static [u8]> {
    candidates
        .iter()
        .map(PathBuf::from)
        .filter(|p| p.is_file())
        .find_map(|p| load_font(&p))
}

/// Registered font data must live for the rest of the process.
fn load_font(path: &Path) -> Option<&'static [u8]> {
    match std::fs::read(path) {
        Ok(bytes) => {
            debug!("loaded font {}", path.display());
            Some(Box::leak(bytes.into_boxed_slice()))
        }
        Err(e) => {
            debug!("cannot read font {}: {}", path.display(), e);
            None
        }
    }
}
