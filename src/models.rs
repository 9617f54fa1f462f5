//! Reference data: aquifer locations, their legend colours, and depletion rates.
//!
//! The built-in [`Dataset::default`] carries the nine regions and the rates of
//! Famiglietti, J. S. (2014), *The global groundwater crisis*, Nature Climate Change 4, 945–948.
//! A dataset can also be loaded from JSON with the same shape.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Longitude/latitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Opaque 8-bit RGB colour, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `rrggbb` (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for HexColor {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        HexColor::parse(&s).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid hex colour '{s}', expected #rrggbb"))
        })
    }
}

/// Where a region sits on the map and where its label goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionLocation {
    pub name: String,
    /// Marker position.
    pub coord: LonLat,
    /// Text anchor (horizontal centre, baseline) the arrow starts from.
    pub label: LonLat,
}

/// Legend colour of a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionColor {
    pub name: String,
    pub color: HexColor,
}

/// A region joined from the location and colour tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    pub coord: LonLat,
    pub label: LonLat,
    pub color: HexColor,
}

/// Depletion rates as three parallel arrays; index `i` is the same region in each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepletionTable {
    /// Region name and measurement period, separated by a newline.
    pub labels: Vec<String>,
    pub mm_per_year: Vec<f64>,
    pub km3_per_year: Vec<f64>,
}

/// One row of the depletion table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepletionRecord {
    pub label: String,
    pub mm_per_year: f64,
    pub km3_per_year: f64,
}

impl DepletionRecord {
    /// First line of the label: the region name.
    pub fn region(&self) -> &str {
        self.label.lines().next().unwrap_or("").trim()
    }

    /// Remaining label text with surrounding parentheses removed, e.g. `2003–2013`.
    pub fn period(&self) -> &str {
        match self.label.split_once('\n') {
            Some((_, rest)) => rest.trim().trim_start_matches('(').trim_end_matches(')'),
            None => "",
        }
    }

    /// Label on a single line, for places that cannot break text.
    pub fn one_line_label(&self) -> String {
        self.label.lines().map(str::trim).collect::<Vec<_>>().join(" ")
    }
}

impl DepletionTable {
    /// Zip the parallel arrays into records, checking lengths and values.
    pub fn records(&self) -> Result<Vec<DepletionRecord>> {
        let n = self.labels.len();
        if self.mm_per_year.len() != n || self.km3_per_year.len() != n {
            return Err(Error::Dataset(format!(
                "depletion arrays differ in length: labels={}, mm_per_year={}, km3_per_year={}",
                n,
                self.mm_per_year.len(),
                self.km3_per_year.len()
            )));
        }
        self.labels
            .iter()
            .zip(self.mm_per_year.iter().zip(self.km3_per_year.iter()))
            .map(|(label, (&mm, &km3))| {
                if !mm.is_finite() || !km3.is_finite() {
                    return Err(Error::Dataset(format!(
                        "non-finite depletion rate for '{}'",
                        label.replace('\n', " ")
                    )));
                }
                Ok(DepletionRecord {
                    label: label.clone(),
                    mm_per_year: mm,
                    km3_per_year: km3,
                })
            })
            .collect()
    }
}

/// The complete set of reference tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Marker table; drawing order.
    pub regions: Vec<RegionLocation>,
    /// Colour table; legend order.
    pub colors: Vec<RegionColor>,
    pub depletion: DepletionTable,
}

impl Dataset {
    /// Load a dataset from a JSON file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let dataset: Dataset = serde_json::from_str(&text)?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// Check both region tables share one key set and the depletion arrays line up.
    pub fn validate(&self) -> Result<()> {
        self.joined_regions()?;
        self.depletion.records()?;
        Ok(())
    }

    /// Regions in marker-table order, each with its colour.
    pub fn joined_regions(&self) -> Result<Vec<Region>> {
        let located: BTreeSet<&str> = self.regions.iter().map(|r| r.name.as_str()).collect();
        let colored: BTreeSet<&str> = self.colors.iter().map(|c| c.name.as_str()).collect();
        if located.len() != self.regions.len() {
            return Err(Error::Dataset("duplicate region name in marker table".into()));
        }
        if colored.len() != self.colors.len() {
            return Err(Error::Dataset("duplicate region name in colour table".into()));
        }
        let no_color: Vec<&str> = located.difference(&colored).copied().collect();
        let no_marker: Vec<&str> = colored.difference(&located).copied().collect();
        if !no_color.is_empty() || !no_marker.is_empty() {
            return Err(Error::Dataset(format!(
                "region tables disagree; without colour: {:?}, without marker: {:?}",
                no_color, no_marker
            )));
        }

        Ok(self
            .regions
            .iter()
            .filter_map(|loc| {
                let color = self.colors.iter().find(|c| c.name == loc.name)?.color;
                Some(Region {
                    name: loc.name.clone(),
                    coord: loc.coord,
                    label: loc.label,
                    color,
                })
            })
            .collect())
    }

    /// Legend entries in colour-table order.
    pub fn legend_entries(&self) -> Vec<(String, HexColor)> {
        self.colors.iter().map(|c| (c.name.clone(), c.color)).collect()
    }
}

impl Default for Dataset {
    fn default() -> Self {
        // (name, marker, label, colour)
        let table: [(&str, LonLat, LonLat, HexColor); 9] = [
            (
                "Northwest Sahara",
                LonLat::new(10.0, 26.0),
                LonLat::new(-20.0, 22.0),
                HexColor::rgb(0x1f, 0x78, 0xb4),
            ),
            (
                "California Central Valley",
                LonLat::new(-120.0, 37.0),
                LonLat::new(-140.0, 27.0),
                HexColor::rgb(0x33, 0xa0, 0x2c),
            ),
            (
                "High Plains (Ogallala)",
                LonLat::new(-100.0, 39.0),
                LonLat::new(-90.0, 52.0),
                HexColor::rgb(0xe3, 0x1a, 0x1c),
            ),
            (
                "Guarani",
                LonLat::new(-55.0, -25.0),
                LonLat::new(-35.0, -35.0),
                HexColor::rgb(0xff, 0x7f, 0x00),
            ),
            (
                "Northern Middle East",
                LonLat::new(44.0, 34.0),
                LonLat::new(44.0, 47.0),
                HexColor::rgb(0x6a, 0x3d, 0x9a),
            ),
            (
                "Arabian",
                LonLat::new(50.0, 20.0),
                LonLat::new(65.0, 10.0),
                HexColor::rgb(0xb1, 0x59, 0x28),
            ),
            (
                "Northwestern India",
                LonLat::new(73.0, 28.0),
                LonLat::new(83.0, 20.0),
                HexColor::rgb(0xa6, 0xce, 0xe3),
            ),
            (
                "North China Plain",
                LonLat::new(116.0, 36.0),
                LonLat::new(135.0, 42.0),
                HexColor::rgb(0xfb, 0x9a, 0x99),
            ),
            (
                "Canning Basin",
                LonLat::new(122.0, -22.0),
                LonLat::new(140.0, -32.0),
                HexColor::rgb(0xfd, 0xbf, 0x6f),
            ),
        ];

        let regions = table
            .iter()
            .map(|(name, coord, label, _)| RegionLocation {
                name: (*name).to_string(),
                coord: *coord,
                label: *label,
            })
            .collect();
        let colors = table
            .iter()
            .map(|(name, _, _, color)| RegionColor {
                name: (*name).to_string(),
                color: *color,
            })
            .collect();

        let depletion = DepletionTable {
            labels: [
                "Northwest Sahara\n(2003–2013)",
                "California Central Valley\n(2003–2010)",
                "High Plains (Ogallala)\n(2003–2013)",
                "Guarani\n(2003–2009)",
                "Northern Middle East\n(2003–2009)",
                "Arabian\n(2003–2013)",
                "Northwestern India\n(2002–2008)",
                "North China Plain\n(2003–2010)",
                "Canning Basin\n(2003–2013)",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            mm_per_year: vec![2.8, 20.4, 27.6, 0.6, 17.3, 9.1, 40.0, 22.0, 9.4],
            km3_per_year: vec![2.7, 3.1, 12.5, 1.0, 13.0, 15.5, 17.7, 8.3, 3.6],
        };

        Self {
            regions,
            colors,
            depletion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tables_share_key_set() {
        let ds = Dataset::default();
        let located: BTreeSet<&str> = ds.regions.iter().map(|r| r.name.as_str()).collect();
        let colored: BTreeSet<&str> = ds.colors.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(located, colored);
        assert_eq!(ds.joined_regions().unwrap().len(), 9);
    }

    #[test]
    fn orphaned_colour_is_rejected() {
        let mut ds = Dataset::default();
        ds.colors.push(RegionColor {
            name: "Atlantis".into(),
            color: HexColor::rgb(0, 0, 0),
        });
        let err = ds.validate().unwrap_err().to_string();
        assert!(err.contains("Atlantis"), "{err}");
    }

    #[test]
    fn parallel_arrays_must_align() {
        let mut ds = Dataset::default();
        ds.depletion.km3_per_year.pop();
        assert!(matches!(ds.depletion.records(), Err(Error::Dataset(_))));
    }

    #[test]
    fn record_label_parts() {
        let recs = Dataset::default().depletion.records().unwrap();
        assert_eq!(recs[2].region(), "High Plains (Ogallala)");
        assert_eq!(recs[2].period(), "2003–2013");
        assert_eq!(recs[6].one_line_label(), "Northwestern India (2002–2008)");
    }

    #[test]
    fn hex_colour_parsing() {
        assert_eq!(HexColor::parse("#1f78b4"), Some(HexColor::rgb(0x1f, 0x78, 0xb4)));
        assert_eq!(HexColor::parse("FDBF6F"), Some(HexColor::rgb(0xfd, 0xbf, 0x6f)));
        assert_eq!(HexColor::parse("#12345"), None);
        assert_eq!(HexColor::parse("#gg0000"), None);
    }
}
