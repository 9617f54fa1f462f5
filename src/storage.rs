use crate::error::Result;
use crate::models::DepletionRecord;
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Prefix cells that spreadsheets would evaluate as formulas.
fn sanitize_cell(s: &str) -> String {
    match s.chars().next() {
        Some('=' | '+' | '-' | '@') => format!("'{s}"),
        _ => s.to_string(),
    }
}

/// Save the depletion table as CSV with header `region,period,mm_per_year,km3_per_year`.
pub fn save_csv<P: AsRef<Path>>(records: &[DepletionRecord], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record(["region", "period", "mm_per_year", "km3_per_year"])?;
    for r in records {
        wtr.serialize((
            sanitize_cell(r.region()),
            sanitize_cell(r.period()),
            r.mm_per_year,
            r.km3_per_year,
        ))?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct JsonRow<'a> {
    region: &'a str,
    period: &'a str,
    label: &'a str,
    mm_per_year: f64,
    km3_per_year: f64,
}

/// Save the depletion table as a pretty JSON array.
pub fn save_json<P: AsRef<Path>>(records: &[DepletionRecord], path: P) -> Result<()> {
    let rows: Vec<JsonRow> = records
        .iter()
        .map(|r| JsonRow {
            region: r.region(),
            period: r.period(),
            label: &r.label,
            mm_per_year: r.mm_per_year,
            km3_per_year: r.km3_per_year,
        })
        .collect();
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(&rows)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}
