use crate::model::{Category, RecordInput};
use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, Writer};
use serde::Deserialize;
use std::path::Path;

pub const HEADERS: [&str; 10] = [
    "Nama Pelajar",
    "Kelas",
    "Tarikh",
    "Masa",
    "Kategori",
    "Jenis Salah Laku",
    "Lokasi",
    "Dilaporkan Oleh",
    "Tindakan",
    "Butiran",
];

const DEFAULT_TIME: &str = "08:00";

/// One line of a batch entry CSV.
#[derive(Debug, Deserialize)]
struct CaseRow {
    #[serde(rename = "Nama Pelajar")]
    student_name: String,
    #[serde(rename = "Kelas")]
    student_class: String,
    #[serde(rename = "Tarikh")]
    date: String,
    #[serde(rename = "Masa", default)]
    time: String,
    #[serde(rename = "Kategori", default)]
    category: String,
    #[serde(rename = "Jenis Salah Laku")]
    violation_type: String,
    #[serde(rename = "Lokasi", default)]
    location: String,
    #[serde(rename = "Dilaporkan Oleh")]
    reported_by: String,
    #[serde(rename = "Tindakan", default)]
    action_taken: String,
    #[serde(rename = "Butiran", default)]
    details: String,
}

/// Accepts the full label or the bare level, e.g. `Berat`; blank means `Ringan`.
fn parse_category(value: &str) -> Option<Category> {
    let value = value.trim();
    if value.is_empty() {
        return Some(Category::Ringan);
    }
    Category::from_label(value).or_else(|| Category::from_label(&format!("SALAH LAKU {value}")))
}

impl CaseRow {
    fn into_input(self, line: usize) -> Result<RecordInput> {
        let Some(category) = parse_category(&self.category) else {
            bail!("baris {}: kategori tidak dikenali '{}'", line, self.category);
        };
        let time = if self.time.trim().is_empty() {
            DEFAULT_TIME.to_string()
        } else {
            self.time.trim().to_string()
        };
        Ok(RecordInput {
            student_name: self.student_name.trim().to_string(),
            student_class: self.student_class.trim().to_string(),
            date: self.date.trim().to_string(),
            time,
            category,
            violation_type: self.violation_type.trim().to_string(),
            location: self.location.trim().to_string(),
            reported_by: self.reported_by.trim().to_string(),
            action_taken: self.action_taken.trim().to_string(),
            details: self.details.trim().to_string(),
        })
    }
}

pub fn init_csv(filename: &str) -> Result<()> {
    let csv_filename = if filename.ends_with(".csv") {
        filename.to_string()
    } else {
        format!("{}.csv", filename)
    };

    let mut wtr = Writer::from_path(&csv_filename)?;
    wtr.write_record(HEADERS)?;
    wtr.flush()?;
    println!("Templat CSV dicipta: {}", csv_filename);
    Ok(())
}

/// Reads every row of a batch CSV; each row is validated before anything is returned.
pub fn load_batch(path: &Path) -> Result<Vec<RecordInput>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .with_context(|| format!("gagal membuka {}", path.display()))?;

    let mut inputs = Vec::new();
    for (i, result) in rdr.deserialize().enumerate() {
        // header is line 1
        let line = i + 2;
        let row: CaseRow = result.with_context(|| format!("baris {} tidak sah", line))?;
        let input = row.into_input(line)?;
        input
            .validate()
            .with_context(|| format!("baris {} ditolak", line))?;
        inputs.push(input);
    }
    Ok(inputs)
}
