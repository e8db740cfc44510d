//! PDF documents for discipline cases.
//!
//! Every template lays its content out on a [`canvas::Sheet`] with fixed
//! millimetre coordinates on A4, then [`render::render_pdf`] produces the
//! bytes. Templates:
//! - [`summary`] - one-page case summary, also printed in bulk
//! - [`full_report`] - individual report with a key/value table
//! - [`letter`] - warning letter to parents
//! - [`table_report`] - landscape table of many cases

pub mod canvas;
pub mod full_report;
pub mod letter;
pub mod logo;
pub mod render;
pub mod summary;
pub mod table;
pub mod table_report;

use crate::model::{DisciplineRecord, SchoolInfo, parse_date};
use crate::query::Window;
use canvas::{FontWeight, Orientation, Sheet};
use chrono::{NaiveDateTime, Timelike};
use logo::Logo;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("PDF gagal dijana: {0}")]
    Pdf(String),
    #[error("tiada rekod untuk dicetak")]
    NoRecords,
    #[error("gagal menulis {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("lembaran kerja gagal dijana: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// A finished file, ready to be written out under its own name.
#[derive(Debug)]
pub struct GeneratedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl GeneratedDocument {
    pub fn save_in(&self, dir: &Path) -> Result<PathBuf, DocumentError> {
        let path = dir.join(&self.filename);
        fs::write(&path, &self.bytes).map_err(|source| DocumentError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// `YYYY-MM-DD` as `DD/MM/YYYY`; empty dates print as `-`.
pub fn format_date_my(date: &str) -> String {
    if date.trim().is_empty() {
        return "-".to_string();
    }
    match parse_date(date) {
        Some(d) => d.format("%d/%m/%Y").to_string(),
        None => date.to_string(),
    }
}

pub fn today_my(now: NaiveDateTime) -> String {
    now.format("%d/%m/%Y").to_string()
}

/// 12-hour clock with the Malay `PG`/`PTG` suffix, e.g. `02:05:09 PTG`.
pub fn clock_my(now: NaiveDateTime) -> String {
    let (is_pm, hour) = now.hour12();
    format!(
        "{:02}:{:02}:{:02} {}",
        hour,
        now.minute(),
        now.second(),
        if is_pm { "PTG" } else { "PG" }
    )
}

/// Student name with every whitespace run replaced by `_`.
pub fn file_stem(name: &str) -> String {
    WHITESPACE.replace_all(name, "_").into_owned()
}

/// "Prepared by" and "verified by" lines, moved to a fresh page when they
/// would start below the usable height.
pub fn draw_signature_block(sheet: &mut Sheet, start_y: f32) {
    let landscape = sheet.orientation() == Orientation::Landscape;
    let limit = if landscape { 170.0 } else { 250.0 };
    let mut y = start_y;
    if y > limit {
        sheet.add_page();
        y = 20.0;
    }

    let margin = 20.0;
    let right_x = if landscape { 180.0 } else { 130.0 };
    sheet.set_font(FontWeight::Bold);
    sheet.set_font_size(10.0);

    sheet.text("Disediakan oleh:", margin, y);
    sheet.line(margin, y + 15.0, margin + 60.0, y + 15.0);
    sheet.text("(Guru / Warden Bertugas)", margin, y + 20.0);

    sheet.text("Disahkan oleh:", right_x, y);
    sheet.line(right_x, y + 15.0, right_x + 60.0, y + 15.0);
    sheet.text("(Pentadbiran MTIJ)", right_x, y + 20.0);
}

/// Produces the PDF documents for one school.
///
/// The logo is loaded afresh for each document and left out when it cannot
/// be loaded.
#[derive(Debug, Clone)]
pub struct DocumentGenerator {
    school: SchoolInfo,
    logo_source: Option<String>,
}

impl DocumentGenerator {
    pub fn new(school: SchoolInfo, logo_source: Option<String>) -> Self {
        Self {
            school,
            logo_source,
        }
    }

    fn logo(&self) -> Option<Logo> {
        logo::fetch_or_skip(self.logo_source.as_deref())
    }

    pub fn summary(
        &self,
        record: &DisciplineRecord,
        now: NaiveDateTime,
    ) -> Result<GeneratedDocument, DocumentError> {
        summary::generate(record, &self.school, self.logo().as_ref(), now)
    }

    pub fn summaries(
        &self,
        records: &[&DisciplineRecord],
        now: NaiveDateTime,
    ) -> Result<GeneratedDocument, DocumentError> {
        if records.is_empty() {
            return Err(DocumentError::NoRecords);
        }
        summary::generate_bulk(records, &self.school, self.logo().as_ref(), now)
    }

    pub fn full_report(
        &self,
        record: &DisciplineRecord,
    ) -> Result<GeneratedDocument, DocumentError> {
        full_report::generate(record, &self.school, self.logo().as_ref())
    }

    pub fn letter(
        &self,
        record: &DisciplineRecord,
        now: NaiveDateTime,
    ) -> Result<GeneratedDocument, DocumentError> {
        letter::generate(record, &self.school, self.logo().as_ref(), now)
    }

    pub fn table_report(
        &self,
        records: &[&DisciplineRecord],
        window: Window,
        now: NaiveDateTime,
    ) -> Result<GeneratedDocument, DocumentError> {
        table_report::generate(records, window, now)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn dates_print_day_first() {
        assert_eq!(format_date_my("2024-03-01"), "01/03/2024");
        assert_eq!(format_date_my(""), "-");
        assert_eq!(format_date_my("esok"), "esok");
    }

    #[test]
    fn clock_uses_malay_suffixes() {
        let at = |h, m, s| {
            NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(h, m, s)
                .unwrap()
        };
        assert_eq!(clock_my(at(14, 5, 9)), "02:05:09 PTG");
        assert_eq!(clock_my(at(0, 30, 0)), "12:30:00 PG");
        assert_eq!(clock_my(at(12, 0, 0)), "12:00:00 PTG");
        assert_eq!(today_my(at(9, 0, 0)), "01/01/2026");
    }

    #[test]
    fn file_stem_collapses_whitespace() {
        assert_eq!(file_stem("Nur Aisyah  binti\tKamal"), "Nur_Aisyah_binti_Kamal");
    }

    #[test]
    fn signature_moves_to_new_page_when_low() {
        let mut sheet = Sheet::new(Orientation::Portrait);
        draw_signature_block(&mut sheet, 130.0);
        assert_eq!(sheet.pages().len(), 1);

        let mut sheet = Sheet::new(Orientation::Portrait);
        draw_signature_block(&mut sheet, 251.0);
        assert_eq!(sheet.pages().len(), 2);
        assert_eq!(sheet.pages()[1].texts()[0], "Disediakan oleh:");

        let mut sheet = Sheet::new(Orientation::Landscape);
        draw_signature_block(&mut sheet, 171.0);
        assert_eq!(sheet.pages().len(), 2);
    }

    #[test]
    fn empty_bulk_is_refused() {
        let generator = DocumentGenerator::new(fixtures::school(), None);
        assert!(matches!(
            generator.summaries(&[], fixtures::now()),
            Err(DocumentError::NoRecords)
        ));
    }
}
