use super::canvas::{FontWeight, Orientation, Rgb, Sheet};
use super::logo::Logo;
use super::render::render_pdf;
use super::{
    DocumentError, GeneratedDocument, draw_signature_block, file_stem, format_date_my, today_my,
};
use crate::model::{DisciplineRecord, SchoolInfo};
use chrono::NaiveDateTime;

const TOP: f32 = 15.0;

/// Lays out one case summary starting on the sheet's current page.
pub fn layout(
    sheet: &mut Sheet,
    record: &DisciplineRecord,
    school: &SchoolInfo,
    logo: Option<&Logo>,
    now: NaiveDateTime,
) {
    let y = TOP;
    if let Some(logo) = logo {
        sheet.image(logo, 15.0, y, 20.0, 20.0);
    }

    sheet.set_font_size(14.0);
    sheet.set_font(FontWeight::Bold);
    sheet.text("RINGKASAN KES DISIPLIN", 40.0, y + 7.0);
    sheet.set_font_size(9.0);
    sheet.set_font(FontWeight::Normal);
    sheet.text(&school.name, 40.0, y + 12.0);
    sheet.text(&format!("Tarikh Cetakan: {}", today_my(now)), 40.0, y + 17.0);

    sheet.set_draw_color(Rgb(226, 232, 240));
    sheet.line(15.0, y + 25.0, 195.0, y + 25.0);

    sheet.set_font_size(10.0);
    sheet.set_font(FontWeight::Bold);
    sheet.text("MAKLUMAT PELAJAR", 15.0, y + 35.0);
    sheet.set_font(FontWeight::Normal);
    sheet.text(&format!("Nama: {}", record.student_name), 15.0, y + 42.0);
    sheet.text(&format!("Kelas: {}", record.student_class), 15.0, y + 47.0);
    sheet.text(&format!("ID Rekod: {}", record.id), 15.0, y + 52.0);

    sheet.set_font(FontWeight::Bold);
    sheet.text("BUTIRAN KESALAHAN", 110.0, y + 35.0);
    sheet.set_font(FontWeight::Normal);
    sheet.text(&format!("Kategori: {}", record.category), 110.0, y + 42.0);
    sheet.text(&format!("Mata Demerit: {}", record.demerit), 110.0, y + 47.0);
    sheet.text(&format!("Tarikh: {}", format_date_my(&record.date)), 110.0, y + 52.0);

    sheet.set_fill_color(Rgb(248, 250, 252));
    sheet.rounded_rect_filled(15.0, y + 60.0, 180.0, 45.0, 3.0);

    sheet.set_font(FontWeight::Bold);
    sheet.text("JENIS KESALAHAN:", 20.0, y + 70.0);
    sheet.set_font(FontWeight::Normal);
    sheet.text_wrapped(&record.violation_type, 20.0, y + 77.0, 170.0);

    sheet.set_font(FontWeight::Bold);
    sheet.text("TINDAKAN:", 20.0, y + 87.0);
    sheet.set_font(FontWeight::Normal);
    sheet.text(&record.action_taken, 45.0, y + 87.0);

    sheet.set_font(FontWeight::Bold);
    sheet.text("DILAPORKAN OLEH:", 20.0, y + 93.0);
    sheet.set_font(FontWeight::Normal);
    sheet.text(&record.reported_by, 60.0, y + 93.0);

    draw_signature_block(sheet, y + 115.0);
}

pub fn generate(
    record: &DisciplineRecord,
    school: &SchoolInfo,
    logo: Option<&Logo>,
    now: NaiveDateTime,
) -> Result<GeneratedDocument, DocumentError> {
    let mut sheet = Sheet::new(Orientation::Portrait);
    layout(&mut sheet, record, school, logo, now);
    Ok(GeneratedDocument {
        filename: format!("Ringkasan_{}.pdf", file_stem(&record.student_name)),
        bytes: render_pdf(&sheet, "Ringkasan Kes Disiplin")?,
    })
}

/// Each case after the first starts on a new page.
pub fn layout_bulk(
    sheet: &mut Sheet,
    records: &[&DisciplineRecord],
    school: &SchoolInfo,
    logo: Option<&Logo>,
    now: NaiveDateTime,
) {
    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            sheet.add_page();
        }
        layout(sheet, record, school, logo, now);
    }
}

/// All summaries in one file.
pub fn generate_bulk(
    records: &[&DisciplineRecord],
    school: &SchoolInfo,
    logo: Option<&Logo>,
    now: NaiveDateTime,
) -> Result<GeneratedDocument, DocumentError> {
    let mut sheet = Sheet::new(Orientation::Portrait);
    layout_bulk(&mut sheet, records, school, logo, now);
    Ok(GeneratedDocument {
        filename: "Ringkasan_Kes_Pukal.pdf".to_string(),
        bytes: render_pdf(&sheet, "Ringkasan Kes Pukal")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::fixtures::{now, record, school};
    use crate::document::logo;
    use printpdf::image_crate::DynamicImage;

    #[test]
    fn summary_fits_one_page() {
        let mut sheet = Sheet::new(Orientation::Portrait);
        let rec = record("MTIJ-AB12C", "Nur Aisyah binti Kamal");
        layout(&mut sheet, &rec, &school(), None, now());

        assert_eq!(sheet.pages().len(), 1);
        let texts = sheet.pages()[0].texts();
        assert!(texts.contains(&"Nama: Nur Aisyah binti Kamal"));
        assert!(texts.contains(&"ID Rekod: MTIJ-AB12C"));
        assert!(texts.contains(&"Kategori: SALAH LAKU SEDERHANA"));
        assert!(texts.contains(&"Mata Demerit: -10"));
        assert!(texts.contains(&"Tarikh: 01/03/2024"));
        assert!(texts.contains(&"Tarikh Cetakan: 17/10/2026"));
        assert!(texts.contains(&"Disahkan oleh:"));
    }

    #[test]
    fn logo_is_placed_when_available() {
        let mut sheet = Sheet::new(Orientation::Portrait);
        let logo = Logo::from_image(DynamicImage::new_rgb8(8, 8));
        layout(&mut sheet, &record("a", "Ali"), &school(), Some(&logo), now());
        assert!(sheet.pages()[0].has_image());
    }

    #[test]
    fn failed_logo_still_yields_document() {
        let missing = logo::fetch_or_skip(Some("/tiada/logo.png"));
        let doc = generate(&record("a", "Ahmad Danial"), &school(), missing.as_ref(), now()).unwrap();
        assert_eq!(doc.filename, "Ringkasan_Ahmad_Danial.pdf");
        assert!(doc.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn bulk_puts_each_record_on_its_own_page() {
        let a = record("a", "Ali");
        let b = record("b", "Abu");
        let c = record("c", "Ahmad");
        let records = [&a, &b, &c];
        let mut sheet = Sheet::new(Orientation::Portrait);
        layout_bulk(&mut sheet, &records, &school(), None, now());
        assert_eq!(sheet.pages().len(), records.len());
        assert!(sheet.pages()[0].texts().contains(&"Nama: Ali"));
        assert!(sheet.pages()[1].texts().contains(&"Nama: Abu"));
        assert!(sheet.pages()[2].texts().contains(&"Nama: Ahmad"));

        let doc = generate_bulk(&[&a, &b, &c], &school(), None, now()).unwrap();
        assert_eq!(doc.filename, "Ringkasan_Kes_Pukal.pdf");
    }
}
