use super::canvas::{Align, FontWeight, Orientation, Sheet};
use super::logo::Logo;
use super::render::render_pdf;
use super::{DocumentError, GeneratedDocument, file_stem, format_date_my, today_my};
use crate::model::{DisciplineRecord, SchoolInfo};
use chrono::NaiveDateTime;

const MARGIN: f32 = 20.0;
const CENTER_X: f32 = 105.0;
const TEXT_WIDTH: f32 = 170.0;
const VALUE_WIDTH: f32 = 120.0;

const SUBJECT: &str = "PER: NOTIS SALAH LAKU DISIPLIN MURID";
const OPENING: &str = "Dengan segala hormatnya perkara di atas adalah dirujuk. Dimaklumkan bahawa \
                       anak/jagaan tuan/puan telah didapati melanggar peraturan disiplin maahad \
                       seperti butiran berikut:";
const CLOSING: &str = "Kerjasama tuan/puan amatlah dihargai bagi memastikan sahsiah anak jagaan \
                       dapat diperbaiki di masa hadapan.";
const NO_DETAILS: &str = "Tiada butiran tambahan";

/// Reference number suffix: the id without its first `REC`, taken after
/// the last `-`, or `001` when nothing is left.
pub fn reference_suffix(id: &str) -> String {
    let trimmed = id.replacen("REC", "", 1);
    match trimmed.rsplit('-').next() {
        Some(last) if !last.is_empty() => last.to_string(),
        _ => "001".to_string(),
    }
}

/// `MTIJ/DISP/{year}/{suffix}`, the year taken from the case date.
pub fn reference_number(record: &DisciplineRecord) -> String {
    let year = record.date.split('-').next().unwrap_or_default();
    format!("MTIJ/DISP/{}/{}", year, reference_suffix(&record.id))
}

fn numbered_items(record: &DisciplineRecord) -> [(&'static str, String); 6] {
    let details = if record.details.is_empty() {
        NO_DETAILS
    } else {
        record.details.as_str()
    };
    [
        ("1. Jenis Kesalahan", record.violation_type.clone()),
        ("2. Kategori Kes", record.category.to_string()),
        (
            "3. Tarikh & Masa",
            format!("{} / {}", format_date_my(&record.date), record.time),
        ),
        ("4. Lokasi", record.location.clone()),
        ("5. Tindakan", record.action_taken.clone()),
        ("6. Butiran", details.to_string()),
    ]
}

/// The whole letter on a single page, laid out top to bottom.
pub fn layout(
    sheet: &mut Sheet,
    record: &DisciplineRecord,
    school: &SchoolInfo,
    logo: Option<&Logo>,
    now: NaiveDateTime,
) {
    if let Some(logo) = logo {
        sheet.image(logo, 92.5, 10.0, 25.0, 25.0);
    }

    let mut y = 42.0;
    sheet.set_font_size(14.0);
    sheet.set_font(FontWeight::Bold);
    sheet.text_aligned(&school.name.to_uppercase(), CENTER_X, y, Align::Center);

    y += 6.0;
    sheet.set_font_size(10.0);
    sheet.set_font(FontWeight::Normal);
    sheet.text_aligned(&school.address, CENTER_X, y, Align::Center);
    y += 5.0;
    sheet.text_aligned(
        &format!("Telefon: {} | Emel: {}", school.phone, school.email),
        CENTER_X,
        y,
        Align::Center,
    );
    y += 5.0;
    sheet.set_line_width(0.5);
    sheet.line(MARGIN, y, 190.0, y);

    y += 10.0;
    sheet.set_font_size(11.0);
    sheet.text(&format!("Ruj. Kami : {}", reference_number(record)), MARGIN, y);
    sheet.text(&format!("Tarikh : {}", today_my(now)), 150.0, y);

    y += 15.0;
    sheet.set_font(FontWeight::Bold);
    sheet.text("KEPADA:", MARGIN, y);
    y += 6.0;
    sheet.set_font(FontWeight::Normal);
    sheet.text("Ibu Bapa / Penjaga,", MARGIN, y);
    y += 6.0;
    sheet.set_font(FontWeight::Bold);
    sheet.text(&record.student_name.to_uppercase(), MARGIN, y);
    y += 6.0;
    sheet.set_font(FontWeight::Normal);
    sheet.text(&format!("Kelas: {}", record.student_class), MARGIN, y);

    y += 12.0;
    sheet.text("Tuan/Puan,", MARGIN, y);

    y += 10.0;
    sheet.set_font(FontWeight::Bold);
    sheet.text(SUBJECT, MARGIN, y);
    let underline = sheet.text_width(SUBJECT);
    sheet.line(MARGIN, y + 0.5, MARGIN + underline, y + 0.5);

    y += 10.0;
    sheet.set_font(FontWeight::Normal);
    let lines = sheet.text_wrapped(OPENING, MARGIN, y, TEXT_WIDTH);
    y += lines as f32 * 5.0 + 5.0;

    for (label, value) in numbered_items(record) {
        sheet.set_font(FontWeight::Bold);
        sheet.text(label, MARGIN + 5.0, y);
        sheet.set_font(FontWeight::Normal);
        let lines = sheet.text_wrapped(&format!(": {value}"), MARGIN + 50.0, y, VALUE_WIDTH);
        y += lines as f32 * 6.0;
    }

    y += 5.0;
    sheet.text_wrapped(CLOSING, MARGIN, y, TEXT_WIDTH);
    y += 10.0;
    sheet.text("Sekian, terima kasih.", MARGIN, y);

    y += 10.0;
    sheet.set_font(FontWeight::Bold);
    sheet.text("\"MEMBINA GENERASI AL-QURAN\"", MARGIN, y);
    y += 6.0;
    sheet.text("\"ADAB MENDAHULUI ILMU\"", MARGIN, y);

    y += 15.0;
    sheet.set_font(FontWeight::Normal);
    sheet.set_font_size(11.0);
    sheet.text("Yang benar,", MARGIN, y);

    y += 25.0;
    sheet.text(&".".repeat(75), MARGIN, y);
    y += 5.0;
    sheet.set_font(FontWeight::Bold);
    sheet.set_font_size(12.0);
    sheet.text("Pihak Pentadbiran Disiplin", MARGIN, y);
    y += 5.0;
    sheet.set_font_size(10.0);
    sheet.text(&school.name, MARGIN, y);
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
        filename: format!("Surat_Disiplin_{}.pdf", file_stem(&record.student_name)),
        bytes: render_pdf(&sheet, "Notis Salah Laku Disiplin Murid")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::fixtures::{now, record, school};

    #[test]
    fn suffix_follows_last_dash() {
        assert_eq!(reference_suffix("MTIJ-AB12C"), "AB12C");
        assert_eq!(reference_suffix("REC-001"), "001");
        assert_eq!(reference_suffix("REC-042"), "042");
        assert_eq!(reference_suffix("ABC"), "ABC");
        assert_eq!(reference_suffix("REC"), "001");
        assert_eq!(reference_suffix("X-"), "001");
    }

    #[test]
    fn reference_uses_case_year() {
        let rec = record("MTIJ-AB12C", "Ali");
        assert_eq!(reference_number(&rec), "MTIJ/DISP/2024/AB12C");
    }

    #[test]
    fn letter_addresses_the_parents() {
        let mut sheet = Sheet::new(Orientation::Portrait);
        layout(&mut sheet, &record("REC-001", "Nur Aisyah"), &school(), None, now());

        assert_eq!(sheet.pages().len(), 1);
        let texts = sheet.pages()[0].texts();
        assert!(texts.contains(&"Ruj. Kami : MTIJ/DISP/2024/001"));
        assert!(texts.contains(&"Tarikh : 17/10/2026"));
        assert!(texts.contains(&"NUR AISYAH"));
        assert!(texts.contains(&"Kelas: 2 Al-Ghazali"));
        assert!(texts.contains(&SUBJECT));
        assert!(texts.contains(&": SALAH LAKU SEDERHANA"));
        assert!(texts.contains(&": 01/03/2024 / 10:15"));
        assert!(texts.contains(&": Tiada butiran tambahan"));
        assert!(texts.contains(&"Pihak Pentadbiran Disiplin"));
        assert_eq!(*texts.last().unwrap(), "Maahad Tahfiz Integrasi Jerantut");
    }

    #[test]
    fn long_details_stay_on_one_page() {
        let mut rec = record("a", "Ali");
        rec.details = "Pelajar didapati berada di luar kawasan asrama selepas waktu prep malam \
                       tanpa kebenaran warden bertugas dan enggan memberi kerjasama."
            .to_string();
        let mut sheet = Sheet::new(Orientation::Portrait);
        layout(&mut sheet, &rec, &school(), None, now());
        assert_eq!(sheet.pages().len(), 1);
    }

    #[test]
    fn file_is_named_after_student() {
        let doc = generate(&record("a", "Ahmad Danial"), &school(), None, now()).unwrap();
        assert_eq!(doc.filename, "Surat_Disiplin_Ahmad_Danial.pdf");
    }
}
