use super::canvas::{Align, FontWeight, Orientation, Sheet};
use super::logo::Logo;
use super::render::render_pdf;
use super::table::Table;
use super::{DocumentError, GeneratedDocument, draw_signature_block, file_stem, format_date_my};
use crate::model::{DisciplineRecord, SchoolInfo};

const CENTER_X: f32 = 105.0;
const TABLE_TOP: f32 = 85.0;

fn letterhead(sheet: &mut Sheet, school: &SchoolInfo, logo: Option<&Logo>) {
    if let Some(logo) = logo {
        sheet.image(logo, 90.0, 10.0, 30.0, 30.0);
    }

    sheet.set_font_size(14.0);
    sheet.set_font(FontWeight::Bold);
    sheet.text_aligned(&school.name.to_uppercase(), CENTER_X, 48.0, Align::Center);
    sheet.set_font_size(9.0);
    sheet.set_font(FontWeight::Normal);
    sheet.text_aligned(&school.address, CENTER_X, 54.0, Align::Center);
    sheet.text_aligned(
        &format!("Tel: {} | Email: {}", school.phone, school.email),
        CENTER_X,
        59.0,
        Align::Center,
    );
    sheet.line(20.0, 65.0, 190.0, 65.0);
}

/// Label/value rows shown in the report table.
pub fn rows(record: &DisciplineRecord) -> Vec<Vec<String>> {
    let details = if record.details.is_empty() {
        "-".to_string()
    } else {
        record.details.clone()
    };
    [
        ("ID Rekod", record.id.clone()),
        ("Nama Murid", record.student_name.clone()),
        ("Kelas", record.student_class.clone()),
        ("Tarikh", format!("{} ({})", format_date_my(&record.date), record.day)),
        ("Jenis Kesalahan", record.violation_type.clone()),
        ("Mata Demerit", record.demerit.to_string()),
        ("Tindakan", record.action_taken.clone()),
        ("Butiran", details),
    ]
    .into_iter()
    .map(|(label, value)| vec![label.to_string(), value])
    .collect()
}

pub fn layout(sheet: &mut Sheet, record: &DisciplineRecord, school: &SchoolInfo, logo: Option<&Logo>) {
    letterhead(sheet, school, logo);

    sheet.set_font_size(13.0);
    sheet.set_font(FontWeight::Bold);
    sheet.text_aligned("LAPORAN SALAH LAKU DISIPLIN INDIVIDU", CENTER_X, 75.0, Align::Center);

    let mut table = Table::new(TABLE_TOP);
    table.body = rows(record);
    table.body_style.font_size = 9.0;
    table.margin.bottom = 40.0;
    let final_y = table.draw(sheet);

    draw_signature_block(sheet, final_y + 15.0);
}

pub fn generate(
    record: &DisciplineRecord,
    school: &SchoolInfo,
    logo: Option<&Logo>,
) -> Result<GeneratedDocument, DocumentError> {
    let mut sheet = Sheet::new(Orientation::Portrait);
    layout(&mut sheet, record, school, logo);
    Ok(GeneratedDocument {
        filename: format!("Laporan_{}.pdf", file_stem(&record.student_name)),
        bytes: render_pdf(&sheet, "Laporan Salah Laku Disiplin Individu")?,
    })
}
