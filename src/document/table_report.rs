use super::canvas::{Align, FontWeight, Orientation, Rgb, Sheet, Stroke};
use super::render::render_pdf;
use super::table::{CellStyle, ColumnStyle, Margin, Table, VAlign};
use super::{DocumentError, GeneratedDocument, clock_my, draw_signature_block, format_date_my, today_my};
use crate::model::DisciplineRecord;
use crate::query::Window;
use chrono::NaiveDateTime;

pub const TITLE: &str = "LAPORAN DISIPLIN MURID (MTIJ)";
pub const HEADERS: [&str; 9] = [
    "No",
    "Tarikh",
    "Nama Murid",
    "Kelas",
    "Kategori",
    "Salah Laku",
    "Mata",
    "Lokasi",
    "Tindakan",
];

const CENTER_X: f32 = 148.5;
const TABLE_TOP: f32 = 35.0;

/// One row per record, numbered from 1 in the order given.
pub fn rows(records: &[&DisciplineRecord]) -> Vec<Vec<String>> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            vec![
                (i + 1).to_string(),
                format_date_my(&r.date),
                r.student_name.clone(),
                r.student_class.clone(),
                r.category.to_string(),
                r.violation_type.clone(),
                r.demerit.to_string(),
                r.location.clone(),
                r.action_taken.clone(),
            ]
        })
        .collect()
}

pub fn report_file_name(window: Window, extension: &str) -> String {
    format!("Ringkasan_Laporan_MTIJ_{}.{}", window.report_label(), extension)
}

fn table(records: &[&DisciplineRecord]) -> Table {
    let body_style = CellStyle {
        font_size: 8.0,
        padding: 2.0,
        valign: VAlign::Middle,
        text_color: Rgb(50, 50, 50),
        line: Stroke {
            color: Rgb(200, 200, 200),
            width: 0.1,
        },
        ..CellStyle::default()
    };
    let mut table = Table::new(TABLE_TOP);
    table.head = HEADERS.iter().map(|h| h.to_string()).collect();
    table.body = rows(records);
    table.columns = vec![
        ColumnStyle::centered(8.0),
        ColumnStyle::centered(22.0),
        ColumnStyle::fixed(55.0),
        ColumnStyle::centered(20.0),
        ColumnStyle::fixed(35.0),
        ColumnStyle::fixed(50.0),
        ColumnStyle::centered(12.0),
        ColumnStyle::fixed(25.0),
        ColumnStyle::fixed(40.0),
    ];
    table.head_style = CellStyle {
        font_size: 9.0,
        weight: FontWeight::Bold,
        align: Align::Center,
        text_color: Rgb::WHITE,
        fill: Some(Rgb(37, 76, 186)),
        ..body_style
    };
    table.body_style = body_style;
    table.margin = Margin {
        left: 10.0,
        right: 10.0,
        bottom: 40.0,
        ..Margin::default()
    };
    table
}

pub fn layout(sheet: &mut Sheet, records: &[&DisciplineRecord], window: Window, now: NaiveDateTime) {
    sheet.set_font_size(20.0);
    sheet.set_font(FontWeight::Bold);
    sheet.text_aligned(TITLE, CENTER_X, 15.0, Align::Center);

    sheet.set_font_size(11.0);
    sheet.set_font(FontWeight::Normal);
    sheet.text_aligned(
        &format!("Kategori Laporan: {}", window.report_label()),
        CENTER_X,
        22.0,
        Align::Center,
    );
    sheet.text_aligned(
        &format!("Dijana pada: {}, {}", today_my(now), clock_my(now)),
        CENTER_X,
        28.0,
        Align::Center,
    );

    let final_y = table(records).draw(sheet);
    draw_signature_block(sheet, final_y + 15.0);
}

/// Landscape table of the given records, in the order given.
pub fn generate(
    records: &[&DisciplineRecord],
    window: Window,
    now: NaiveDateTime,
) -> Result<GeneratedDocument, DocumentError> {
    let mut sheet = Sheet::new(Orientation::Landscape);
    layout(&mut sheet, records, window, now);
    Ok(GeneratedDocument {
        filename: report_file_name(window, "pdf"),
        bytes: render_pdf(&sheet, TITLE)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::fixtures::{now, record};

    #[test]
    fn rows_are_numbered_in_order() {
        let a = record("a", "Ali");
        let b = record("b", "Abu");
        let rows = rows(&[&a, &b]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], "1");
        assert_eq!(rows[1][0], "2");
        assert_eq!(rows[1][2], "Abu");
        assert_eq!(rows[0][1], "01/03/2024");
        assert_eq!(rows[0][4], "SALAH LAKU SEDERHANA");
        assert_eq!(rows[0][6], "-10");
    }

    #[test]
    fn column_widths_are_fixed() {
        let widths = table(&[]).column_widths(297.0);
        assert_eq!(widths, vec![8.0, 22.0, 55.0, 20.0, 35.0, 50.0, 12.0, 25.0, 40.0]);
    }

    #[test]
    fn empty_report_has_header_only() {
        let mut sheet = Sheet::new(Orientation::Landscape);
        layout(&mut sheet, &[], Window::Today, now());
        assert_eq!(sheet.pages().len(), 1);
        let texts = sheet.pages()[0].texts();
        assert!(texts.contains(&"Kategori Laporan: HARIAN"));
        assert!(texts.contains(&"Dijana pada: 17/10/2026, 02:05:09 PTG"));
        for h in HEADERS {
            assert!(texts.contains(&h));
        }
        assert!(texts.contains(&"Disediakan oleh:"));
    }

    #[test]
    fn many_records_span_pages() {
        let recs: Vec<_> = (0..60).map(|i| record(&format!("r{i}"), &format!("Pelajar {i}"))).collect();
        let refs: Vec<&DisciplineRecord> = recs.iter().collect();
        let mut sheet = Sheet::new(Orientation::Landscape);
        layout(&mut sheet, &refs, Window::All, now());
        assert!(sheet.pages().len() > 1);
        assert_eq!(sheet.pages()[1].texts()[0], "No");
    }

    #[test]
    fn file_is_named_after_window() {
        let doc = generate(&[], Window::Month, now()).unwrap();
        assert_eq!(doc.filename, "Ringkasan_Laporan_MTIJ_BULANAN.pdf");
        assert_eq!(report_file_name(Window::All, "xlsx"), "Ringkasan_Laporan_MTIJ_KESELURUHAN.xlsx");
    }
}
