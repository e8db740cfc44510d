use crate::document::table_report::{HEADERS, TITLE, report_file_name};
use crate::document::{DocumentError, GeneratedDocument, clock_my, format_date_my, today_my};
use crate::model::DisciplineRecord;
use crate::query::Window;
use chrono::NaiveDateTime;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

const SHEET_NAME: &str = "Laporan";
const LAST_COL: u16 = HEADERS.len() as u16 - 1;
const HEADER_ROW: u32 = 4;

struct ReportFormats {
    title: Format,
    subtitle: Format,
    header: Format,
    cell: Format,
    left_text: Format,
}

impl ReportFormats {
    fn new() -> Self {
        Self {
            title: Format::new()
                .set_bold()
                .set_font_size(18)
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter),
            subtitle: Format::new()
                .set_font_size(11)
                .set_align(FormatAlign::Center),
            header: Format::new()
                .set_bold()
                .set_font_color(0xFFFFFF)
                .set_background_color(0x254CBA)
                .set_border(FormatBorder::Thin)
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_text_wrap(),
            cell: Format::new()
                .set_border(FormatBorder::Thin)
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter),
            left_text: Format::new()
                .set_align(FormatAlign::Left)
                .set_border(FormatBorder::Thin)
                .set_text_wrap()
                .set_align(FormatAlign::VerticalCenter),
        }
    }
}

fn write_report_header(
    ws: &mut Worksheet,
    window: Window,
    now: NaiveDateTime,
    fmt: &ReportFormats,
) -> Result<u32, XlsxError> {
    ws.set_row_height(0, 30)?;
    ws.merge_range(0, 0, 0, LAST_COL, TITLE, &fmt.title)?;
    ws.merge_range(
        1,
        0,
        1,
        LAST_COL,
        &format!("Kategori Laporan: {}", window.report_label()),
        &fmt.subtitle,
    )?;
    ws.merge_range(
        2,
        0,
        2,
        LAST_COL,
        &format!("Dijana pada: {}, {}", today_my(now), clock_my(now)),
        &fmt.subtitle,
    )?;

    for (col, header) in HEADERS.iter().enumerate() {
        ws.write_string_with_format(HEADER_ROW, col as u16, *header, &fmt.header)?;
    }
    ws.set_freeze_panes(HEADER_ROW + 1, 0)?;
    Ok(HEADER_ROW + 1)
}

fn write_record_row(
    ws: &mut Worksheet,
    row: u32,
    number: usize,
    record: &DisciplineRecord,
    fmt: &ReportFormats,
) -> Result<(), XlsxError> {
    ws.write_number_with_format(row, 0, number as f64, &fmt.cell)?;
    ws.write_string_with_format(row, 1, format_date_my(&record.date), &fmt.cell)?;
    ws.write_string_with_format(row, 2, &record.student_name, &fmt.left_text)?;
    ws.write_string_with_format(row, 3, &record.student_class, &fmt.cell)?;
    ws.write_string_with_format(row, 4, record.category.label(), &fmt.left_text)?;
    ws.write_string_with_format(row, 5, &record.violation_type, &fmt.left_text)?;
    ws.write_number_with_format(row, 6, record.demerit, &fmt.cell)?;
    ws.write_string_with_format(row, 7, &record.location, &fmt.left_text)?;
    ws.write_string_with_format(row, 8, &record.action_taken, &fmt.left_text)?;
    Ok(())
}

// Character widths roughly matching the PDF table's millimetre columns.
fn set_column_widths(ws: &mut Worksheet) -> Result<(), XlsxError> {
    let widths = [5, 12, 30, 12, 22, 30, 7, 15, 24];
    for (col, w) in widths.iter().enumerate() {
        ws.set_column_width(col as u16, *w)?;
    }
    Ok(())
}

/// The tabular report as a single-sheet workbook, same rows as the PDF.
pub fn generate_workbook(
    records: &[&DisciplineRecord],
    window: Window,
    now: NaiveDateTime,
) -> Result<GeneratedDocument, DocumentError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;
    worksheet.set_landscape();
    let fmt = ReportFormats::new();

    let mut row = write_report_header(worksheet, window, now, &fmt)?;
    for (i, record) in records.iter().enumerate() {
        write_record_row(worksheet, row, i + 1, record, &fmt)?;
        row += 1;
    }
    set_column_widths(worksheet)?;

    Ok(GeneratedDocument {
        filename: report_file_name(window, "xlsx"),
        bytes: workbook.save_to_buffer()?,
    })
}
