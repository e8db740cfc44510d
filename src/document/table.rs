use super::canvas::{
    Align, DrawOp, FontWeight, LINE_HEIGHT_FACTOR, PT_TO_MM, Rgb, Sheet, Stroke, split_to_width,
    text_width,
};

// Cap height share of the font size, used to place the first baseline.
const ASCENT: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlign {
    #[default]
    Top,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellStyle {
    pub font_size: f32,
    pub padding: f32,
    pub weight: FontWeight,
    pub align: Align,
    pub valign: VAlign,
    pub text_color: Rgb,
    pub fill: Option<Rgb>,
    pub line: Stroke,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            font_size: 10.0,
            padding: 5.0 * PT_TO_MM,
            weight: FontWeight::Normal,
            align: Align::Left,
            valign: VAlign::Top,
            text_color: Rgb(80, 80, 80),
            fill: None,
            line: Stroke {
                color: Rgb(200, 200, 200),
                width: 0.1,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColumnStyle {
    /// Fixed width in millimetres; `None` shares the leftover width.
    pub width: Option<f32>,
    pub align: Option<Align>,
}

impl ColumnStyle {
    pub fn fixed(width: f32) -> Self {
        Self {
            width: Some(width),
            align: None,
        }
    }

    pub fn centered(width: f32) -> Self {
        Self {
            width: Some(width),
            align: Some(Align::Center),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Margin {
    fn default() -> Self {
        let m = 40.0 * PT_TO_MM;
        Self {
            top: m,
            right: m,
            bottom: m,
            left: m,
        }
    }
}

/// Grid table laid out row by row, breaking onto new pages against the
/// bottom margin and repeating the header on each page.
#[derive(Debug, Clone)]
pub struct Table {
    pub start_y: f32,
    pub head: Vec<String>,
    pub body: Vec<Vec<String>>,
    pub columns: Vec<ColumnStyle>,
    pub head_style: CellStyle,
    pub body_style: CellStyle,
    pub margin: Margin,
}

impl Table {
    pub fn new(start_y: f32) -> Self {
        let body_style = CellStyle::default();
        Self {
            start_y,
            head: Vec::new(),
            body: Vec::new(),
            columns: Vec::new(),
            head_style: CellStyle {
                weight: FontWeight::Bold,
                text_color: Rgb::WHITE,
                fill: Some(Rgb(26, 188, 156)),
                ..body_style
            },
            body_style,
            margin: Margin::default(),
        }
    }

    fn column_count(&self) -> usize {
        self.body
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.head.len()))
            .chain(std::iter::once(self.columns.len()))
            .max()
            .unwrap_or(0)
    }

    /// Fixed widths as given; the rest of the printable width is split
    /// among auto columns in proportion to their widest cell.
    pub fn column_widths(&self, page_width: f32) -> Vec<f32> {
        let count = self.column_count();
        let available = page_width - self.margin.left - self.margin.right;
        let fixed: f32 = (0..count)
            .filter_map(|i| self.columns.get(i).and_then(|c| c.width))
            .sum();

        let natural: Vec<f32> = (0..count)
            .map(|i| {
                let head = self.head.get(i).map(|t| (t, &self.head_style));
                let cells = self.body.iter().filter_map(|row| row.get(i)).map(|t| (t, &self.body_style));
                head.into_iter()
                    .chain(cells)
                    .map(|(t, s)| text_width(t, s.weight, s.font_size) + 2.0 * s.padding)
                    .fold(1.0_f32, f32::max)
            })
            .collect();
        let auto_natural: f32 = (0..count)
            .filter(|&i| self.columns.get(i).and_then(|c| c.width).is_none())
            .map(|i| natural[i])
            .sum();
        let leftover = (available - fixed).max(0.0);

        (0..count)
            .map(|i| match self.columns.get(i).and_then(|c| c.width) {
                Some(w) => w,
                None if auto_natural > 0.0 => leftover * natural[i] / auto_natural,
                None => 0.0,
            })
            .collect()
    }

    /// Draws the table onto `sheet` and returns the y just below it.
    pub fn draw(&self, sheet: &mut Sheet) -> f32 {
        let widths = self.column_widths(sheet.width());
        let bottom = sheet.height() - self.margin.bottom;
        let mut y = self.start_y;

        if !self.head.is_empty() {
            y = self.draw_row(sheet, &self.head, &self.head_style, &widths, y, true);
        }
        for row in &self.body {
            let height = self.row_height(row, &self.body_style, &widths);
            if y + height > bottom && y > self.margin.top {
                sheet.add_page();
                y = self.margin.top;
                if !self.head.is_empty() {
                    y = self.draw_row(sheet, &self.head, &self.head_style, &widths, y, true);
                }
            }
            y = self.draw_row(sheet, row, &self.body_style, &widths, y, false);
        }
        y
    }

    // one point of slack so text that just fits is not broken
    fn cell_lines(&self, text: &str, style: &CellStyle, width: f32) -> Vec<String> {
        let space = width - 2.0 * style.padding + PT_TO_MM;
        split_to_width(text, style.weight, style.font_size, space)
    }

    fn row_height(&self, row: &[String], style: &CellStyle, widths: &[f32]) -> f32 {
        let line_height = style.font_size * LINE_HEIGHT_FACTOR * PT_TO_MM;
        let lines = row
            .iter()
            .zip(widths)
            .map(|(text, &w)| self.cell_lines(text, style, w).len())
            .max()
            .unwrap_or(1);
        lines as f32 * line_height + 2.0 * style.padding
    }

    fn draw_row(
        &self,
        sheet: &mut Sheet,
        row: &[String],
        style: &CellStyle,
        widths: &[f32],
        y: f32,
        is_head: bool,
    ) -> f32 {
        let height = self.row_height(row, style, widths);
        let line_height = style.font_size * LINE_HEIGHT_FACTOR * PT_TO_MM;
        let mut x = self.margin.left;

        for (i, &w) in widths.iter().enumerate() {
            sheet.push(DrawOp::Rect {
                x,
                y,
                w,
                h: height,
                radius: 0.0,
                fill: style.fill,
                stroke: Some(style.line),
            });

            let text = row.get(i).map(String::as_str).unwrap_or("");
            let lines = self.cell_lines(text, style, w);
            let align = if is_head {
                style.align
            } else {
                self.columns.get(i).and_then(|c| c.align).unwrap_or(style.align)
            };
            let anchor = match align {
                Align::Left => x + style.padding,
                Align::Center => x + w / 2.0,
            };
            let block = lines.len() as f32 * line_height;
            let top = match style.valign {
                VAlign::Top => y + style.padding,
                VAlign::Middle => y + (height - block) / 2.0,
            };
            let first_baseline = top + (line_height - style.font_size * PT_TO_MM) / 2.0
                + style.font_size * PT_TO_MM * ASCENT;
            for (n, line) in lines.iter().enumerate().filter(|(_, l)| !l.is_empty()) {
                sheet.push_text(
                    line,
                    anchor,
                    first_baseline + n as f32 * line_height,
                    align,
                    style.weight,
                    style.font_size,
                    style.text_color,
                );
            }
            x += w;
        }
        y + height
    }
}
