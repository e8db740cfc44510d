//! Page canvas in millimetres with the origin at the top-left corner.
//!
//! Templates draw onto a [`Sheet`] the way one would drive a stateful PDF
//! surface: select a font, size and colour, then place text, lines and
//! shapes at absolute coordinates. The sheet only records the placements;
//! [`super::render`] turns them into PDF bytes.

use super::logo::Logo;

pub const PT_TO_MM: f32 = 25.4 / 72.0;
pub const LINE_HEIGHT_FACTOR: f32 = 1.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// A4 width and height in millimetres.
    pub fn size(self) -> (f32, f32) {
        match self {
            Orientation::Portrait => (210.0, 297.0),
            Orientation::Landscape => (297.0, 210.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgb,
    pub width: f32,
}

#[derive(Debug, Clone)]
pub enum DrawOp {
    /// `x` is the left edge of the text, `y` its baseline.
    Text {
        x: f32,
        y: f32,
        text: String,
        weight: FontWeight,
        size: f32,
        color: Rgb,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        stroke: Stroke,
    },
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        fill: Option<Rgb>,
        stroke: Option<Stroke>,
    },
    Image {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        logo: Logo,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    #[cfg(test)]
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[cfg(test)]
    pub fn has_image(&self) -> bool {
        self.ops.iter().any(|op| matches!(op, DrawOp::Image { .. }))
    }
}

#[derive(Debug, Clone, Copy)]
struct Pen {
    weight: FontWeight,
    size: f32,
    text_color: Rgb,
    draw_color: Rgb,
    fill_color: Rgb,
    line_width: f32,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            weight: FontWeight::Normal,
            size: 16.0,
            text_color: Rgb::BLACK,
            draw_color: Rgb::BLACK,
            fill_color: Rgb::BLACK,
            line_width: 0.2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sheet {
    orientation: Orientation,
    pages: Vec<Page>,
    pen: Pen,
}

impl Sheet {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            pages: vec![Page::default()],
            pen: Pen::default(),
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn width(&self) -> f32 {
        self.orientation.size().0
    }

    pub fn height(&self) -> f32 {
        self.orientation.size().1
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn add_page(&mut self) {
        self.pages.push(Page::default());
    }

    pub fn set_font(&mut self, weight: FontWeight) {
        self.pen.weight = weight;
    }

    pub fn set_font_size(&mut self, size: f32) {
        self.pen.size = size;
    }

    pub fn set_draw_color(&mut self, color: Rgb) {
        self.pen.draw_color = color;
    }

    pub fn set_fill_color(&mut self, color: Rgb) {
        self.pen.fill_color = color;
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.pen.line_width = width;
    }

    pub(crate) fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    pub fn text(&mut self, text: &str, x: f32, y: f32) {
        self.text_aligned(text, x, y, Align::Left);
    }

    pub fn text_aligned(&mut self, text: &str, x: f32, y: f32, align: Align) {
        let pen = self.pen;
        self.push_text(text, x, y, align, pen.weight, pen.size, pen.text_color);
    }

    /// Places already-split lines one line height apart.
    pub fn text_lines(&mut self, lines: &[String], x: f32, y: f32) {
        let step = self.line_height();
        for (i, line) in lines.iter().enumerate() {
            self.text(line, x, y + step * i as f32);
        }
    }

    /// Wraps `text` to `max_width` and draws it, returning the line count.
    pub fn text_wrapped(&mut self, text: &str, x: f32, y: f32, max_width: f32) -> usize {
        let lines = self.split_text(text, max_width);
        self.text_lines(&lines, x, y);
        lines.len()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn push_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        align: Align,
        weight: FontWeight,
        size: f32,
        color: Rgb,
    ) {
        let width = text_width(text, weight, size);
        let left = match align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
        };
        self.push(DrawOp::Text {
            x: left,
            y,
            text: text.to_string(),
            weight,
            size,
            color,
        });
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let stroke = Stroke {
            color: self.pen.draw_color,
            width: self.pen.line_width,
        };
        self.push(DrawOp::Line {
            from: (x1, y1),
            to: (x2, y2),
            stroke,
        });
    }

    pub fn rounded_rect_filled(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32) {
        let fill = Some(self.pen.fill_color);
        self.push(DrawOp::Rect {
            x,
            y,
            w,
            h,
            radius,
            fill,
            stroke: None,
        });
    }

    pub fn image(&mut self, logo: &Logo, x: f32, y: f32, w: f32, h: f32) {
        self.push(DrawOp::Image {
            x,
            y,
            w,
            h,
            logo: logo.clone(),
        });
    }

    pub fn line_height(&self) -> f32 {
        self.pen.size * LINE_HEIGHT_FACTOR * PT_TO_MM
    }

    pub fn text_width(&self, text: &str) -> f32 {
        text_width(text, self.pen.weight, self.pen.size)
    }

    pub fn split_text(&self, text: &str, max_width: f32) -> Vec<String> {
        split_to_width(text, self.pen.weight, self.pen.size, max_width)
    }
}

// Helvetica advance widths (1/1000 em) for ASCII 32..=126.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, //
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, //
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, //
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, //
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, //
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, //
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, //
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, //
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

fn glyph_width(ch: char, weight: FontWeight) -> u16 {
    let table = match weight {
        FontWeight::Normal => &HELVETICA,
        FontWeight::Bold => &HELVETICA_BOLD,
    };
    match ch as u32 {
        code @ 32..=126 => table[(code - 32) as usize],
        _ => 556,
    }
}

/// Width of `text` in millimetres at `size` points.
pub fn text_width(text: &str, weight: FontWeight, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| glyph_width(c, weight) as u32).sum();
    units as f32 / 1000.0 * size * PT_TO_MM
}

/// Greedy word wrap; words wider than the line are broken by character.
/// Explicit newlines always start a new line.
pub fn split_to_width(text: &str, weight: FontWeight, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if text_width(&candidate, weight, size) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            for ch in word.chars() {
                current.push(ch);
                if text_width(&current, weight, size) > max_width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::replace(&mut current, ch.to_string()));
                }
            }
        }
        lines.push(current);
    }
    lines
}
