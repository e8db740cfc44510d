use super::DocumentError;
use super::canvas::{DrawOp, FontWeight, PT_TO_MM, Rgb, Sheet, Stroke};
use super::logo::Logo;
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfLayerReference, Point, Polygon,
};
use std::f32::consts::FRAC_PI_2;

const IMAGE_DPI: f32 = 300.0;
const CORNER_SEGMENTS: usize = 6;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn get(&self, weight: FontWeight) -> &IndirectFontRef {
        match weight {
            FontWeight::Normal => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }
}

fn pdf_error(e: printpdf::Error) -> DocumentError {
    DocumentError::Pdf(format!("{e:?}"))
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(printpdf::Rgb::new(
        rgb.0 as f32 / 255.0,
        rgb.1 as f32 / 255.0,
        rgb.2 as f32 / 255.0,
        None,
    ))
}

/// Renders every page of `sheet` into a PDF file held in memory.
pub fn render_pdf(sheet: &Sheet, title: &str) -> Result<Vec<u8>, DocumentError> {
    let (width, height) = sheet.orientation().size();
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(width), Mm(height), "Halaman 1");
    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?,
    };

    for (index, page) in sheet.pages().iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let name = format!("Halaman {}", index + 1);
            let (page_idx, layer_idx) = doc.add_page(Mm(width), Mm(height), name);
            doc.get_page(page_idx).get_layer(layer_idx)
        };
        let painter = Painter {
            layer: &layer,
            fonts: &fonts,
            page_height: height,
        };
        for op in &page.ops {
            painter.draw(op);
        }
    }

    doc.save_to_bytes().map_err(pdf_error)
}

struct Painter<'a> {
    layer: &'a PdfLayerReference,
    fonts: &'a Fonts,
    page_height: f32,
}

impl Painter<'_> {
    // the sheet measures y downwards from the top edge, PDF upwards from the bottom
    fn point(&self, x: f32, y: f32) -> Point {
        Point::new(Mm(x), Mm(self.page_height - y))
    }

    fn set_stroke(&self, stroke: Stroke) {
        self.layer.set_outline_color(color(stroke.color));
        self.layer.set_outline_thickness(stroke.width / PT_TO_MM);
    }

    fn draw(&self, op: &DrawOp) {
        match op {
            DrawOp::Text {
                x,
                y,
                text,
                weight,
                size,
                color: rgb,
            } => {
                self.layer.set_fill_color(color(*rgb));
                self.layer.use_text(
                    text.clone(),
                    *size,
                    Mm(*x),
                    Mm(self.page_height - y),
                    self.fonts.get(*weight),
                );
            }
            DrawOp::Line { from, to, stroke } => {
                self.set_stroke(*stroke);
                self.layer.add_line(Line {
                    points: vec![
                        (self.point(from.0, from.1), false),
                        (self.point(to.0, to.1), false),
                    ],
                    is_closed: false,
                });
            }
            DrawOp::Rect {
                x,
                y,
                w,
                h,
                radius,
                fill,
                stroke,
            } => {
                let mode = match (fill, stroke) {
                    (Some(_), Some(_)) => PaintMode::FillStroke,
                    (Some(_), None) => PaintMode::Fill,
                    (None, Some(_)) => PaintMode::Stroke,
                    (None, None) => return,
                };
                if let Some(rgb) = fill {
                    self.layer.set_fill_color(color(*rgb));
                }
                if let Some(s) = stroke {
                    self.set_stroke(*s);
                }
                let ring = outline(*x, *y, *w, *h, *radius)
                    .into_iter()
                    .map(|(px, py)| (self.point(px, py), false))
                    .collect();
                self.layer.add_polygon(Polygon {
                    rings: vec![ring],
                    mode,
                    winding_order: WindingOrder::NonZero,
                });
            }
            DrawOp::Image { x, y, w, h, logo } => self.draw_image(logo, *x, *y, *w, *h),
        }
    }

    fn draw_image(&self, logo: &Logo, x: f32, y: f32, w: f32, h: f32) {
        let (px_w, px_h) = logo.pixel_size();
        if px_w == 0 || px_h == 0 {
            return;
        }
        let natural_w = px_w as f32 / IMAGE_DPI * 25.4;
        let natural_h = px_h as f32 / IMAGE_DPI * 25.4;
        Image::from_dynamic_image(logo.image()).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x)),
                translate_y: Some(Mm(self.page_height - y - h)),
                scale_x: Some(w / natural_w),
                scale_y: Some(h / natural_h),
                dpi: Some(IMAGE_DPI),
                ..Default::default()
            },
        );
    }
}

/// Corner points of a rectangle, with quarter circles of `radius` at each
/// corner when it is positive.
fn outline(x: f32, y: f32, w: f32, h: f32, radius: f32) -> Vec<(f32, f32)> {
    let r = radius.min(w / 2.0).min(h / 2.0);
    if r <= 0.0 {
        return vec![(x, y), (x + w, y), (x + w, y + h), (x, y + h)];
    }
    // centre of each corner arc and the angle it starts at, clockwise on screen
    let corners = [
        (x + w - r, y + r, -FRAC_PI_2),
        (x + w - r, y + h - r, 0.0),
        (x + r, y + h - r, FRAC_PI_2),
        (x + r, y + r, 2.0 * FRAC_PI_2),
    ];
    let mut points = Vec::with_capacity(4 * (CORNER_SEGMENTS + 1));
    for (cx, cy, start) in corners {
        for step in 0..=CORNER_SEGMENTS {
            let angle = start + FRAC_PI_2 * step as f32 / CORNER_SEGMENTS as f32;
            points.push((cx + r * angle.cos(), cy + r * angle.sin()));
        }
    }
    points
}
