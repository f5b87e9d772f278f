// Print surface: draws rendered cards onto CR80-sized PDF pages

use crate::error::{DesignerError, Result};
use crate::images;
use crate::render::{approx_text_width, render, Border, Bounds, Node, NodeKind, Paint, Side, VisualTree};
use crate::student::Student;
use crate::template::{Align, PhotoShape, Template};
use crate::units::{mm_to_points, Scale, MM_PER_INCH};
use ::image::{DynamicImage, Luma, Rgba, RgbImage};
use log::warn;
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;
use qrcode::QrCode;
use std::fs::File;
use std::io::{BufWriter, Cursor};

// ============================================================================
// Constants
// ============================================================================

const PLACEHOLDER_FILL: &str = "#e2e8f0";
const PLACEHOLDER_TEXT: &str = "#94a3b8";

/// Bands used to approximate a vertical gradient
const GRADIENT_STEPS: usize = 24;

/// Segments per quarter circle for rounded corners
const CORNER_SEGMENTS: usize = 6;
const CIRCLE_SEGMENTS: usize = 32;

/// Baseline position inside a text box, as a share of the font size
const BASELINE_RATIO: f32 = 0.85;

// ============================================================================
// Public API
// ============================================================================

/// Renders front and back of every student's card, two pages per student.
/// An empty roster prints the built-in sample student.
pub fn render_cards(template: &Template, students: &[Student]) -> Result<Vec<u8>> {
    let doc = build_document(template, students)?;
    let mut buffer = BufWriter::new(Cursor::new(Vec::new()));
    doc.save(&mut buffer)
        .map_err(|e| DesignerError::Pdf(e.to_string()))?;
    let cursor = buffer
        .into_inner()
        .map_err(|e| DesignerError::Pdf(e.to_string()))?;
    Ok(cursor.into_inner())
}

pub fn write_cards(template: &Template, students: &[Student], output_path: &str) -> Result<()> {
    let doc = build_document(template, students)?;
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    doc.save(&mut writer)
        .map_err(|e| DesignerError::Pdf(e.to_string()))?;
    Ok(())
}

// ============================================================================
// Document
// ============================================================================

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    bold_italic: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self> {
        let font = |builtin| {
            doc.add_builtin_font(builtin)
                .map_err(|e| DesignerError::Pdf(e.to_string()))
        };
        Ok(Fonts {
            regular: font(BuiltinFont::Helvetica)?,
            bold: font(BuiltinFont::HelveticaBold)?,
            italic: font(BuiltinFont::HelveticaOblique)?,
            bold_italic: font(BuiltinFont::HelveticaBoldOblique)?,
        })
    }

    fn get(&self, bold: bool, italic: bool) -> &IndirectFontRef {
        match (bold, italic) {
            (true, true) => &self.bold_italic,
            (true, false) => &self.bold,
            (false, true) => &self.italic,
            (false, false) => &self.regular,
        }
    }
}

fn build_document(template: &Template, students: &[Student]) -> Result<PdfDocumentReference> {
    let (doc, page1, layer1) = PdfDocument::new(
        &template.name,
        Mm(template.width),
        Mm(template.height),
        "Layer 1",
    );
    let fonts = Fonts::load(&doc)?;

    let sample = [Student::sample()];
    let students = if students.is_empty() { &sample[..] } else { students };

    let mut first_page = Some((page1, layer1));
    for student in students {
        for side in [Side::Front, Side::Back] {
            let (page, layer) = first_page
                .take()
                .unwrap_or_else(|| doc.add_page(Mm(template.width), Mm(template.height), "Layer 1"));
            let layer = doc.get_page(page).get_layer(layer);
            let tree = render(template, student, side, Scale::PRINT);
            draw_tree(&layer, &fonts, &tree)?;
        }
    }

    Ok(doc)
}

// ============================================================================
// Drawing
// ============================================================================

/// Tree coordinates are mm from the top-left; PDF space starts bottom-left.
struct Canvas<'a> {
    layer: &'a PdfLayerReference,
    height: f32,
}

impl<'a> Canvas<'a> {
    fn point(&self, x: f32, y: f32) -> (Point, bool) {
        (Point::new(Mm(x), Mm(self.height - y)), false)
    }

    fn fill(&self, color: &str, opacity: f32) {
        self.layer.set_fill_color(pdf_color(color, opacity));
    }

    fn stroke(&self, border: &Border) {
        self.layer.set_outline_color(pdf_color(&border.color, 1.0));
        self.layer.set_outline_thickness(mm_to_points(border.width));
    }

    fn polygon(&self, points: Vec<(Point, bool)>, mode: PaintMode) {
        self.layer.add_polygon(Polygon {
            rings: vec![points],
            mode,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn shape_points(&self, bounds: &Bounds, shape: PhotoShape, radius: f32) -> Vec<(Point, bool)> {
        match shape {
            PhotoShape::Circle => self.ellipse_points(bounds),
            PhotoShape::Rounded => self.rounded_rect_points(bounds, radius.max(bounds.width * 0.12)),
            PhotoShape::Square => self.rounded_rect_points(bounds, 0.0),
        }
    }

    fn rounded_rect_points(&self, b: &Bounds, radius: f32) -> Vec<(Point, bool)> {
        let r = radius.min(b.width / 2.0).min(b.height / 2.0).max(0.0);
        if r == 0.0 {
            return vec![
                self.point(b.x, b.y),
                self.point(b.x + b.width, b.y),
                self.point(b.x + b.width, b.y + b.height),
                self.point(b.x, b.y + b.height),
            ];
        }

        // corner centres clockwise from top-left, with their starting angle
        let corners = [
            (b.x + r, b.y + r, 180.0_f32),
            (b.x + b.width - r, b.y + r, 270.0),
            (b.x + b.width - r, b.y + b.height - r, 0.0),
            (b.x + r, b.y + b.height - r, 90.0),
        ];
        let mut points = Vec::with_capacity(4 * (CORNER_SEGMENTS + 1));
        for (cx, cy, start) in corners {
            for i in 0..=CORNER_SEGMENTS {
                let angle = (start + 90.0 * i as f32 / CORNER_SEGMENTS as f32).to_radians();
                points.push(self.point(cx + r * angle.cos(), cy + r * angle.sin()));
            }
        }
        points
    }

    fn ellipse_points(&self, b: &Bounds) -> Vec<(Point, bool)> {
        let (cx, cy) = (b.x + b.width / 2.0, b.y + b.height / 2.0);
        (0..=CIRCLE_SEGMENTS)
            .map(|i| {
                let angle = 2.0 * std::f32::consts::PI * i as f32 / CIRCLE_SEGMENTS as f32;
                self.point(cx + b.width / 2.0 * angle.cos(), cy + b.height / 2.0 * angle.sin())
            })
            .collect()
    }

    fn draw_line(&self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let line = Line {
            points: vec![self.point(x1, y1), self.point(x2, y2)],
            is_closed: false,
        };
        self.layer.add_line(line);
    }
}

fn draw_tree(layer: &PdfLayerReference, fonts: &Fonts, tree: &VisualTree) -> Result<()> {
    let canvas = Canvas {
        layer,
        height: tree.height,
    };
    for node in &tree.nodes {
        draw_node(&canvas, fonts, node)?;
    }
    Ok(())
}

fn draw_node(canvas: &Canvas<'_>, fonts: &Fonts, node: &Node) -> Result<()> {
    let b = &node.bounds;
    match &node.kind {
        NodeKind::Panel { paint, radius, border } => {
            match paint {
                Paint::Solid { color } => {
                    canvas.fill(color, 1.0);
                    canvas.polygon(canvas.rounded_rect_points(b, *radius), PaintMode::Fill);
                }
                Paint::Gradient { from, to } => draw_gradient(canvas, b, from, to),
                Paint::Image { payload } => match images::decode(payload) {
                    Ok(img) => embed_image(canvas, &img, b, Fit::Stretch),
                    Err(e) => warn!("background image skipped: {}", e),
                },
            }
            if let Some(border) = border {
                canvas.stroke(border);
                canvas.polygon(canvas.rounded_rect_points(b, *radius), PaintMode::Stroke);
            }
        }
        NodeKind::Text {
            text,
            font_size,
            bold,
            italic,
            color,
            align,
            opacity,
        } => {
            if text.is_empty() {
                return Ok(());
            }
            let x = aligned_x(b, text, *font_size, *align);
            let baseline = b.y + font_size * BASELINE_RATIO;
            canvas.fill(color, *opacity);
            canvas.layer.use_text(
                text.as_str(),
                Scale::PRINT.font_to_pt(*font_size),
                Mm(x),
                Mm(canvas.height - baseline),
                fonts.get(*bold, *italic),
            );
        }
        NodeKind::Image { payload, shape, border } => {
            match images::decode(payload) {
                Ok(img) => embed_image(canvas, &img, b, Fit::Contain),
                Err(e) => warn!("image skipped: {}", e),
            }
            if let Some(border) = border {
                canvas.stroke(border);
                canvas.polygon(canvas.shape_points(b, *shape, 0.0), PaintMode::Stroke);
            }
        }
        NodeKind::Placeholder { glyph, shape, border } => {
            canvas.fill(PLACEHOLDER_FILL, 1.0);
            canvas.polygon(canvas.shape_points(b, *shape, 0.0), PaintMode::Fill);
            if let Some(border) = border {
                canvas.stroke(border);
                canvas.polygon(canvas.shape_points(b, *shape, 0.0), PaintMode::Stroke);
            }
            // glyph sized to a fifth of the slot height
            let font_size = b.height / 5.0;
            let x = aligned_x(b, glyph, font_size, Align::Center);
            let baseline = b.y + (b.height + font_size * BASELINE_RATIO) / 2.0;
            canvas.fill(PLACEHOLDER_TEXT, 1.0);
            canvas.layer.use_text(
                glyph.as_str(),
                Scale::PRINT.font_to_pt(font_size),
                Mm(x),
                Mm(canvas.height - baseline),
                fonts.get(true, false),
            );
        }
        NodeKind::Qr { data } => {
            let qr = generate_qr_image(data)?;
            embed_image(canvas, &qr, b, Fit::Stretch);
        }
        NodeKind::Line { color, thickness } => {
            canvas.stroke(&Border {
                width: *thickness,
                color: color.clone(),
            });
            canvas.draw_line(b.x, b.y + b.height, b.x + b.width, b.y + b.height);
        }
        NodeKind::Stripe { colors } => {
            let band = b.height / colors.len().max(1) as f32;
            for (i, color) in colors.iter().enumerate() {
                let rect = Bounds {
                    y: b.y + band * i as f32,
                    height: band,
                    ..*b
                };
                canvas.fill(color, 1.0);
                canvas.polygon(canvas.rounded_rect_points(&rect, 0.0), PaintMode::Fill);
            }
        }
    }
    Ok(())
}

fn aligned_x(b: &Bounds, text: &str, font_size: f32, align: Align) -> f32 {
    let width = approx_text_width(text, font_size);
    match align {
        Align::Left => b.x,
        Align::Center => b.x + (b.width - width) / 2.0,
        Align::Right => b.x + b.width - width,
    }
}

fn draw_gradient(canvas: &Canvas<'_>, b: &Bounds, from: &str, to: &str) {
    let (r1, g1, b1) = parse_hex(from);
    let (r2, g2, b2) = parse_hex(to);
    let band = b.height / GRADIENT_STEPS as f32;
    for i in 0..GRADIENT_STEPS {
        let t = i as f32 / (GRADIENT_STEPS - 1) as f32;
        let mix = |a: f32, c: f32| a + (c - a) * t;
        canvas
            .layer
            .set_fill_color(Color::Rgb(Rgb::new(mix(r1, r2), mix(g1, g2), mix(b1, b2), None)));
        let rect = Bounds {
            y: b.y + band * i as f32,
            height: band,
            ..*b
        };
        canvas.polygon(canvas.rounded_rect_points(&rect, 0.0), PaintMode::Fill);
    }
}

// ============================================================================
// Images and QR codes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Fit {
    /// Keep the aspect ratio, centred in the bounds
    Contain,
    Stretch,
}

fn generate_qr_image(data: &str) -> Result<DynamicImage> {
    let code = QrCode::new(data.as_bytes()).map_err(|e| DesignerError::Qr(e.to_string()))?;
    let image = code.render::<Luma<u8>>().build();
    Ok(DynamicImage::ImageLuma8(image))
}

fn embed_image(canvas: &Canvas<'_>, img: &DynamicImage, b: &Bounds, fit: Fit) {
    // Composite against white, PDF images here carry no alpha
    let rgba_image = img.to_rgba8();
    let (width_px, height_px) = rgba_image.dimensions();
    if width_px == 0 || height_px == 0 || b.width <= 0.0 || b.height <= 0.0 {
        return;
    }
    let mut rgb_image = RgbImage::new(width_px, height_px);
    for (x, y, pixel) in rgba_image.enumerate_pixels() {
        let Rgba([r, g, bl, a]) = *pixel;
        let alpha = a as f32 / 255.0;
        let bg = 255.0;
        let out_r = (r as f32 * alpha + bg * (1.0 - alpha)) as u8;
        let out_g = (g as f32 * alpha + bg * (1.0 - alpha)) as u8;
        let out_b = (bl as f32 * alpha + bg * (1.0 - alpha)) as u8;
        rgb_image.put_pixel(x, y, ::image::Rgb([out_r, out_g, out_b]));
    }

    let aspect_ratio = width_px as f32 / height_px as f32;
    let (final_width_mm, final_height_mm) = match fit {
        Fit::Stretch => (b.width, b.height),
        Fit::Contain if b.width / b.height > aspect_ratio => (b.height * aspect_ratio, b.height),
        Fit::Contain => (b.width, b.width / aspect_ratio),
    };
    let x = b.x + (b.width - final_width_mm) / 2.0;
    let y_bottom = b.y + (b.height + final_height_mm) / 2.0;

    let image = Image::from(ImageXObject {
        width: Px(width_px as usize),
        height: Px(height_px as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: fit == Fit::Contain,
        image_data: rgb_image.into_raw(),
        image_filter: None,
        clipping_bbox: None,
        smask: None,
    });

    // DPI fixes the width; the height follows through the y scale
    let dpi = width_px as f32 / (final_width_mm / MM_PER_INCH);
    let natural_height_mm = height_px as f32 / dpi * MM_PER_INCH;

    image.add_to_layer(
        canvas.layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x)),
            translate_y: Some(Mm(canvas.height - y_bottom)),
            scale_y: Some(final_height_mm / natural_height_mm),
            dpi: Some(dpi),
            ..Default::default()
        },
    );
}

// ============================================================================
// Colours
// ============================================================================

/// `#rgb` or `#rrggbb` as 0..1 components; anything else is black.
fn parse_hex(color: &str) -> (f32, f32, f32) {
    let hex = color.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return (0.0, 0.0, 0.0);
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return (0.0, 0.0, 0.0),
    };
    let channel = |i: usize| {
        u8::from_str_radix(&expanded[i..i + 2], 16)
            .map(|v| v as f32 / 255.0)
            .ok()
    };
    match (channel(0), channel(2), channel(4)) {
        (Some(r), Some(g), Some(b)) => (r, g, b),
        _ => (0.0, 0.0, 0.0),
    }
}

/// Opacity is approximated by blending towards the white card stock.
fn pdf_color(color: &str, opacity: f32) -> Color {
    let (r, g, b) = parse_hex(color);
    let a = opacity.clamp(0.0, 1.0);
    let blend = |c: f32| c * a + (1.0 - a);
    Color::Rgb(Rgb::new(blend(r), blend(g), blend(b), None))
}
