// Renderer: projects a template and a student onto a visual tree
//
// The same tree drives the on-screen preview (zoom scale) and print output
// (Scale::PRINT). Nodes are in paint order and carry the selection they
// stand for, so clicks map back through VisualTree::hit_test.

use crate::editor::Selection;
use crate::registry::resolve_display_value;
use crate::student::Student;
use crate::template::{Align, BackgroundKind, ImagePayload, PhotoShape, Template};
use crate::units::Scale;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// Constants
// ============================================================================

/// Height of the decorative stripe along the bottom edge (mm)
const STRIPE_HEIGHT_MM: f32 = 1.5;
const STRIPE_COLORS: [&str; 3] = ["#1e3a8a", "#f59e0b", "#1e3a8a"];

const FOOTER_LABEL: &str = "SECURITY NODE";
const FOOTER_FONT_SIZE: f32 = 4.0;
const FOOTER_COLOR: &str = "#64748b";

/// Signature box height as a share of its width
const SIGN_ASPECT: f32 = 0.35;
const SIGN_CAPTION: &str = "Authorised Signatory";
const SIGN_CAPTION_FONT_SIZE: f32 = 5.0;

const WATERMARK_FONT_SIZE: f32 = 28.0;
const WATERMARK_OPACITY: f32 = 0.08;

const BACK_TEXT_FONT_SIZE: f32 = 6.0;
const BACK_QR_SIZE_MM: f32 = 10.0;
const BACK_QR_MARGIN_MM: f32 = 4.0;
const BACK_QR_LABEL: &str = "Scan to verify this card";
const BACK_QR_LABEL_FONT_SIZE: f32 = 5.0;

/// Line height as a multiple of the font size
const LINE_HEIGHT: f32 = 1.2;

/// Average Helvetica glyph advance as a share of the font size
pub const AVG_CHAR_WIDTH_EM: f32 = 0.5;

const PHOTO_PLACEHOLDER: &str = "PHOTO";
const LOGO_PLACEHOLDER: &str = "LOGO";

// ============================================================================
// Visual tree
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Front,
    Back,
}

/// Rectangle in screen units, origin at the card's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Paint {
    Solid { color: String },
    /// Top to bottom
    Gradient { from: String, to: String },
    Image { payload: ImagePayload },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Border {
    pub width: f32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum NodeKind {
    Panel {
        paint: Paint,
        radius: f32,
        border: Option<Border>,
    },
    Text {
        text: String,
        font_size: f32,
        bold: bool,
        italic: bool,
        color: String,
        align: Align,
        opacity: f32,
    },
    Image {
        payload: ImagePayload,
        shape: PhotoShape,
        border: Option<Border>,
    },
    Placeholder {
        glyph: String,
        shape: PhotoShape,
        border: Option<Border>,
    },
    Qr {
        data: String,
    },
    /// Horizontal rule along the bottom of the bounds
    Line {
        color: String,
        thickness: f32,
    },
    /// Equal-height horizontal bands
    Stripe {
        colors: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    #[serde(skip_serializing_if = "Selection::is_none")]
    pub target: Selection,
    pub bounds: Bounds,
    #[serde(flatten)]
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualTree {
    pub side: Side,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<Node>,
}

impl VisualTree {
    /// The selection a click at `x`, `y` produces: the topmost selectable
    /// node under the point, or [`Selection::None`].
    pub fn hit_test(&self, x: f32, y: f32) -> Selection {
        self.nodes
            .iter()
            .rev()
            .find(|n| !n.target.is_none() && n.bounds.contains(x, y))
            .map(|n| n.target.clone())
            .unwrap_or_default()
    }

    pub fn nodes_for<'a>(&'a self, target: &'a Selection) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes.iter().filter(move |n| &n.target == target)
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// QR content identifying the card holder
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QrPayload<'a> {
    app: &'static str,
    template: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    student_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gr_number: Option<&'a str>,
    name: String,
}

fn qr_data(template: &Template, student: &Student) -> String {
    let payload = QrPayload {
        app: "idcard-designer",
        template: &template.name,
        student_id: student.id.as_deref(),
        gr_number: student.gr_number.as_deref(),
        name: resolve_display_value("name", student),
    };
    serde_json::to_string(&payload).unwrap_or_default()
}

/// Character-count estimate of how wide `text` renders at `font_size`
/// (screen units).
pub fn approx_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * AVG_CHAR_WIDTH_EM
}

/// Greedy word wrap to lines no wider than `max_width`.
fn wrap_text(text: &str, font_size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if !current.is_empty() && approx_text_width(&candidate, font_size) > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

struct Painter<'a> {
    template: &'a Template,
    scale: Scale,
    nodes: Vec<Node>,
}

impl<'a> Painter<'a> {
    fn bounds(&self, x: f32, y: f32, width: f32, height: f32) -> Bounds {
        Bounds {
            x: self.scale.to_screen(x),
            y: self.scale.to_screen(y),
            width: self.scale.to_screen(width),
            height: self.scale.to_screen(height),
        }
    }

    fn push(&mut self, target: Selection, bounds: Bounds, kind: NodeKind) {
        self.nodes.push(Node { target, bounds, kind });
    }

    fn border(&self, width: f32, color: &str) -> Option<Border> {
        if width > 0.0 {
            Some(Border {
                width: self.scale.to_screen(width),
                color: color.to_string(),
            })
        } else {
            None
        }
    }

    /// Text box at mm position; height is one line of `points`.
    #[allow(clippy::too_many_arguments)]
    fn text(
        &mut self,
        target: Selection,
        text: String,
        x: f32,
        y: f32,
        width: f32,
        points: f32,
        style: TextStyle<'_>,
    ) {
        let font_size = self.scale.font_to_screen(points);
        let bounds = Bounds {
            x: self.scale.to_screen(x),
            y: self.scale.to_screen(y),
            width: self.scale.to_screen(width),
            height: font_size * LINE_HEIGHT,
        };
        self.push(
            target,
            bounds,
            NodeKind::Text {
                text,
                font_size,
                bold: style.bold,
                italic: style.italic,
                color: style.color.to_string(),
                align: style.align,
                opacity: style.opacity,
            },
        );
    }

    fn background(&mut self) {
        let t = self.template;
        let paint = match (t.background_kind, &t.background_image) {
            (BackgroundKind::Image, Some(payload)) => Paint::Image {
                payload: Arc::clone(payload),
            },
            (BackgroundKind::Gradient, _) => Paint::Gradient {
                from: t.gradient_from.clone(),
                to: t.gradient_to.clone(),
            },
            _ => Paint::Solid {
                color: t.background_color.clone(),
            },
        };
        let bounds = self.bounds(0.0, 0.0, t.width, t.height);
        let kind = NodeKind::Panel {
            paint,
            radius: self.scale.to_screen(t.card_rounding),
            border: self.border(t.border_width, &t.border_color),
        };
        self.push(Selection::None, bounds, kind);
    }
}

#[derive(Debug, Clone, Copy)]
struct TextStyle<'a> {
    bold: bool,
    italic: bool,
    color: &'a str,
    align: Align,
    opacity: f32,
}

impl<'a> TextStyle<'a> {
    fn plain(color: &'a str, align: Align) -> Self {
        TextStyle {
            bold: false,
            italic: false,
            color,
            align,
            opacity: 1.0,
        }
    }
}

/// Lays out one side of the card for `student` at `scale`.
pub fn render(template: &Template, student: &Student, side: Side, scale: Scale) -> VisualTree {
    let mut painter = Painter {
        template,
        scale,
        nodes: Vec::new(),
    };
    painter.background();
    match side {
        Side::Front => render_front(&mut painter, student),
        Side::Back => render_back(&mut painter, student),
    }
    VisualTree {
        side,
        width: scale.to_screen(template.width),
        height: scale.to_screen(template.height),
        nodes: painter.nodes,
    }
}

fn render_front(p: &mut Painter<'_>, student: &Student) {
    let t = p.template;

    // Header band
    let band = p.bounds(0.0, 0.0, t.width, t.header_height);
    p.push(
        Selection::None,
        band,
        NodeKind::Panel {
            paint: Paint::Solid {
                color: t.header_color.clone(),
            },
            radius: 0.0,
            border: None,
        },
    );

    if t.show_logo {
        let bounds = p.bounds(t.logo_x, t.logo_y, t.logo_size, t.logo_size);
        let kind = match &t.logo_image {
            Some(payload) => NodeKind::Image {
                payload: Arc::clone(payload),
                shape: PhotoShape::Square,
                border: None,
            },
            None => NodeKind::Placeholder {
                glyph: LOGO_PLACEHOLDER.to_string(),
                shape: PhotoShape::Square,
                border: None,
            },
        };
        p.push(Selection::Logo, bounds, kind);
    }

    // Header text box hugs the text so the logo stays clickable beside it
    let header_mm = crate::units::points_to_mm(t.header_text_size);
    let header_y = t.header_text_y + ((t.header_height - header_mm * LINE_HEIGHT) / 2.0).max(0.0);
    let header_width = approx_text_width(&t.header_text, header_mm).min(t.width);
    let header_x = t.header_text_x
        + match t.header_text_align {
            Align::Left => 0.0,
            Align::Center => (t.width - header_width) / 2.0,
            Align::Right => t.width - header_width,
        };
    p.text(
        Selection::HeaderText,
        t.header_text.clone(),
        header_x,
        header_y,
        header_width,
        t.header_text_size,
        TextStyle {
            bold: true,
            ..TextStyle::plain(&t.header_text_color, t.header_text_align)
        },
    );

    // Photo slot
    let photo_bounds = p.bounds(t.photo_x, t.photo_y, t.photo_size, t.photo_size);
    let photo_border = p.border(t.photo_border_size, &t.photo_border_color);
    let photo = student.photo.as_deref().filter(|s| !s.is_empty());
    let kind = match photo {
        Some(payload) => NodeKind::Image {
            payload: Arc::from(payload),
            shape: t.photo_shape,
            border: photo_border,
        },
        None => NodeKind::Placeholder {
            glyph: PHOTO_PLACEHOLDER.to_string(),
            shape: t.photo_shape,
            border: photo_border,
        },
    };
    p.push(Selection::Photo, photo_bounds, kind);

    // Fields: by layer, then list order
    let mut fields: Vec<_> = t.fields.iter().filter(|f| f.visible).collect();
    fields.sort_by_key(|f| f.layer.unwrap_or(0));
    for field in fields {
        let value = resolve_display_value(&field.key, student);
        let text = if field.label.is_empty() {
            value
        } else {
            format!("{}: {}", field.label, value)
        };
        p.text(
            Selection::Field(field.key.clone()),
            text,
            field.x,
            field.y,
            field.width,
            field.font_size,
            TextStyle {
                bold: field.bold,
                italic: field.italic,
                color: &field.color,
                align: field.align,
                opacity: 1.0,
            },
        );
    }

    if t.show_qr {
        let bounds = p.bounds(t.qr_x, t.qr_y, t.qr_size, t.qr_size);
        p.push(
            Selection::Qr,
            bounds,
            NodeKind::Qr {
                data: qr_data(t, student),
            },
        );
    }

    // Signature block
    let sign_height = t.sign_width * SIGN_ASPECT;
    let sign_bounds = p.bounds(t.sign_x, t.sign_y, t.sign_width, sign_height);
    let kind = match &t.sign_image {
        Some(payload) => NodeKind::Image {
            payload: Arc::clone(payload),
            shape: PhotoShape::Square,
            border: None,
        },
        None => NodeKind::Line {
            color: t.border_color.clone(),
            thickness: p.scale.to_screen(0.2),
        },
    };
    p.push(Selection::Sign, sign_bounds, kind);
    p.text(
        Selection::Sign,
        SIGN_CAPTION.to_string(),
        t.sign_x,
        t.sign_y + sign_height + 0.3,
        t.sign_width,
        SIGN_CAPTION_FONT_SIZE,
        TextStyle::plain(FOOTER_COLOR, Align::Center),
    );

    // Security stripe and footer label
    let stripe = p.bounds(0.0, t.height - STRIPE_HEIGHT_MM, t.width, STRIPE_HEIGHT_MM);
    p.push(
        Selection::None,
        stripe,
        NodeKind::Stripe {
            colors: STRIPE_COLORS.iter().map(|c| c.to_string()).collect(),
        },
    );
    let footer_line = crate::units::points_to_mm(FOOTER_FONT_SIZE) * LINE_HEIGHT;
    p.text(
        Selection::None,
        FOOTER_LABEL.to_string(),
        0.0,
        t.height - STRIPE_HEIGHT_MM - footer_line - 0.3,
        t.width - 2.0,
        FOOTER_FONT_SIZE,
        TextStyle {
            bold: true,
            ..TextStyle::plain(FOOTER_COLOR, Align::Right)
        },
    );
}

fn render_back(p: &mut Painter<'_>, student: &Student) {
    let t = p.template;

    let watermark_line = crate::units::points_to_mm(WATERMARK_FONT_SIZE) * LINE_HEIGHT;
    p.text(
        Selection::None,
        t.watermark_text.clone(),
        0.0,
        (t.height - watermark_line) / 2.0,
        t.width,
        WATERMARK_FONT_SIZE,
        TextStyle {
            bold: true,
            opacity: WATERMARK_OPACITY,
            ..TextStyle::plain(&t.header_color, Align::Center)
        },
    );

    let line_mm = crate::units::points_to_mm(BACK_TEXT_FONT_SIZE) * LINE_HEIGHT;
    let wrap_width = p.scale.to_screen(t.back_text_width);
    let font_size = p.scale.font_to_screen(BACK_TEXT_FONT_SIZE);
    let lines = wrap_text(&t.back_text, font_size, wrap_width);
    for (i, line) in lines.into_iter().enumerate() {
        p.text(
            Selection::None,
            line,
            t.back_text_x,
            t.back_text_y + i as f32 * line_mm,
            t.back_text_width,
            BACK_TEXT_FONT_SIZE,
            TextStyle::plain("#1f2937", Align::Left),
        );
    }

    // Fixed footer: QR with its label
    let qr_y = t.height - BACK_QR_MARGIN_MM - BACK_QR_SIZE_MM;
    let bounds = p.bounds(BACK_QR_MARGIN_MM, qr_y, BACK_QR_SIZE_MM, BACK_QR_SIZE_MM);
    p.push(
        Selection::None,
        bounds,
        NodeKind::Qr {
            data: qr_data(t, student),
        },
    );
    let label_x = BACK_QR_MARGIN_MM * 2.0 + BACK_QR_SIZE_MM;
    let label_line = crate::units::points_to_mm(BACK_QR_LABEL_FONT_SIZE) * LINE_HEIGHT;
    p.text(
        Selection::None,
        BACK_QR_LABEL.to_string(),
        label_x,
        qr_y + (BACK_QR_SIZE_MM - label_line) / 2.0,
        t.width - label_x - BACK_QR_MARGIN_MM,
        BACK_QR_LABEL_FONT_SIZE,
        TextStyle::plain(FOOTER_COLOR, Align::Left),
    );
}
