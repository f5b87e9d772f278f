// Template model: one named ID-card layout on the CR80 card surface

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

// ============================================================================
// Constants
// ============================================================================

/// CR80 card dimensions in mm (long and short edge)
pub const CR80_LONG_MM: f32 = 85.60;
pub const CR80_SHORT_MM: f32 = 53.98;

/// Defaults for fields appended by the registry
pub const DEFAULT_FIELD_FONT_SIZE: f32 = 7.0;
pub const DEFAULT_FIELD_X_MM: f32 = 34.0;
pub const DEFAULT_FIELD_Y_MM: f32 = 15.0;
pub const DEFAULT_FIELD_WIDTH_MM: f32 = 45.0;
pub const DEFAULT_FIELD_SPACING_MM: f32 = 4.5;
pub const DEFAULT_FIELD_COLOR: &str = "#000000";

/// Encoded image (a `data:` URL), shared between template versions
pub type ImagePayload = Arc<str>;

// ============================================================================
// Enumerations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Orientation {
    /// Landscape, long edge horizontal
    Horizontal,
    /// Portrait, long edge vertical
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    Solid,
    Gradient,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoShape {
    Square,
    Rounded,
    Circle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

// ============================================================================
// Field
// ============================================================================

/// One student attribute placed on the card. Positions are mm from the
/// card's top-left corner; `font_size` is in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub key: String,
    #[serde(default)]
    pub label: String,
    pub visible: bool,
    pub font_size: f32,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    pub color: String,
    #[serde(default)]
    pub align: Align,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<i32>,
}

impl Field {
    pub fn new(key: &str, label: &str, x: f32, y: f32) -> Self {
        Field {
            key: key.to_string(),
            label: label.to_string(),
            visible: true,
            font_size: DEFAULT_FIELD_FONT_SIZE,
            bold: false,
            italic: false,
            color: DEFAULT_FIELD_COLOR.to_string(),
            align: Align::Left,
            x,
            y,
            width: DEFAULT_FIELD_WIDTH_MM,
            layer: None,
        }
    }

    /// Returns a copy with every `Some` entry of `patch` applied. The key is
    /// not patchable.
    pub fn merge(&self, patch: &FieldPatch) -> Field {
        let mut next = self.clone();
        merge_fields!(next, patch, [
            label, visible, font_size, bold, italic, color, align, x, y, width, layer,
        ]);
        next
    }
}

/// Partial update for a [`Field`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    /// `Some(None)` (JSON `null`) clears the layer
    #[serde(deserialize_with = "explicit_null", skip_serializing_if = "Option::is_none")]
    pub layer: Option<Option<i32>>,
}

/// Keeps an explicit `null` apart from an absent key.
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============================================================================
// Template
// ============================================================================

/// A complete card layout. Cloning is cheap enough for undo history: image
/// payloads are shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,

    // Geometry
    pub orientation: Orientation,
    pub width: f32,
    pub height: f32,
    pub card_rounding: f32,
    pub border_width: f32,
    pub border_color: String,

    // Background
    pub background_kind: BackgroundKind,
    pub background_color: String,
    pub gradient_from: String,
    pub gradient_to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<ImagePayload>,

    // Header band
    pub header_color: String,
    pub header_height: f32,
    pub header_text: String,
    pub header_text_size: f32,
    pub header_text_color: String,
    pub header_text_align: Align,
    pub header_text_x: f32,
    pub header_text_y: f32,

    // Logo
    pub show_logo: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_image: Option<ImagePayload>,
    pub logo_x: f32,
    pub logo_y: f32,
    pub logo_size: f32,

    // Photo slot
    pub photo_x: f32,
    pub photo_y: f32,
    pub photo_size: f32,
    pub photo_shape: PhotoShape,
    pub photo_border_size: f32,
    pub photo_border_color: String,

    #[serde(default)]
    pub fields: Vec<Field>,

    // Security and validation
    pub show_qr: bool,
    pub qr_x: f32,
    pub qr_y: f32,
    pub qr_size: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_image: Option<ImagePayload>,
    pub sign_x: f32,
    pub sign_y: f32,
    pub sign_width: f32,
    pub back_text: String,
    pub back_text_x: f32,
    pub back_text_y: f32,
    pub back_text_width: f32,
    pub watermark_text: String,

    #[serde(default)]
    pub snap_to_grid: bool,
}

impl Template {
    /// The width/height pair every card of `orientation` must have.
    pub fn canonical_dimensions(orientation: Orientation) -> (f32, f32) {
        match orientation {
            Orientation::Horizontal => (CR80_LONG_MM, CR80_SHORT_MM),
            Orientation::Vertical => (CR80_SHORT_MM, CR80_LONG_MM),
        }
    }

    /// The pre-populated landscape layout offered for new templates.
    pub fn standard() -> Self {
        let (width, height) = Self::canonical_dimensions(Orientation::Horizontal);

        let mut name = Field::new("name", "", DEFAULT_FIELD_X_MM, DEFAULT_FIELD_Y_MM);
        name.font_size = 9.0;
        name.bold = true;
        name.width = 48.0;

        Template {
            id: None,
            name: "Standard".to_string(),
            orientation: Orientation::Horizontal,
            width,
            height,
            card_rounding: 3.0,
            border_width: 0.3,
            border_color: "#1e3a8a".to_string(),
            background_kind: BackgroundKind::Solid,
            background_color: "#ffffff".to_string(),
            gradient_from: "#e0f2fe".to_string(),
            gradient_to: "#ffffff".to_string(),
            background_image: None,
            header_color: "#1e3a8a".to_string(),
            header_height: 11.0,
            header_text: "SCHOOL NAME".to_string(),
            header_text_size: 9.0,
            header_text_color: "#ffffff".to_string(),
            header_text_align: Align::Center,
            header_text_x: 0.0,
            header_text_y: 0.0,
            show_logo: true,
            logo_image: None,
            logo_x: 3.0,
            logo_y: 1.5,
            logo_size: 8.0,
            photo_x: 5.0,
            photo_y: 15.0,
            photo_size: 25.0,
            photo_shape: PhotoShape::Rounded,
            photo_border_size: 0.5,
            photo_border_color: "#1e3a8a".to_string(),
            fields: vec![
                name,
                Field::new("classSection", "Class", DEFAULT_FIELD_X_MM, 21.0),
                Field::new("rollNo", "Roll No", DEFAULT_FIELD_X_MM, 25.5),
                Field::new("dob", "DOB", DEFAULT_FIELD_X_MM, 30.0),
            ],
            show_qr: true,
            qr_x: 68.0,
            qr_y: 30.0,
            qr_size: 14.0,
            sign_image: None,
            sign_x: 40.0,
            sign_y: 40.0,
            sign_width: 20.0,
            back_text: "This card is the property of the school. If found, please return it to the school office."
                .to_string(),
            back_text_x: 6.0,
            back_text_y: 14.0,
            back_text_width: 73.6,
            watermark_text: "SCHOOL".to_string(),
            snap_to_grid: false,
        }
    }

    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn has_field(&self, key: &str) -> bool {
        self.field(key).is_some()
    }

    /// Restores the model invariants on a template that came from outside
    /// the editor: canonical dimensions for the orientation and unique field
    /// keys (the first occurrence wins).
    pub fn normalized(mut self) -> Self {
        let (width, height) = Self::canonical_dimensions(self.orientation);
        self.width = width;
        self.height = height;

        let mut seen = HashSet::new();
        self.fields.retain(|f| seen.insert(f.key.clone()));
        self
    }

    /// Returns a copy with every `Some` entry of `patch` applied. An empty
    /// image payload clears that slot.
    pub fn merge(&self, patch: &TemplatePatch) -> Template {
        let mut next = self.clone();
        merge_fields!(next, patch, [
            name,
            card_rounding,
            border_width,
            border_color,
            background_kind,
            background_color,
            gradient_from,
            gradient_to,
            header_color,
            header_height,
            header_text,
            header_text_size,
            header_text_color,
            header_text_align,
            show_logo,
            photo_shape,
            photo_border_size,
            photo_border_color,
            show_qr,
            back_text,
            back_text_x,
            back_text_y,
            back_text_width,
            watermark_text,
            snap_to_grid,
        ]);
        if let Some(image) = &patch.background_image {
            next.background_image = non_empty(image);
        }
        if let Some(image) = &patch.logo_image {
            next.logo_image = non_empty(image);
        }
        if let Some(image) = &patch.sign_image {
            next.sign_image = non_empty(image);
        }
        next
    }
}

fn non_empty(image: &ImagePayload) -> Option<ImagePayload> {
    if image.is_empty() {
        None
    } else {
        Some(Arc::clone(image))
    }
}

/// Partial update for template-level styling. Element positions and sizes
/// are changed through editor commands instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplatePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_rounding: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_kind: Option<BackgroundKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gradient_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gradient_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<ImagePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_text_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_text_align: Option<Align>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_logo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_image: Option<ImagePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_shape: Option<PhotoShape>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_border_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_qr: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sign_image: Option<ImagePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_text_x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_text_y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_text_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watermark_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snap_to_grid: Option<bool>,
}
