// idcard-designer: design, preview and print student ID cards

/// Copies every `Some` entry of a patch struct onto the matching field.
macro_rules! merge_fields {
    ($target:ident, $patch:ident, [$($field:ident),* $(,)?]) => {
        $(
            if let Some(value) = &$patch.$field {
                $target.$field = value.clone();
            }
        )*
    };
}

pub mod config;
pub mod editor;
pub mod error;
pub mod images;
pub mod pdf;
pub mod registry;
pub mod render;
pub mod store;
pub mod student;
pub mod template;
pub mod units;

pub use config::{DesignerConfig, Limits};
pub use editor::{Axis, Command, Delta, Editor, Selection};
pub use error::{DesignerError, Result};
pub use registry::{add_field, resolve_display_value};
pub use render::{render, Side, VisualTree};
pub use store::{save, AuditSink, TemplateStore};
pub use student::Student;
pub use template::{Field, Orientation, Template};
pub use units::Scale;
