// Errors shared by the library and the CLI

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DesignerError {
    #[error("Field '{0}' is already on this card")]
    DuplicateField(String),
    #[error("'{0}' is not a known student attribute")]
    UnknownField(String),
    #[error("Failed to save template: {0}")]
    SaveFailure(String),
    #[error("No template matches '{0}'")]
    TemplateNotFound(String),
    #[error("Failed to read template store: {0}")]
    Store(String),
    #[error("Failed to read roster file: {0}")]
    Roster(String),
    #[error("Failed to load image: {0}")]
    Image(String),
    #[error("Failed to generate QR code: {0}")]
    Qr(String),
    #[error("Failed to create PDF: {0}")]
    Pdf(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Failed to read commands file: {0}")]
    Commands(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DesignerError>;
