// Image intake: logo, signature, background and photo payloads

use crate::error::{DesignerError, Result};
use crate::template::ImagePayload;
use ::image::DynamicImage;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::warn;
use std::io::Read;
use std::sync::Arc;

/// Uploads above this size are accepted with a warning
pub const ADVISORY_MAX_BYTES: usize = 512 * 1024;

/// Reads image bytes from a file path, an `http(s)` URL or a `data:` URL.
pub fn load_source(source: &str) -> Result<Vec<u8>> {
    if source.starts_with("data:") {
        decode_data_url(source)
    } else if source.starts_with("http://") || source.starts_with("https://") {
        let response = ureq::get(source)
            .call()
            .map_err(|e| DesignerError::Image(format!("Failed to fetch URL: {}", e)))?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| DesignerError::Image(format!("Failed to read response: {}", e)))?;
        Ok(bytes)
    } else {
        std::fs::read(source).map_err(|e| DesignerError::Image(format!("{}: {}", source, e)))
    }
}

/// Validates that `bytes` decode as an image and encodes them as a data URL.
pub fn to_data_url(bytes: &[u8]) -> Result<ImagePayload> {
    let format = ::image::guess_format(bytes)
        .map_err(|e| DesignerError::Image(format!("Unrecognised image format: {}", e)))?;
    ::image::load_from_memory_with_format(bytes, format)
        .map_err(|e| DesignerError::Image(format!("Failed to decode image: {}", e)))?;

    if bytes.len() > ADVISORY_MAX_BYTES {
        warn!(
            "image is {} KiB, larger than the advised {} KiB",
            bytes.len() / 1024,
            ADVISORY_MAX_BYTES / 1024
        );
    }

    let url = format!("data:{};base64,{}", format.to_mime_type(), STANDARD.encode(bytes));
    Ok(Arc::from(url))
}

pub fn load_payload(source: &str) -> Result<ImagePayload> {
    to_data_url(&load_source(source)?)
}

fn decode_data_url(data_url: &str) -> Result<Vec<u8>> {
    // data:image/png;base64,xxxxx
    let (_, encoded) = data_url
        .split_once(',')
        .ok_or_else(|| DesignerError::Image("Invalid data URL format".to_string()))?;
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| DesignerError::Image(format!("Base64 decode error: {}", e)))
}

/// Decodes a stored payload for drawing.
pub fn decode(payload: &str) -> Result<DynamicImage> {
    let bytes = decode_data_url(payload)?;
    ::image::load_from_memory(&bytes)
        .map_err(|e| DesignerError::Image(format!("Failed to decode image: {}", e)))
}
