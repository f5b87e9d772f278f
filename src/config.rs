// Config: editor steps, grid, zoom, history depth and resize floors

use crate::error::{DesignerError, Result};
use serde::{Deserialize, Serialize};

/// Smallest sizes a resize may reach. Shrinking below a floor clamps to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Limits {
    pub photo_size: f32,
    pub qr_size: f32,
    pub sign_width: f32,
    pub logo_size: f32,
    /// Points
    pub header_text_size: f32,
    /// Points
    pub font_size: f32,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            photo_size: 10.0,
            qr_size: 5.0,
            sign_width: 5.0,
            logo_size: 4.0,
            header_text_size: 4.0,
            font_size: 2.0,
        }
    }
}

/// Editor tuning. Every entry has a default so a config file only needs the
/// values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DesignerConfig {
    pub nudge_step: f32,
    pub fine_nudge_step: f32,
    /// Step for mm sizes (photo, QR, signature, logo)
    pub size_step: f32,
    pub fine_size_step: f32,
    /// Step for font sizes in points
    pub font_step: f32,
    pub fine_font_step: f32,
    /// Grid pitch used when the template has snap-to-grid on
    pub grid_mm: f32,
    pub zoom: u32,
    pub history_depth: usize,
    pub limits: Limits,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        DesignerConfig {
            nudge_step: 1.0,
            fine_nudge_step: 0.1,
            size_step: 2.0,
            fine_size_step: 0.5,
            font_step: 1.0,
            fine_font_step: 0.5,
            grid_mm: 1.0,
            zoom: 10,
            history_depth: 100,
            limits: Limits::default(),
        }
    }
}

impl DesignerConfig {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DesignerError::Config(format!("{}: {}", path, e)))?;
        let config: DesignerConfig = serde_json::from_str(&content)
            .map_err(|e| DesignerError::Config(format!("Invalid JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default(path: &Option<String>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        let l = &self.limits;
        let positive = [
            ("nudgeStep", self.nudge_step),
            ("fineNudgeStep", self.fine_nudge_step),
            ("sizeStep", self.size_step),
            ("fineSizeStep", self.fine_size_step),
            ("fontStep", self.font_step),
            ("fineFontStep", self.fine_font_step),
            ("gridMm", self.grid_mm),
            ("limits.photoSize", l.photo_size),
            ("limits.qrSize", l.qr_size),
            ("limits.signWidth", l.sign_width),
            ("limits.logoSize", l.logo_size),
            ("limits.headerTextSize", l.header_text_size),
            ("limits.fontSize", l.font_size),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(DesignerError::Config(format!("{} must be positive, got {}", name, value)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: DesignerConfig = serde_json::from_str(r#"{"limits": {"photoSize": 12}}"#).unwrap();
        assert_eq!(config.limits.photo_size, 12.0);
        assert_eq!(config.limits.font_size, 2.0);
        assert_eq!(config.nudge_step, 1.0);
    }

    #[test]
    fn rejects_non_positive_floors() {
        let mut config = DesignerConfig::default();
        config.limits.qr_size = 0.0;
        assert!(matches!(config.validate(), Err(DesignerError::Config(_))));
        assert!(DesignerConfig::default().validate().is_ok());
    }
}
