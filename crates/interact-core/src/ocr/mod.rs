use crate::error::{InteractError, Result};
use crate::geometry::{NormalizedRect, PixelSize};
use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// One piece of recognized text with its normalized, bottom-left-origin
/// bounding box. Produced per call and never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct TextMatch {
    pub text: String,
    pub confidence: f32,
    pub bounds: NormalizedRect,
}

/// OCR engine seam. Engines return every recognized string, in whatever
/// order the underlying API emits them; filtering happens upstream.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Recognize text in `image`. `size` is the image's pixel dimensions,
    /// for engines that report pixel boxes and must normalize them.
    async fn recognize(&self, image: &Path, size: PixelSize) -> Result<Vec<TextMatch>>;

    fn name(&self) -> &str;
}

#[cfg(target_os = "macos")]
pub mod vision;

pub mod tesseract;

/// Build the recognizer named by configuration. "auto" picks the Vision
/// framework on macOS and falls back to Tesseract elsewhere.
pub fn create_recognizer(engine: &str, timeout: Duration) -> Result<Box<dyn TextRecognizer>> {
    match engine {
        "auto" => {
            #[cfg(target_os = "macos")]
            {
                Ok(Box::new(vision::AppleVisionRecognizer::new()?))
            }
            #[cfg(not(target_os = "macos"))]
            {
                Ok(Box::new(tesseract::TesseractRecognizer::new(timeout)?))
            }
        }
        "vision" => {
            #[cfg(target_os = "macos")]
            {
                Ok(Box::new(vision::AppleVisionRecognizer::new()?))
            }
            #[cfg(not(target_os = "macos"))]
            {
                Err(InteractError::InvalidInput(
                    "the vision OCR engine is only available on macOS".to_string(),
                ))
            }
        }
        "tesseract" => Ok(Box::new(tesseract::TesseractRecognizer::new(timeout)?)),
        other => Err(InteractError::InvalidInput(format!(
            "unknown OCR engine '{other}' (expected auto, vision, or tesseract)"
        ))),
    }
}
