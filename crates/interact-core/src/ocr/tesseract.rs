use super::{TextMatch, TextRecognizer};
use crate::error::{InteractError, Result};
use crate::exec::run_with_timeout;
use crate::geometry::{NormalizedRect, PixelSize};
use async_trait::async_trait;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

/// Tesseract CLI OCR engine (fallback/cross-platform). Tesseract reports
/// pixel boxes with a top-left origin; they are converted to the normalized
/// bottom-left form the rest of the pipeline expects.
pub struct TesseractRecognizer {
    timeout: Duration,
}

impl TesseractRecognizer {
    pub fn new(timeout: Duration) -> Result<Self> {
        let check = Command::new("which").arg("tesseract").output();
        let available = check.map(|o| o.status.success()).unwrap_or(false);
        if !available {
            return Err(InteractError::Recognition(
                "tesseract is not installed (macOS: brew install tesseract; \
                 Debian/Ubuntu: apt-get install tesseract-ocr)"
                    .to_string(),
            ));
        }
        Ok(Self { timeout })
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    async fn recognize(&self, image: &Path, size: PixelSize) -> Result<Vec<TextMatch>> {
        let path = image.to_string_lossy().to_string();
        let output =
            run_with_timeout("tesseract", &[&path, "stdout", "tsv"], self.timeout).await?;
        if !output.status.success() {
            return Err(InteractError::Recognition(format!(
                "tesseract failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        parse_tsv(&String::from_utf8_lossy(&output.stdout), size)
    }

    fn name(&self) -> &str {
        "Tesseract OCR"
    }
}

/// Parse Tesseract TSV output. Columns: level, page_num, block_num, par_num,
/// line_num, word_num, left, top, width, height, conf, text. Non-word rows
/// carry conf = -1 and are dropped.
fn parse_tsv(tsv: &str, size: PixelSize) -> Result<Vec<TextMatch>> {
    let mut matches = Vec::new();
    for line in tsv.lines().skip(1) {
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 12 {
            continue;
        }
        let (Ok(left), Ok(top), Ok(width), Ok(height), Ok(conf)) = (
            parts[6].parse::<f64>(),
            parts[7].parse::<f64>(),
            parts[8].parse::<f64>(),
            parts[9].parse::<f64>(),
            parts[10].parse::<f32>(),
        ) else {
            continue;
        };
        let text = parts[11].trim();
        if text.is_empty() || conf <= 0.0 {
            continue;
        }
        let pixel = crate::geometry::PixelRect {
            x: left,
            y: top,
            width,
            height,
        };
        let bounds: NormalizedRect = pixel.to_normalized(size)?;
        matches.push(TextMatch {
            text: text.to_string(),
            confidence: conf / 100.0,
            bounds,
        });
    }
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    #[test]
    fn parses_word_rows_and_normalizes() {
        let tsv = format!(
            "{HEADER}\n\
             5\t1\t1\t1\t1\t1\t240\t600\t120\t60\t96.5\tSettings\n\
             5\t1\t1\t1\t1\t2\t0\t0\t0\t0\t-1\t\n"
        );
        let size = PixelSize {
            width: 600,
            height: 1200,
        };
        let matches = parse_tsv(&tsv, size).unwrap();
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.text, "Settings");
        assert!((m.confidence - 0.965).abs() < 1e-6);
        // Top-left pixel (240, 600, 120, 60) -> bottom-left normalized.
        assert!((m.bounds.x - 0.4).abs() < 1e-9);
        assert!((m.bounds.y - 0.45).abs() < 1e-9);
        assert!((m.bounds.width - 0.2).abs() < 1e-9);
        assert!((m.bounds.height - 0.05).abs() < 1e-9);
    }

    #[test]
    fn skips_headers_and_structural_rows() {
        let tsv = format!("{HEADER}\n1\t1\t0\t0\t0\t0\t0\t0\t600\t1200\t-1\t\n");
        let matches = parse_tsv(
            &tsv,
            PixelSize {
                width: 600,
                height: 1200,
            },
        )
        .unwrap();
        assert!(matches.is_empty());
    }
}
