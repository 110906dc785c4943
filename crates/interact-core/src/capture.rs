//! Window-region screenshot capture via the `screencapture` utility.

use crate::error::{InteractError, Result};
use crate::exec::run_with_timeout;
use crate::geometry::{PixelSize, ScreenRect};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tempfile::TempPath;

/// A captured screenshot. Owns its temp file: the file is removed when this
/// value drops, so every exit path of an orchestration (success, no-match,
/// error) releases the artifact without explicit cleanup code.
pub struct Screenshot {
    path: TempPath,
    size: PixelSize,
}

impl Screenshot {
    pub fn new(path: TempPath, size: PixelSize) -> Self {
        Self { path, size }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pixel dimensions read back from the image file itself. Capture
    /// resolution may differ from the requested rectangle (HiDPI 2x), so
    /// consumers must scale against these, never the window's point size.
    pub fn size(&self) -> PixelSize {
        self.size
    }

    /// Copy the capture to a caller-owned location, then release the temp
    /// file. Copy rather than rename so the destination may live on another
    /// volume.
    pub fn persist(self, dest: &Path) -> Result<()> {
        std::fs::copy(&self.path, dest)?;
        Ok(())
    }
}

#[async_trait]
pub trait ScreenCapturer: Send + Sync {
    async fn capture(&self, bounds: ScreenRect) -> Result<Screenshot>;
}

/// Capturer backed by `screencapture -x -R`.
pub struct Screencapture {
    timeout: Duration,
}

impl Screencapture {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl ScreenCapturer for Screencapture {
    async fn capture(&self, bounds: ScreenRect) -> Result<Screenshot> {
        let file = tempfile::Builder::new()
            .prefix("ios-interact-")
            .suffix(".png")
            .tempfile()?;
        let path = file.into_temp_path();

        let region = format!(
            "{:.0},{:.0},{:.0},{:.0}",
            bounds.x, bounds.y, bounds.width, bounds.height
        );
        let path_str = path.to_string_lossy().to_string();
        let output =
            run_with_timeout("screencapture", &["-x", "-R", &region, &path_str], self.timeout)
                .await?;

        if !output.status.success() {
            return Err(InteractError::Capture(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        let len = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        if len == 0 {
            return Err(InteractError::Capture(format!(
                "screencapture produced an empty file for region {region}"
            )));
        }

        let (width, height) = image::image_dimensions(&path)
            .map_err(|e| InteractError::Capture(format!("unreadable screenshot: {e}")))?;
        tracing::debug!(
            "captured region {} into {} ({}x{} px)",
            region,
            path_str,
            width,
            height
        );
        Ok(Screenshot::new(path, PixelSize { width, height }))
    }
}
