//! The interaction pipeline: locate window, capture, recognize, select
//! occurrence, transform, click. No step is retried; the first failure
//! aborts the request and surfaces to the caller.

use crate::capture::ScreenCapturer;
use crate::click::{ClickDispatcher, HardwareButton};
use crate::error::{InteractError, Result};
use crate::geometry::{ScreenPoint, WindowPoint};
use crate::ocr::{TextMatch, TextRecognizer};
use crate::window::{select_window, Window, WindowLocator};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Explicit per-call targeting context. Passed into every orchestration so
/// there is no ambient "current simulator" state shared between calls.
#[derive(Debug, Clone, Default)]
pub struct TargetContext {
    /// Substring to match against window titles; `None` targets the primary
    /// window.
    pub device_name: Option<String>,
}

impl TargetContext {
    pub fn named(device_name: Option<String>) -> Self {
        Self { device_name }
    }
}

/// Coordinate space for direct (non-OCR) clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateSpace {
    /// Absolute screen coordinates, used as-is.
    #[default]
    Screen,
    /// Relative to the target window's origin.
    Window,
    /// Accepted as an alias for window-relative coordinates.
    Device,
}

impl CoordinateSpace {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "screen" => Ok(Self::Screen),
            "window" => Ok(Self::Window),
            "device" => Ok(Self::Device),
            other => Err(InteractError::InvalidInput(format!(
                "invalid coordinate_space '{other}' (expected screen, window, or device)"
            ))),
        }
    }
}

/// Result of a successful text click.
#[derive(Debug, Clone, Serialize)]
pub struct ClickOutcome {
    pub text: String,
    pub occurrence: usize,
    pub point: ScreenPoint,
}

/// A text match with its click point already lifted into screen space.
#[derive(Debug, Clone, Serialize)]
pub struct LocatedText {
    pub text: String,
    pub confidence: f32,
    pub center: ScreenPoint,
}

/// Keep matches that contain the search text (case-insensitive) and clear
/// the confidence floor, preserving recognizer order.
pub fn filter_matches(
    matches: Vec<TextMatch>,
    search: Option<&str>,
    min_confidence: f32,
) -> Vec<TextMatch> {
    let needle = search.map(|s| s.to_lowercase());
    matches
        .into_iter()
        .filter(|m| m.confidence >= min_confidence)
        .filter(|m| match &needle {
            Some(n) => m.text.to_lowercase().contains(n),
            None => true,
        })
        .collect()
}

pub struct Orchestrator {
    locator: Box<dyn WindowLocator>,
    capturer: Box<dyn ScreenCapturer>,
    recognizer: Box<dyn TextRecognizer>,
    dispatcher: Box<dyn ClickDispatcher>,
    min_confidence: f32,
}

impl Orchestrator {
    pub fn new(
        locator: Box<dyn WindowLocator>,
        capturer: Box<dyn ScreenCapturer>,
        recognizer: Box<dyn TextRecognizer>,
        dispatcher: Box<dyn ClickDispatcher>,
        min_confidence: f32,
    ) -> Self {
        Self {
            locator,
            capturer,
            recognizer,
            dispatcher,
            min_confidence,
        }
    }

    pub async fn list_windows(&self) -> Result<Vec<Window>> {
        self.locator.list_windows().await
    }

    async fn target_window(&self, ctx: &TargetContext) -> Result<Window> {
        let windows = self.locator.list_windows().await?;
        select_window(&windows, ctx.device_name.as_deref()).cloned()
    }

    /// Full pipeline: click the `occurrence`-th (1-indexed, recognizer
    /// order) match of `text` in the target window.
    pub async fn click_text(
        &self,
        ctx: &TargetContext,
        text: &str,
        occurrence: usize,
    ) -> Result<ClickOutcome> {
        if occurrence == 0 {
            return Err(InteractError::InvalidInput(
                "occurrence is 1-indexed and must be positive".to_string(),
            ));
        }

        let window = self.target_window(ctx).await?;
        let shot = self.capturer.capture(window.bounds).await?;
        let matches = self.recognizer.recognize(shot.path(), shot.size()).await?;
        let matches = filter_matches(matches, Some(text), self.min_confidence);

        if matches.is_empty() {
            return Err(InteractError::NotFound(format!(
                "text '{text}' not found in simulator"
            )));
        }
        if occurrence > matches.len() {
            return Err(InteractError::NotFound(format!(
                "only {} occurrence(s) of '{}' found, requested occurrence {}",
                matches.len(),
                text,
                occurrence
            )));
        }

        let target = &matches[occurrence - 1];
        let point = target
            .bounds
            .to_pixels(shot.size())?
            .center()
            .to_screen(window.bounds.origin());

        tracing::info!(
            "clicking '{}' (occurrence {}/{}) at {}",
            target.text,
            occurrence,
            matches.len(),
            point
        );
        self.dispatcher.click(point).await?;

        Ok(ClickOutcome {
            text: target.text.clone(),
            occurrence,
            point,
        })
        // `shot` drops here on every path, removing the temp file.
    }

    /// Read-only OCR pass over the target window. Centers are reported in
    /// absolute screen space so they can be fed straight back into
    /// [`Orchestrator::click_at`].
    pub async fn find_text(
        &self,
        ctx: &TargetContext,
        search: Option<&str>,
    ) -> Result<Vec<LocatedText>> {
        let window = self.target_window(ctx).await?;
        let shot = self.capturer.capture(window.bounds).await?;
        let matches = self.recognizer.recognize(shot.path(), shot.size()).await?;
        let matches = filter_matches(matches, search, self.min_confidence);

        let origin = window.bounds.origin();
        matches
            .into_iter()
            .map(|m| {
                let center = m.bounds.to_pixels(shot.size())?.center().to_screen(origin);
                Ok(LocatedText {
                    text: m.text,
                    confidence: m.confidence,
                    center,
                })
            })
            .collect()
    }

    /// Direct click, bypassing OCR. Screen space is untransformed; window
    /// and device spaces add the target window's origin (no vertical flip).
    pub async fn click_at(
        &self,
        ctx: &TargetContext,
        x: f64,
        y: f64,
        space: CoordinateSpace,
    ) -> Result<ScreenPoint> {
        let point = match space {
            CoordinateSpace::Screen => ScreenPoint { x, y },
            CoordinateSpace::Window | CoordinateSpace::Device => {
                let window = self.target_window(ctx).await?;
                WindowPoint { x, y }.to_screen(window.bounds.origin())
            }
        };
        self.dispatcher.click(point).await?;
        Ok(point)
    }

    /// Capture the target window and persist the image to `dest`, outside
    /// the temp-file lifecycle.
    pub async fn save_screenshot(&self, ctx: &TargetContext, dest: &Path) -> Result<PathBuf> {
        let window = self.target_window(ctx).await?;
        let shot = self.capturer.capture(window.bounds).await?;
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        shot.persist(dest)?;
        Ok(dest.to_path_buf())
    }

    /// Simulate a hardware button through the Simulator's keyboard shortcut.
    pub async fn press_button(&self, button: HardwareButton) -> Result<()> {
        self.dispatcher.send_key(button.key_combo()).await
    }
}
