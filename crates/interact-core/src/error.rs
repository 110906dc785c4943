use thiserror::Error;

pub type Result<T> = std::result::Result<T, InteractError>;

/// Errors surfaced by the interaction pipeline. Nothing in the pipeline
/// catches one of these and substitutes a fallback value; every failure
/// aborts the current orchestration and reaches the caller as-is.
#[derive(Debug, Error)]
pub enum InteractError {
    /// Target window, text, or occurrence does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The caller supplied an argument the pipeline rejects up front.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// screencapture failed or produced an unusable image.
    #[error("screen capture failed: {0}")]
    Capture(String),

    /// Click or keystroke dispatch failed.
    #[error("automation failed: {0} (check accessibility permissions under System Settings > Privacy & Security)")]
    Automation(String),

    /// Degenerate geometry: zero-size image, malformed bounds.
    #[error("coordinate transform failed: {0}")]
    Transform(String),

    /// The OCR engine failed to run or returned garbage.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    #[error("'{command}' timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
