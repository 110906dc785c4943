//! OCR-driven click targeting for iOS Simulator windows.
//!
//! The pipeline converts text found by OCR in a window screenshot into a
//! physical click on a possibly-moved, possibly-HiDPI simulator window:
//! enumerate windows, capture the target's region, recognize text, pick the
//! requested occurrence, transform its normalized bounds through screenshot
//! pixel space into screen space, and dispatch a synthetic click.

pub mod capture;
pub mod click;
pub mod error;
mod exec;
pub mod geometry;
pub mod ocr;
pub mod orchestrator;
pub mod window;

pub use capture::{ScreenCapturer, Screencapture, Screenshot};
pub use click::{ClickDispatcher, HardwareButton, KeyCombo, SystemEventsDispatcher};
pub use error::{InteractError, Result};
pub use geometry::{
    NormalizedRect, PixelPoint, PixelRect, PixelSize, ScreenPoint, ScreenRect, WindowPoint,
};
pub use ocr::{create_recognizer, TextMatch, TextRecognizer};
pub use orchestrator::{
    filter_matches, ClickOutcome, CoordinateSpace, LocatedText, Orchestrator, TargetContext,
};
pub use window::{parse_window_data, select_window, SystemEventsLocator, Window, WindowLocator};
