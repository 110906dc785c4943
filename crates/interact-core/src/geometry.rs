//! Typed coordinate spaces.
//!
//! Three spaces flow through the click pipeline and they must never be
//! mixed silently:
//!
//! - OCR space: normalized fractions in [0,1], origin at the bottom-left
//!   (the Vision framework convention).
//! - Pixel space: screenshot pixels, origin at the top-left. On HiDPI
//!   displays this is larger than the window's logical size, so the pixel
//!   basis is always the screenshot's own dimensions.
//! - Screen space: absolute display coordinates, origin at the top-left.
//!
//! Each space gets its own type so a pixel value cannot be handed to a
//! screen-space consumer without an explicit conversion.

use crate::error::{InteractError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bounding box in normalized OCR space, bottom-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Pixel dimensions of a captured image, read back from the file itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

/// A point in screenshot pixel space, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

/// A rectangle in screenshot pixel space, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A point in absolute screen space, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// A rectangle in absolute screen space, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A point relative to a window's own origin, top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedRect {
    /// Convert to top-left-origin pixel coordinates, flipping the vertical
    /// axis. `size` must be the screenshot's own pixel dimensions, never the
    /// window's logical size (capture may be 2x on HiDPI).
    pub fn to_pixels(&self, size: PixelSize) -> Result<PixelRect> {
        if size.width == 0 || size.height == 0 {
            return Err(InteractError::Transform(format!(
                "image has degenerate dimensions {}x{}",
                size.width, size.height
            )));
        }
        let (w, h) = (size.width as f64, size.height as f64);
        Ok(PixelRect {
            x: self.x * w,
            y: (1.0 - self.y - self.height) * h,
            width: self.width * w,
            height: self.height * h,
        })
    }
}

impl PixelRect {
    /// Inverse of [`NormalizedRect::to_pixels`].
    pub fn to_normalized(&self, size: PixelSize) -> Result<NormalizedRect> {
        if size.width == 0 || size.height == 0 {
            return Err(InteractError::Transform(format!(
                "image has degenerate dimensions {}x{}",
                size.width, size.height
            )));
        }
        let (w, h) = (size.width as f64, size.height as f64);
        let height = self.height / h;
        Ok(NormalizedRect {
            x: self.x / w,
            y: 1.0 - self.y / h - height,
            width: self.width / w,
            height,
        })
    }

    /// Center point. Valid for zero-area rectangles as well.
    pub fn center(&self) -> PixelPoint {
        PixelPoint {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }
}

impl PixelPoint {
    /// Translate into screen space by adding the capture rectangle's screen
    /// origin. The origin is the only additive offset; window size plays no
    /// part in the forward transform.
    pub fn to_screen(&self, origin: ScreenPoint) -> ScreenPoint {
        ScreenPoint {
            x: origin.x + self.x,
            y: origin.y + self.y,
        }
    }
}

impl WindowPoint {
    /// Window-relative to absolute screen coordinates. No vertical flip.
    pub fn to_screen(&self, origin: ScreenPoint) -> ScreenPoint {
        ScreenPoint {
            x: origin.x + self.x,
            y: origin.y + self.y,
        }
    }
}

impl ScreenRect {
    pub fn origin(&self) -> ScreenPoint {
        ScreenPoint {
            x: self.x,
            y: self.y,
        }
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }
}

impl fmt::Display for ScreenPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.0}, {:.0})", self.x, self.y)
    }
}
