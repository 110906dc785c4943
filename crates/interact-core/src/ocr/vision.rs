use super::{TextMatch, TextRecognizer};
use crate::error::{InteractError, Result};
use crate::geometry::{NormalizedRect, PixelSize};
use async_trait::async_trait;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_float, c_uint};
use std::path::Path;

// FFI bindings to the Swift VisionBridge (see vision-bridge/). Boxes come
// back in the Vision framework's native normalized, bottom-left-origin form.
#[repr(C)]
struct VisionTextBox {
    text: *const c_char,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    confidence: c_float,
}

extern "C" {
    fn vision_recognize_text(
        image_path: *const c_char,
        out_boxes: *mut *mut std::ffi::c_void,
        out_count: *mut c_uint,
    ) -> bool;

    fn vision_free_boxes(boxes: *mut std::ffi::c_void, count: c_uint);
}

/// Apple Vision framework OCR engine.
pub struct AppleVisionRecognizer;

impl AppleVisionRecognizer {
    pub fn new() -> Result<Self> {
        Ok(Self)
    }
}

#[async_trait]
impl TextRecognizer for AppleVisionRecognizer {
    async fn recognize(&self, image: &Path, _size: PixelSize) -> Result<Vec<TextMatch>> {
        let c_path = CString::new(image.to_string_lossy().as_bytes())
            .map_err(|e| InteractError::Recognition(format!("bad image path: {e}")))?;

        let mut boxes_ptr: *mut std::ffi::c_void = std::ptr::null_mut();
        let mut count: c_uint = 0;

        let success =
            unsafe { vision_recognize_text(c_path.as_ptr(), &mut boxes_ptr, &mut count) };
        if !success {
            return Err(InteractError::Recognition(
                "Apple Vision OCR failed".to_string(),
            ));
        }
        if boxes_ptr.is_null() || count == 0 {
            return Ok(Vec::new());
        }

        let mut matches = Vec::with_capacity(count as usize);
        unsafe {
            let boxes = std::slice::from_raw_parts(boxes_ptr as *const VisionTextBox, count as usize);
            for b in boxes {
                let text = if b.text.is_null() {
                    String::new()
                } else {
                    CStr::from_ptr(b.text).to_string_lossy().into_owned()
                };
                if text.is_empty() {
                    continue;
                }
                matches.push(TextMatch {
                    text,
                    confidence: b.confidence,
                    bounds: NormalizedRect {
                        x: b.x,
                        y: b.y,
                        width: b.width,
                        height: b.height,
                    },
                });
            }
            vision_free_boxes(boxes_ptr, count);
        }

        Ok(matches)
    }

    fn name(&self) -> &str {
        "Apple Vision Framework"
    }
}
