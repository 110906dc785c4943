//! End-to-end pipeline tests with mock collaborators standing in for
//! System Events, screencapture, and the OCR engine.

use async_trait::async_trait;
use interact_core::capture::{ScreenCapturer, Screenshot};
use interact_core::click::{ClickDispatcher, KeyCombo};
use interact_core::error::{InteractError, Result};
use interact_core::geometry::{NormalizedRect, PixelSize, ScreenPoint, ScreenRect};
use interact_core::ocr::{TextMatch, TextRecognizer};
use interact_core::orchestrator::{CoordinateSpace, Orchestrator, TargetContext};
use interact_core::window::{Window, WindowLocator};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

struct FixedWindows(Vec<Window>);

#[async_trait]
impl WindowLocator for FixedWindows {
    async fn list_windows(&self) -> Result<Vec<Window>> {
        Ok(self.0.clone())
    }
}

/// Writes a real temp file per capture and records its path so tests can
/// verify the file is gone after the pipeline returns.
struct RecordingCapturer {
    size: PixelSize,
    captured: Arc<Mutex<Vec<PathBuf>>>,
}

#[async_trait]
impl ScreenCapturer for RecordingCapturer {
    async fn capture(&self, _bounds: ScreenRect) -> Result<Screenshot> {
        let mut file = tempfile::Builder::new()
            .prefix("pipeline-test-")
            .suffix(".png")
            .tempfile()?;
        file.write_all(b"not actually a png")?;
        let path = file.into_temp_path();
        self.captured.lock().unwrap().push(path.to_path_buf());
        Ok(Screenshot::new(path, self.size))
    }
}

struct FixedMatches(Vec<TextMatch>);

#[async_trait]
impl TextRecognizer for FixedMatches {
    async fn recognize(&self, _image: &Path, _size: PixelSize) -> Result<Vec<TextMatch>> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

#[derive(Clone, Default)]
struct RecordingDispatcher {
    clicks: Arc<Mutex<Vec<ScreenPoint>>>,
    keys: Arc<Mutex<Vec<KeyCombo>>>,
    fail: bool,
}

#[async_trait]
impl ClickDispatcher for RecordingDispatcher {
    async fn click(&self, point: ScreenPoint) -> Result<()> {
        if self.fail {
            return Err(InteractError::Automation("click refused".to_string()));
        }
        self.clicks.lock().unwrap().push(point);
        Ok(())
    }

    async fn send_key(&self, combo: KeyCombo) -> Result<()> {
        self.keys.lock().unwrap().push(combo);
        Ok(())
    }
}

fn window_at(x: f64, y: f64) -> Window {
    Window {
        index: 1,
        title: "iPhone 15 - iOS 17.2".to_string(),
        bounds: ScreenRect {
            x,
            y,
            width: 300.0,
            height: 600.0,
        },
    }
}

fn text_match(text: &str, bounds: NormalizedRect) -> TextMatch {
    TextMatch {
        text: text.to_string(),
        confidence: 0.95,
        bounds,
    }
}

struct Harness {
    orchestrator: Orchestrator,
    clicks: Arc<Mutex<Vec<ScreenPoint>>>,
    keys: Arc<Mutex<Vec<KeyCombo>>>,
    captured: Arc<Mutex<Vec<PathBuf>>>,
}

fn harness(windows: Vec<Window>, size: PixelSize, matches: Vec<TextMatch>) -> Harness {
    harness_with(windows, size, matches, false)
}

fn harness_with(
    windows: Vec<Window>,
    size: PixelSize,
    matches: Vec<TextMatch>,
    fail_clicks: bool,
) -> Harness {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = RecordingDispatcher {
        fail: fail_clicks,
        ..Default::default()
    };
    let clicks = dispatcher.clicks.clone();
    let keys = dispatcher.keys.clone();
    let orchestrator = Orchestrator::new(
        Box::new(FixedWindows(windows)),
        Box::new(RecordingCapturer {
            size,
            captured: captured.clone(),
        }),
        Box::new(FixedMatches(matches)),
        Box::new(dispatcher),
        0.3,
    );
    Harness {
        orchestrator,
        clicks,
        keys,
        captured,
    }
}

fn assert_captures_cleaned(h: &Harness) {
    let captured = h.captured.lock().unwrap();
    assert!(!captured.is_empty(), "expected at least one capture");
    for path in captured.iter() {
        assert!(!path.exists(), "temp screenshot {} still exists", path.display());
    }
}

// Scenario A: "Settings" at normalized (0.4, 0.45, 0.2, 0.05) in a 600x1200
// capture of a window at (100, 50) clicks screen point (400, 680).
#[tokio::test]
async fn click_text_hits_the_transformed_center() {
    let h = harness(
        vec![window_at(100.0, 50.0)],
        PixelSize {
            width: 600,
            height: 1200,
        },
        vec![text_match(
            "Settings",
            NormalizedRect {
                x: 0.4,
                y: 0.45,
                width: 0.2,
                height: 0.05,
            },
        )],
    );
    let ctx = TargetContext::default();
    let outcome = h.orchestrator.click_text(&ctx, "Settings", 1).await.unwrap();

    assert_eq!(outcome.text, "Settings");
    let clicks = h.clicks.lock().unwrap();
    assert_eq!(clicks.len(), 1);
    assert!((clicks[0].x - 400.0).abs() < 1e-9);
    assert!((clicks[0].y - 680.0).abs() < 1e-9);
    drop(clicks);
    assert_captures_cleaned(&h);
}

#[tokio::test]
async fn moving_the_window_translates_the_click() {
    let size = PixelSize {
        width: 600,
        height: 1200,
    };
    let bounds = NormalizedRect {
        x: 0.4,
        y: 0.45,
        width: 0.2,
        height: 0.05,
    };
    let ctx = TargetContext::default();

    let a = harness(
        vec![window_at(100.0, 50.0)],
        size,
        vec![text_match("Settings", bounds)],
    );
    let b = harness(
        vec![window_at(137.0, 38.0)],
        size,
        vec![text_match("Settings", bounds)],
    );
    let pa = a.orchestrator.click_text(&ctx, "Settings", 1).await.unwrap().point;
    let pb = b.orchestrator.click_text(&ctx, "Settings", 1).await.unwrap().point;
    assert!((pb.x - pa.x - 37.0).abs() < 1e-9);
    assert!((pb.y - pa.y + 12.0).abs() < 1e-9);
}

// Scenario B: occurrence=2 clicks the second match in recognizer order.
#[tokio::test]
async fn occurrence_selects_in_recognizer_order() {
    let first = NormalizedRect {
        x: 0.1,
        y: 0.8,
        width: 0.2,
        height: 0.05,
    };
    let second = NormalizedRect {
        x: 0.1,
        y: 0.2,
        width: 0.2,
        height: 0.05,
    };
    let size = PixelSize {
        width: 1000,
        height: 1000,
    };
    let h = harness(
        vec![window_at(0.0, 0.0)],
        size,
        vec![text_match("Next", first), text_match("Next", second)],
    );
    let ctx = TargetContext::default();
    h.orchestrator.click_text(&ctx, "Next", 2).await.unwrap();

    let clicks = h.clicks.lock().unwrap();
    assert_eq!(clicks.len(), 1);
    // Second match: py = (1 - 0.2 - 0.05) * 1000 = 750, center y = 775.
    assert!((clicks[0].y - 775.0).abs() < 1e-9);
}

#[tokio::test]
async fn occurrence_beyond_matches_is_not_found() {
    let h = harness(
        vec![window_at(0.0, 0.0)],
        PixelSize {
            width: 100,
            height: 100,
        },
        vec![text_match(
            "Next",
            NormalizedRect {
                x: 0.1,
                y: 0.1,
                width: 0.1,
                height: 0.1,
            },
        )],
    );
    let ctx = TargetContext::default();
    let err = h.orchestrator.click_text(&ctx, "Next", 3).await.unwrap_err();
    assert!(matches!(err, InteractError::NotFound(_)));
    assert!(err.to_string().contains("only 1 occurrence(s)"));
    assert!(h.clicks.lock().unwrap().is_empty());
    assert_captures_cleaned(&h);
}

#[tokio::test]
async fn occurrence_zero_is_rejected_before_any_capture() {
    let h = harness(
        vec![window_at(0.0, 0.0)],
        PixelSize {
            width: 100,
            height: 100,
        },
        vec![],
    );
    let ctx = TargetContext::default();
    let err = h.orchestrator.click_text(&ctx, "Next", 0).await.unwrap_err();
    assert!(matches!(err, InteractError::InvalidInput(_)));
    assert!(h.captured.lock().unwrap().is_empty());
}

// Scenario D: zero matches surfaces NotFound naming the search text, and
// the temp screenshot is still cleaned up.
#[tokio::test]
async fn missing_text_is_not_found_and_capture_is_cleaned() {
    let h = harness(
        vec![window_at(0.0, 0.0)],
        PixelSize {
            width: 100,
            height: 100,
        },
        vec![],
    );
    let ctx = TargetContext::default();
    let err = h
        .orchestrator
        .click_text(&ctx, "Sign Out", 1)
        .await
        .unwrap_err();
    assert!(matches!(err, InteractError::NotFound(_)));
    assert!(err.to_string().contains("Sign Out"));
    assert_captures_cleaned(&h);
}

#[tokio::test]
async fn dispatch_failure_still_cleans_the_capture() {
    let h = harness_with(
        vec![window_at(0.0, 0.0)],
        PixelSize {
            width: 100,
            height: 100,
        },
        vec![text_match(
            "OK",
            NormalizedRect {
                x: 0.4,
                y: 0.4,
                width: 0.2,
                height: 0.2,
            },
        )],
        true,
    );
    let ctx = TargetContext::default();
    let err = h.orchestrator.click_text(&ctx, "OK", 1).await.unwrap_err();
    assert!(matches!(err, InteractError::Automation(_)));
    assert_captures_cleaned(&h);
}

// Scenario C: screen-space clicks are dispatched untransformed, even when
// no simulator window exists.
#[tokio::test]
async fn screen_space_click_is_untransformed() {
    let h = harness(
        vec![],
        PixelSize {
            width: 100,
            height: 100,
        },
        vec![],
    );
    let ctx = TargetContext::default();
    let point = h
        .orchestrator
        .click_at(&ctx, 250.0, 400.0, CoordinateSpace::Screen)
        .await
        .unwrap();
    assert_eq!(point, ScreenPoint { x: 250.0, y: 400.0 });
    let clicks = h.clicks.lock().unwrap();
    assert_eq!(clicks[0], ScreenPoint { x: 250.0, y: 400.0 });
}

#[tokio::test]
async fn window_space_click_adds_the_window_origin() {
    let h = harness(
        vec![window_at(100.0, 50.0)],
        PixelSize {
            width: 100,
            height: 100,
        },
        vec![],
    );
    let ctx = TargetContext::default();
    let point = h
        .orchestrator
        .click_at(&ctx, 10.0, 20.0, CoordinateSpace::Window)
        .await
        .unwrap();
    assert_eq!(point, ScreenPoint { x: 110.0, y: 70.0 });
}

#[tokio::test]
async fn named_window_must_match() {
    let h = harness(
        vec![window_at(0.0, 0.0)],
        PixelSize {
            width: 100,
            height: 100,
        },
        vec![],
    );
    let ctx = TargetContext::named(Some("iPad".to_string()));
    let err = h
        .orchestrator
        .click_at(&ctx, 1.0, 1.0, CoordinateSpace::Window)
        .await
        .unwrap_err();
    assert!(matches!(err, InteractError::NotFound(_)));
}

#[tokio::test]
async fn list_windows_with_none_running_is_empty_not_an_error() {
    let h = harness(
        vec![],
        PixelSize {
            width: 100,
            height: 100,
        },
        vec![],
    );
    let windows = h.orchestrator.list_windows().await.unwrap();
    assert!(windows.is_empty());
}

#[tokio::test]
async fn find_text_reports_screen_space_centers() {
    let h = harness(
        vec![window_at(100.0, 50.0)],
        PixelSize {
            width: 600,
            height: 1200,
        },
        vec![text_match(
            "Settings",
            NormalizedRect {
                x: 0.4,
                y: 0.45,
                width: 0.2,
                height: 0.05,
            },
        )],
    );
    let ctx = TargetContext::default();
    let located = h.orchestrator.find_text(&ctx, Some("Settings")).await.unwrap();
    assert_eq!(located.len(), 1);
    assert!((located[0].center.x - 400.0).abs() < 1e-9);
    assert!((located[0].center.y - 680.0).abs() < 1e-9);
    // Read-only: no click dispatched, capture cleaned.
    assert!(h.clicks.lock().unwrap().is_empty());
    assert_captures_cleaned(&h);
}

#[tokio::test]
async fn press_button_sends_the_home_shortcut() {
    let h = harness(
        vec![],
        PixelSize {
            width: 100,
            height: 100,
        },
        vec![],
    );
    h.orchestrator
        .press_button(interact_core::HardwareButton::Home)
        .await
        .unwrap();
    let keys = h.keys.lock().unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0], interact_core::HardwareButton::Home.key_combo());
}

#[tokio::test]
async fn save_screenshot_persists_outside_the_temp_lifecycle() {
    let h = harness(
        vec![window_at(0.0, 0.0)],
        PixelSize {
            width: 100,
            height: 100,
        },
        vec![],
    );
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("shots").join("out.png");
    let ctx = TargetContext::default();
    let saved = h.orchestrator.save_screenshot(&ctx, &dest).await.unwrap();
    assert_eq!(saved, dest);
    assert!(dest.exists());
    assert_captures_cleaned(&h);
}
