//! Simulator window enumeration via the System Events accessibility layer.

use crate::error::{InteractError, Result};
use crate::exec::run_osascript;
use crate::geometry::ScreenRect;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// One simulator window at the moment it was enumerated. A snapshot, not a
/// live handle: it is stale the instant the window moves or resizes, so it
/// is created fresh on every call and discarded after one use.
#[derive(Debug, Clone, Serialize)]
pub struct Window {
    /// 1-based enumeration order (OS z-order). Index 1 is the primary window.
    pub index: usize,
    pub title: String,
    pub bounds: ScreenRect,
}

#[async_trait]
pub trait WindowLocator: Send + Sync {
    /// All windows owned by the simulator process. An absent process or a
    /// process with zero windows yields an empty vec, not an error.
    async fn list_windows(&self) -> Result<Vec<Window>>;
}

/// Locator backed by `osascript` / System Events.
pub struct SystemEventsLocator {
    process_name: String,
    timeout: Duration,
}

impl SystemEventsLocator {
    pub fn new(process_name: impl Into<String>, timeout: Duration) -> Self {
        Self {
            process_name: process_name.into(),
            timeout,
        }
    }

    fn enumeration_script(&self) -> String {
        format!(
            r#"tell application "System Events"
    if not (exists process "{process}") then return ""
    set out to ""
    set i to 1
    tell process "{process}"
        repeat with w in windows
            set {{px, py}} to position of w
            set {{sw, sh}} to size of w
            set out to out & i & ", " & px & ", " & py & ", " & sw & ", " & sh & ", " & (name of w) & linefeed
            set i to i + 1
        end repeat
    end tell
    return out
end tell"#,
            process = self.process_name
        )
    }
}

#[async_trait]
impl WindowLocator for SystemEventsLocator {
    async fn list_windows(&self) -> Result<Vec<Window>> {
        let output = run_osascript(&self.enumeration_script(), self.timeout).await?;
        let windows = parse_window_data(&output);
        tracing::debug!("enumerated {} simulator window(s)", windows.len());
        Ok(windows)
    }
}

/// Parse the locator script's line-per-window output:
/// `index, x, y, width, height, title`. Titles may themselves contain
/// commas, so the title is everything after the fifth separator. Malformed
/// lines are skipped.
pub fn parse_window_data(output: &str) -> Vec<Window> {
    let mut windows = Vec::new();
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.splitn(6, ", ");
        let parsed = (|| {
            let index: usize = parts.next()?.parse().ok()?;
            let x: f64 = parts.next()?.parse().ok()?;
            let y: f64 = parts.next()?.parse().ok()?;
            let width: f64 = parts.next()?.parse().ok()?;
            let height: f64 = parts.next()?.parse().ok()?;
            let title = parts.next().unwrap_or("").to_string();
            Some(Window {
                index,
                title,
                bounds: ScreenRect {
                    x,
                    y,
                    width,
                    height,
                },
            })
        })();
        if let Some(window) = parsed {
            windows.push(window);
        }
    }
    windows
}

/// Pick the target window. With a device name the match is a
/// case-insensitive substring test against titles, and zero matches is an
/// error rather than a silent default; without one, the primary (first)
/// window is used.
pub fn select_window<'a>(windows: &'a [Window], device_name: Option<&str>) -> Result<&'a Window> {
    if windows.is_empty() {
        return Err(InteractError::NotFound(
            "no simulator windows found; make sure the iOS Simulator is running".to_string(),
        ));
    }
    match device_name {
        Some(name) => {
            let needle = name.to_lowercase();
            windows
                .iter()
                .find(|w| w.title.to_lowercase().contains(&needle))
                .ok_or_else(|| {
                    InteractError::NotFound(format!("no simulator window matching '{name}'"))
                })
        }
        None => Ok(&windows[0]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "1, 100, 50, 390, 844, iPhone 15 - iOS 17.2\n\
                          2, 520, 50, 430, 932, iPad Pro (12.9-inch)\n";

    #[test]
    fn parses_window_lines() {
        let windows = parse_window_data(SAMPLE);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].index, 1);
        assert_eq!(windows[0].title, "iPhone 15 - iOS 17.2");
        assert_eq!(windows[0].bounds.x, 100.0);
        assert_eq!(windows[0].bounds.y, 50.0);
        assert_eq!(windows[0].bounds.width, 390.0);
        assert_eq!(windows[0].bounds.height, 844.0);
        assert_eq!(windows[1].title, "iPad Pro (12.9-inch)");
    }

    #[test]
    fn title_keeps_embedded_commas() {
        let windows = parse_window_data("1, 0, 0, 100, 200, iPhone 15, Pro, Max\n");
        assert_eq!(windows[0].title, "iPhone 15, Pro, Max");
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let windows = parse_window_data("garbage\n1, not-a-number, 0, 100, 200, x\n\n");
        assert!(windows.is_empty());
    }

    #[test]
    fn empty_output_yields_empty_vec() {
        assert!(parse_window_data("").is_empty());
    }

    #[test]
    fn selects_first_window_when_unnamed() {
        let windows = parse_window_data(SAMPLE);
        let selected = select_window(&windows, None).unwrap();
        assert_eq!(selected.index, 1);
    }

    #[test]
    fn selects_by_case_insensitive_substring() {
        let windows = parse_window_data(SAMPLE);
        let selected = select_window(&windows, Some("ipad pro")).unwrap();
        assert_eq!(selected.index, 2);
    }

    #[test]
    fn unmatched_name_is_not_found_even_with_windows_present() {
        let windows = parse_window_data(SAMPLE);
        let err = select_window(&windows, Some("iPhone 42")).unwrap_err();
        assert!(matches!(err, InteractError::NotFound(_)));
        assert!(err.to_string().contains("iPhone 42"));
    }

    #[test]
    fn no_windows_is_not_found() {
        let err = select_window(&[], None).unwrap_err();
        assert!(matches!(err, InteractError::NotFound(_)));
    }
}
