//! Parameter types for the MCP tool surface.

use rmcp::{schemars, schemars::JsonSchema};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ClickTextRequest {
    #[schemars(description = "Text to find and click, matched case-insensitively")]
    pub text: String,
    #[schemars(description = "Which occurrence to click when the text appears more than once (1-based, default 1)")]
    pub occurrence: Option<usize>,
    #[schemars(description = "Substring of the simulator window title to target (e.g. 'iPhone 15'); defaults to the first window")]
    pub simulator_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ClickAtCoordinatesRequest {
    #[schemars(description = "X coordinate")]
    pub x: f64,
    #[schemars(description = "Y coordinate")]
    pub y: f64,
    #[schemars(description = "Coordinate space: 'screen' (default), 'window', or 'device'")]
    pub coordinate_space: Option<String>,
    #[schemars(description = "Substring of the simulator window title to target; defaults to the first window")]
    pub simulator_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct FindTextRequest {
    #[schemars(description = "Only report text containing this substring; omit to report everything visible")]
    pub search_text: Option<String>,
    #[schemars(description = "Substring of the simulator window title to target; defaults to the first window")]
    pub simulator_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ScreenshotRequest {
    #[schemars(description = "Output filename; defaults to a timestamped name on the Desktop")]
    pub filename: Option<String>,
    #[schemars(description = "Return the saved file path in the response (default true)")]
    pub return_path: Option<bool>,
    #[schemars(description = "Substring of the simulator window title to target; defaults to the first window")]
    pub simulator_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LaunchAppRequest {
    #[schemars(description = "Bundle identifier, e.g. com.apple.Preferences")]
    pub bundle_id: String,
    #[schemars(description = "Simulator device UDID; defaults to the booted device")]
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TerminateAppRequest {
    #[schemars(description = "Bundle identifier of the app to terminate")]
    pub bundle_id: String,
    #[schemars(description = "Simulator device UDID; defaults to the booted device")]
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListAppsRequest {
    #[schemars(description = "Simulator device UDID; defaults to the booted device")]
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct OpenUrlRequest {
    #[schemars(description = "URL to open, e.g. https://example.com or maps://")]
    pub url: String,
    #[schemars(description = "Simulator device UDID; defaults to the booted device")]
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetAppContainerRequest {
    #[schemars(description = "Bundle identifier of the app")]
    pub bundle_id: String,
    #[schemars(description = "Container type: 'app', 'data', 'groups', or a group identifier (default 'data')")]
    pub container_type: Option<String>,
    #[schemars(description = "Simulator device UDID; defaults to the booted device")]
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PressButtonRequest {
    #[schemars(description = "Hardware button: 'home', 'lock', 'volume_up', or 'volume_down'")]
    pub button_name: String,
}
