//! MCP tool surface for iOS Simulator automation.

use crate::requests::*;
use anyhow::Result;
use interact_core::{
    create_recognizer, CoordinateSpace, HardwareButton, InteractError, Orchestrator, Screencapture,
    SystemEventsDispatcher, SystemEventsLocator, TargetContext,
};
use interact_config::Config;
use interact_simctl::{format_app_list, SimctlClient, SimctlError};
use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::info;

fn map_err(e: InteractError) -> McpError {
    match e {
        InteractError::InvalidInput(_) => McpError::invalid_params(e.to_string(), None),
        _ => McpError::internal_error(e.to_string(), None),
    }
}

fn map_simctl_err(e: SimctlError) -> McpError {
    McpError::internal_error(e.to_string(), None)
}

fn text_result(message: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(message.into())])
}

fn json_result<T: serde::Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(text_result(json))
}

#[derive(Clone)]
pub struct InteractServer {
    orchestrator: Arc<Orchestrator>,
    simctl: Arc<SimctlClient>,
    config: Arc<Config>,
    tool_router: ToolRouter<Self>,
}

impl InteractServer {
    pub fn new(config: Config) -> Result<Self> {
        let timeout = Duration::from_secs(config.automation.command_timeout_secs);
        let process = config.automation.simulator_process.clone();

        let recognizer = create_recognizer(&config.ocr.engine, timeout)?;
        info!(engine = recognizer.name(), "text recognizer ready");

        let orchestrator = Orchestrator::new(
            Box::new(SystemEventsLocator::new(process.clone(), timeout)),
            Box::new(Screencapture::new(timeout)),
            recognizer,
            Box::new(SystemEventsDispatcher::new(process, timeout)),
            config.ocr.min_confidence,
        );

        Ok(Self {
            orchestrator: Arc::new(orchestrator),
            simctl: Arc::new(SimctlClient::new(timeout)),
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        })
    }

    fn device<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested.unwrap_or(&self.config.simulator.default_device)
    }

    fn screenshot_dest(&self, filename: Option<String>) -> PathBuf {
        let name = filename.unwrap_or_else(|| {
            let millis = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default();
            format!("ios_screenshot_{millis}.png")
        });
        let path = PathBuf::from(&name);
        if path.is_absolute() {
            path
        } else {
            dirs::desktop_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(path)
        }
    }
}

#[tool_router]
impl InteractServer {
    #[tool(
        description = "Find text on the simulator screen via OCR and click it. Use 'occurrence' to pick between repeated matches."
    )]
    async fn click_text(
        &self,
        Parameters(ClickTextRequest {
            text,
            occurrence,
            simulator_name,
        }): Parameters<ClickTextRequest>,
    ) -> Result<CallToolResult, McpError> {
        let ctx = TargetContext::named(simulator_name);
        let outcome = self
            .orchestrator
            .click_text(&ctx, &text, occurrence.unwrap_or(1))
            .await
            .map_err(map_err)?;
        Ok(text_result(format!(
            "Clicked on '{}' (occurrence {}) at {}",
            outcome.text, outcome.occurrence, outcome.point
        )))
    }

    #[tool(
        description = "Click at raw coordinates. coordinate_space 'screen' clicks at the given macOS screen point; 'window' and 'device' are relative to the simulator window's top-left corner."
    )]
    async fn click_at_coordinates(
        &self,
        Parameters(ClickAtCoordinatesRequest {
            x,
            y,
            coordinate_space,
            simulator_name,
        }): Parameters<ClickAtCoordinatesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let space = match coordinate_space.as_deref() {
            Some(s) => CoordinateSpace::parse(s).map_err(map_err)?,
            None => CoordinateSpace::default(),
        };
        let ctx = TargetContext::named(simulator_name);
        let point = self
            .orchestrator
            .click_at(&ctx, x, y, space)
            .await
            .map_err(map_err)?;
        Ok(text_result(format!("Clicked at {point}")))
    }

    #[tool(
        description = "List all text currently visible on the simulator screen, with screen coordinates for each match. Read-only."
    )]
    async fn find_text_in_simulator(
        &self,
        Parameters(FindTextRequest {
            search_text,
            simulator_name,
        }): Parameters<FindTextRequest>,
    ) -> Result<CallToolResult, McpError> {
        let ctx = TargetContext::named(simulator_name);
        let located = self
            .orchestrator
            .find_text(&ctx, search_text.as_deref())
            .await
            .map_err(map_err)?;
        json_result(&located)
    }

    #[tool(description = "List open iOS Simulator windows with their titles and screen bounds.")]
    async fn list_simulator_windows(&self) -> Result<CallToolResult, McpError> {
        let windows = self
            .orchestrator
            .list_windows()
            .await
            .map_err(map_err)?;
        if windows.is_empty() {
            return Ok(text_result("No simulator windows found"));
        }
        json_result(&windows)
    }

    #[tool(
        description = "Save a screenshot of the simulator window as PNG. Defaults to a timestamped file on the Desktop."
    )]
    async fn screenshot(
        &self,
        Parameters(ScreenshotRequest {
            filename,
            return_path,
            simulator_name,
        }): Parameters<ScreenshotRequest>,
    ) -> Result<CallToolResult, McpError> {
        let ctx = TargetContext::named(simulator_name);
        let dest = self.screenshot_dest(filename);
        let saved = self
            .orchestrator
            .save_screenshot(&ctx, &dest)
            .await
            .map_err(map_err)?;
        if return_path.unwrap_or(true) {
            Ok(text_result(format!("Screenshot saved to {}", saved.display())))
        } else {
            Ok(text_result("Screenshot saved"))
        }
    }

    #[tool(description = "Launch an app on the simulator by bundle identifier.")]
    async fn launch_app(
        &self,
        Parameters(LaunchAppRequest {
            bundle_id,
            device_id,
        }): Parameters<LaunchAppRequest>,
    ) -> Result<CallToolResult, McpError> {
        let device = self.device(device_id.as_deref());
        let pid = self
            .simctl
            .launch_app(&bundle_id, device)
            .await
            .map_err(map_simctl_err)?;
        Ok(text_result(match pid {
            Some(pid) => format!("Launched {bundle_id} (pid {pid})"),
            None => format!("Launched {bundle_id}"),
        }))
    }

    #[tool(
        description = "Terminate a running app on the simulator. Succeeds even if the app is not running."
    )]
    async fn terminate_app(
        &self,
        Parameters(TerminateAppRequest {
            bundle_id,
            device_id,
        }): Parameters<TerminateAppRequest>,
    ) -> Result<CallToolResult, McpError> {
        let device = self.device(device_id.as_deref());
        self.simctl
            .terminate_app(&bundle_id, device)
            .await
            .map_err(map_simctl_err)?;
        Ok(text_result(format!("Terminated {bundle_id}")))
    }

    #[tool(description = "List apps installed on the simulator.")]
    async fn list_apps(
        &self,
        Parameters(ListAppsRequest { device_id }): Parameters<ListAppsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let device = self.device(device_id.as_deref());
        let apps = self
            .simctl
            .list_apps(device)
            .await
            .map_err(map_simctl_err)?;
        Ok(text_result(format_app_list(&apps)))
    }

    #[tool(description = "Open a URL in the simulator (http, https, or custom schemes).")]
    async fn open_url(
        &self,
        Parameters(OpenUrlRequest { url, device_id }): Parameters<OpenUrlRequest>,
    ) -> Result<CallToolResult, McpError> {
        let device = self.device(device_id.as_deref());
        self.simctl
            .open_url(&url, device)
            .await
            .map_err(map_simctl_err)?;
        Ok(text_result(format!("Opened {url}")))
    }

    #[tool(description = "Get the filesystem path of an app's container on the simulator.")]
    async fn get_app_container(
        &self,
        Parameters(GetAppContainerRequest {
            bundle_id,
            container_type,
            device_id,
        }): Parameters<GetAppContainerRequest>,
    ) -> Result<CallToolResult, McpError> {
        let device = self.device(device_id.as_deref());
        let container_type = container_type.as_deref().unwrap_or("data");
        let path = self
            .simctl
            .get_app_container(&bundle_id, container_type, device)
            .await
            .map_err(map_simctl_err)?;
        Ok(text_result(path.display().to_string()))
    }

    #[tool(
        description = "Press a simulator hardware button: home, lock, volume_up, or volume_down."
    )]
    async fn press_button(
        &self,
        Parameters(PressButtonRequest { button_name }): Parameters<PressButtonRequest>,
    ) -> Result<CallToolResult, McpError> {
        let button = HardwareButton::parse(&button_name).ok_or_else(|| {
            McpError::invalid_params(
                format!(
                    "unknown button '{button_name}'. Valid buttons: home, lock, volume_up, volume_down"
                ),
                None,
            )
        })?;
        self.orchestrator
            .press_button(button)
            .await
            .map_err(map_err)?;
        Ok(text_result(format!("Pressed {button_name}")))
    }
}

#[tool_handler]
impl ServerHandler for InteractServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "iOS Simulator automation over OCR. Use 'click_text' to tap visible text, \
                 'find_text_in_simulator' to see what is on screen first, \
                 'click_at_coordinates' for raw taps, 'list_simulator_windows' to pick a \
                 window when several simulators are open, 'screenshot' to capture the \
                 screen, 'launch_app'/'terminate_app'/'list_apps' for app lifecycle, \
                 'open_url' to open links, 'get_app_container' to locate app data, and \
                 'press_button' for hardware buttons."
                    .into(),
            ),
        }
    }
}
