//! Async client for `xcrun simctl`, the iOS Simulator's command line
//! interface. App lifecycle, URL dispatch, and container lookups all go
//! through a single execution point so every invocation gets the same
//! timeout and error handling.

mod apps;

pub use apps::{format_app_list, parse_app_list, App, AppList};

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

pub type Result<T> = std::result::Result<T, SimctlError>;

#[derive(Debug, thiserror::Error)]
pub enum SimctlError {
    #[error("simctl command failed: {0}")]
    CommandFailed(String),

    #[error("{0}")]
    NotFound(String),

    #[error("'{command}' timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A simctl invocation plus the device it targets. `to_args` knows where
/// each subcommand expects the device identifier.
#[derive(Debug, Clone)]
pub struct SimulatorCommand {
    pub command: Vec<String>,
    pub device: String,
}

impl SimulatorCommand {
    pub fn new<I, S>(command: I, device: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into_iter().map(Into::into).collect(),
            device: device.to_string(),
        }
    }

    pub fn to_args(&self) -> Vec<String> {
        match self.command.first().map(String::as_str) {
            // These subcommands take the device right after the verb
            Some("launch") | Some("terminate") | Some("openurl") | Some("get_app_container") => {
                let mut args = vec![self.command[0].clone(), self.device.clone()];
                args.extend(self.command[1..].iter().cloned());
                args
            }
            Some("listapps") => vec!["listapps".to_string(), self.device.clone()],
            _ => self.command.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub success: bool,
    pub output: String,
    pub error: Option<String>,
    pub exit_code: i32,
}

impl CommandResult {
    /// Best available failure description.
    pub fn failure_detail(&self) -> &str {
        match self.error.as_deref() {
            Some(e) if !e.trim().is_empty() => e,
            _ => &self.output,
        }
    }
}

/// Some simctl subcommands exit 0 even when they fail, so the combined
/// output is scanned for known failure markers.
fn parse_command_success(output: &str, error: &str, exit_code: i32) -> bool {
    if exit_code != 0 {
        return false;
    }
    const ERROR_PATTERNS: &[&str] = &[
        "error:",
        "failed",
        "an error was encountered",
        "no devices are booted",
    ];
    let combined = format!("{output}{error}").to_lowercase();
    !ERROR_PATTERNS.iter().any(|p| combined.contains(p))
}

/// Launch output looks like "com.example.app: 12345".
fn extract_launch_pid(output: &str) -> Option<u32> {
    let (_, rest) = output.rsplit_once(": ")?;
    rest.trim().parse().ok()
}

pub struct SimctlClient {
    timeout: Duration,
}

impl SimctlClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Runs one simctl command. This is the only method that spawns a
    /// process; everything else composes on top of it.
    pub async fn execute(&self, command: &SimulatorCommand) -> Result<CommandResult> {
        let args = command.to_args();
        debug!(?args, "running xcrun simctl");

        let mut cmd = Command::new("xcrun");
        cmd.arg("simctl")
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| SimctlError::Timeout {
                command: format!("xcrun simctl {}", args.join(" ")),
                seconds: self.timeout.as_secs(),
            })??;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let exit_code = output.status.code().unwrap_or(-1);
        let success = parse_command_success(&stdout, &stderr, exit_code);

        if !success {
            warn!(exit_code, stderr = %stderr.trim(), "simctl command reported failure");
        }

        Ok(CommandResult {
            success,
            output: stdout,
            error: if stderr.is_empty() { None } else { Some(stderr) },
            exit_code,
        })
    }

    /// Launches an app, returning its pid when simctl reports one.
    pub async fn launch_app(&self, bundle_id: &str, device: &str) -> Result<Option<u32>> {
        let cmd = SimulatorCommand::new(["launch", bundle_id], device);
        let result = self.execute(&cmd).await?;
        if !result.success {
            return Err(SimctlError::CommandFailed(format!(
                "failed to launch {bundle_id}: {}",
                result.failure_detail().trim()
            )));
        }
        Ok(extract_launch_pid(&result.output))
    }

    /// Terminates an app. A bundle that is not running is not an error.
    pub async fn terminate_app(&self, bundle_id: &str, device: &str) -> Result<()> {
        let cmd = SimulatorCommand::new(["terminate", bundle_id], device);
        let result = self.execute(&cmd).await?;
        if !result.success {
            let detail = result.failure_detail();
            if detail.contains("found nothing to terminate") {
                debug!(bundle_id, "app was not running");
                return Ok(());
            }
            return Err(SimctlError::CommandFailed(format!(
                "failed to terminate {bundle_id}: {}",
                detail.trim()
            )));
        }
        Ok(())
    }

    pub async fn open_url(&self, url: &str, device: &str) -> Result<()> {
        let cmd = SimulatorCommand::new(["openurl", url], device);
        let result = self.execute(&cmd).await?;
        if !result.success {
            return Err(SimctlError::CommandFailed(format!(
                "failed to open URL {url}: {}",
                result.failure_detail().trim()
            )));
        }
        Ok(())
    }

    pub async fn get_app_container(
        &self,
        bundle_id: &str,
        container_type: &str,
        device: &str,
    ) -> Result<PathBuf> {
        let cmd = SimulatorCommand::new(["get_app_container", bundle_id, container_type], device);
        let result = self.execute(&cmd).await?;
        if !result.success {
            return Err(SimctlError::NotFound(format!(
                "no {container_type} container for {bundle_id}: {}",
                result.failure_detail().trim()
            )));
        }
        let path = result.output.trim();
        if path.is_empty() {
            return Err(SimctlError::NotFound(format!(
                "empty container path returned for {bundle_id}"
            )));
        }
        Ok(PathBuf::from(path))
    }

    pub async fn list_apps(&self, device: &str) -> Result<AppList> {
        let cmd = SimulatorCommand::new(["listapps"], device);
        let result = self.execute(&cmd).await?;
        if !result.success {
            return Err(SimctlError::CommandFailed(format!(
                "failed to list apps: {}",
                result.failure_detail().trim()
            )));
        }
        Ok(parse_app_list(&result.output))
    }

    /// Finds an app by display name (exact first, then substring) and
    /// launches it.
    pub async fn find_and_launch_app(&self, app_name: &str, device: &str) -> Result<Option<u32>> {
        let apps = self.list_apps(device).await?;
        let app = apps
            .find_by_name(app_name)
            .or_else(|| {
                let needle = app_name.to_lowercase();
                apps.apps.iter().find(|a| a.name().to_lowercase().contains(&needle))
            })
            .ok_or_else(|| {
                let available: Vec<String> = apps
                    .apps
                    .iter()
                    .map(|a| format!("• {} ({})", a.name(), a.bundle_id))
                    .collect();
                SimctlError::NotFound(format!(
                    "app '{app_name}' not found. Available apps:\n{}",
                    available.join("\n")
                ))
            })?;
        let bundle_id = app.bundle_id.clone();
        self.launch_app(&bundle_id, device).await
    }
}
