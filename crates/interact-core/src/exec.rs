//! Subprocess plumbing shared by the locator, capturer, and dispatcher.
//! Every external invocation runs under a timeout so a hung system utility
//! cannot hang the whole request.

use crate::error::{InteractError, Result};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

pub(crate) async fn run_with_timeout(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<Output> {
    tracing::debug!("running {} {:?} (timeout {:?})", program, args, timeout);
    let future = Command::new(program).args(args).output();
    match tokio::time::timeout(timeout, future).await {
        Ok(output) => Ok(output?),
        Err(_) => Err(InteractError::Timeout {
            command: program.to_string(),
            seconds: timeout.as_secs(),
        }),
    }
}

/// Run an inline AppleScript via osascript and return its stdout.
pub(crate) async fn run_osascript(script: &str, timeout: Duration) -> Result<String> {
    let output = run_with_timeout("osascript", &["-e", script], timeout).await?;
    if !output.status.success() {
        return Err(InteractError::Automation(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
