//! Run an external command-line tool to completion.

use crate::error::{CompanionError, Result};
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

/// Maximum number of stderr bytes carried into an error message.
const MAX_STDERR_BYTES: usize = 2 * 1024;

/// Run `program` with `args`, waiting at most `timeout`.
///
/// stdout is discarded. A non-zero exit turns into
/// [`CompanionError::Tool`] carrying the exit code and the tail of stderr.
/// The child is killed if the timeout expires.
pub(crate) async fn run_tool(
    tool: &str,
    program: &Path,
    args: &[OsString],
    timeout: Option<Duration>,
) -> Result<()> {
    let mut cmd = tokio::process::Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    tracing::debug!(tool, program = %program.display(), ?args, "running tool");

    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, cmd.output())
            .await
            .map_err(|_| CompanionError::Tool {
                tool: tool.to_owned(),
                message: format!("timed out after {}s", limit.as_secs()),
            })?,
        None => cmd.output().await,
    }
    .map_err(|e| CompanionError::Tool {
        tool: tool.to_owned(),
        message: format!("failed to start {}: {e}", program.display()),
    })?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    let tail_start = stderr
        .char_indices()
        .map(|(i, _)| i)
        .find(|&i| stderr.len() - i <= MAX_STDERR_BYTES)
        .unwrap_or(stderr.len());

    Err(CompanionError::Tool {
        tool: tool.to_owned(),
        message: format!(
            "exited with status {}: {}",
            output
                .status
                .code()
                .map_or_else(|| "unknown".to_owned(), |c| c.to_string()),
            &stderr[tail_start..]
        ),
    })
}
