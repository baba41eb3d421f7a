//! Command execution utilities
//!
//! Provides consistent command execution with proper error handling and logging.

use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::process::{Output, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

/// Result of a command execution.
#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

impl CommandOutput {
    /// Exit code as text, or "signal" when the process was killed.
    pub fn exit_label(&self) -> String {
        self.code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string())
    }
}

/// Run a command, feeding `input` on stdin, and return its output.
///
/// Stdin is written while stdout and stderr are drained, so a chatty child
/// cannot stall on full pipes. A child that exits without reading its input
/// still yields its exit code and stderr; only spawn and wait failures are
/// errors. Arguments are logged, `input` is not.
///
/// # Example
/// ```ignore
/// let output = run_with_input("mongosh", &["--quiet"], "db.version()").await?;
/// ```
#[instrument(skip_all, fields(cmd = %cmd))]
pub async fn run_with_input(cmd: &str, args: &[&str], input: &str) -> Result<CommandOutput> {
    debug!(args = ?args, "Running command with stdin");

    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .context(format!("Failed to spawn {}", cmd))?;

    let stdin = child.stdin.take();
    let write = async move {
        if let Some(mut stdin) = stdin {
            stdin.write_all(input.as_bytes()).await?;
            stdin.shutdown().await?;
        }
        Ok::<(), std::io::Error>(())
    };

    let (written, output) = tokio::join!(write, child.wait_with_output());
    let output = output.context(format!("Failed to wait for {}", cmd))?;

    match written {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::BrokenPipe => {
            debug!("Child closed stdin before reading all input");
        }
        Err(e) => warn!(error = %e, "Failed to write stdin"),
    }

    Ok(output.into())
}
