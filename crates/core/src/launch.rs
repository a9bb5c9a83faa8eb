//! OS-level launch primitives: the direct preflight run and the
//! interactive open of the target executable.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Preflight run failed: {0}")]
    Preflight(String),

    #[error("Preflight run timed out after {0:?}")]
    PreflightTimeout(Duration),

    #[error("Interactive open failed: {0}")]
    Open(String),
}

/// The two process operations a launch session needs. A trait seam so
/// sessions can be exercised without spawning real processes.
#[async_trait]
pub trait ProgramLauncher: Send + Sync {
    /// Run the target directly with a single no-op argument and wait,
    /// bounded by `timeout`, for it to exit. The exit status is
    /// deliberately ignored; the run exists only so that any one-time
    /// execution authorization the OS grants applies before the target
    /// is launched indirectly through the terminal host.
    async fn preflight(
        &self,
        target: &Path,
        arg: &str,
        timeout: Duration,
    ) -> Result<(), LaunchError>;

    /// Ask the OS to open the target through the user's default handler
    /// for executables, which is expected to be a terminal emulator.
    /// Fire-and-forget: no wait, no retained handle, no exit status.
    ///
    /// No arguments can be forwarded here: anything passed to the opener
    /// goes to the terminal emulator itself, not to the program it ends
    /// up hosting. The manifest channel carries the file list instead.
    async fn open_interactive(&self, target: &Path) -> Result<(), LaunchError>;
}

/// Production launcher backed by `tokio::process` and `xdg-open`.
pub struct OsLauncher;

#[async_trait]
impl ProgramLauncher for OsLauncher {
    async fn preflight(
        &self,
        target: &Path,
        arg: &str,
        timeout: Duration,
    ) -> Result<(), LaunchError> {
        // kill_on_drop: a target that hangs past the bound must not
        // outlive the session.
        let run = Command::new(target)
            .arg(arg)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(timeout, run).await {
            Ok(Ok(output)) => {
                tracing::debug!("Preflight of {:?} exited with {}", target, output.status);
                Ok(())
            }
            Ok(Err(e)) => Err(LaunchError::Preflight(e.to_string())),
            Err(_) => Err(LaunchError::PreflightTimeout(timeout)),
        }
    }

    async fn open_interactive(&self, target: &Path) -> Result<(), LaunchError> {
        Command::new("xdg-open")
            .arg(target)
            .spawn()
            .map_err(|e| LaunchError::Open(e.to_string()))?;

        tracing::debug!("Handed {:?} to the OS opener", target);
        Ok(())
    }
}
