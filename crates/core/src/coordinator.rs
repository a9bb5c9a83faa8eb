//! The launch coordinator: one end-to-end launcher session.
//!
//! Order is fixed: clear stale manifest, persist any received file
//! batches, preflight the target, hand it to the OS opener. Every step
//! runs exactly once, and a failed step never stops the ones after it —
//! aborting would leave the user with no terminal window at all, which
//! is strictly worse than launching with an empty file selection.

use crate::launch::ProgramLauncher;
use crate::manifest::ManifestChannel;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_PREFLIGHT_ARG: &str = "--version";
pub const DEFAULT_PREFLIGHT_TIMEOUT: Duration = Duration::from_millis(3000);

/// Result of one session step. Failures are recorded here and logged at
/// the point of occurrence, never propagated between steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Ok,
    Failed(String),
    Skipped,
}

impl StepOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, StepOutcome::Ok)
    }
}

/// What happened during a session, step by step. `manifest_write` is
/// `Skipped` when no file-open event arrived before launch.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub cleanup: StepOutcome,
    pub manifest_write: StepOutcome,
    pub preflight: StepOutcome,
    pub interactive_open: StepOutcome,
}

pub struct Coordinator {
    channel: ManifestChannel,
    target: PathBuf,
    preflight_arg: String,
    preflight_timeout: Duration,
    launcher: Arc<dyn ProgramLauncher>,
}

impl Coordinator {
    pub fn new(
        channel: ManifestChannel,
        target: PathBuf,
        launcher: Arc<dyn ProgramLauncher>,
    ) -> Self {
        Self {
            channel,
            target,
            preflight_arg: DEFAULT_PREFLIGHT_ARG.to_string(),
            preflight_timeout: DEFAULT_PREFLIGHT_TIMEOUT,
            launcher,
        }
    }

    pub fn with_preflight_arg(mut self, arg: impl Into<String>) -> Self {
        self.preflight_arg = arg.into();
        self
    }

    pub fn with_preflight_timeout(mut self, timeout: Duration) -> Self {
        self.preflight_timeout = timeout;
        self
    }

    /// Pre-launch setup: remove a manifest left over from an earlier
    /// session that the target never consumed. A manifest that is not
    /// there is the common case; an unremovable one is logged and the
    /// session continues.
    pub async fn initialize(&self) -> StepOutcome {
        match self.channel.clear().await {
            Ok(()) => StepOutcome::Ok,
            Err(e) => {
                warn!("Failed to remove stale manifest: {}", e);
                StepOutcome::Failed(e.to_string())
            }
        }
    }

    /// Files-received notification. May run zero or more times before
    /// launch; each call replaces the manifest wholesale, so the last
    /// batch wins. A write failure degrades the session to "open the
    /// target with no pre-selected files".
    pub async fn receive_files(&self, paths: &[PathBuf]) -> StepOutcome {
        debug!("Received {} path(s) to hand off", paths.len());
        match self.channel.write(paths).await {
            Ok(()) => StepOutcome::Ok,
            Err(e) => {
                warn!(
                    "Failed to write manifest, launching without pre-selected files: {}",
                    e
                );
                StepOutcome::Failed(e.to_string())
            }
        }
    }

    /// The terminal launch sequence, exactly once per session: a direct
    /// throwaway run of the target to settle any one-time execution
    /// authorization, then the real hand-off to the OS opener. The
    /// preflight result never blocks the open.
    pub async fn launch(&self) -> (StepOutcome, StepOutcome) {
        let preflight = match self
            .launcher
            .preflight(&self.target, &self.preflight_arg, self.preflight_timeout)
            .await
        {
            Ok(()) => StepOutcome::Ok,
            Err(e) => {
                warn!("Preflight run of {:?} failed: {}", self.target, e);
                StepOutcome::Failed(e.to_string())
            }
        };

        let interactive_open = match self.launcher.open_interactive(&self.target).await {
            Ok(()) => StepOutcome::Ok,
            Err(e) => {
                // The one failure that leaves the session with no visible
                // outcome; callers surface it to the user where they can.
                warn!("Interactive open of {:?} failed: {}", self.target, e);
                StepOutcome::Failed(e.to_string())
            }
        };

        (preflight, interactive_open)
    }

    /// Drive a whole session: initialize, hand over each file batch in
    /// order, launch. After this returns the coordinator has no further
    /// role; the manifest it wrote stays for the target to consume.
    pub async fn run_session(&self, batches: &[Vec<PathBuf>]) -> SessionReport {
        let cleanup = self.initialize().await;

        let mut manifest_write = StepOutcome::Skipped;
        for batch in batches {
            manifest_write = self.receive_files(batch).await;
        }

        let (preflight, interactive_open) = self.launch().await;

        SessionReport {
            cleanup,
            manifest_write,
            preflight,
            interactive_open,
        }
    }
}
