//! The launcher binary. The desktop's open-with mechanism starts this
//! process with the selected file paths as arguments; it persists them
//! to the manifest, launches the target program in the user's terminal
//! via the OS opener, and exits.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use termbridge_app::config::Config;
use termbridge_core::{well_known_path, Coordinator, ManifestChannel, OsLauncher, StepOutcome};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let launcher_dir = launcher_dir().context("Failed to locate the launcher executable")?;

    let mut config = match Config::load(&launcher_dir) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load launcher config, using defaults: {:#}", e);
            Config::default()
        }
    };
    config.apply_env_overrides();

    let target = config.resolve_target(&launcher_dir);
    let channel = ManifestChannel::new(well_known_path(&config.manifest_program()));
    let paths = open_event_paths();
    debug!("Session start: target {:?}, {} path(s)", target, paths.len());

    let coordinator = Coordinator::new(channel, target.clone(), Arc::new(OsLauncher))
        .with_preflight_arg(&config.preflight_arg)
        .with_preflight_timeout(Duration::from_millis(config.preflight_timeout_ms));

    let batches = if paths.is_empty() {
        Vec::new()
    } else {
        vec![paths]
    };
    let report = coordinator.run_session(&batches).await;

    if let StepOutcome::Failed(reason) = &report.interactive_open {
        // The one failure that leaves the session with nothing visible
        // at all; say so on stderr in case the launcher was run by hand.
        eprintln!(
            "termbridge: could not open {}: {}",
            target.display(),
            reason
        );
    }

    debug!("Session finished: {:?}", report);
    Ok(())
}

fn launcher_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to resolve current executable")?;
    Ok(exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".")))
}

/// File paths the desktop delivered as our argv. The manifest carries
/// absolute paths only, so relative ones are resolved against the
/// working directory best-effort.
fn open_event_paths() -> Vec<PathBuf> {
    let cwd = std::env::current_dir().ok();
    std::env::args_os()
        .skip(1)
        .map(PathBuf::from)
        .map(|path| {
            if path.is_absolute() {
                path
            } else if let Some(cwd) = &cwd {
                cwd.join(path)
            } else {
                path
            }
        })
        .collect()
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_path = std::env::temp_dir().join("termbridge.log");

    // A GUI-spawned process has no attached terminal; the log file is
    // where step failures stay visible.
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .init();
        }
        Err(_) => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
}
