//! End-to-end session behavior against a recording launcher.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use termbridge_core::{Coordinator, LaunchError, ManifestChannel, ProgramLauncher, StepOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Preflight(PathBuf),
    Open(PathBuf),
}

struct RecordingLauncher {
    calls: Arc<Mutex<Vec<Call>>>,
    fail_preflight: bool,
    fail_open: bool,
}

impl RecordingLauncher {
    fn new() -> (Arc<Self>, Arc<Mutex<Vec<Call>>>) {
        Self::with_failures(false, false)
    }

    fn with_failures(fail_preflight: bool, fail_open: bool) -> (Arc<Self>, Arc<Mutex<Vec<Call>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let launcher = Arc::new(Self {
            calls: calls.clone(),
            fail_preflight,
            fail_open,
        });
        (launcher, calls)
    }
}

#[async_trait]
impl ProgramLauncher for RecordingLauncher {
    async fn preflight(
        &self,
        target: &Path,
        _arg: &str,
        _timeout: Duration,
    ) -> Result<(), LaunchError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Preflight(target.to_path_buf()));
        if self.fail_preflight {
            Err(LaunchError::Preflight("no such executable".to_string()))
        } else {
            Ok(())
        }
    }

    async fn open_interactive(&self, target: &Path) -> Result<(), LaunchError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Open(target.to_path_buf()));
        if self.fail_open {
            Err(LaunchError::Open("no handler for executables".to_string()))
        } else {
            Ok(())
        }
    }
}

fn coordinator(
    dir: &Path,
    launcher: Arc<RecordingLauncher>,
) -> (Coordinator, PathBuf, PathBuf) {
    let manifest = dir.join("target-paths.txt");
    let target = dir.join("target");
    let coordinator = Coordinator::new(
        ManifestChannel::new(&manifest),
        target.clone(),
        launcher,
    );
    (coordinator, manifest, target)
}

#[tokio::test]
async fn test_full_session_hands_off_paths() {
    let dir = tempfile::tempdir().unwrap();
    let (launcher, calls) = RecordingLauncher::new();
    let (coordinator, manifest, target) = coordinator(dir.path(), launcher);

    // Stale manifest from a session the target never consumed.
    std::fs::write(&manifest, "/stale/old.dat\n").unwrap();

    let report = coordinator
        .run_session(&[vec![
            PathBuf::from("/a/one.dat"),
            PathBuf::from("/b/two.dat"),
        ]])
        .await;

    assert!(report.cleanup.is_ok());
    assert!(report.manifest_write.is_ok());
    assert!(report.preflight.is_ok());
    assert!(report.interactive_open.is_ok());

    // The manifest stays in place for the target program; deleting it
    // after consumption is the target's job.
    let contents = std::fs::read_to_string(&manifest).unwrap();
    assert_eq!(contents, "/a/one.dat\n/b/two.dat\n");

    let calls = calls.lock().unwrap();
    assert_eq!(
        *calls,
        vec![Call::Preflight(target.clone()), Call::Open(target)]
    );
}

#[tokio::test]
async fn test_session_without_files_still_launches() {
    let dir = tempfile::tempdir().unwrap();
    let (launcher, calls) = RecordingLauncher::new();
    let (coordinator, manifest, _) = coordinator(dir.path(), launcher);

    let report = coordinator.run_session(&[]).await;

    assert!(report.cleanup.is_ok());
    assert_eq!(report.manifest_write, StepOutcome::Skipped);
    assert!(report.interactive_open.is_ok());
    assert!(!manifest.exists());
    assert_eq!(calls.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_stale_manifest_removed_even_when_no_files_arrive() {
    let dir = tempfile::tempdir().unwrap();
    let (launcher, _) = RecordingLauncher::new();
    let (coordinator, manifest, _) = coordinator(dir.path(), launcher);

    std::fs::write(&manifest, "/stale/old.dat\n").unwrap();
    let report = coordinator.run_session(&[]).await;

    assert!(report.cleanup.is_ok());
    assert!(!manifest.exists());
}

#[tokio::test]
async fn test_manifest_write_failure_still_launches() {
    let dir = tempfile::tempdir().unwrap();
    let (launcher, calls) = RecordingLauncher::new();
    // Unwritable channel: the parent directory does not exist.
    let coordinator = Coordinator::new(
        ManifestChannel::new(dir.path().join("missing").join("target-paths.txt")),
        dir.path().join("target"),
        launcher,
    );

    let report = coordinator
        .run_session(&[vec![PathBuf::from("/a/one.dat")]])
        .await;

    assert!(matches!(report.manifest_write, StepOutcome::Failed(_)));
    assert!(report.interactive_open.is_ok());
    assert_eq!(calls.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_preflight_failure_still_opens_interactively() {
    let dir = tempfile::tempdir().unwrap();
    let (launcher, calls) = RecordingLauncher::with_failures(true, false);
    let (coordinator, _, target) = coordinator(dir.path(), launcher);

    let report = coordinator
        .run_session(&[vec![PathBuf::from("/a/one.dat")]])
        .await;

    assert!(matches!(report.preflight, StepOutcome::Failed(_)));
    assert!(report.interactive_open.is_ok());
    assert!(calls.lock().unwrap().contains(&Call::Open(target)));
}

#[tokio::test]
async fn test_interactive_open_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let (launcher, _) = RecordingLauncher::with_failures(true, true);
    let (coordinator, _, _) = coordinator(dir.path(), launcher);

    let report = coordinator
        .run_session(&[vec![PathBuf::from("/a/one.dat")]])
        .await;

    assert!(matches!(report.interactive_open, StepOutcome::Failed(_)));
}

#[tokio::test]
async fn test_last_batch_wins_across_multiple_notifications() {
    let dir = tempfile::tempdir().unwrap();
    let (launcher, _) = RecordingLauncher::new();
    let (coordinator, manifest, _) = coordinator(dir.path(), launcher);

    let report = coordinator
        .run_session(&[
            vec![PathBuf::from("/first/batch.dat")],
            vec![PathBuf::from("/second/batch.dat")],
        ])
        .await;

    assert!(report.manifest_write.is_ok());
    let contents = std::fs::read_to_string(&manifest).unwrap();
    assert_eq!(contents, "/second/batch.dat\n");
}
