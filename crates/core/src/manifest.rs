//! The manifest channel: a one-shot mailbox file carrying the selected
//! file paths from the launcher to the target program.
//!
//! The launcher only ever writes and clears. Reading the manifest, and
//! deleting it after consumption, belong to the target program.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Well-known manifest location for `program`: `<tmpdir>/<program>-paths.txt`.
///
/// This is a contract constant shared by convention with the target
/// program, not a runtime setting. Both processes must be able to reach
/// it no matter which desktop application spawned them, hence the system
/// temp directory.
pub fn well_known_path(program: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{program}-paths.txt"))
}

pub struct ManifestChannel {
    path: PathBuf,
}

impl ManifestChannel {
    /// A channel at an explicit path. Production code passes
    /// [`well_known_path`]; tests point this at a scratch directory.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// One path per line, every line newline-terminated. An empty list
    /// encodes to an empty string. A path containing a newline cannot be
    /// represented in this format.
    pub fn encode(paths: &[PathBuf]) -> String {
        let mut out = String::new();
        for path in paths {
            out.push_str(&path.display().to_string());
            out.push('\n');
        }
        out
    }

    /// Replace the manifest contents with `paths`.
    ///
    /// Atomic write: a concurrent reader sees either the previous
    /// manifest or the complete new one, never a truncated file.
    pub async fn write(&self, paths: &[PathBuf]) -> Result<(), ManifestError> {
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, Self::encode(paths)).await?;
        fs::rename(&temp_path, &self.path).await?;

        tracing::debug!("Wrote {} path(s) to {:?}", paths.len(), self.path);
        Ok(())
    }

    /// Remove the manifest if present. An absent manifest is the common
    /// case and is not an error.
    pub async fn clear(&self) -> Result<(), ManifestError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::debug!("Removed stale manifest {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
