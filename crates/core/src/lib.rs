//! Hand-off core for launching a terminal-hosted program from a GUI
//! file-open event.
//!
//! The desktop's open-with mechanism starts a short-lived launcher with
//! the selected paths; the program that eventually runs inside the
//! terminal emulator receives no arguments from that launch. The bridge
//! is a well-known manifest file: the launcher writes the path list
//! there, then asks the OS to open the target executable, and the target
//! reads and deletes the manifest on its own schedule.

pub mod coordinator;
pub mod launch;
pub mod manifest;

pub use coordinator::{Coordinator, SessionReport, StepOutcome};
pub use launch::{LaunchError, OsLauncher, ProgramLauncher};
pub use manifest::{well_known_path, ManifestChannel, ManifestError};
