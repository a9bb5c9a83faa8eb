use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use termbridge_core::coordinator::{DEFAULT_PREFLIGHT_ARG, DEFAULT_PREFLIGHT_TIMEOUT};

pub const CONFIG_FILE: &str = "config.toml";

/// The name the bundled terminal program is expected to be installed
/// under, next to the launcher binary, when no config overrides it.
const DEFAULT_TARGET: &str = "termbridge-target";

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target executable. A relative value resolves against the
    /// directory holding the launcher binary itself.
    pub target: PathBuf,

    /// Argument the target recognizes as "print something and exit",
    /// used for the authorization preflight run.
    pub preflight_arg: String,

    /// Bounded wait for the preflight run.
    pub preflight_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: PathBuf::from(DEFAULT_TARGET),
            preflight_arg: DEFAULT_PREFLIGHT_ARG.to_string(),
            preflight_timeout_ms: DEFAULT_PREFLIGHT_TIMEOUT.as_millis() as u64,
        }
    }
}

impl Config {
    /// Load `config.toml` from the launcher's own directory; a missing
    /// file means defaults.
    pub fn load(launcher_dir: &Path) -> Result<Self> {
        let path = launcher_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// `TERMBRIDGE_*` environment variables take precedence over the
    /// config file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(target) = std::env::var("TERMBRIDGE_TARGET") {
            self.target = PathBuf::from(target);
        }
        if let Ok(arg) = std::env::var("TERMBRIDGE_PREFLIGHT_ARG") {
            self.preflight_arg = arg;
        }
        if let Ok(ms) = std::env::var("TERMBRIDGE_PREFLIGHT_TIMEOUT_MS") {
            match ms.parse() {
                Ok(ms) => self.preflight_timeout_ms = ms,
                Err(_) => {
                    tracing::warn!("Ignoring non-numeric TERMBRIDGE_PREFLIGHT_TIMEOUT_MS: {}", ms)
                }
            }
        }
    }

    pub fn resolve_target(&self, launcher_dir: &Path) -> PathBuf {
        if self.target.is_absolute() {
            self.target.clone()
        } else {
            launcher_dir.join(&self.target)
        }
    }

    /// The name keying the manifest convention the target program reads:
    /// its own executable stem.
    pub fn manifest_program(&self) -> String {
        self.target
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("termbridge")
            .to_string()
    }
}
