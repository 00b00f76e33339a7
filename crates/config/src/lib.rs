pub mod schema;
pub mod watcher;

pub use schema::{BackendConfig, DashConfig, RefreshConfig, ThemeConfig};
pub use watcher::ConfigWatcher;

use envdash_core::{DashError, Result};
use std::path::{Path, PathBuf};

/// Where a loaded configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOrigin {
    File,
    /// No file at the path; built-in defaults are in use.
    Defaults,
}

/// Load configuration from a TOML file.  Returns `DashConfig::default()` if
/// the file doesn't exist so the dashboard always has sensible defaults.
pub fn load(path: impl AsRef<Path>) -> Result<DashConfig> {
    let path = path.as_ref();
    let (config, origin) = load_with_origin(path)?;
    if origin == ConfigOrigin::Defaults {
        warn_missing(path);
    }
    Ok(config)
}

/// Like [`load`], but reports a missing file to the caller instead of
/// logging it, for use before a subscriber is installed.
pub fn load_with_origin(path: impl AsRef<Path>) -> Result<(DashConfig, ConfigOrigin)> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok((DashConfig::default(), ConfigOrigin::Defaults));
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| DashError::Config(format!("cannot read '{}': {e}", path.display())))?;

    let config: DashConfig = toml::from_str(&raw).map_err(|e| DashError::Config(format!("TOML parse error: {e}")))?;
    Ok((config, ConfigOrigin::File))
}

/// The warning logged when [`load`] falls back to defaults.
pub fn warn_missing(path: &Path) {
    tracing::warn!(
        "Config file not found at '{}'; using defaults.",
        path.display()
    );
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config").join("envdash.toml")
}

/// Directory for state that outlives one invocation (the latest composition),
/// honouring `$XDG_STATE_HOME`.
pub fn state_dir() -> PathBuf {
    xdg_dir("XDG_STATE_HOME", ".local/state")
}

fn xdg_dir(var: &str, home_fallback: &str) -> PathBuf {
    let base = std::env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(home_fallback)
        });
    base.join("envdash")
}
