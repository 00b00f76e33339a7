use envdash_core::DEFAULT_CAPACITY;
use serde::{Deserialize, Serialize};

/// Root configuration structure parsed from `envdash.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    /// `tracing` filter used when `RUST_LOG` is unset, e.g. `"info"` or `"envdash=debug"`.
    pub log_level: String,
    /// Where the backend API lives.
    pub backend: BackendConfig,
    /// Polling and history settings.
    pub refresh: RefreshConfig,
    /// Chart colours.
    pub theme: ThemeConfig,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            backend:   BackendConfig::default(),
            refresh:   RefreshConfig::default(),
            theme:     ThemeConfig::default(),
        }
    }
}

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL without trailing slash, e.g. `"http://127.0.0.1:5000"`.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url:   "http://127.0.0.1:5000".to_string(),
            timeout_ms: 10_000,
        }
    }
}

/// Dashboard refresh settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Poll interval in milliseconds.
    pub interval_ms: u64,
    /// Number of samples kept for the live chart.
    pub history_capacity: usize,
    /// Number of recent events shown, newest first.
    pub recent_events: usize,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_ms:      5_000,
            history_capacity: DEFAULT_CAPACITY,
            recent_events:    10,
        }
    }
}

/// Chart styling, one colour per dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Temperature line colour (hex, e.g. `"#e74c3c"`).
    pub temperature: String,
    /// Humidity line colour.
    pub humidity: String,
    /// Light line colour.
    pub light: String,
    /// Alpha applied to a line colour to get its fill colour (0.0 – 1.0).
    pub fill_alpha: f32,
    /// Bezier curve tension forwarded to the chart.
    pub tension: f32,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            temperature: "#e74c3c".to_string(),
            humidity:    "#3498db".to_string(),
            light:       "#f39c12".to_string(),
            fill_alpha:  0.1,
            tension:     0.4,
        }
    }
}
