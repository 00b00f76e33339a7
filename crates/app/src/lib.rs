//! Dashboard loop for `envdash`.
//!
//! Owns the application state and wires together the background tasks:
//! - Backend poller (system status, sensors, realtime readings, events)
//! - Config file watcher (live reload on change)
//! - Ctrl-C (graceful shutdown)

pub mod actions;
pub mod store;

pub use actions::CompositionSource;
pub use store::CompositionStore;

use envdash_api::ApiClient;
use envdash_config::{load as load_config, ConfigWatcher, DashConfig};
use envdash_core::{AppState, Message, Result};
use envdash_monitor::spawn_poller;
use envdash_renderer::{chart_data, render_dashboard, ChartData, ViewOptions};
use envdash_theme::Theme;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// How the dashboard reports each refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Redraw the text dashboard.
    #[default]
    Text,
    /// One chart document (JSON) per line.
    ChartJson,
}

/// What the loop has to do after a message was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    None,
    Redraw,
    RestartPoller,
    Quit,
}

// ── State ─────────────────────────────────────────────────────────────────────

pub struct Dashboard {
    state:       AppState,
    config:      DashConfig,
    config_path: PathBuf,
    /// `--base-url` from the command line; survives config reloads.
    base_url_override: Option<String>,
    theme:       Theme,
    client:      ApiClient,
}

impl Dashboard {
    pub fn new(mut config: DashConfig, config_path: PathBuf, base_url_override: Option<String>) -> Self {
        if let Some(url) = &base_url_override {
            config.backend.base_url = url.clone();
        }
        Self {
            state: AppState::with_capacity(config.refresh.history_capacity),
            theme: Theme::from_config(&config.theme),
            client: ApiClient::from_config(&config.backend),
            config,
            config_path,
            base_url_override,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.config.refresh.interval_ms.max(100))
    }

    // ── Update ────────────────────────────────────────────────────────────────

    pub fn update(&mut self, message: Message) -> Update {
        match message {
            Message::SystemStatus(status) => {
                self.state.system = status;
            }
            Message::SensorStatus(sensors) => {
                self.state.sensors = sensors;
            }
            Message::Readings { at, readings } => {
                if !self.state.apply_readings(at, &readings) {
                    warn!("Realtime payload had no temperature, humidity or light reading");
                }
            }
            Message::Events(events) => {
                self.state.events = events;
            }
            Message::RefreshDone => return Update::Redraw,
            Message::ConfigReloaded => match load_config(&self.config_path) {
                Ok(cfg) => {
                    info!("Config reloaded");
                    return self.apply_config(cfg);
                }
                Err(e) => warn!("Config reload failed: {e}"),
            },
            Message::Shutdown => return Update::Quit,
        }
        Update::None
    }

    /// Swap in a freshly loaded config. Backend or interval changes need a
    /// new poller; theme and history size apply in place.
    pub fn apply_config(&mut self, mut cfg: DashConfig) -> Update {
        if let Some(url) = &self.base_url_override {
            cfg.backend.base_url = url.clone();
        }

        self.theme = Theme::from_config(&cfg.theme);
        self.state.history.set_capacity(cfg.refresh.history_capacity);

        let restart = cfg.backend != self.config.backend
            || cfg.refresh.interval_ms != self.config.refresh.interval_ms;
        if cfg.backend != self.config.backend {
            self.client = ApiClient::from_config(&cfg.backend);
        }
        self.config = cfg;

        if restart {
            Update::RestartPoller
        } else {
            Update::Redraw
        }
    }

    // ── View ──────────────────────────────────────────────────────────────────

    pub fn view(&self) -> String {
        render_dashboard(
            &self.state,
            &ViewOptions {
                backend:       self.client.base_url().to_string(),
                recent_events: self.config.refresh.recent_events,
            },
        )
    }

    pub fn chart(&self) -> ChartData {
        chart_data(&self.state.history.snapshot(), &self.theme)
    }

    fn draw(&self, mode: OutputMode) {
        let mut stdout = std::io::stdout().lock();
        let result = match mode {
            OutputMode::Text => {
                // Clear and home the cursor on a terminal; plain append otherwise.
                let clear = if stdout.is_terminal() { "\x1b[2J\x1b[H" } else { "" };
                write!(stdout, "{clear}{}", self.view())
            }
            OutputMode::ChartJson => match serde_json::to_string(&self.chart()) {
                Ok(line) => writeln!(stdout, "{line}"),
                Err(e) => {
                    warn!("Cannot encode chart data: {e}");
                    Ok(())
                }
            },
        };
        if let Err(e) = result.and_then(|_| stdout.flush()) {
            warn!("Failed to write dashboard: {e}");
        }
    }
}

// ── Entry points ──────────────────────────────────────────────────────────────

/// Run the live dashboard until Ctrl-C.
pub async fn run(dashboard: Dashboard, mode: OutputMode) -> Result<()> {
    let mut dashboard = dashboard;
    let mut poll_rx = spawn_poller(dashboard.client.clone(), dashboard.poll_interval());
    let (_watcher, mut config_rx) = ConfigWatcher::spawn(dashboard.config_path.clone());

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    info!(
        "Polling {} every {:?}",
        dashboard.client.base_url(),
        dashboard.poll_interval()
    );

    loop {
        let message = tokio::select! {
            Some(m) = poll_rx.recv() => m,
            Some(()) = config_rx.recv() => Message::ConfigReloaded,
            _ = &mut ctrl_c => Message::Shutdown,
            else => break,
        };

        match dashboard.update(message) {
            Update::None => {}
            Update::Redraw => dashboard.draw(mode),
            Update::RestartPoller => {
                info!("Restarting poller against {}", dashboard.client.base_url());
                poll_rx = spawn_poller(dashboard.client.clone(), dashboard.poll_interval());
                dashboard.draw(mode);
            }
            Update::Quit => break,
        }
    }

    info!("Dashboard stopped");
    Ok(())
}

/// Refresh once, print the dashboard and return.
pub async fn run_once(dashboard: Dashboard, mode: OutputMode) -> Result<()> {
    let mut dashboard = dashboard;
    let (tx, mut rx) = mpsc::channel(8);
    envdash_monitor::refresh(&dashboard.client, &tx).await;
    drop(tx);

    while let Some(message) = rx.recv().await {
        dashboard.update(message);
    }
    dashboard.draw(mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use envdash_core::{Channel, ChannelReading};

    fn dashboard() -> Dashboard {
        Dashboard::new(DashConfig::default(), PathBuf::from("/nonexistent/envdash.toml"), None)
    }

    fn temperature(v: f64) -> Message {
        Message::Readings {
            at: Local::now(),
            readings: vec![ChannelReading {
                sensor_id: "ssn:Temperature".into(),
                channel:   Some(Channel::Temperature),
                value:     v,
                unit:      "°C".into(),
            }],
        }
    }

    #[test]
    fn readings_feed_the_chart() {
        let mut d = dashboard();
        for v in 1..=7 {
            assert_eq!(d.update(temperature(v as f64)), Update::None);
        }
        assert_eq!(d.update(Message::RefreshDone), Update::Redraw);

        let chart = d.chart();
        assert_eq!(chart.labels.len(), 5);
        assert_eq!(chart.datasets[0].data, vec![3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(chart.datasets[1].data, vec![0.0; 5]);
    }

    #[test]
    fn shutdown_quits() {
        assert_eq!(dashboard().update(Message::Shutdown), Update::Quit);
    }

    #[test]
    fn reload_with_missing_file_restores_defaults() {
        let mut d = dashboard();
        // A missing config file loads as defaults, so nothing needs restarting.
        assert_eq!(d.update(Message::ConfigReloaded), Update::Redraw);
    }

    #[test]
    fn config_changes() {
        let mut d = dashboard();
        for v in 1..=5 {
            d.update(temperature(v as f64));
        }

        let mut cfg = DashConfig::default();
        cfg.refresh.history_capacity = 2;
        assert_eq!(d.apply_config(cfg.clone()), Update::Redraw);
        assert_eq!(d.state().history.len(), 2);

        cfg.refresh.interval_ms = 1_000;
        assert_eq!(d.apply_config(cfg.clone()), Update::RestartPoller);

        cfg.backend.base_url = "http://elsewhere:5000".into();
        assert_eq!(d.apply_config(cfg), Update::RestartPoller);
        assert_eq!(d.client().base_url(), "http://elsewhere:5000");
    }

    #[test]
    fn base_url_override_survives_reload() {
        let mut d = Dashboard::new(
            DashConfig::default(),
            PathBuf::from("/nonexistent/envdash.toml"),
            Some("http://override:1234".into()),
        );
        assert_eq!(d.client().base_url(), "http://override:1234");
        assert_eq!(d.apply_config(DashConfig::default()), Update::Redraw);
        assert_eq!(d.client().base_url(), "http://override:1234");
    }
}
