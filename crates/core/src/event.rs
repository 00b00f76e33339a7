use crate::sample::ChannelReading;
use crate::state::{EventEntry, SensorStatus, SystemStatus};
use chrono::{DateTime, Local};

/// All messages that can flow into the dashboard loop.
///
/// Sources:
/// - Poller task          → `SystemStatus`, `SensorStatus`, `Readings`, `Events`
/// - Config watcher task  → `ConfigReloaded`
/// - Signal handler       → `Shutdown`
#[derive(Debug, Clone)]
pub enum Message {
    // ── Poller ────────────────────────────────────────────────────────────────
    SystemStatus(SystemStatus),
    SensorStatus(Vec<SensorStatus>),
    /// Realtime readings, stamped with the local time the response arrived.
    Readings {
        at:       DateTime<Local>,
        readings: Vec<ChannelReading>,
    },
    Events(Vec<EventEntry>),
    /// Every fetch of one refresh cycle has completed (successfully or not).
    RefreshDone,

    // ── Config ────────────────────────────────────────────────────────────────
    /// Config file changed on disk; triggers a live reload.
    ConfigReloaded,

    // ── Internal ──────────────────────────────────────────────────────────────
    /// Graceful shutdown requested.
    Shutdown,
}
