use crate::sample::{ChannelReading, LatestReadings};
use crate::series::SeriesBuffer;
use chrono::{DateTime, Local};

/// Central dashboard state; every view reads from this.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Latest backend system status.
    pub system: SystemStatus,
    /// Per-sensor status rows, sorted by sensor id.
    pub sensors: Vec<SensorStatus>,
    /// Recent semantic events, oldest first as delivered by the backend.
    pub events: Vec<EventEntry>,
    /// Most recent value per channel from the last realtime payload.
    pub latest: LatestReadings,
    /// Rolling chart history.
    pub history: SeriesBuffer,
    /// Local time of the last successful realtime fetch.
    pub last_update: Option<DateTime<Local>>,
}

impl AppState {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            history: SeriesBuffer::new(capacity),
            ..Self::default()
        }
    }

    /// Fold one realtime payload into the state.
    ///
    /// A payload without any charted channel leaves the chart history
    /// untouched. Returns `true` when a sample was appended.
    pub fn apply_readings(&mut self, at: DateTime<Local>, readings: &[ChannelReading]) -> bool {
        self.latest = LatestReadings::from_readings(readings);
        self.last_update = Some(at);

        let sample = self.latest.to_sample(at.format("%H:%M:%S").to_string());
        if sample.is_empty() {
            return false;
        }
        self.history.append(sample);
        true
    }
}

/// Backend system status.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemStatus {
    pub running: bool,
    /// Uptime as formatted by the backend.
    pub uptime: String,
    pub events_processed: u64,
    pub compositions_created: u64,
}

impl Default for SystemStatus {
    fn default() -> Self {
        Self {
            running: false,
            uptime: "00:00:00".to_string(),
            events_processed: 0,
            compositions_created: 0,
        }
    }
}

/// One row of the sensor status panel.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorStatus {
    pub id: String,
    /// Latest value as reported by the backend, `None` when unknown.
    pub latest_value: Option<String>,
    pub updated_at: Option<String>,
    pub trend: Option<String>,
    pub status: Option<String>,
}

impl SensorStatus {
    /// Short display name: the part after the first `:` (`"ssn:Temp01"` → `"Temp01"`).
    pub fn display_name(&self) -> &str {
        match self.id.split_once(':') {
            Some((_, name)) if !name.is_empty() => name,
            _ => &self.id,
        }
    }
}

/// One entry of the recent-events panel.
#[derive(Debug, Clone, PartialEq)]
pub struct EventEntry {
    pub kind: String,
    pub description: String,
    /// Parsed event time, `None` when the backend timestamp was unparseable.
    pub time: Option<DateTime<Local>>,
    pub raw_time: String,
}
