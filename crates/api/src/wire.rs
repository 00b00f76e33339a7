//! JSON shapes exchanged with the backend and their conversion into
//! `envdash-core` types.

use chrono::{DateTime, Local, NaiveDateTime};
use envdash_core::{
    environment_summary,
    state::{EventEntry, SensorStatus, SystemStatus},
    Channel, ChannelReading, DashError, LatestReadings, Result,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One element of `GET /api/sensors/realtime` (an SSN observation).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub made_by_sensor: String,
    pub has_result:     ObservationResult,
    #[serde(default)]
    pub result_time:    Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservationResult {
    pub value: f64,
    #[serde(default)]
    pub unit:  String,
}

impl Observation {
    /// Tag the observation with its channel.
    pub fn into_reading(self) -> ChannelReading {
        ChannelReading {
            channel:   Channel::classify(&self.made_by_sensor),
            sensor_id: self.made_by_sensor,
            value:     self.has_result.value,
            unit:      self.has_result.unit,
        }
    }
}

/// `GET /api/system/status`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SystemStatusWire {
    pub running: bool,
    pub uptime: Option<String>,
    pub total_events_processed: u64,
    pub total_compositions_created: u64,
}

impl From<SystemStatusWire> for SystemStatus {
    fn from(w: SystemStatusWire) -> Self {
        let defaults = SystemStatus::default();
        Self {
            running:              w.running,
            uptime:               w.uptime.unwrap_or(defaults.uptime),
            events_processed:     w.total_events_processed,
            compositions_created: w.total_compositions_created,
        }
    }
}

/// One value of the `GET /api/sensors/status` map.
///
/// The backend keys these fields in Chinese.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SensorStatusWire {
    #[serde(rename = "最新值")]
    pub latest_value: Option<Value>,
    #[serde(rename = "更新时间")]
    pub updated_at: Option<Value>,
    #[serde(rename = "趋势")]
    pub trend: Option<Value>,
    #[serde(rename = "状态")]
    pub status: Option<Value>,
}

/// Convert the sensor status map into rows sorted by sensor id.
pub fn sensor_rows(map: BTreeMap<String, SensorStatusWire>) -> Vec<SensorStatus> {
    map.into_iter()
        .map(|(id, w)| SensorStatus {
            id,
            latest_value: w.latest_value.as_ref().and_then(display_value),
            updated_at:   w.updated_at.as_ref().and_then(display_value),
            trend:        w.trend.as_ref().and_then(display_value),
            status:       w.status.as_ref().and_then(display_value),
        })
        .collect()
}

/// One element of `GET /api/events/recent`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EventWire {
    #[serde(rename = "eventType")]
    pub event_type:  Option<String>,
    pub description: Option<String>,
    pub semantics:   Option<Semantics>,
    pub timestamp:   Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Semantics {
    pub value_interpretation: Option<String>,
}

impl From<EventWire> for EventEntry {
    fn from(w: EventWire) -> Self {
        let description = w
            .description
            .filter(|d| !d.is_empty())
            .or_else(|| w.semantics.and_then(|s| s.value_interpretation))
            .unwrap_or_default();
        let raw_time = w.timestamp.unwrap_or_default();
        Self {
            kind: w
                .event_type
                .filter(|k| !k.is_empty())
                .unwrap_or_else(|| "unknown event".to_string()),
            description,
            time: parse_time(&raw_time),
            raw_time,
        }
    }
}

/// `{status, message}` answer of the start / stop endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionResponse {
    pub status:  String,
    #[serde(default)]
    pub message: Option<String>,
}

impl ActionResponse {
    /// `Ok(message)` when `status == "success"`.
    pub fn into_result(self) -> Result<String> {
        let message = self.message.unwrap_or_default();
        if self.status == "success" {
            Ok(message)
        } else if message.is_empty() {
            Err(DashError::Rejected(self.status))
        } else {
            Err(DashError::Rejected(message))
        }
    }
}

/// Body of `POST /api/compositions/create`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositionRequest {
    pub target_goal: String,
    pub sensor_data: Map<String, Value>,
    pub constraints: Vec<String>,
}

impl CompositionRequest {
    /// Split a comma separated constraint list, dropping blank entries.
    pub fn parse_constraints(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Flatten the latest readings into the `sensor_data` object the composer expects.
pub fn sensor_data(latest: &LatestReadings, now: DateTime<Local>) -> Map<String, Value> {
    let mut data = Map::new();
    for (channel, value, unit) in latest.iter() {
        let (value_key, unit_key) = match channel {
            Channel::Temperature => ("temperature", Some("temperature_unit")),
            Channel::Humidity    => ("humidity", Some("humidity_unit")),
            Channel::Smoke       => ("smoke_level", Some("smoke_unit")),
            Channel::Light       => ("light_level", Some("light_unit")),
            Channel::Motion      => ("motion_detected", None),
        };
        let json_value = if channel == Channel::Motion {
            Value::Bool(value > 0.0)
        } else {
            serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
        };
        data.insert(value_key.to_string(), json_value);
        if let Some(unit_key) = unit_key {
            data.insert(unit_key.to_string(), Value::String(unit.to_string()));
        }
    }
    data.insert("timestamp".to_string(), Value::String(now.to_rfc3339()));
    data.insert(
        "environment_summary".to_string(),
        Value::String(environment_summary(latest)),
    );
    data
}

/// Render a loosely typed backend value for display; `null` yields `None`.
pub fn display_value(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Parse an RFC 3339 timestamp or a naive ISO-8601 one (taken as local time).
pub fn parse_time(raw: &str) -> Option<DateTime<Local>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Local));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .and_then(|t| t.and_local_timezone(Local).earliest())
}
