use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One tracked sensor dimension.
///
/// The API layer tags every decoded reading with a channel once; nothing
/// downstream inspects sensor identifiers again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Temperature,
    Humidity,
    Light,
    Smoke,
    Motion,
}

impl Channel {
    /// Channels plotted on the live chart, in dataset order.
    pub const CHARTED: [Channel; 3] = [Channel::Temperature, Channel::Humidity, Channel::Light];

    /// Every known channel, in classification priority order.
    pub const ALL: [Channel; 5] = [
        Channel::Temperature,
        Channel::Humidity,
        Channel::Smoke,
        Channel::Motion,
        Channel::Light,
    ];

    /// Lowercase channel name, also the substring searched for in sensor ids.
    pub fn name(self) -> &'static str {
        match self {
            Channel::Temperature => "temperature",
            Channel::Humidity    => "humidity",
            Channel::Light       => "light",
            Channel::Smoke       => "smoke",
            Channel::Motion      => "motion",
        }
    }

    /// Classify a backend sensor identifier such as `"ssn:TemperatureSensor_01"`.
    ///
    /// Matching is case-insensitive; the first channel in [`Channel::ALL`]
    /// whose name occurs in the id wins.
    pub fn classify(sensor_id: &str) -> Option<Channel> {
        let id = sensor_id.to_lowercase();
        Channel::ALL.into_iter().find(|c| id.contains(c.name()))
    }

    pub fn is_charted(self) -> bool {
        Channel::CHARTED.contains(&self)
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single decoded sensor observation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelReading {
    pub sensor_id: String,
    /// `None` when the sensor does not belong to any known channel.
    pub channel:   Option<Channel>,
    pub value:     f64,
    pub unit:      String,
}

/// One chart row: a display timestamp plus up to three charted values.
///
/// `None` means the backend sent no reading for that channel this tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp:   String,
    pub temperature: Option<f64>,
    pub humidity:    Option<f64>,
    pub light:       Option<f64>,
}

impl Sample {
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with(mut self, channel: Channel, value: f64) -> Self {
        self.set(channel, value);
        self
    }

    /// Record `value` for `channel`. Returns `false` for non-charted channels.
    pub fn set(&mut self, channel: Channel, value: f64) -> bool {
        let slot = match channel {
            Channel::Temperature => &mut self.temperature,
            Channel::Humidity    => &mut self.humidity,
            Channel::Light       => &mut self.light,
            Channel::Smoke | Channel::Motion => return false,
        };
        *slot = Some(value);
        true
    }

    pub fn get(&self, channel: Channel) -> Option<f64> {
        match channel {
            Channel::Temperature => self.temperature,
            Channel::Humidity    => self.humidity,
            Channel::Light       => self.light,
            Channel::Smoke | Channel::Motion => None,
        }
    }

    /// `true` when no charted channel carries a value.
    pub fn is_empty(&self) -> bool {
        Channel::CHARTED.iter().all(|c| self.get(*c).is_none())
    }
}

/// Most recent value and unit per channel from one realtime payload.
///
/// When several sensors map to the same channel the last one wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LatestReadings {
    values: BTreeMap<Channel, (f64, String)>,
}

impl LatestReadings {
    pub fn from_readings<'a>(readings: impl IntoIterator<Item = &'a ChannelReading>) -> Self {
        let mut values = BTreeMap::new();
        for reading in readings {
            if let Some(channel) = reading.channel {
                values.insert(channel, (reading.value, reading.unit.clone()));
            }
        }
        Self { values }
    }

    pub fn value(&self, channel: Channel) -> Option<f64> {
        self.values.get(&channel).map(|(v, _)| *v)
    }

    pub fn unit(&self, channel: Channel) -> Option<&str> {
        self.values.get(&channel).map(|(_, u)| u.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Channel, f64, &str)> {
        self.values.iter().map(|(c, (v, u))| (*c, *v, u.as_str()))
    }

    /// Project the charted channels into a chart row.
    pub fn to_sample(&self, timestamp: impl Into<String>) -> Sample {
        let mut sample = Sample::new(timestamp);
        for channel in Channel::CHARTED {
            if let Some(v) = self.value(channel) {
                sample.set(channel, v);
            }
        }
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(id: &str, value: f64, unit: &str) -> ChannelReading {
        ChannelReading {
            sensor_id: id.into(),
            channel:   Channel::classify(id),
            value,
            unit:      unit.into(),
        }
    }

    #[test]
    fn classify_is_case_insensitive() {
        assert_eq!(Channel::classify("ssn:TemperatureSensor_01"), Some(Channel::Temperature));
        assert_eq!(Channel::classify("ssn:humidity_02"), Some(Channel::Humidity));
        assert_eq!(Channel::classify("LIGHT-3"), Some(Channel::Light));
        assert_eq!(Channel::classify("ssn:SmokeDetector"), Some(Channel::Smoke));
        assert_eq!(Channel::classify("ssn:MotionSensor"), Some(Channel::Motion));
        assert_eq!(Channel::classify("ssn:PressureSensor"), None);
    }

    #[test]
    fn non_charted_channels_are_not_stored_in_sample() {
        let mut s = Sample::new("t");
        assert!(!s.set(Channel::Smoke, 12.0));
        assert!(s.is_empty());
        assert!(s.set(Channel::Light, 300.0));
        assert_eq!(s.get(Channel::Light), Some(300.0));
        assert!(!s.is_empty());
    }

    #[test]
    fn latest_readings_last_sensor_wins() {
        let readings = [
            reading("ssn:Temperature_1", 21.0, "°C"),
            reading("ssn:Temperature_2", 23.5, "°C"),
            reading("ssn:Humidity_1", 55.0, "%"),
            reading("ssn:Barometer", 1013.0, "hPa"),
        ];
        let latest = LatestReadings::from_readings(&readings);
        assert_eq!(latest.value(Channel::Temperature), Some(23.5));
        assert_eq!(latest.unit(Channel::Humidity), Some("%"));
        assert_eq!(latest.iter().count(), 2);

        let sample = latest.to_sample("12:00:00");
        assert_eq!(sample.temperature, Some(23.5));
        assert_eq!(sample.humidity, Some(55.0));
        assert_eq!(sample.light, None);
    }
}
