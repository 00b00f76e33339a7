use crate::colors::Color;
use envdash_core::Channel;

/// Visual settings for one chart dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStyle {
    pub channel: Channel,
    /// Legend label, e.g. `"Temperature (°C)"`.
    pub label:   String,
    pub line:    Color,
    pub fill:    Color,
    pub tension: f32,
}

/// Legend label for a charted channel.
pub fn channel_label(channel: Channel) -> &'static str {
    match channel {
        Channel::Temperature => "Temperature (°C)",
        Channel::Humidity    => "Humidity (%)",
        Channel::Light       => "Light (lux)",
        Channel::Smoke       => "Smoke (ppm)",
        Channel::Motion      => "Motion",
    }
}
