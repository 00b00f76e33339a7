use crate::sample::{Channel, LatestReadings};

/// Describe the environment in one line from the latest readings.
///
/// Each channel present contributes one phrase; the phrases are joined with
/// `", "`. With no readings at all the result is `"environment normal"`.
pub fn environment_summary(latest: &LatestReadings) -> String {
    let mut parts = Vec::new();

    if let Some(t) = latest.value(Channel::Temperature) {
        parts.push(if t < 18.0 {
            format!("cold ({t}°C)")
        } else if t > 28.0 {
            format!("hot ({t}°C)")
        } else {
            format!("comfortable temperature ({t}°C)")
        });
    }

    if let Some(h) = latest.value(Channel::Humidity) {
        parts.push(if h < 40.0 {
            format!("dry air ({h}%)")
        } else if h > 70.0 {
            format!("humid air ({h}%)")
        } else {
            format!("comfortable humidity ({h}%)")
        });
    }

    if let Some(l) = latest.value(Channel::Light) {
        parts.push(if l < 100.0 {
            format!("dim light ({l}lux)")
        } else if l > 500.0 {
            format!("bright light ({l}lux)")
        } else {
            format!("moderate light ({l}lux)")
        });
    }

    if let Some(m) = latest.value(Channel::Motion) {
        parts.push(if m > 0.0 {
            "activity detected".to_string()
        } else {
            "no activity".to_string()
        });
    }

    if let Some(s) = latest.value(Channel::Smoke) {
        parts.push(if s > 200.0 {
            format!("high smoke level ({s}ppm)")
        } else if s > 100.0 {
            format!("slight smoke detected ({s}ppm)")
        } else {
            "air quality normal".to_string()
        });
    }

    if parts.is_empty() {
        "environment normal".to_string()
    } else {
        parts.join(", ")
    }
}
