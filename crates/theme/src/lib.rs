pub mod colors;
pub mod style;

pub use colors::Color;
pub use style::{channel_label, DatasetStyle};

use envdash_config::ThemeConfig;
use envdash_core::Channel;

/// Compiled theme derived from [`ThemeConfig`].
///
/// Calling [`Theme::from_config`] is infallible; invalid color strings fall
/// back to the stock palette.
#[derive(Debug, Clone)]
pub struct Theme {
    /// One entry per charted channel, in dataset order.
    pub datasets: Vec<DatasetStyle>,
}

impl Theme {
    /// Build a [`Theme`] from the config file's `[theme]` section.
    pub fn from_config(cfg: &ThemeConfig) -> Self {
        let datasets = Channel::CHARTED
            .into_iter()
            .map(|channel| {
                let (hex, fallback) = match channel {
                    Channel::Humidity => (&cfg.humidity, Color::BLUE),
                    Channel::Light    => (&cfg.light, Color::ORANGE),
                    _                 => (&cfg.temperature, Color::RED),
                };
                let line = Color::from_hex(hex).unwrap_or(fallback);
                DatasetStyle {
                    channel,
                    label: channel_label(channel).to_string(),
                    line,
                    fill: line.with_alpha(cfg.fill_alpha),
                    tension: cfg.tension,
                }
            })
            .collect();
        Self { datasets }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default())
    }
}
