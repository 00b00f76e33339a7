use envdash_core::SeriesSnapshot;
use envdash_theme::Theme;
use serde::Serialize;

/// Input document for a line-chart front end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels:   Vec<String>,
    /// Temperature, humidity and light, in that order.
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label:            String,
    pub data:             Vec<f64>,
    pub border_color:     String,
    pub background_color: String,
    pub tension:          f32,
}

/// Pair a history snapshot with the theme's dataset styles.
pub fn chart_data(snapshot: &SeriesSnapshot, theme: &Theme) -> ChartData {
    let datasets = theme
        .datasets
        .iter()
        .map(|style| Dataset {
            label:            style.label.clone(),
            data:             snapshot.channel(style.channel).to_vec(),
            border_color:     style.line.to_hex(),
            background_color: style.fill.to_css_rgba(),
            tension:          style.tension,
        })
        .collect();

    ChartData {
        labels: snapshot.labels.clone(),
        datasets,
    }
}
