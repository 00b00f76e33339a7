use envdash_api::Composition;
use envdash_core::{
    environment_summary,
    state::{EventEntry, SensorStatus},
    AppState, Channel, Sample,
};
use std::fmt::Write;

/// Characters of the workflow shown in the composition summary.
const WORKFLOW_EXCERPT: usize = 200;

/// Knobs for [`render_dashboard`].
#[derive(Debug, Clone)]
pub struct ViewOptions {
    /// Backend URL shown in the header.
    pub backend: String,
    /// Number of recent events listed, newest first.
    pub recent_events: usize,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            backend:       String::new(),
            recent_events: 10,
        }
    }
}

/// Render the whole dashboard as plain text.
pub fn render_dashboard(state: &AppState, opts: &ViewOptions) -> String {
    let mut out = String::new();
    header(&mut out, state, opts);
    sensors(&mut out, state);
    history(&mut out, state);
    events(&mut out, &state.events, opts.recent_events);
    out
}

fn header(out: &mut String, state: &AppState, opts: &ViewOptions) {
    let sys = &state.system;
    let status = if sys.running { "running" } else { "stopped" };
    let _ = writeln!(out, "envdash  {}", opts.backend);
    let _ = writeln!(out, "system {status}  uptime {}", sys.uptime);
    let _ = writeln!(
        out,
        "events processed {}  compositions created {}",
        sys.events_processed, sys.compositions_created
    );
    if let Some(t) = state.last_update {
        let _ = writeln!(out, "last update {}", t.format("%H:%M:%S"));
    }
    out.push('\n');
}

fn sensors(out: &mut String, state: &AppState) {
    out.push_str("Sensors\n");
    if state.sensors.is_empty() {
        out.push_str("  (no sensor status)\n");
    }
    for s in &state.sensors {
        sensor_row(out, s);
    }
    out.push('\n');
}

/// Name and value, then whichever of trend, status and update time the backend sent.
fn sensor_row(out: &mut String, s: &SensorStatus) {
    let value = s.latest_value.as_deref().unwrap_or("N/A");
    let _ = write!(out, "  {:<28} {value:<10}", s.display_name());
    if let Some(trend) = &s.trend {
        let _ = write!(out, " trend {trend}");
    }
    if let Some(status) = &s.status {
        let _ = write!(out, " [{status}]");
    }
    if let Some(updated) = &s.updated_at {
        let _ = write!(out, " updated {updated}");
    }
    let trimmed = out.trim_end_matches(' ').len();
    out.truncate(trimmed);
    out.push('\n');
}

fn history(out: &mut String, state: &AppState) {
    let _ = writeln!(out, "Live readings (last {})", state.history.capacity());
    let _ = write!(out, "  {:<10}", "time");
    for channel in Channel::CHARTED {
        let _ = write!(out, " {:>12}", channel.name());
    }
    out.push('\n');

    for sample in state.history.rows() {
        history_row(out, sample);
    }
    if state.history.is_empty() {
        out.push_str("  (waiting for data)\n");
    }

    if !state.latest.is_empty() {
        let _ = writeln!(out, "  {}", environment_summary(&state.latest));
    }
    out.push('\n');
}

/// One table row; a channel without a reading shows `-` rather than zero.
fn history_row(out: &mut String, sample: &Sample) {
    let _ = write!(out, "  {:<10}", sample.timestamp);
    for channel in Channel::CHARTED {
        match sample.get(channel) {
            Some(v) => {
                let _ = write!(out, " {v:>12.1}");
            }
            None => {
                let _ = write!(out, " {:>12}", "-");
            }
        }
    }
    out.push('\n');
}

fn events(out: &mut String, events: &[EventEntry], limit: usize) {
    out.push_str("Recent events\n");
    if events.is_empty() || limit == 0 {
        out.push_str("  no events\n");
        return;
    }
    let start = events.len().saturating_sub(limit);
    for e in events[start..].iter().rev() {
        let time = e
            .time
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| e.raw_time.clone());
        if e.description.is_empty() {
            let _ = writeln!(out, "  [{time}] {}", e.kind);
        } else {
            let _ = writeln!(out, "  [{time}] {}: {}", e.kind, e.description);
        }
    }
}

/// Short summary printed after a composition is created.
pub fn render_composition_summary(c: &Composition) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Composition {}", c.title());
    if let Some(created) = &c.created_at {
        let _ = writeln!(out, "created {created}");
    }
    if let Some(workflow) = &c.workflow {
        let excerpt: String = workflow.chars().take(WORKFLOW_EXCERPT).collect();
        let _ = writeln!(out, "Workflow:\n{excerpt}...");
    }
    out
}
