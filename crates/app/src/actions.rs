//! One-shot commands forwarded to the backend. Each returns the text to print.

use crate::store::{read_composition, CompositionStore};
use chrono::Local;
use envdash_api::{sensor_data, ApiClient, Composition, CompositionRequest};
use envdash_core::{DashError, LatestReadings, Result};
use envdash_renderer::{composition_markdown, render_composition_summary};
use std::fmt::Write;
use std::path::PathBuf;
use tracing::info;

/// Where a composition command takes its composition from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositionSource {
    /// Fetch `GET /api/compositions/{id}`.
    Id(String),
    /// Read a JSON file.
    File(PathBuf),
    /// The one stored by the last `compose`.
    Latest,
}

impl CompositionSource {
    pub async fn resolve(&self, client: &ApiClient, store: &CompositionStore) -> Result<Composition> {
        match self {
            CompositionSource::Id(id) => client.load_composition(id).await,
            CompositionSource::File(path) => read_composition(path),
            CompositionSource::Latest => store.load_latest(),
        }
    }
}

pub async fn start_system(client: &ApiClient) -> Result<String> {
    let message = client.start_system().await?;
    info!("System started");
    Ok(non_empty(message, "system started"))
}

pub async fn stop_system(client: &ApiClient) -> Result<String> {
    let message = client.stop_system().await?;
    info!("System stopped");
    Ok(non_empty(message, "system stopped"))
}

pub async fn system_status(client: &ApiClient) -> Result<String> {
    let s = client.system_status().await?;
    Ok(format!(
        "running: {}\nuptime: {}\nevents processed: {}\ncompositions created: {}",
        if s.running { "yes" } else { "no" },
        s.uptime,
        s.events_processed,
        s.compositions_created
    ))
}

pub async fn available_services(client: &ApiClient) -> Result<String> {
    let services = client.available_services().await?;
    serde_json::to_string_pretty(&services).map_err(|e| DashError::Decode(e.to_string()))
}

/// Ask the backend for a composition meeting `goal` under the current readings.
pub async fn compose(
    client: &ApiClient,
    store: &CompositionStore,
    goal: &str,
    constraints: &str,
) -> Result<String> {
    let goal = goal.trim();
    if goal.is_empty() {
        return Err(DashError::Composition("target goal must not be empty".into()));
    }

    let readings = client.realtime().await?;
    let latest = LatestReadings::from_readings(&readings);
    let request = CompositionRequest {
        target_goal: goal.to_string(),
        sensor_data: sensor_data(&latest, Local::now()),
        constraints: CompositionRequest::parse_constraints(constraints),
    };

    let composition = client.create_composition(&request).await?;
    info!("Composition '{}' created", composition.title());
    store.save_latest(&composition)?;

    Ok(render_composition_summary(&composition))
}

pub async fn show(source: &CompositionSource, client: &ApiClient, store: &CompositionStore) -> Result<String> {
    let c = source.resolve(client, store).await?;
    let mut out = format!("{}\n", c.title());
    if let Some(created) = &c.created_at {
        let _ = writeln!(out, "created {created}");
    }
    out.push('\n');
    out.push_str(&composition_markdown(&c));
    Ok(out)
}

pub async fn save(source: &CompositionSource, client: &ApiClient, store: &CompositionStore) -> Result<String> {
    let c = source.resolve(client, store).await?;
    client.save_composition(&c).await?;
    Ok(format!("composition {} saved", c.title()))
}

/// A failed validation is reported as [`DashError::Rejected`].
pub async fn validate(source: &CompositionSource, client: &ApiClient, store: &CompositionStore) -> Result<String> {
    let c = source.resolve(client, store).await?;
    let result = client.validate_composition(&c).await?;
    if result.valid {
        Ok("✅ composition is valid".to_string())
    } else {
        Err(DashError::Rejected(format!(
            "validation failed: {}",
            result.message.unwrap_or_default()
        )))
    }
}

/// Run the composition against the real environment. Requires `confirmed`.
pub async fn execute(
    source: &CompositionSource,
    client: &ApiClient,
    store: &CompositionStore,
    confirmed: bool,
) -> Result<String> {
    if !confirmed {
        return Err(DashError::Composition(
            "execution affects the real environment; pass --yes to confirm".into(),
        ));
    }
    let c = source.resolve(client, store).await?;
    let result = client.execute_composition(&c).await?;
    if result.success {
        info!("Composition '{}' executed", c.title());
        Ok("✅ composition executed".to_string())
    } else {
        Err(DashError::Rejected(format!(
            "execution failed: {}",
            result.message.unwrap_or_default()
        )))
    }
}

pub async fn simulate(source: &CompositionSource, client: &ApiClient, store: &CompositionStore) -> Result<String> {
    let c = source.resolve(client, store).await?;
    let result = client.simulate_composition(&c).await?;
    let log = result.simulation_log.map(|l| l.to_string()).unwrap_or_default();
    Ok(format!("simulation finished:\n{log}"))
}

pub async fn history(client: &ApiClient) -> Result<String> {
    let list = client.composition_history().await?;
    Ok(history_table(&list))
}

/// One line per composition: the value to pass as `--id`, title, creation time.
fn history_table(list: &[Composition]) -> String {
    if list.is_empty() {
        return "no compositions yet".to_string();
    }
    let mut out = String::new();
    for c in list {
        let id = c.lookup_id().unwrap_or_else(|| "-".to_string());
        let created = c.created_at.as_deref().unwrap_or("-");
        let _ = writeln!(out, "{id:<12} {:<32} {created}", c.title());
    }
    out
}

fn non_empty(message: String, fallback: &str) -> String {
    if message.is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
