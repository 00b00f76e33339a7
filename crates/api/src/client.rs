use crate::composition::{
    Composition, ExecutionResult, SaveResult, SimulationResult, ValidationResult,
};
use crate::wire::{
    sensor_rows, ActionResponse, CompositionRequest, EventWire, Observation, SensorStatusWire,
    SystemStatusWire,
};
use envdash_config::BackendConfig;
use envdash_core::{
    state::{EventEntry, SensorStatus, SystemStatus},
    ChannelReading, DashError, Result,
};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// Client for the smart-environment backend REST API.
///
/// Requests are made with a blocking `ureq` agent on tokio's blocking pool,
/// so every method is `async` and safe to call from the runtime. Cloning is
/// cheap; clones share the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    agent:    ureq::Agent,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").field("base_url", &self.base_url).finish()
    }
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { base_url, agent }
    }

    pub fn from_config(cfg: &BackendConfig) -> Self {
        Self::new(cfg.base_url.clone(), Duration::from_millis(cfg.timeout_ms))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── System ────────────────────────────────────────────────────────────────

    pub async fn system_status(&self) -> Result<SystemStatus> {
        let wire: SystemStatusWire = self.get("/api/system/status").await?.decode()?;
        Ok(wire.into())
    }

    /// Start data collection. Returns the backend's confirmation message.
    pub async fn start_system(&self) -> Result<String> {
        let resp: ActionResponse = self.post_empty("/api/system/start").await?.decode_verdict("status")?;
        resp.into_result()
    }

    /// Stop data collection. Returns the backend's confirmation message.
    pub async fn stop_system(&self) -> Result<String> {
        let resp: ActionResponse = self.post_empty("/api/system/stop").await?.decode_verdict("status")?;
        resp.into_result()
    }

    // ── Sensors & events ──────────────────────────────────────────────────────

    pub async fn realtime(&self) -> Result<Vec<ChannelReading>> {
        let observations: Vec<Observation> = self.get("/api/sensors/realtime").await?.decode()?;
        Ok(observations.into_iter().map(Observation::into_reading).collect())
    }

    pub async fn sensor_status(&self) -> Result<Vec<SensorStatus>> {
        let map: BTreeMap<String, SensorStatusWire> = self.get("/api/sensors/status").await?.decode()?;
        Ok(sensor_rows(map))
    }

    pub async fn recent_events(&self) -> Result<Vec<EventEntry>> {
        let events: Vec<EventWire> = self.get("/api/events/recent").await?.decode()?;
        Ok(events.into_iter().map(EventEntry::from).collect())
    }

    pub async fn available_services(&self) -> Result<serde_json::Value> {
        self.get("/api/services/available").await?.decode()
    }

    // ── Compositions ──────────────────────────────────────────────────────────

    pub async fn create_composition(&self, request: &CompositionRequest) -> Result<Composition> {
        let c: Composition = self
            .post("/api/compositions/create", request)
            .await?
            .decode_verdict("error")?;
        c.into_checked()
    }

    pub async fn composition_history(&self) -> Result<Vec<Composition>> {
        self.get("/api/compositions/history").await?.decode()
    }

    pub async fn load_composition(&self, id: &str) -> Result<Composition> {
        let path = format!("/api/compositions/{}", urlencoding::encode(id));
        let c: Composition = self.get(&path).await?.decode_verdict("error")?;
        c.into_checked()
    }

    pub async fn save_composition(&self, composition: &Composition) -> Result<()> {
        let r: SaveResult = self
            .post("/api/compositions/save", composition)
            .await?
            .decode_verdict("error")?;
        match r.error {
            Some(e) => Err(DashError::Composition(e)),
            None => Ok(()),
        }
    }

    pub async fn validate_composition(&self, composition: &Composition) -> Result<ValidationResult> {
        self.post("/api/compositions/validate", composition).await?.decode()
    }

    pub async fn execute_composition(&self, composition: &Composition) -> Result<ExecutionResult> {
        self.post("/api/compositions/execute", composition).await?.decode()
    }

    pub async fn simulate_composition(&self, composition: &Composition) -> Result<SimulationResult> {
        self.post("/api/compositions/simulate", composition).await?.decode()
    }

    // ── Transport ─────────────────────────────────────────────────────────────

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get(&self, path: &str) -> Result<Reply> {
        let url = self.url(path);
        let agent = self.agent.clone();
        debug!("GET {url}");
        let path = path.to_string();
        blocking(move || read_reply(path, agent.get(&url).call())).await
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Reply> {
        let payload = serde_json::to_string(body)
            .map_err(|e| DashError::Decode(format!("encode {path}: {e}")))?;
        self.send_post(path, payload).await
    }

    async fn post_empty(&self, path: &str) -> Result<Reply> {
        self.send_post(path, String::new()).await
    }

    async fn send_post(&self, path: &str, payload: String) -> Result<Reply> {
        let url = self.url(path);
        let agent = self.agent.clone();
        debug!("POST {url}");
        let path = path.to_string();
        blocking(move || {
            let request = agent.post(&url);
            let response = if payload.is_empty() {
                request.call()
            } else {
                request
                    .set("Content-Type", "application/json")
                    .send_string(&payload)
            };
            read_reply(path, response)
        })
        .await
    }
}

async fn blocking<F, R>(f: F) -> Result<R>
where
    F: FnOnce() -> Result<R> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DashError::Transport(format!("request task failed: {e}")))?
}

/// A completed exchange: any HTTP status, body read to the end.
#[derive(Debug)]
struct Reply {
    path:   String,
    url:    String,
    status: u16,
    body:   String,
}

impl Reply {
    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode a 2xx body; any other status is [`DashError::Http`].
    fn decode<T: DeserializeOwned>(self) -> Result<T> {
        if self.is_success() {
            self.parse()
        } else {
            Err(self.into_http_error())
        }
    }

    /// Like [`Reply::decode`], but an error status whose JSON body carries
    /// `key` is still decoded, leaving the verdict to the typed response.
    fn decode_verdict<T: DeserializeOwned>(self, key: &str) -> Result<T> {
        if self.is_success() || has_key(&self.body, key) {
            self.parse()
        } else {
            Err(self.into_http_error())
        }
    }

    fn parse<T: DeserializeOwned>(self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| DashError::Decode(format!("{}: {e}", self.path)))
    }

    fn into_http_error(self) -> DashError {
        DashError::Http {
            body:   error_message(&self.body),
            url:    self.url,
            status: self.status,
        }
    }
}

fn read_reply(path: String, response: std::result::Result<ureq::Response, ureq::Error>) -> Result<Reply> {
    let resp = match response {
        Ok(resp) | Err(ureq::Error::Status(_, resp)) => resp,
        // The transport error already names the URL.
        Err(ureq::Error::Transport(t)) => return Err(DashError::Transport(t.to_string())),
    };
    let status = resp.status();
    let url = resp.get_url().to_string();
    let body = resp
        .into_string()
        .map_err(|e| DashError::Transport(format!("{url}: {e}")))?;
    Ok(Reply {
        path,
        url,
        status,
        body,
    })
}

fn has_key(body: &str, key: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .is_some_and(|v| v.get(key).is_some())
}

/// Pull `error` / `message` out of a JSON error body, else return it as-is.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["error", "message"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalised() {
        let c = ApiClient::new("http://localhost:5000/", Duration::from_secs(1));
        assert_eq!(c.url("/api/system/status"), "http://localhost:5000/api/system/status");
    }

    fn reply(status: u16, body: &str) -> Reply {
        Reply {
            path: "/api/test".into(),
            url: "http://localhost:5000/api/test".into(),
            status,
            body: body.into(),
        }
    }

    #[test]
    fn error_status_with_verdict_is_decoded() {
        let resp: ActionResponse = reply(500, r#"{"status":"error","message":"already running"}"#)
            .decode_verdict("status")
            .unwrap();
        assert!(matches!(resp.into_result(), Err(DashError::Rejected(m)) if m == "already running"));

        let c: Composition = reply(500, r#"{"error":"LLM unavailable"}"#).decode_verdict("error").unwrap();
        assert!(matches!(c.into_checked(), Err(DashError::Composition(m)) if m == "LLM unavailable"));
    }

    #[test]
    fn error_status_without_verdict_stays_http() {
        let err = reply(500, "Internal Server Error")
            .decode_verdict::<Composition>("error")
            .unwrap_err();
        assert!(matches!(err, DashError::Http { status: 500, ref body, .. } if body == "Internal Server Error"));

        // A plain decode never trusts an error status, even with a JSON body.
        let err = reply(503, r#"{"error":"busy"}"#).decode::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, DashError::Http { status: 503, .. }));
    }

    #[test]
    fn error_body_message() {
        assert_eq!(error_message(r#"{"status":"error","message":"already running"}"#), "already running");
        assert_eq!(error_message(r#"{"error":"bad goal"}"#), "bad goal");
        assert_eq!(error_message("Internal Server Error\n"), "Internal Server Error");
    }
}
