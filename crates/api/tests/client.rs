use std::collections::HashMap;
use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use envdash_api::{ApiClient, Composition, CompositionRequest};
use envdash_core::{Channel, DashError};
use serde_json::json;
use tiny_http::{Header, Response, Server};

type Recorded = Arc<Mutex<Vec<(String, String, String)>>>;

/// Canned backend answering `(method, url)` pairs with `(status, body)`.
struct MockBackend {
    server:   Arc<Server>,
    base:     String,
    requests: Recorded,
    worker:   Option<thread::JoinHandle<()>>,
}

impl MockBackend {
    fn start(routes: &[(&str, &str, u16, serde_json::Value)]) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("bind mock backend"));
        let port = server
            .server_addr()
            .to_ip()
            .expect("tcp listener")
            .port();
        let routes: HashMap<(String, String), (u16, String)> = routes
            .iter()
            .map(|(m, u, s, b)| ((m.to_string(), u.to_string()), (*s, b.to_string())))
            .collect();
        let requests: Recorded = Arc::default();

        let worker = {
            let server = Arc::clone(&server);
            let requests = Arc::clone(&requests);
            thread::spawn(move || {
                for mut request in server.incoming_requests() {
                    let method = request.method().to_string();
                    let url = request.url().to_string();
                    let mut body = String::new();
                    let _ = request.as_reader().read_to_string(&mut body);
                    requests.lock().unwrap().push((method.clone(), url.clone(), body));

                    let (status, payload) = routes
                        .get(&(method, url))
                        .cloned()
                        .unwrap_or((404, r#"{"error":"not found"}"#.to_string()));
                    let response = Response::from_string(payload)
                        .with_status_code(status)
                        .with_header(
                            Header::from_bytes("Content-Type", "application/json").unwrap(),
                        );
                    let _ = request.respond(response);
                }
            })
        };

        Self {
            server,
            base: format!("http://127.0.0.1:{port}"),
            requests,
            worker: Some(worker),
        }
    }

    fn client(&self) -> ApiClient {
        ApiClient::new(self.base.clone(), Duration::from_secs(5))
    }

    fn recorded(&self) -> Vec<(String, String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[tokio::test]
async fn realtime_readings_are_tagged() {
    let backend = MockBackend::start(&[(
        "GET",
        "/api/sensors/realtime",
        200,
        json!([
            { "madeBySensor": "ssn:TemperatureSensor_01", "hasResult": { "value": 24.5, "unit": "°C" } },
            { "madeBySensor": "ssn:LightSensor_01", "hasResult": { "value": 412, "unit": "lux" } },
            { "madeBySensor": "ssn:DoorContact", "hasResult": { "value": 1, "unit": "" } }
        ]),
    )]);

    let readings = backend.client().realtime().await.unwrap();
    let channels: Vec<Option<Channel>> = readings.iter().map(|r| r.channel).collect();
    assert_eq!(channels, vec![Some(Channel::Temperature), Some(Channel::Light), None]);
    assert_eq!(readings[1].value, 412.0);
}

#[tokio::test]
async fn system_status_and_start() {
    let backend = MockBackend::start(&[
        (
            "GET",
            "/api/system/status",
            200,
            json!({
                "running": true,
                "uptime": "0天 01:02:03",
                "total_events_processed": 17,
                "total_compositions_created": 2,
                "collector_stats": {}
            }),
        ),
        ("POST", "/api/system/start", 200, json!({ "status": "success", "message": "started" })),
        ("POST", "/api/system/stop", 500, json!({ "status": "error", "message": "collector stuck" })),
    ]);
    let client = backend.client();

    let status = client.system_status().await.unwrap();
    assert!(status.running);
    assert_eq!(status.events_processed, 17);
    assert_eq!(status.compositions_created, 2);

    assert_eq!(client.start_system().await.unwrap(), "started");

    // The backend reports refusals as HTTP 500 with a `{status, message}` body.
    match client.stop_system().await {
        Err(DashError::Rejected(message)) => assert_eq!(message, "collector stuck"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn error_status_bodies_carry_the_backend_verdict() {
    let backend = MockBackend::start(&[
        ("POST", "/api/compositions/create", 500, json!({ "error": "LLM unavailable" })),
        ("POST", "/api/system/start", 500, json!({ "status": "error", "message": "already running" })),
        ("GET", "/api/system/status", 502, json!({ "error": "bad gateway" })),
    ]);
    let client = backend.client();
    let request = CompositionRequest {
        target_goal: "save energy".into(),
        sensor_data: serde_json::Map::new(),
        constraints: Vec::new(),
    };

    let err = client.create_composition(&request).await.unwrap_err();
    assert!(matches!(err, DashError::Composition(ref m) if m == "LLM unavailable"), "{err}");

    let err = client.start_system().await.unwrap_err();
    assert!(matches!(err, DashError::Rejected(ref m) if m == "already running"), "{err}");

    // Endpoints without an error field in their schema keep the HTTP status.
    let err = client.system_status().await.unwrap_err();
    assert!(matches!(err, DashError::Http { status: 502, ref body, .. } if body == "bad gateway"), "{err}");
}

#[tokio::test]
async fn unknown_route_is_an_http_error() {
    let backend = MockBackend::start(&[]);
    let err = backend.client().composition_history().await.unwrap_err();
    assert!(matches!(err, DashError::Http { status: 404, .. }), "{err}");
}

#[tokio::test]
async fn sensor_status_and_events() {
    let backend = MockBackend::start(&[
        (
            "GET",
            "/api/sensors/status",
            200,
            json!({ "ssn:Humidity_01": { "最新值": 48.2, "趋势": "stable", "状态": "normal" } }),
        ),
        (
            "GET",
            "/api/events/recent",
            200,
            json!([{ "eventType": "HighTemperature", "description": "too hot", "timestamp": "2025-06-15T20:45:55" }]),
        ),
    ]);
    let client = backend.client();

    let sensors = client.sensor_status().await.unwrap();
    assert_eq!(sensors.len(), 1);
    assert_eq!(sensors[0].display_name(), "Humidity_01");
    assert_eq!(sensors[0].latest_value.as_deref(), Some("48.2"));

    let events = client.recent_events().await.unwrap();
    assert_eq!(events[0].kind, "HighTemperature");
    assert!(events[0].time.is_some());
}

#[tokio::test]
async fn create_composition_posts_request_body() {
    let backend = MockBackend::start(&[(
        "POST",
        "/api/compositions/create",
        200,
        json!({ "composition_id": "comp_1", "workflow": "cool the room" }),
    )]);
    let request = CompositionRequest {
        target_goal: "keep the room cool".into(),
        sensor_data: serde_json::Map::new(),
        constraints: vec!["quiet".into()],
    };

    let composition = backend.client().create_composition(&request).await.unwrap();
    assert_eq!(composition.title(), "comp_1");

    let recorded = backend.recorded();
    let (_, _, body) = &recorded[0];
    let sent: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(sent["target_goal"], "keep the room cool");
    assert_eq!(sent["constraints"], json!(["quiet"]));
}

#[tokio::test]
async fn composition_error_payload() {
    let backend = MockBackend::start(&[(
        "GET",
        "/api/compositions/comp%2042",
        200,
        json!({ "error": "no such composition" }),
    )]);

    let err = backend.client().load_composition("comp 42").await.unwrap_err();
    assert!(matches!(err, DashError::Composition(ref m) if m == "no such composition"), "{err}");
}

#[tokio::test]
async fn composition_actions() {
    let backend = MockBackend::start(&[
        ("POST", "/api/compositions/save", 200, json!({ "status": "saved" })),
        ("POST", "/api/compositions/validate", 200, json!({ "valid": false, "message": "missing service" })),
        ("POST", "/api/compositions/execute", 200, json!({ "success": true })),
        ("POST", "/api/compositions/simulate", 200, json!({ "simulation_log": ["step 1 ok", "step 2 ok"] })),
    ]);
    let client = backend.client();
    let composition: Composition =
        serde_json::from_value(json!({ "composition_id": "comp_9", "custom": 1 })).unwrap();

    client.save_composition(&composition).await.unwrap();

    let validation = client.validate_composition(&composition).await.unwrap();
    assert!(!validation.valid);
    assert_eq!(validation.message.as_deref(), Some("missing service"));

    assert!(client.execute_composition(&composition).await.unwrap().success);

    let simulation = client.simulate_composition(&composition).await.unwrap();
    assert_eq!(
        simulation.simulation_log.map(|l| l.to_string()).as_deref(),
        Some("step 1 ok\nstep 2 ok")
    );

    // The composition goes back exactly as it was received.
    for (_, _, body) in backend.recorded() {
        let sent: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(sent, json!({ "composition_id": "comp_9", "custom": 1 }));
    }
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let client = ApiClient::new(format!("http://127.0.0.1:{port}"), Duration::from_secs(2));
    let err = client.system_status().await.unwrap_err();
    assert!(matches!(err, DashError::Transport(_)), "{err}");
    // The URL is named once.
    let message = err.to_string();
    assert_eq!(message.matches("/api/system/status").count(), 1, "{message}");
}
