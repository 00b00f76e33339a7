//! Background poller feeding the dashboard.
//!
//! Every tick fetches system status, sensor status, realtime readings and
//! recent events concurrently and forwards each successful result as a
//! [`Message`]. Failed fetches are logged and skipped; they never produce a
//! message, so the chart history only ever sees well-formed samples.

use chrono::Local;
use envdash_api::ApiClient;
use envdash_core::Message;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

/// Spawn a background Tokio task that refreshes from the backend every
/// `interval` and forwards results through the returned channel.
///
/// The first refresh happens immediately. The task stops once the receiver
/// is dropped; an in-flight refresh is abandoned.
pub fn spawn_poller(client: ApiClient, interval: Duration) -> mpsc::Receiver<Message> {
    let (tx, rx) = mpsc::channel(16);

    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        // A slow backend must not cause a burst of catch-up refreshes.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                _ = ticker.tick() => {}
            }

            tokio::select! {
                _ = tx.closed() => break,
                open = refresh(&client, &tx) => {
                    if !open {
                        break;
                    }
                }
            }
        }
        debug!("Poller stopped");
    });

    rx
}

/// Run one refresh cycle, sending every successful result and finally
/// [`Message::RefreshDone`]. Returns `false` if the receiver has gone away.
pub async fn refresh(client: &ApiClient, tx: &mpsc::Sender<Message>) -> bool {
    let (system, sensors, readings, events) = futures::join!(
        client.system_status(),
        client.sensor_status(),
        client.realtime(),
        client.recent_events(),
    );
    let at = Local::now();

    let mut messages = Vec::with_capacity(5);
    match system {
        Ok(s) => messages.push(Message::SystemStatus(s)),
        Err(e) => warn!("Failed to fetch system status: {e}"),
    }
    match sensors {
        Ok(s) => messages.push(Message::SensorStatus(s)),
        Err(e) => warn!("Failed to fetch sensor status: {e}"),
    }
    match readings {
        Ok(readings) => messages.push(Message::Readings { at, readings }),
        Err(e) => warn!("Failed to fetch realtime readings: {e}"),
    }
    match events {
        Ok(e) => messages.push(Message::Events(e)),
        Err(e) => warn!("Failed to fetch recent events: {e}"),
    }
    messages.push(Message::RefreshDone);

    for message in messages {
        if tx.send(message).await.is_err() {
            return false; // receiver dropped
        }
    }
    true
}
