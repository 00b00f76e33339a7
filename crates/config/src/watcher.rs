use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Quiet period after the last filesystem event before a reload is signalled.
const DEBOUNCE: Duration = Duration::from_millis(250);

/// Watches the config file and sends one notification per burst of changes.
///
/// The parent directory is watched rather than the file itself so that
/// editors which save by writing a temporary file and renaming it over the
/// original are still picked up. Dropping the handle stops watching.
pub struct ConfigWatcher {
    task: JoinHandle<()>,
}

impl ConfigWatcher {
    /// Spawn a filesystem watcher for `path`.
    /// Returns the watcher handle and a receiver that fires after every change.
    pub fn spawn(path: impl AsRef<Path>) -> (Self, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel(1);
        let task = tokio::spawn(watch_loop(path.as_ref().to_path_buf(), tx));
        (Self { task }, rx)
    }
}

impl Drop for ConfigWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn watch_loop(path: PathBuf, tx: mpsc::Sender<()>) {
    use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

    let Some(file_name) = path.file_name().map(OsString::from) else {
        error!("Config path '{}' has no file name; not watching", path.display());
        return;
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let (event_tx, mut event_rx) = mpsc::channel::<notify::Result<Event>>(16);

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = event_tx.blocking_send(res);
        },
        Config::default().with_poll_interval(Duration::from_secs(2)),
    ) {
        Ok(w) => w,
        Err(e) => {
            error!("Failed to create filesystem watcher: {e}");
            return;
        }
    };

    if let Err(e) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
        warn!("Cannot watch '{}': {e}; live reload disabled", dir.display());
        return;
    }

    info!("Watching config file: {}", path.display());

    loop {
        let Some(event) = event_rx.recv().await else { break };
        if !touches(&event, &file_name) {
            continue;
        }

        // Swallow the rest of the burst.
        loop {
            match tokio::time::timeout(DEBOUNCE, event_rx.recv()).await {
                Ok(Some(_)) => continue,
                Ok(None) => return,
                Err(_) => break,
            }
        }

        debug!("Config change detected");
        if tx.send(()).await.is_err() {
            break; // receiver dropped
        }
    }
}

/// `true` if `event` modifies, creates or renames the watched file.
fn touches(event: &notify::Result<notify::Event>, file_name: &OsString) -> bool {
    use notify::EventKind::*;
    match event {
        Ok(e) => {
            matches!(e.kind, Modify(_) | Create(_))
                && e.paths.iter().any(|p| p.file_name() == Some(file_name.as_os_str()))
        }
        Err(e) => {
            warn!("Watcher error: {e}");
            false
        }
    }
}
