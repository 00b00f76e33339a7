use envdash_api::Composition;
use envdash_core::{DashError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

const LATEST_FILE: &str = "latest_composition.json";

/// Remembers the most recently created composition between invocations so
/// that `composition validate` and friends work without an explicit id.
#[derive(Debug, Clone)]
pub struct CompositionStore {
    dir: PathBuf,
}

impl CompositionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under `$XDG_STATE_HOME/envdash`.
    pub fn default_location() -> Self {
        Self::new(envdash_config::state_dir())
    }

    pub fn latest_path(&self) -> PathBuf {
        self.dir.join(LATEST_FILE)
    }

    pub fn save_latest(&self, composition: &Composition) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(composition)
            .map_err(|e| DashError::Decode(format!("encode composition: {e}")))?;
        let path = self.latest_path();
        std::fs::write(&path, json)?;
        debug!("Stored latest composition at {}", path.display());
        Ok(())
    }

    pub fn load_latest(&self) -> Result<Composition> {
        let path = self.latest_path();
        if !path.exists() {
            return Err(DashError::Composition(
                "no composition stored yet; run `envdash compose` first".into(),
            ));
        }
        read_composition(&path)
    }
}

/// Read a composition from a JSON file.
pub fn read_composition(path: &Path) -> Result<Composition> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|e| DashError::Decode(format!("'{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CompositionStore::new(dir.path().join("nested"));
        assert!(matches!(store.load_latest(), Err(DashError::Composition(_))));

        let c: Composition =
            serde_json::from_value(serde_json::json!({ "composition_id": "comp_5", "x": [1, 2] }))
                .unwrap();
        store.save_latest(&c).unwrap();
        assert_eq!(store.load_latest().unwrap(), c);
    }

    #[test]
    fn unreadable_json_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(read_composition(&path), Err(DashError::Decode(_))));
    }
}
