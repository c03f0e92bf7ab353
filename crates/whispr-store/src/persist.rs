//! Snapshot backends. Implementations are synchronous; the service calls
//! them from a blocking task.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};
use whispr_types::models::Snapshot;

pub trait SnapshotStore: Send + Sync + 'static {
    /// Load the last saved snapshot. A missing store yields an empty snapshot.
    fn load(&self) -> anyhow::Result<Snapshot>;

    /// Replace the stored snapshot.
    fn save(&self, snapshot: &Snapshot) -> anyhow::Result<()>;
}

/// Snapshot kept in memory only. Used by tests and the `memory` backend.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    saved: Mutex<Option<Snapshot>>,
    saves: AtomicUsize,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            saved: Mutex::new(Some(snapshot)),
            saves: AtomicUsize::new(0),
        }
    }

    /// Last saved snapshot, if any save has happened.
    pub fn saved(&self) -> Option<Snapshot> {
        self.saved.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of completed saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Acquire)
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> anyhow::Result<Snapshot> {
        Ok(self.saved().unwrap_or_default())
    }

    fn save(&self, snapshot: &Snapshot) -> anyhow::Result<()> {
        *self.saved.lock().unwrap_or_else(|e| e.into_inner()) = Some(snapshot.clone());
        self.saves.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

/// One JSON document holding every collection.
#[derive(Debug, Clone)]
pub struct JsonSnapshotFile {
    path: PathBuf,
}

impl JsonSnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonSnapshotFile {
    fn load(&self) -> anyhow::Result<Snapshot> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No state file at {}, starting empty", self.path.display());
                return Ok(Snapshot::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()));
            }
        };

        let doc: Value = match serde_json::from_str(&raw) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("State file {} is corrupt, starting empty: {}", self.path.display(), e);
                return Ok(Snapshot::default());
            }
        };

        Ok(Snapshot {
            confessions: parse_entries(&doc, "confessions"),
            crushes: parse_entries(&doc, "crushes"),
            market_items: parse_entries(&doc, "marketItems"),
            comments: parse_entries(&doc, "comments"),
            profiles: parse_entries(&doc, "profiles"),
        })
    }

    fn save(&self, snapshot: &Snapshot) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        let body = serde_json::to_vec(snapshot).context("serializing snapshot")?;

        // Write-then-rename so readers never see a partial file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

/// Parse each array element on its own, dropping the ones that don't fit.
fn parse_entries<T: DeserializeOwned>(doc: &Value, key: &str) -> Vec<T> {
    let Some(entries) = doc.get(key).and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| match serde_json::from_value(entry.clone()) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("Dropping malformed {} entry: {}", key, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use whispr_types::models::Profile;

    fn profile(id: &str) -> Profile {
        Profile {
            id: id.into(),
            alias: "Echo Pulse".into(),
            avatar_index: 1,
            karma: 10,
            confessions_count: 0,
            reactions_given: 0,
            crushes_sent: 0,
            matches_revealed: 0,
            created_at: Utc::now(),
            last_reaction_at: None,
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshotFile::new(dir.path().join("nope.json"));
        let snapshot = store.load().unwrap();
        assert!(snapshot.confessions.is_empty());
        assert!(snapshot.profiles.is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();
        let snapshot = JsonSnapshotFile::new(&path).load().unwrap();
        assert!(snapshot.market_items.is_empty());
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshotFile::new(dir.path().join("nested").join("state.json"));
        let snapshot = Snapshot {
            profiles: vec![profile("p1"), profile("p2")],
            ..Default::default()
        };
        store.save(&snapshot).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.profiles, snapshot.profiles);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn malformed_entries_are_dropped_individually() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let good = serde_json::to_value(profile("p1")).unwrap();
        let doc = serde_json::json!({
            "profiles": [good, {"id": 42}],
            "confessions": "not an array",
        });
        fs::write(&path, doc.to_string()).unwrap();

        let loaded = JsonSnapshotFile::new(&path).load().unwrap();
        assert_eq!(loaded.profiles.len(), 1);
        assert_eq!(loaded.profiles[0].id, "p1");
        assert!(loaded.confessions.is_empty());
    }

    #[test]
    fn memory_store_round_trips() {
        let store = MemorySnapshotStore::new();
        assert!(store.saved().is_none());
        assert_eq!(store.save_count(), 0);
        store
            .save(&Snapshot {
                profiles: vec![profile("p9")],
                ..Default::default()
            })
            .unwrap();
        assert_eq!(store.load().unwrap().profiles[0].id, "p9");
        assert_eq!(store.save_count(), 1);
    }
}
