//! Application state: the record store and the façades over it

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use grandview_core::{
    HousekeepingService, InMemoryGateway, Notifier, Result, RoomService, StoreSnapshot,
    TracingNotifier,
};
use tracing::{debug, info};

use crate::config::Config;

/// Main application state
pub struct AppState {
    store: Arc<InMemoryGateway>,
    snapshot_path: Option<PathBuf>,
    pub rooms: RoomService,
    pub housekeeping: HousekeepingService,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        let snapshot_path = config.snapshot_path();
        let snapshot = match &snapshot_path {
            Some(path) => load_snapshot(path)?,
            None => StoreSnapshot::new(),
        };

        Ok(Self::with_store(
            Arc::new(InMemoryGateway::from_snapshot(snapshot)),
            Arc::new(TracingNotifier),
            config,
            snapshot_path,
        ))
    }

    pub fn with_store(
        store: Arc<InMemoryGateway>,
        notifier: Arc<dyn Notifier>,
        config: &Config,
        snapshot_path: Option<PathBuf>,
    ) -> Self {
        let options = config.facade_options();
        Self {
            rooms: RoomService::new(store.clone(), notifier.clone())
                .with_options(options.clone()),
            housekeeping: HousekeepingService::new(store.clone(), notifier)
                .with_options(options),
            store,
            snapshot_path,
        }
    }

    /// Write the store back to the snapshot file, if there is one
    pub async fn persist(&self) -> Result<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        save_snapshot(path, &self.store.snapshot().await)?;
        info!(path = %path.display(), "Store saved");
        Ok(())
    }
}

/// Read a snapshot; a missing file is an empty store
pub fn load_snapshot(path: &Path) -> Result<StoreSnapshot> {
    if !path.exists() {
        debug!(path = %path.display(), "No snapshot, starting empty");
        return Ok(StoreSnapshot::new());
    }
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

pub fn save_snapshot(path: &Path, snapshot: &StoreSnapshot) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(snapshot)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grandview_core::{Collection, RecordId, RecordingNotifier, RoomStatus};
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_missing_snapshot_is_empty() {
        let dir = TempDir::new().unwrap();
        let snapshot = load_snapshot(&dir.path().join("store.json")).unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_corrupt_snapshot_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{not json").unwrap();
        assert!(load_snapshot(&path).is_err());
    }

    #[tokio::test]
    async fn test_persist_round_trips_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let mut snapshot = StoreSnapshot::new();
        snapshot.insert(
            Collection::Rooms,
            vec![json!({"Id": 1, "room_number_c": "101", "status_c": "Available"})
                .as_object()
                .cloned()
                .unwrap()],
        );
        save_snapshot(&path, &snapshot).unwrap();

        let store = Arc::new(InMemoryGateway::from_snapshot(load_snapshot(&path).unwrap()));
        let state = AppState::with_store(
            store,
            Arc::new(RecordingNotifier::new()),
            &Config::default(),
            Some(path.clone()),
        );
        state
            .rooms
            .set_status(RecordId(1), RoomStatus::Cleaning)
            .await
            .unwrap();
        state.persist().await.unwrap();

        let reloaded = load_snapshot(&path).unwrap();
        let rooms = &reloaded[&Collection::Rooms];
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0]["status_c"], "Cleaning");
    }
}
