//! State persistence
//!
//! The store mirrors its full state to durable storage after every mutation
//! and reads it back once at startup. The in-memory state is the source of
//! truth; storage is a write-behind mirror, so a failing backend degrades the
//! session to memory-only rather than failing any operation.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::types::StoreState;

/// Durable storage for the persisted state document
pub trait StorageBackend {
    /// Read the previously saved state, or `None` on first launch.
    fn load(&self) -> Result<Option<StoreState>, StoreError>;

    /// Replace the saved state with a full serialization of `state`.
    fn save(&mut self, state: &StoreState) -> Result<(), StoreError>;
}

/// Single-file JSON storage, one document per store
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for JsonFileStorage {
    fn load(&self) -> Result<Option<StoreState>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)?;
        let state = serde_json::from_str(&json)?;
        Ok(Some(state))
    }

    fn save(&mut self, state: &StoreState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string(state)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// In-memory storage for tests and throwaway sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    saved: Option<StoreState>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the backend with a pre-existing state, as if saved by a prior run.
    pub fn with_state(state: StoreState) -> Self {
        Self { saved: Some(state) }
    }

    pub fn saved(&self) -> Option<&StoreState> {
        self.saved.as_ref()
    }
}

impl StorageBackend for MemoryStorage {
    fn load(&self) -> Result<Option<StoreState>, StoreError> {
        Ok(self.saved.clone())
    }

    fn save(&mut self, state: &StoreState) -> Result<(), StoreError> {
        self.saved = Some(state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{default_color, ChartType, CounterMode, Graph};
    use pretty_assertions::assert_eq;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("graphtrack-{}-{}.json", name, uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_file_storage_first_launch_is_empty() {
        let storage = JsonFileStorage::new(temp_path("missing"));
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_file_storage_round_trip() {
        let path = temp_path("round-trip");
        let mut storage = JsonFileStorage::new(&path);

        let mut state = StoreState::default();
        state
            .graphs
            .push(Graph::new("Water", ChartType::Bar, default_color()));
        state.counter = 5;
        state.counter_mode = CounterMode::Target;

        storage.save(&state).unwrap();
        let loaded = storage.load().unwrap().unwrap();
        assert_eq!(loaded, state);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_file_storage_reads_legacy_document() {
        // A document from a release without counterMode or the optional
        // graph display fields
        let path = temp_path("legacy");
        fs::write(
            &path,
            r#"{
                "graphs": [
                    {"id": "g1", "name": "Mood", "values": [3.0, 4.0], "chartType": "line"}
                ],
                "counter": 2,
                "targetMaxCounter": 0
            }"#,
        )
        .unwrap();

        let storage = JsonFileStorage::new(&path);
        let state = storage.load().unwrap().unwrap();
        assert_eq!(state.counter_mode, CounterMode::All);
        assert_eq!(state.graphs[0].color, crate::types::GRAPH_COLORS[0]);
        assert!(state.graphs[0].show_grid);
        assert_eq!(state.graphs[0].avg_window_size, 1);
        assert_eq!(state.counter, 2);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_memory_storage_round_trip() {
        let mut storage = MemoryStorage::new();
        assert!(storage.load().unwrap().is_none());

        let state = StoreState {
            counter: 7,
            ..StoreState::default()
        };
        storage.save(&state).unwrap();
        assert_eq!(storage.load().unwrap().unwrap().counter, 7);
    }
}
