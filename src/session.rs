//! Play-through state and its persistence.
//!
//! The saved blob is the JSON form of [`SessionState`]:
//!
//! ```json
//! {"currentRoomId": "room-02", "inventory": [],
//!  "solvedPuzzles": {"door-01": true}, "unlockedDoors": {"door-01": true},
//!  "roomSpecificData": {}}
//! ```
//!
//! Restoring merges the stored top-level fields over a fresh default state,
//! one field at a time. A field missing from an older save keeps its default;
//! nested values are never merged.

use std::collections::BTreeSet;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::store::{KeyValueStore, StoreError};
use crate::text::escape_log;

pub const DEFAULT_SAVE_KEY: &str = "room_trace_save";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("could not encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub current_room_id: String,
    pub inventory: Vec<Value>,
    #[serde(with = "flag_set")]
    pub solved_puzzles: BTreeSet<String>,
    #[serde(with = "flag_set")]
    pub unlocked_doors: BTreeSet<String>,
    pub room_specific_data: Map<String, Value>,
    /// Top-level fields this version does not know. Kept so that saving
    /// again writes them back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionState {
    pub fn new(start_room: &str) -> Self {
        Self {
            current_room_id: start_room.to_string(),
            inventory: Vec::new(),
            solved_puzzles: BTreeSet::new(),
            unlocked_doors: BTreeSet::new(),
            room_specific_data: Map::new(),
            extra: Map::new(),
        }
    }
}

/// Sets are stored as `{id: true}` maps. Only a literal `true` counts; any
/// other value means not set and is dropped on load.
mod flag_set {
    use std::collections::{BTreeMap, BTreeSet};

    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(set: &BTreeSet<String>, s: S) -> Result<S::Ok, S::Error> {
        s.collect_map(set.iter().map(|id| (id, true)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeSet<String>, D::Error> {
        let flags = BTreeMap::<String, Value>::deserialize(d)?;
        Ok(flags
            .into_iter()
            .filter_map(|(id, flag)| (flag == Value::Bool(true)).then_some(id))
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    Found,
    NotFound,
    /// The stored bytes could not be turned into a session; nothing was applied.
    Corrupt(String),
}

pub struct SessionStore<S: KeyValueStore> {
    state: SessionState,
    store: S,
    key: String,
    start_room: String,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S, key: impl Into<String>, start_room: impl Into<String>) -> Self {
        let start_room = start_room.into();
        Self {
            state: SessionState::new(&start_room),
            store,
            key: key.into(),
            start_room,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn start_room(&self) -> &str {
        &self.start_room
    }

    pub fn current_room(&self) -> &str {
        &self.state.current_room_id
    }

    /// No catalog check here; the controller only passes ids it took from the catalog.
    pub fn set_current_room(&mut self, room_id: &str) {
        debug!(
            "current room {} -> {}",
            escape_log(&self.state.current_room_id),
            escape_log(room_id)
        );
        self.state.current_room_id = room_id.to_string();
    }

    pub fn is_puzzle_solved(&self, puzzle_id: &str) -> bool {
        self.state.solved_puzzles.contains(puzzle_id)
    }

    pub fn mark_puzzle_solved(&mut self, puzzle_id: &str) {
        if self.state.solved_puzzles.insert(puzzle_id.to_string()) {
            info!("puzzle solved: {}", escape_log(puzzle_id));
        }
    }

    pub fn is_door_unlocked(&self, door_id: &str) -> bool {
        self.state.unlocked_doors.contains(door_id)
    }

    pub fn unlock_door(&mut self, door_id: &str) {
        if self.state.unlocked_doors.insert(door_id.to_string()) {
            info!("door unlocked: {}", escape_log(door_id));
        }
    }

    pub fn persist(&mut self) -> Result<(), SessionError> {
        let bytes = serde_json::to_vec(&self.state)?;
        self.store.set(&self.key, &bytes)?;
        info!("session saved under {} ({} bytes)", self.key, bytes.len());
        Ok(())
    }

    pub fn restore(&mut self) -> Result<RestoreOutcome, StoreError> {
        let Some(bytes) = self.store.get(&self.key)? else {
            debug!("no saved session under {}", self.key);
            return Ok(RestoreOutcome::NotFound);
        };

        match self.merge_over_defaults(&bytes) {
            Ok(state) => {
                self.state = state;
                info!(
                    "session restored: room {}, {} solved, {} unlocked",
                    escape_log(&self.state.current_room_id),
                    self.state.solved_puzzles.len(),
                    self.state.unlocked_doors.len()
                );
                Ok(RestoreOutcome::Found)
            }
            Err(reason) => {
                warn!("saved session under {} is corrupt: {}", self.key, reason);
                Ok(RestoreOutcome::Corrupt(reason))
            }
        }
    }

    fn merge_over_defaults(&self, bytes: &[u8]) -> Result<SessionState, String> {
        let loaded: Value = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
        let Value::Object(loaded) = loaded else {
            return Err("saved session is not a JSON object".to_string());
        };

        let mut merged = match serde_json::to_value(SessionState::new(&self.start_room)) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err("default session did not encode as an object".to_string()),
            Err(e) => return Err(e.to_string()),
        };
        for (field, value) in loaded {
            merged.insert(field, value);
        }

        serde_json::from_value(Value::Object(merged)).map_err(|e| e.to_string())
    }

    /// The in-memory reset always happens; the returned error only concerns the stored copy.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        info!("resetting session to {}", escape_log(&self.start_room));
        self.state = SessionState::new(&self.start_room);
        self.store.remove(&self.key)
    }
}
