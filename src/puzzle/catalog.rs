use std::collections::HashMap;

use log::warn;
use serde_json::Value;

use super::loader::LoadError;
use super::types::RoomDefinition;
use crate::text::escape_log;

/// Room definitions in data-file order.
#[derive(Debug, Default, Clone)]
pub struct RoomCatalog {
    rooms: Vec<RoomDefinition>,
    index: HashMap<String, usize>,
}

impl RoomCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object of `roomId -> room`. Key order is kept, and a
    /// room without an inline id takes its key.
    pub fn from_value(source: &str, value: Value) -> Result<Self, LoadError> {
        let Value::Object(entries) = value else {
            return Err(LoadError::Shape {
                path: source.to_string(),
                reason: "rooms must be a JSON object keyed by room id".to_string(),
            });
        };

        let mut catalog = Self::new();
        for (key, entry) in entries {
            let mut room: RoomDefinition =
                serde_json::from_value(entry).map_err(|e| LoadError::Shape {
                    path: source.to_string(),
                    reason: format!("room {}: {}", key, e),
                })?;
            if room.id.is_empty() {
                room.id = key.clone();
            } else if room.id != key {
                warn!(
                    "room keyed {} declares id {}; using the key",
                    escape_log(&key),
                    escape_log(&room.id)
                );
                room.id = key.clone();
            }
            catalog.push(room);
        }
        Ok(catalog)
    }

    /// Returns false when the id is already taken; the existing room wins.
    pub fn push(&mut self, room: RoomDefinition) -> bool {
        if self.index.contains_key(&room.id) {
            return false;
        }
        self.index.insert(room.id.clone(), self.rooms.len());
        self.rooms.push(room);
        true
    }

    /// Appends another catalog, e.g. a room pack. Returns how many rooms were added.
    pub fn extend(&mut self, other: RoomCatalog) -> usize {
        let mut added = 0;
        for room in other.rooms {
            let id = room.id.clone();
            if self.push(room) {
                added += 1;
            } else {
                warn!("duplicate room {} ignored", escape_log(&id));
            }
        }
        added
    }

    pub fn get(&self, room_id: &str) -> Option<&RoomDefinition> {
        self.index.get(room_id).map(|&i| &self.rooms[i])
    }

    pub fn contains(&self, room_id: &str) -> bool {
        self.index.contains_key(room_id)
    }

    pub fn position(&self, room_id: &str) -> Option<usize> {
        self.index.get(room_id).copied()
    }

    /// The room after `room_id` in catalog order. `None` past the last room or
    /// for an id the catalog does not know.
    pub fn successor(&self, room_id: &str) -> Option<&RoomDefinition> {
        let i = self.position(room_id)?;
        self.rooms.get(i + 1)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &RoomDefinition> {
        self.rooms.iter()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn room(title: &str, door: &str) -> Value {
        json!({"title": title, "door": {"id": door, "answer": "x"}})
    }

    #[test]
    fn keeps_file_order_not_alphabetical() {
        let catalog = RoomCatalog::from_value(
            "test",
            json!({"room-b": room("B", "door-b"), "room-a": room("A", "door-a")}),
        )
        .unwrap();
        let ids: Vec<_> = catalog.rooms().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["room-b", "room-a"]);
        assert_eq!(catalog.successor("room-b").unwrap().id, "room-a");
        assert!(catalog.successor("room-a").is_none());
        assert!(catalog.successor("room-zz").is_none());
    }

    #[test]
    fn key_wins_over_inline_id() {
        let catalog = RoomCatalog::from_value(
            "test",
            json!({"room-01": {"id": "other", "title": "T", "door": {"id": "d"}}}),
        )
        .unwrap();
        assert!(catalog.contains("room-01"));
        assert!(!catalog.contains("other"));
    }

    #[test]
    fn bad_room_and_bad_shape_are_errors() {
        assert!(RoomCatalog::from_value("test", json!({"room-01": {"title": "no door"}})).is_err());
        assert!(RoomCatalog::from_value("test", json!(["room-01"])).is_err());
    }

    #[test]
    fn extend_skips_duplicates() {
        let mut base =
            RoomCatalog::from_value("base", json!({"room-01": room("One", "door-01")})).unwrap();
        let pack = RoomCatalog::from_value(
            "pack",
            json!({"room-01": room("Impostor", "door-x"), "room-02": room("Two", "door-02")}),
        )
        .unwrap();
        assert_eq!(base.extend(pack), 1);
        assert_eq!(base.get("room-01").unwrap().title, "One");
        assert_eq!(base.position("room-02"), Some(1));
    }
}
