//! Consistency checks between rooms and puzzles, run by `room-trace check`.

use std::fmt;

use crate::puzzle::{PuzzleRegistry, RoomCatalog};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    StartRoomMissing(String),
    /// The door takes answers but nothing can verify them.
    DoorWithoutPuzzle { room: String, door: String },
    ObjectWithoutPuzzle { room: String, object: String, puzzle: String },
    /// Every door is answered through its own puzzle; a room with a door that
    /// takes no answers can never be left.
    SealedDoor { room: String, door: String },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::StartRoomMissing(id) => write!(f, "start room {} is not in the catalog", id),
            Finding::DoorWithoutPuzzle { room, door } => {
                write!(f, "{}: door {} has no puzzle definition", room, door)
            }
            Finding::ObjectWithoutPuzzle { room, object, puzzle } => write!(
                f,
                "{}: object {} points at unknown puzzle {}",
                room, object, puzzle
            ),
            Finding::SealedDoor { room, door } => {
                write!(f, "{}: door {} does not accept answers", room, door)
            }
        }
    }
}

pub fn audit(catalog: &RoomCatalog, puzzles: &PuzzleRegistry, start_room: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    if !catalog.contains(start_room) {
        findings.push(Finding::StartRoomMissing(start_room.to_string()));
    }

    for room in catalog.rooms() {
        if room.door.accepts_answers() {
            if puzzles.lookup(room.door.puzzle_id()).is_none() {
                findings.push(Finding::DoorWithoutPuzzle {
                    room: room.id.clone(),
                    door: room.door.id.clone(),
                });
            }
        } else {
            findings.push(Finding::SealedDoor {
                room: room.id.clone(),
                door: room.door.id.clone(),
            });
        }

        for object in &room.objects {
            if puzzles.lookup(&object.puzzle_id).is_none() {
                findings.push(Finding::ObjectWithoutPuzzle {
                    room: room.id.clone(),
                    object: object.id.clone(),
                    puzzle: object.puzzle_id.clone(),
                });
            }
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reports_every_kind_of_gap() {
        let catalog = RoomCatalog::from_value(
            "test",
            json!({
                "room-01": {
                    "title": "A",
                    "objects": [{"id": "o1", "puzzleId": "ghost", "name": "Ghost"}],
                    "door": {"id": "door-01", "answer": "X"}
                },
                "room-02": {"title": "B", "door": {"id": "door-02"}}
            }),
        )
        .unwrap();
        let puzzles = PuzzleRegistry::new();

        let findings = audit(&catalog, &puzzles, "lobby");
        assert_eq!(findings.len(), 4);
        assert_eq!(findings[0], Finding::StartRoomMissing("lobby".into()));
        assert!(findings.contains(&Finding::SealedDoor {
            room: "room-02".into(),
            door: "door-02".into()
        }));
        assert_eq!(
            findings[1].to_string(),
            "room-01: door door-01 has no puzzle definition"
        );
    }

    #[test]
    fn clean_data_has_no_findings() {
        let catalog = RoomCatalog::from_value(
            "test",
            json!({"room-01": {"title": "A", "door": {"id": "door-01", "answer": "X"}}}),
        )
        .unwrap();
        let mut puzzles = PuzzleRegistry::new();
        puzzles
            .load_value(
                "test",
                json!({"door-01": {"question": "Q", "hint": "H", "correctAnswer": "X"}}),
            )
            .unwrap();
        assert!(audit(&catalog, &puzzles, "room-01").is_empty());
    }
}
