#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use room_trace::config::DataConfig;
use room_trace::puzzle::{load_all_game_data, GameData, RoomDefinition};
use room_trace::{Controller, ControllerSettings, KeyValueStore, Message, Presenter, SessionStore};

pub const ROOMS: &str = r#"{
    "room-01": {
        "title": "Interrogation Room",
        "description": "A single bulb swings overhead.",
        "objects": [
            {"id": "obj-ledger", "puzzleId": "clue-ledger", "name": "Ledger"}
        ],
        "door": {"id": "door-01", "answer": "GOLD"}
    },
    "room-02": {
        "title": "Records Hall",
        "door": {"id": "door-02", "answer": "ECHO"}
    }
}"#;

pub const PUZZLES: &str = r#"{
    "door-01": {"question": "Q", "hint": "H", "correctAnswer": "GOLD"},
    "door-02": {"question": "What answers back?", "hint": "Shout", "correctAnswer": "echo"},
    "clue-ledger": {"question": "Which metal is listed twice?", "hint": "It glitters", "correctAnswer": "gold"}
}"#;

/// Presenter that remembers everything it was asked to show.
#[derive(Default)]
pub struct Recorder {
    pub rendered: Vec<(String, bool)>,
    pub messages: Vec<Message>,
}

impl Recorder {
    pub fn last_message(&self) -> &Message {
        self.messages.last().expect("no message shown")
    }
}

impl Presenter for Recorder {
    fn render_room(&mut self, room: &RoomDefinition, door_unlocked: bool) {
        self.rendered.push((room.id.clone(), door_unlocked));
    }

    fn show_message(&mut self, message: Message) {
        self.messages.push(message);
    }
}

pub fn write_data(dir: &Path, rooms: &str, puzzles: &str) -> DataConfig {
    std::fs::create_dir_all(dir.join("rooms")).unwrap();
    std::fs::create_dir_all(dir.join("puzzles")).unwrap();
    std::fs::write(dir.join("rooms/basic_rooms.json"), rooms).unwrap();
    std::fs::write(dir.join("puzzles/puzzle_definitions.json"), puzzles).unwrap();
    DataConfig {
        dir: dir.to_path_buf(),
        ..DataConfig::default()
    }
}

pub fn game_data(dir: &Path) -> GameData {
    load_all_game_data(&write_data(dir, ROOMS, PUZZLES)).unwrap()
}

pub fn instant_settings() -> ControllerSettings {
    ControllerSettings {
        advance_delay: Duration::ZERO,
        ..ControllerSettings::default()
    }
}

pub fn start<S: KeyValueStore>(data: GameData, session: SessionStore<S>) -> Controller<S, Recorder> {
    Controller::start(data, session, Recorder::default(), instant_settings()).unwrap()
}
