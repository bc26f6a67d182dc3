use std::path::{Path, PathBuf};

use log::{info, warn};
use serde_json::Value;
use thiserror::Error;

use super::catalog::RoomCatalog;
use super::registry::PuzzleRegistry;
use crate::config::DataConfig;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected data in {path}: {reason}")]
    Shape { path: String, reason: String },

    #[error("bad room pack pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("data loader thread panicked")]
    Worker,
}

pub struct GameData {
    pub rooms: RoomCatalog,
    pub puzzles: PuzzleRegistry,
}

pub fn load_json(path: &Path) -> Result<Value, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| LoadError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Loads rooms and puzzles side by side, then any room packs. Both core files
/// are mandatory; a failure in either aborts the whole load.
pub fn load_all_game_data(data: &DataConfig) -> Result<GameData, LoadError> {
    let rooms_path = data.dir.join(&data.rooms);
    let puzzles_path = data.dir.join(&data.puzzles);
    info!(
        "loading game data from {} and {}",
        rooms_path.display(),
        puzzles_path.display()
    );

    let (rooms, puzzles) = std::thread::scope(|s| {
        let rooms = s.spawn(|| load_json(&rooms_path));
        let puzzles = s.spawn(|| load_json(&puzzles_path));
        (rooms.join(), puzzles.join())
    });
    let rooms = rooms.map_err(|_| LoadError::Worker)??;
    let puzzles = puzzles.map_err(|_| LoadError::Worker)??;

    let mut catalog = RoomCatalog::from_value(&rooms_path.display().to_string(), rooms)?;
    let mut registry = PuzzleRegistry::new();
    registry.load_value(&puzzles_path.display().to_string(), puzzles)?;

    if let Some(pattern) = &data.room_packs {
        for pack in room_pack_paths(&data.dir, pattern)? {
            let source = pack.display().to_string();
            let pack_catalog = RoomCatalog::from_value(&source, load_json(&pack)?)?;
            let added = catalog.extend(pack_catalog);
            info!("room pack {} added {} rooms", source, added);
        }
    }

    info!(
        "game data ready: {} rooms, {} puzzles",
        catalog.len(),
        registry.len()
    );
    Ok(GameData {
        rooms: catalog,
        puzzles: registry,
    })
}

fn room_pack_paths(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, LoadError> {
    let full = dir.join(pattern);
    let mut paths: Vec<PathBuf> = glob::glob(&full.to_string_lossy())?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("skipping unreadable room pack: {}", e);
                None
            }
        })
        .collect();

    // Sort so room_pack_01, room_pack_02, ... append in order
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, rel: &str, body: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    fn data_config(dir: &Path) -> DataConfig {
        DataConfig {
            dir: dir.to_path_buf(),
            ..DataConfig::default()
        }
    }

    const ROOMS: &str = r#"{"room-01": {"title": "One", "door": {"id": "door-01", "answer": "A"}}}"#;
    const PUZZLES: &str = r#"{"door-01": {"question": "Q", "hint": "H", "correctAnswer": "A"}}"#;

    #[test]
    fn loads_core_files_and_packs_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "rooms/basic_rooms.json", ROOMS);
        write(dir.path(), "puzzles/puzzle_definitions.json", PUZZLES);
        write(
            dir.path(),
            "room_packs/room_pack_02.json",
            r#"{"room-03": {"title": "Three", "door": {"id": "door-03"}}}"#,
        );
        write(
            dir.path(),
            "room_packs/room_pack_01.json",
            r#"{"room-02": {"title": "Two", "door": {"id": "door-02"}}}"#,
        );

        let data = load_all_game_data(&data_config(dir.path())).unwrap();
        let ids: Vec<_> = data.rooms.rooms().map(|r| r.id.clone()).collect();
        assert_eq!(ids, ["room-01", "room-02", "room-03"]);
        assert!(data.puzzles.lookup("door-01").is_some());
    }

    #[test]
    fn missing_puzzles_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "rooms/basic_rooms.json", ROOMS);
        let err = load_all_game_data(&data_config(dir.path())).err().unwrap();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn unparseable_rooms_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "rooms/basic_rooms.json", "{ not json");
        write(dir.path(), "puzzles/puzzle_definitions.json", PUZZLES);
        let err = load_all_game_data(&data_config(dir.path())).err().unwrap();
        assert!(matches!(err, LoadError::Parse { .. }));
    }
}
