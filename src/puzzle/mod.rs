pub mod catalog;
pub mod loader;
pub mod registry;
pub mod types;

pub use catalog::RoomCatalog;
pub use loader::{load_all_game_data, load_json, GameData, LoadError};
pub use registry::{PuzzleRegistry, Verdict};
pub use types::{Door, Position, PuzzleDefinition, RoomDefinition, RoomObject, Size};
