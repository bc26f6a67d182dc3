//! Game configuration, read from a TOML file.
//!
//! Every field has a default, so an empty file (or none at all with
//! [`Config::load_or_default`]) gives a playable setup:
//!
//! ```toml
//! [data]
//! dir = "data"
//! rooms = "rooms/basic_rooms.json"
//! puzzles = "puzzles/puzzle_definitions.json"
//! room_packs = "room_packs/*.json"
//!
//! [game]
//! start_room = "room-01"
//! advance_delay_ms = 1000
//! message_ms = 3000
//!
//! [storage]
//! save_dir = "saves"
//! save_key = "room_trace_save"
//!
//! [logging]
//! level = "info"
//! file = "room_trace.log"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::session::DEFAULT_SAVE_KEY;
use crate::store::is_valid_key;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub game: GameConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub dir: PathBuf,
    pub rooms: String,
    pub puzzles: String,
    /// Glob relative to `dir`; matching files are appended to the room catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_packs: Option<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            rooms: "rooms/basic_rooms.json".to_string(),
            puzzles: "puzzles/puzzle_definitions.json".to_string(),
            room_packs: Some("room_packs/*.json".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub start_room: String,
    /// Pause between walking through an open door and entering the next room.
    pub advance_delay_ms: u64,
    /// How long transient messages stay on screen.
    pub message_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_room: "room-01".to_string(),
            advance_delay_ms: 1000,
            message_ms: 3000,
        }
    }
}

impl GameConfig {
    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }

    pub fn message_duration(&self) -> Duration {
        Duration::from_millis(self.message_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub save_dir: PathBuf,
    pub save_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from("saves"),
            save_key: DEFAULT_SAVE_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Log destination while the game owns the terminal.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some(PathBuf::from("room_trace.log")),
        }
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> Result<log::LevelFilter> {
        self.level
            .parse()
            .map_err(|_| anyhow!("invalid log level {:?}", self.level))
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            info!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.game.start_room.trim().is_empty() {
            bail!("game.start_room must not be empty");
        }
        if !is_valid_key(&self.storage.save_key) {
            bail!(
                "storage.save_key {:?} may only contain letters, digits, '-' and '_'",
                self.storage.save_key
            );
        }
        self.logging.level_filter()?;
        Ok(())
    }

    /// Writes the default configuration. Refuses to overwrite an existing file.
    pub fn write_default(path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if path.exists() {
            bail!("{} already exists", path.display());
        }
        let body = toml::to_string_pretty(&Self::default())?;
        let content = format!("# ROOM : TRACE configuration\n\n{}", body);
        std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}
