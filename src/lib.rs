//! ROOM : TRACE, a terminal escape-room game.
//!
//! - [`puzzle`] loads rooms and puzzles from JSON and verifies answers.
//! - [`session`] tracks the play-through and saves it to a [`store`].
//! - [`controller`] maps player intents onto both and asks a presenter to redraw.
//! - [`ui`] is the ratatui presenter and input loop.

pub mod audit;
pub mod config;
pub mod controller;
pub mod message;
pub mod puzzle;
pub mod session;
pub mod store;
pub mod text;
pub mod ui;

pub use controller::{Controller, ControllerSettings, Heading, IntentHandler, Presenter};
pub use message::Message;
pub use session::{RestoreOutcome, SessionState, SessionStore};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
