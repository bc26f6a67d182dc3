//! Game flow: turns player intents into session and registry operations,
//! then redraws the current room.
//!
//! The controller owns every piece of game state. Nothing is global; a test
//! builds a fresh controller with an in-memory store and a recording presenter.

use std::time::{Duration, Instant};

use log::{debug, info, warn};
use thiserror::Error;

use crate::message::{Linger, Message};
use crate::puzzle::{GameData, PuzzleRegistry, RoomCatalog, RoomDefinition};
use crate::session::{RestoreOutcome, SessionStore};
use crate::store::KeyValueStore;
use crate::text::escape_log;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("start room {0:?} is not in the room catalog")]
    StartRoomMissing(String),

    #[error("unknown room id: {0}")]
    UnknownRoom(String),
}

/// Draws rooms and feedback. Implemented by the terminal UI.
pub trait Presenter {
    fn render_room(&mut self, room: &RoomDefinition, door_unlocked: bool);
    fn show_message(&mut self, message: Message);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    North,
    West,
    South,
    East,
}

/// Everything a player can ask for, one method per intent.
pub trait IntentHandler {
    fn object_clicked(&mut self, object_id: &str, puzzle_id: &str);
    fn door_clicked(&mut self, door_id: &str);
    fn answer_submitted(&mut self, answer: &str);
    fn save_requested(&mut self);
    fn load_requested(&mut self);
    /// Reserved for free movement inside a room; currently ignored.
    fn move_requested(&mut self, heading: Heading);
}

#[derive(Debug, Clone, Copy)]
pub struct ControllerSettings {
    pub advance_delay: Duration,
    pub message_duration: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            advance_delay: Duration::from_millis(1000),
            message_duration: crate::message::DEFAULT_MESSAGE_DURATION,
        }
    }
}

pub struct Controller<S: KeyValueStore, P: Presenter> {
    catalog: RoomCatalog,
    puzzles: PuzzleRegistry,
    session: SessionStore<S>,
    presenter: P,
    settings: ControllerSettings,
    pending_advance: Option<Instant>,
}

impl<S: KeyValueStore, P: Presenter> Controller<S, P> {
    /// Restores the saved session if there is a usable one, otherwise starts
    /// fresh, then draws the current room.
    pub fn start(
        data: GameData,
        session: SessionStore<S>,
        presenter: P,
        settings: ControllerSettings,
    ) -> Result<Self, ControllerError> {
        if !data.rooms.contains(session.start_room()) {
            return Err(ControllerError::StartRoomMissing(
                session.start_room().to_string(),
            ));
        }

        let mut controller = Self {
            catalog: data.rooms,
            puzzles: data.puzzles,
            session,
            presenter,
            settings,
            pending_advance: None,
        };

        // Reset first so the restore outcome is the message left on screen.
        match controller.session.restore() {
            Ok(RestoreOutcome::Found) => {
                controller.say(Message::info("The system has loaded your record..."));
            }
            Ok(RestoreOutcome::NotFound) => {
                let note = controller.reset_session().err().unwrap_or_default();
                controller.say(Message::info(format!(
                    "No saved record. Starting a new game...{}",
                    note
                )));
            }
            Ok(RestoreOutcome::Corrupt(reason)) => {
                warn!("discarding corrupt save: {}", reason);
                let note = controller.reset_session().err().unwrap_or_default();
                controller.say(Message::error(format!(
                    "Could not load the record! The save file seems damaged. Starting a new game...{}",
                    note
                )));
            }
            Err(e) => {
                warn!("could not read save: {}", e);
                let note = controller.reset_session().err().unwrap_or_default();
                controller.say(Message::error(format!(
                    "Could not read the record: {}. Starting a new game...{}",
                    e, note
                )));
            }
        }

        controller.refresh();
        Ok(controller)
    }

    pub fn session(&self) -> &SessionStore<S> {
        &self.session
    }

    pub fn catalog(&self) -> &RoomCatalog {
        &self.catalog
    }

    pub fn puzzles(&self) -> &PuzzleRegistry {
        &self.puzzles
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn current_room(&self) -> Option<&RoomDefinition> {
        self.catalog.get(self.session.current_room())
    }

    pub fn advance_pending(&self) -> bool {
        self.pending_advance.is_some()
    }

    /// Full redraw of the current room. An unknown room id is reported to the
    /// player and left as is.
    pub fn render_current_room(&mut self) -> Result<(), ControllerError> {
        let room_id = self.session.current_room().to_string();
        let Some(room) = self.catalog.get(&room_id) else {
            warn!("no room data for {}", escape_log(&room_id));
            self.presenter.show_message(
                Message::error(format!("Unknown room id: {}. System failure.", room_id)).sticky(),
            );
            return Err(ControllerError::UnknownRoom(room_id));
        };

        let unlocked = self.session.is_door_unlocked(&room.door.id);
        self.presenter.render_room(room, unlocked);
        debug!("rendered {} ({})", escape_log(&room.title), escape_log(&room_id));
        Ok(())
    }

    /// Moves to the next room once the post-unlock delay has passed.
    /// Returns true when a move happened.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.pending_advance {
            Some(due) if now >= due => {
                self.pending_advance = None;
                self.advance();
                true
            }
            _ => false,
        }
    }

    /// Next room in catalog order; past the last room, back to the start room.
    pub fn advance(&mut self) {
        let current = self.session.current_room().to_string();
        let next = match self.catalog.successor(&current) {
            Some(room) => room.id.clone(),
            None => {
                let start = self.session.start_room().to_string();
                info!("no room after {}, returning to {}", escape_log(&current), start);
                self.say(Message::info(
                    "You reached the end of the maze. The trace loops back to the start...",
                ));
                start
            }
        };
        self.session.set_current_room(&next);
        self.refresh();
    }

    /// Wipes the session, saved copy included, and starts over.
    pub fn new_game(&mut self) {
        self.pending_advance = None;
        match self.reset_session() {
            Ok(()) => self.say(Message::info(
                "The system erased every record. A new beginning...",
            )),
            Err(note) => self.say(Message::error(format!("New game started.{}", note))),
        }
        self.refresh();
    }

    /// The in-memory state is always reset. On failure to delete the saved
    /// copy, returns a note to append to whatever the caller reports.
    fn reset_session(&mut self) -> Result<(), String> {
        self.session.reset().map_err(|e| {
            warn!("could not delete saved session: {}", e);
            format!(" (could not erase the saved record: {})", e)
        })
    }

    fn refresh(&mut self) {
        if let Err(e) = self.render_current_room() {
            warn!("render skipped: {}", e);
        }
    }

    fn say(&mut self, message: Message) {
        let message = match message.linger {
            Linger::For(_) => message.lasting(self.settings.message_duration),
            Linger::Sticky => message,
        };
        self.presenter.show_message(message);
    }
}

impl<S: KeyValueStore, P: Presenter> IntentHandler for Controller<S, P> {
    fn object_clicked(&mut self, object_id: &str, puzzle_id: &str) {
        debug!(
            "object {} clicked (puzzle {})",
            escape_log(object_id),
            escape_log(puzzle_id)
        );
        if self.session.is_puzzle_solved(puzzle_id) {
            self.say(Message::info("Already solved. Nothing new here."));
            return;
        }

        let message = match self.puzzles.lookup(puzzle_id) {
            Some(puzzle) => Message::info(format!(
                "[Clue] {} (hint: {})",
                puzzle.question, puzzle.hint
            )),
            None => Message::error("Just an ordinary object. There is nothing here..."),
        };
        self.say(message);
    }

    fn door_clicked(&mut self, door_id: &str) {
        debug!("door {} clicked", escape_log(door_id));
        let is_current_door = self
            .current_room()
            .is_some_and(|room| room.door.id == door_id);
        if !is_current_door {
            self.say(Message::error("An unknown door..."));
            return;
        }

        if self.session.is_door_unlocked(door_id) {
            self.say(Message::info("The door is open. Moving to the next space..."));
            self.pending_advance = Some(Instant::now() + self.settings.advance_delay);
        } else {
            self.say(Message::error(
                "The door is locked. Find the traces and answer.",
            ));
        }
    }

    fn answer_submitted(&mut self, answer: &str) {
        let Some(door) = self
            .current_room()
            .filter(|room| room.door.accepts_answers())
            .map(|room| room.door.clone())
        else {
            self.say(Message::error("No answer can be entered here."));
            return;
        };

        let verdict = self
            .puzzles
            .verify(door.puzzle_id(), answer, &mut self.session);
        if verdict.correct {
            self.say(Message::info(&verdict.message));
            self.session.unlock_door(&door.id);
            self.refresh();
        } else {
            self.say(Message::error(&verdict.message));
        }
    }

    fn save_requested(&mut self) {
        match self.session.persist() {
            Ok(()) => self.say(Message::info("The system saved your record...")),
            Err(e) => {
                warn!("save failed: {}", e);
                self.say(Message::error(format!("Saving the record failed! {}", e)));
            }
        }
    }

    fn load_requested(&mut self) {
        match self.session.restore() {
            Ok(RestoreOutcome::Found) => {
                self.pending_advance = None;
                self.say(Message::info("The system loaded your record..."));
                self.refresh();
            }
            Ok(RestoreOutcome::NotFound) => {
                self.say(Message::error("There is no saved record."));
            }
            Ok(RestoreOutcome::Corrupt(_)) => {
                self.say(Message::error(
                    "Loading the record failed! The save file seems damaged.",
                ));
            }
            Err(e) => {
                warn!("load failed: {}", e);
                self.say(Message::error(format!("Loading the record failed! {}", e)));
            }
        }
    }

    fn move_requested(&mut self, heading: Heading) {
        debug!("movement {:?} ignored", heading);
    }
}
