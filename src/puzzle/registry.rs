use std::collections::HashMap;

use log::{info, warn};
use serde_json::Value;

use super::loader::LoadError;
use super::types::PuzzleDefinition;
use crate::session::SessionStore;
use crate::store::KeyValueStore;
use crate::text::escape_log;

pub const MSG_UNKNOWN_PUZZLE: &str = "Unknown puzzle. The system cannot recognise it...";
pub const MSG_CORRECT: &str = "Correct! The system has opened the next trace.";
pub const MSG_WRONG: &str = "Wrong. The system rejects the answer.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub correct: bool,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct PuzzleRegistry {
    puzzles: HashMap<String, PuzzleDefinition>,
}

impl PuzzleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces everything previously loaded.
    pub fn load(&mut self, definitions: HashMap<String, PuzzleDefinition>) {
        self.puzzles = definitions;
        info!("{} puzzle definitions loaded", self.puzzles.len());
    }

    /// Loads a JSON object of puzzle definitions. Entries with the wrong shape
    /// are skipped and later show up as lookup misses.
    pub fn load_value(&mut self, source: &str, value: Value) -> Result<(), LoadError> {
        let Value::Object(entries) = value else {
            return Err(LoadError::Shape {
                path: source.to_string(),
                reason: "puzzle definitions must be a JSON object".to_string(),
            });
        };

        let mut definitions = HashMap::with_capacity(entries.len());
        for (id, entry) in entries {
            match serde_json::from_value::<PuzzleDefinition>(entry) {
                Ok(def) => {
                    definitions.insert(id, def);
                }
                Err(e) => warn!("skipping puzzle {} in {}: {}", escape_log(&id), source, e),
            }
        }
        self.load(definitions);
        Ok(())
    }

    pub fn lookup(&self, puzzle_id: &str) -> Option<&PuzzleDefinition> {
        self.puzzles.get(puzzle_id)
    }

    pub fn len(&self) -> usize {
        self.puzzles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puzzles.is_empty()
    }

    /// Checks `candidate` against the stored answer, ignoring case and
    /// surrounding whitespace. Only a correct answer touches the session.
    pub fn verify<S: KeyValueStore>(
        &self,
        puzzle_id: &str,
        candidate: &str,
        session: &mut SessionStore<S>,
    ) -> Verdict {
        let Some(puzzle) = self.lookup(puzzle_id) else {
            warn!("verify for unknown puzzle {}", escape_log(puzzle_id));
            return Verdict {
                correct: false,
                message: MSG_UNKNOWN_PUZZLE.to_string(),
            };
        };

        if answers_match(candidate, &puzzle.correct_answer) {
            session.mark_puzzle_solved(puzzle_id);
            info!("puzzle {} answered correctly", escape_log(puzzle_id));
            Verdict {
                correct: true,
                message: MSG_CORRECT.to_string(),
            }
        } else {
            info!(
                "puzzle {} wrong answer {:?}",
                escape_log(puzzle_id),
                escape_log(candidate)
            );
            Verdict {
                correct: false,
                message: MSG_WRONG.to_string(),
            }
        }
    }
}

fn answers_match(candidate: &str, expected: &str) -> bool {
    candidate.trim().to_uppercase() == expected.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::DEFAULT_SAVE_KEY;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn registry() -> PuzzleRegistry {
        let mut registry = PuzzleRegistry::new();
        registry
            .load_value(
                "test",
                json!({"door-01": {"question": "Q", "hint": "H", "correctAnswer": "GOLD"}}),
            )
            .unwrap();
        registry
    }

    fn session() -> SessionStore<MemoryStore> {
        SessionStore::new(MemoryStore::new(), DEFAULT_SAVE_KEY, "room-01")
    }

    #[test]
    fn unknown_puzzle_leaves_session_alone() {
        let registry = registry();
        let mut session = session();
        let verdict = registry.verify("door-99", "GOLD", &mut session);
        assert!(!verdict.correct);
        assert_eq!(verdict.message, MSG_UNKNOWN_PUZZLE);
        assert!(session.state().solved_puzzles.is_empty());
    }

    #[test]
    fn case_and_outer_whitespace_are_ignored() {
        let registry = registry();
        for candidate in ["GOLD", "gold", "  gold  ", "\tGoLd\n"] {
            let mut session = session();
            assert!(registry.verify("door-01", candidate, &mut session).correct, "{candidate:?}");
            assert!(session.is_puzzle_solved("door-01"));
        }
        for candidate in ["G OLD", "gold.", "golden", ""] {
            let mut session = session();
            let verdict = registry.verify("door-01", candidate, &mut session);
            assert!(!verdict.correct, "{candidate:?}");
            assert_eq!(verdict.message, MSG_WRONG);
            assert!(!session.is_puzzle_solved("door-01"));
        }
    }

    #[test]
    fn malformed_entries_become_lookup_misses() {
        let mut registry = PuzzleRegistry::new();
        registry
            .load_value(
                "test",
                json!({
                    "ok": {"question": "Q", "hint": "H", "correctAnswer": "A"},
                    "broken": {"question": "Q"}
                }),
            )
            .unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.lookup("ok").is_some());
        assert!(registry.lookup("broken").is_none());
    }

    #[test]
    fn non_object_is_rejected_and_load_replaces() {
        let mut registry = registry();
        assert!(registry.load_value("test", json!([1, 2])).is_err());
        assert_eq!(registry.len(), 1);

        registry.load(HashMap::new());
        assert!(registry.is_empty());
    }
}
