use std::time::Instant;

use crate::controller::Presenter;
use crate::message::{Linger, Message};
use crate::puzzle::RoomDefinition;
use crate::text::sanitize_display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
    Object { puzzle_id: String },
    Door,
}

/// Something in the room the player can select. `id` is passed back to the
/// controller untouched; `label` and `placement` are display-safe.
#[derive(Debug, Clone)]
pub struct Target {
    pub kind: TargetKind,
    pub id: String,
    pub label: String,
    pub placement: String,
}

/// Display-safe snapshot of the last rendered room.
#[derive(Debug, Clone)]
pub struct RoomView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub backdrop: Option<String>,
    pub targets: Vec<Target>,
    pub door_unlocked: bool,
}

#[derive(Debug, Default)]
pub struct TuiPresenter {
    room: Option<RoomView>,
    message: Option<(Message, Instant)>,
}

impl TuiPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn room(&self) -> Option<&RoomView> {
        self.room.as_ref()
    }

    /// The current message, unless its display time has run out.
    pub fn visible_message(&self, now: Instant) -> Option<&Message> {
        let (message, shown_at) = self.message.as_ref()?;
        match message.linger {
            Linger::Sticky => Some(message),
            Linger::For(d) if now.duration_since(*shown_at) < d => Some(message),
            Linger::For(_) => None,
        }
    }
}

impl Presenter for TuiPresenter {
    fn render_room(&mut self, room: &RoomDefinition, door_unlocked: bool) {
        let mut targets: Vec<Target> = room
            .objects
            .iter()
            .map(|obj| Target {
                kind: TargetKind::Object {
                    puzzle_id: obj.puzzle_id.clone(),
                },
                id: obj.id.clone(),
                label: sanitize_display(&obj.label),
                placement: sanitize_display(&obj.position.describe()),
            })
            .collect();
        targets.push(Target {
            kind: TargetKind::Door,
            id: room.door.id.clone(),
            label: if door_unlocked { "Door (open)" } else { "Door (locked)" }.to_string(),
            placement: sanitize_display(&room.door.position.describe()),
        });

        self.room = Some(RoomView {
            id: room.id.clone(),
            title: sanitize_display(&room.title),
            description: sanitize_display(&room.description),
            backdrop: room.background_image.as_deref().map(sanitize_display),
            targets,
            door_unlocked,
        });
    }

    fn show_message(&mut self, message: Message) {
        self.message = Some((message, Instant::now()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn room() -> RoomDefinition {
        serde_json::from_value(serde_json::json!({
            "id": "room-01",
            "title": "Cell\x1b[5m",
            "objects": [{"id": "obj-1", "puzzleId": "p1", "name": "Lamp",
                         "position": {"left": "5%"}}],
            "door": {"id": "door-01", "answer": "X"}
        }))
        .unwrap()
    }

    #[test]
    fn render_lists_objects_then_door() {
        let mut presenter = TuiPresenter::new();
        presenter.render_room(&room(), true);
        let view = presenter.room().unwrap();
        assert_eq!(view.title, "Cell[5m");
        assert_eq!(view.targets.len(), 2);
        assert_eq!(view.targets[0].placement, "left 5%");
        assert_eq!(view.targets[1].kind, TargetKind::Door);
        assert_eq!(view.targets[1].label, "Door (open)");
    }

    #[test]
    fn transient_messages_expire() {
        let mut presenter = TuiPresenter::new();
        presenter.show_message(Message::info("hi").lasting(Duration::from_millis(10)));
        let now = Instant::now();
        assert!(presenter.visible_message(now).is_some());
        assert!(presenter
            .visible_message(now + Duration::from_secs(1))
            .is_none());

        presenter.show_message(Message::error("stuck").sticky());
        assert!(presenter
            .visible_message(Instant::now() + Duration::from_secs(3600))
            .is_some());
    }
}
