use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleDefinition {
    pub question: String,
    pub hint: String,
    pub correct_answer: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDefinition {
    // Rooms are keyed by id in the data files, so the inline id is optional.
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub background_image: Option<String>,
    #[serde(default)]
    pub objects: Vec<RoomObject>,
    pub door: Door,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomObject {
    pub id: String,
    pub puzzle_id: String,
    #[serde(rename = "name", alias = "label")]
    pub label: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub size: Size,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Door {
    pub id: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub answer: Option<String>,
}

impl Door {
    /// A door takes typed answers only when its data carries an `answer`.
    pub fn accepts_answers(&self) -> bool {
        self.answer.as_deref().is_some_and(|a| !a.trim().is_empty())
    }

    /// Doors are verified against the puzzle that shares their id.
    pub fn puzzle_id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Position {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<String>,
}

impl Position {
    /// Short human form, e.g. `left 10%, top 60%`. Empty when nothing is set.
    pub fn describe(&self) -> String {
        [
            ("left", &self.left),
            ("top", &self.top),
            ("right", &self.right),
            ("bottom", &self.bottom),
        ]
        .iter()
        .filter_map(|(edge, value)| value.as_ref().map(|v| format!("{} {}", edge, v)))
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Size {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
}
