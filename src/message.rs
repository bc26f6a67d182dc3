use std::time::Duration;

use crate::text::sanitize_display;

pub const DEFAULT_MESSAGE_DURATION: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linger {
    For(Duration),
    /// Stays until the next message replaces it.
    Sticky,
}

/// A line of player-facing feedback. The text is sanitized on construction,
/// so a `Message` can be drawn without further escaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    text: String,
    pub tone: Tone,
    pub linger: Linger,
}

impl Message {
    pub fn info(text: impl AsRef<str>) -> Self {
        Self::new(text.as_ref(), Tone::Info)
    }

    pub fn error(text: impl AsRef<str>) -> Self {
        Self::new(text.as_ref(), Tone::Error)
    }

    fn new(text: &str, tone: Tone) -> Self {
        Self {
            text: sanitize_display(text),
            tone,
            linger: Linger::For(DEFAULT_MESSAGE_DURATION),
        }
    }

    pub fn sticky(mut self) -> Self {
        self.linger = Linger::Sticky;
        self
    }

    pub fn lasting(mut self, duration: Duration) -> Self {
        self.linger = Linger::For(duration);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_error(&self) -> bool {
        self.tone == Tone::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_sanitized_and_defaults_are_transient() {
        let msg = Message::error("bad \x1b[31mdoor");
        assert_eq!(msg.text(), "bad [31mdoor");
        assert!(msg.is_error());
        assert_eq!(msg.linger, Linger::For(DEFAULT_MESSAGE_DURATION));
        assert_eq!(Message::info("x").sticky().linger, Linger::Sticky);
    }
}
