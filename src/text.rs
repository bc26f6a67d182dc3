//! Text hygiene for anything that reaches the terminal or the log.
//!
//! Room data and player input are untrusted: an ESC byte in a room title could
//! otherwise move the cursor or recolor the screen. Everything shown to the
//! player goes through [`sanitize_display`]; everything logged goes through
//! [`escape_log`].

/// Strip terminal control characters. Newlines survive so multi-line room
/// descriptions keep their shape; tabs become a single space.
pub fn sanitize_display(s: &str) -> String {
    s.chars()
        .filter_map(|c| match c {
            '\n' => Some('\n'),
            '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

/// One log line per call: control characters and backslashes are written as
/// Rust escapes (`\n`, `\u{1b}`), and ids longer than a line get cut.
pub fn escape_log(s: &str) -> String {
    const MAX_CHARS: usize = 120;
    let mut out = String::with_capacity(s.len().min(MAX_CHARS));
    for c in s.chars().take(MAX_CHARS) {
        if c.is_control() || c == '\\' {
            out.extend(c.escape_default());
        } else {
            out.push(c);
        }
    }
    if s.chars().nth(MAX_CHARS).is_some() {
        out.push('…');
    }
    out
}
