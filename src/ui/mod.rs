pub mod presenter;

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use tui_textarea::TextArea;

use crate::controller::{Controller, Heading, IntentHandler, Presenter};
use crate::message::Message;
use crate::store::KeyValueStore;
pub use presenter::{RoomView, Target, TargetKind, TuiPresenter};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Title,
    Playing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    Continue,
    NewGame,
    Quit,
}

impl MenuOption {
    fn next(&self) -> Self {
        match self {
            MenuOption::Continue => MenuOption::NewGame,
            MenuOption::NewGame => MenuOption::Quit,
            MenuOption::Quit => MenuOption::Continue,
        }
    }

    fn prev(&self) -> Self {
        match self {
            MenuOption::Continue => MenuOption::Quit,
            MenuOption::NewGame => MenuOption::Continue,
            MenuOption::Quit => MenuOption::NewGame,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Room,
    Answer,
}

pub struct App<'a, S: KeyValueStore> {
    pub controller: Controller<S, TuiPresenter>,
    pub screen: Screen,
    pub menu_selection: MenuOption,
    focus: Focus,
    selected: usize,
    selected_room: Option<String>,
    answer: TextArea<'a>,
    command_mode: bool,
    command_buffer: String,
    pub should_quit: bool,
}

fn answer_box<'a>() -> TextArea<'a> {
    let mut answer = TextArea::default();
    answer.set_block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Answer [Tab: focus | Enter: submit] "),
    );
    answer.set_cursor_line_style(Style::default());
    answer.set_placeholder_text("type the door's answer...");
    answer
}

impl<'a, S: KeyValueStore> App<'a, S> {
    pub fn new(controller: Controller<S, TuiPresenter>) -> Self {
        App {
            controller,
            screen: Screen::Title,
            menu_selection: MenuOption::Continue,
            focus: Focus::Room,
            selected: 0,
            selected_room: None,
            answer: answer_box(),
            command_mode: false,
            command_buffer: String::new(),
            should_quit: false,
        }
    }

    fn room(&self) -> Option<&RoomView> {
        self.controller.presenter().room()
    }

    fn notify(&mut self, message: Message) {
        self.controller.presenter_mut().show_message(message);
    }

    /// Selection goes back to the first target whenever a different room is shown.
    fn sync_selection(&mut self) {
        let current = self.room().map(|r| r.id.clone());
        if current != self.selected_room {
            self.selected = 0;
            self.selected_room = current;
        }
        let count = self.room().map_or(0, |r| r.targets.len());
        if count > 0 && self.selected >= count {
            self.selected = count - 1;
        }
    }

    pub fn selected_target(&self) -> Option<&Target> {
        self.room()?.targets.get(self.selected)
    }

    pub fn tick(&mut self, now: Instant) {
        self.controller.tick(now);
        self.sync_selection();
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.screen {
            Screen::Title => self.handle_title_key(key),
            Screen::Playing if self.command_mode => self.handle_command_key(key),
            Screen::Playing => match self.focus {
                Focus::Answer => self.handle_answer_key(key),
                Focus::Room => self.handle_room_key(key),
            },
        }
        self.sync_selection();
    }

    fn handle_title_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.menu_selection = self.menu_selection.next(),
            KeyCode::Up | KeyCode::Char('k') => self.menu_selection = self.menu_selection.prev(),
            KeyCode::Enter => match self.menu_selection {
                MenuOption::Continue => self.screen = Screen::Playing,
                MenuOption::NewGame => {
                    self.controller.new_game();
                    self.screen = Screen::Playing;
                }
                MenuOption::Quit => self.should_quit = true,
            },
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    // Vim-style command line, entered with ':'
    fn handle_command_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.command_mode = false;
                self.command_buffer.clear();
            }
            KeyCode::Enter => {
                let command = std::mem::take(&mut self.command_buffer);
                self.command_mode = false;
                self.run_command(command.trim());
            }
            KeyCode::Backspace => {
                self.command_buffer.pop();
                if self.command_buffer.is_empty() {
                    self.command_mode = false;
                }
            }
            KeyCode::Char(c) => self.command_buffer.push(c),
            _ => {}
        }
    }

    fn run_command(&mut self, command: &str) {
        match command {
            "q" | "quit" => self.should_quit = true,
            "w" | "save" => self.controller.save_requested(),
            "e" | "load" => self.controller.load_requested(),
            "wq" => {
                self.controller.save_requested();
                self.should_quit = true;
            }
            "reset" => self.controller.new_game(),
            "help" => self.notify(Message::info(
                "Commands: :w save, :e load, :reset new game, :q quit",
            )),
            "" => {}
            other => self.notify(Message::error(format!("Unknown command: {}", other))),
        }
    }

    fn handle_answer_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let text = self.answer.lines().join(" ");
                // The box is always emptied after a submission.
                self.answer = answer_box();
                self.controller.answer_submitted(&text);
            }
            KeyCode::Esc | KeyCode::Tab => self.focus = Focus::Room,
            _ => {
                self.answer.input(key);
            }
        }
    }

    fn handle_room_key(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Char(':'), _) => {
                self.command_mode = true;
                self.command_buffer.clear();
            }
            (KeyCode::Tab, _) => self.focus = Focus::Answer,
            (KeyCode::Up, _) | (KeyCode::Char('k'), KeyModifiers::NONE) => {
                self.selected = self.selected.saturating_sub(1);
            }
            (KeyCode::Down, _) | (KeyCode::Char('j'), KeyModifiers::NONE) => {
                self.selected += 1;
            }
            (KeyCode::Enter, _) => self.activate_selected(),
            (KeyCode::F(2), _) => self.controller.save_requested(),
            (KeyCode::F(3), _) => self.controller.load_requested(),
            (KeyCode::Esc, _) => self.notify(Message::info("Type :q to quit")),
            (KeyCode::Char(c), KeyModifiers::NONE) => {
                let heading = match c {
                    'w' => Some(Heading::North),
                    'a' => Some(Heading::West),
                    's' => Some(Heading::South),
                    'd' => Some(Heading::East),
                    _ => None,
                };
                if let Some(heading) = heading {
                    self.controller.move_requested(heading);
                }
            }
            _ => {}
        }
    }

    fn activate_selected(&mut self) {
        let Some(target) = self.selected_target().cloned() else {
            return;
        };
        match target.kind {
            TargetKind::Object { puzzle_id } => {
                self.controller.object_clicked(&target.id, &puzzle_id)
            }
            TargetKind::Door => self.controller.door_clicked(&target.id),
        }
    }
}

pub fn run<B: Backend, S: KeyValueStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<'_, S>,
) -> Result<()> {
    loop {
        terminal.draw(|f| draw_ui(f, app))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
        app.tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}

pub fn draw_ui<S: KeyValueStore>(f: &mut Frame, app: &App<'_, S>) {
    if app.screen == Screen::Title {
        draw_title_screen(f, app);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(5),
        ])
        .split(f.area());

    draw_status(f, app, chunks[0]);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);
    draw_room(f, app, main_chunks[0]);
    draw_targets(f, app, main_chunks[1]);

    f.render_widget(&app.answer, chunks[2]);
    draw_message(f, app, chunks[3]);
}

fn draw_status<S: KeyValueStore>(f: &mut Frame, app: &App<'_, S>, area: Rect) {
    let session = app.controller.session();
    let catalog = app.controller.catalog();
    let room_progress = match catalog.position(session.current_room()) {
        Some(i) => format!(" Room {}/{} ", i + 1, catalog.len()),
        None => format!(" Room ?/{} ", catalog.len()),
    };
    let title = app.room().map_or("", |r| r.title.as_str());

    let status = Line::from(vec![
        Span::styled(
            " ROOM : TRACE ",
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" {} ", title),
            Style::default().fg(Color::White).bg(Color::DarkGray),
        ),
        Span::raw("  "),
        Span::styled(room_progress, Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::styled(
            format!(" Solved: {} ", session.state().solved_puzzles.len()),
            Style::default().fg(Color::Yellow),
        ),
    ]);
    let status_block = Paragraph::new(status).block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(status_block, area);
}

fn draw_room<S: KeyValueStore>(f: &mut Frame, app: &App<'_, S>, area: Rect) {
    let mut lines = Vec::new();
    if let Some(room) = app.room() {
        lines.push(Line::from(Span::styled(
            room.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::raw(""));
        lines.extend(room.description.lines().map(|l| Line::raw(l.to_string())));
        if let Some(backdrop) = &room.backdrop {
            lines.push(Line::raw(""));
            lines.push(Line::from(Span::styled(
                format!("backdrop: {}", backdrop),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    let narrative = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" The Room "))
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::White));
    f.render_widget(narrative, area);
}

fn draw_targets<S: KeyValueStore>(f: &mut Frame, app: &App<'_, S>, area: Rect) {
    let room_focused = app.focus == Focus::Room && !app.command_mode;
    let lines: Vec<Line> = app
        .room()
        .map(|room| {
            room.targets
                .iter()
                .enumerate()
                .map(|(i, target)| {
                    let selected = i == app.selected;
                    let marker = if selected { "> " } else { "  " };
                    let color = match target.kind {
                        TargetKind::Door if room.door_unlocked => Color::Green,
                        TargetKind::Door => Color::Red,
                        TargetKind::Object { .. } => Color::White,
                    };
                    let mut style = Style::default().fg(color);
                    if selected && room_focused {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    let mut spans = vec![Span::styled(format!("{}{}", marker, target.label), style)];
                    if !target.placement.is_empty() {
                        spans.push(Span::styled(
                            format!("  ({})", target.placement),
                            Style::default().fg(Color::DarkGray),
                        ));
                    }
                    Line::from(spans)
                })
                .collect()
        })
        .unwrap_or_default();

    let targets = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Look around [j/k: move | Enter: inspect] "),
    );
    f.render_widget(targets, area);
}

fn draw_message<S: KeyValueStore>(f: &mut Frame, app: &App<'_, S>, area: Rect) {
    let (content, style, title) = if app.command_mode {
        (
            format!(":{}", app.command_buffer),
            Style::default().fg(Color::White).bg(Color::DarkGray),
            " Command ",
        )
    } else {
        match app.controller.presenter().visible_message(Instant::now()) {
            Some(message) if message.is_error() => (
                message.text().to_string(),
                Style::default().fg(Color::Red),
                " System ",
            ),
            Some(message) => (
                message.text().to_string(),
                Style::default().fg(Color::Yellow),
                " System ",
            ),
            None => (String::new(), Style::default(), " System "),
        }
    };

    let message = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false })
        .style(style);
    f.render_widget(message, area);
}

fn draw_title_screen<S: KeyValueStore>(f: &mut Frame, app: &App<'_, S>) {
    let title_art = r#"
    ╔═══════════════════════════════════════════════╗
    ║                                               ║
    ║     ██████   ██████   ██████  ███    ███      ║
    ║     ██   ██ ██    ██ ██    ██ ████  ████      ║
    ║     ██████  ██    ██ ██    ██ ██ ████ ██      ║
    ║     ██   ██ ██    ██ ██    ██ ██  ██  ██      ║
    ║     ██   ██  ██████   ██████  ██      ██      ║
    ║                                               ║
    ║              :   T R A C E   :                ║
    ║                                               ║
    ║        "Every room remembers who left."       ║
    ║                                               ║
    ╚═══════════════════════════════════════════════╝
"#;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(15),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(1),
        ])
        .split(f.area());

    let title = Paragraph::new(title_art)
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let options = [
        (MenuOption::Continue, "  CONTINUE  "),
        (MenuOption::NewGame, "  NEW GAME  "),
        (MenuOption::Quit, "  QUIT  "),
    ];
    for (i, (option, label)) in options.iter().enumerate() {
        let style = if app.menu_selection == *option {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let item = Paragraph::new(*label)
            .style(style)
            .alignment(Alignment::Center);
        f.render_widget(item, chunks[i + 1]);
    }

    let help = Paragraph::new("↑/↓ to select  •  ENTER to confirm  •  q to quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[4]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ControllerSettings;
    use crate::puzzle::{GameData, PuzzleRegistry, RoomCatalog};
    use crate::session::{SessionStore, DEFAULT_SAVE_KEY};
    use crate::store::MemoryStore;
    use ratatui::backend::TestBackend;
    use serde_json::json;

    fn app<'a>() -> App<'a, MemoryStore> {
        let rooms = RoomCatalog::from_value(
            "test",
            json!({
                "room-01": {
                    "title": "Cell",
                    "description": "A bare cell.",
                    "objects": [{"id": "obj-note", "puzzleId": "door-01", "name": "Note"}],
                    "door": {"id": "door-01", "answer": "GOLD"}
                },
                "room-02": {"title": "Hall", "door": {"id": "door-02", "answer": "X"}}
            }),
        )
        .unwrap();
        let mut puzzles = PuzzleRegistry::new();
        puzzles
            .load_value(
                "test",
                json!({"door-01": {"question": "Q", "hint": "H", "correctAnswer": "GOLD"}}),
            )
            .unwrap();
        let session = SessionStore::new(MemoryStore::new(), DEFAULT_SAVE_KEY, "room-01");
        let settings = ControllerSettings {
            advance_delay: Duration::ZERO,
            ..ControllerSettings::default()
        };
        let controller = Controller::start(
            GameData { rooms, puzzles },
            session,
            TuiPresenter::new(),
            settings,
        )
        .unwrap();
        App::new(controller)
    }

    fn press(app: &mut App<'_, MemoryStore>, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App<'_, MemoryStore>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn play_through_first_door_with_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::Playing);

        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "gold");
        press(&mut app, KeyCode::Enter);
        assert!(app.controller.session().is_door_unlocked("door-01"));

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.selected_target().unwrap().kind, TargetKind::Door);
        press(&mut app, KeyCode::Enter);
        app.tick(Instant::now());
        assert_eq!(app.controller.session().current_room(), "room-02");
        assert_eq!(app.selected_target().unwrap().id, "door-02");
    }

    #[test]
    fn command_line_saves_and_quits() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, ":w");
        press(&mut app, KeyCode::Enter);
        assert!(app
            .controller
            .session()
            .store()
            .get(DEFAULT_SAVE_KEY)
            .unwrap()
            .is_some());

        type_text(&mut app, ":q");
        press(&mut app, KeyCode::Enter);
        assert!(app.should_quit);
    }

    #[test]
    fn title_new_game_and_quit() {
        let mut app = app();
        press(&mut app, KeyCode::Down);
        assert_eq!(app.menu_selection, MenuOption::NewGame);
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.menu_selection, MenuOption::Quit);
        press(&mut app, KeyCode::Enter);
        assert!(app.should_quit);
    }

    #[test]
    fn draws_room_screen() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw_ui(f, &app)).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("ROOM : TRACE"));
        assert!(screen.contains("A bare cell."));
        assert!(screen.contains("Door (locked)"));
    }
}
