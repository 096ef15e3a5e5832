use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::geometry::Direction;

/// High-level commands consumed by the game loop.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Command {
    Direction(Direction),
    /// Start from the ready screen.
    Start,
    TogglePause,
    Restart,
    /// Ask the advisor for a hint.
    Hint,
    /// Ask for a general strategy tip.
    Tip,
    ToggleAutopilot,
    Quit,
}

/// Maps one key press to a command.
#[must_use]
pub fn map_key(key: KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }

    let command = match key.code {
        KeyCode::Up | KeyCode::Char('w' | 'W' | 'k') => Command::Direction(Direction::Up),
        KeyCode::Down | KeyCode::Char('s' | 'S' | 'j') => Command::Direction(Direction::Down),
        KeyCode::Left | KeyCode::Char('a' | 'A' | 'h') => Command::Direction(Direction::Left),
        KeyCode::Right | KeyCode::Char('d' | 'D' | 'l') => Command::Direction(Direction::Right),
        KeyCode::Enter => Command::Start,
        KeyCode::Char(' ' | 'p' | 'P') => Command::TogglePause,
        KeyCode::Char('r' | 'R') => Command::Restart,
        KeyCode::Char('?' | 'i' | 'I') => Command::Hint,
        KeyCode::Char('g' | 'G') => Command::Tip,
        KeyCode::Char('t' | 'T') => Command::ToggleAutopilot,
        KeyCode::Esc | KeyCode::Char('q' | 'Q') => Command::Quit,
        _ => return None,
    };
    Some(command)
}

/// Waits up to `timeout` for a key press and maps it.
pub fn poll_command(timeout: Duration) -> io::Result<Option<Command>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }

    match event::read()? {
        Event::Key(key) => Ok(map_key(key)),
        _ => Ok(None),
    }
}
