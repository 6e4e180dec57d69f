/// Keyboard input via crossterm.
///
/// Each frame drains every pending key event:
///   - the last key that maps to a movement symbol wins
///   - a quit key (`q`, or Ctrl+C since raw mode swallows SIGINT)
///     anywhere in the batch wins over everything
///
/// Only Press/Repeat events count. Release events (reported by terminals
/// with keyboard enhancement) are ignored.

use std::io;
use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::Input;
use crate::sim::session::KeyPress;

pub struct InputState {
    /// Key events collected during the most recent drain.
    pub raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { raw_events: Vec::with_capacity(8) }
    }

    /// Drain all pending terminal events without blocking.
    pub fn drain_events(&mut self) {
        self.raw_events.clear();
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                if key.kind != KeyEventKind::Release {
                    self.raw_events.push(key);
                }
            }
        }
    }

    /// Symbol for this frame from the drained batch.
    pub fn command(&self) -> Option<Input> {
        resolve_batch(&self.raw_events)
    }

    /// Wait up to `timeout` for one key press on a menu screen.
    pub fn read_key(&mut self, timeout: Duration) -> io::Result<Option<KeyPress>> {
        if !poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => Ok(Some(menu_key(&key))),
            _ => Ok(None),
        }
    }
}

/// Map one key to a movement symbol. Arrow keys alias `a d w s`.
pub fn map_key(key: &KeyEvent) -> Option<Input> {
    if is_ctrl_c(key) {
        return Some(Input::Quit);
    }
    match key.code {
        KeyCode::Left => Some(Input::Left),
        KeyCode::Right => Some(Input::Right),
        KeyCode::Up => Some(Input::Up),
        KeyCode::Down => Some(Input::Down),
        KeyCode::Char(c) => Input::from_char(c),
        _ => None,
    }
}

/// Classify a key on a menu screen.
pub fn menu_key(key: &KeyEvent) -> KeyPress {
    if is_ctrl_c(key) {
        return KeyPress::Quit;
    }
    match key.code {
        KeyCode::Enter => KeyPress::Confirm,
        KeyCode::Char('q') | KeyCode::Char('Q') => KeyPress::Quit,
        _ => KeyPress::Other,
    }
}

fn resolve_batch(keys: &[KeyEvent]) -> Option<Input> {
    let symbols = keys.iter().filter_map(map_key);
    let mut last = None;
    for s in symbols {
        if s == Input::Quit {
            return Some(Input::Quit);
        }
        last = Some(s);
    }
    last
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
}
