//! Key bindings: arrows, vim (hjkl) and wasd.

use crate::engine::Direction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(Direction),
    Restart,
    KeepGoing,
    Quit,
    None,
}

/// Map key event to game action.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Restart,
        KeyCode::Char('c') | KeyCode::Char('C') => Action::KeepGoing,
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('a') => Action::Move(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('d') => Action::Move(Direction::Right),
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('w') => Action::Move(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('s') => Action::Move(Direction::Down),
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn arrows_and_letters_move() {
        let none = KeyModifiers::NONE;
        assert_eq!(key_to_action(key(KeyCode::Left, none)), Action::Move(Direction::Left));
        assert_eq!(key_to_action(key(KeyCode::Char('l'), none)), Action::Move(Direction::Right));
        assert_eq!(key_to_action(key(KeyCode::Char('w'), none)), Action::Move(Direction::Up));
        assert_eq!(key_to_action(key(KeyCode::Char('j'), none)), Action::Move(Direction::Down));
    }

    #[test]
    fn control_keys() {
        assert_eq!(key_to_action(key(KeyCode::Char('c'), KeyModifiers::CONTROL)), Action::Quit);
        assert_eq!(key_to_action(key(KeyCode::Char('c'), KeyModifiers::NONE)), Action::KeepGoing);
        assert_eq!(key_to_action(key(KeyCode::Char('R'), KeyModifiers::SHIFT)), Action::Restart);
        assert_eq!(key_to_action(key(KeyCode::Left, KeyModifiers::ALT)), Action::None);
        assert_eq!(key_to_action(key(KeyCode::Esc, KeyModifiers::NONE)), Action::Quit);
    }
}
