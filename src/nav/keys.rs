use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a key press means to the shell, independent of the active pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    Top,
    Bottom,
    PageUp,
    PageDown,
    Activate,
    Back,
    Yank,
    ToggleHelp,
    ToggleWrap,
    Interrupt,
}

pub fn action_for(key: &KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('d') => Some(Action::Interrupt),
            _ => None,
        };
    }
    let action = match key.code {
        KeyCode::Up | KeyCode::Char('k') => Action::Up,
        KeyCode::Down | KeyCode::Char('j') => Action::Down,
        KeyCode::Home | KeyCode::Char('g') => Action::Top,
        KeyCode::End | KeyCode::Char('G') => Action::Bottom,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Enter => Action::Activate,
        KeyCode::Esc | KeyCode::Char('q') => Action::Back,
        KeyCode::Char('y') => Action::Yank,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::Char('w') | KeyCode::Char('W') => Action::ToggleWrap,
        _ => return None,
    };
    Some(action)
}

/// Short help line: `(key, description)` pairs in display order.
pub const SHORT_HELP: &[(&str, &str)] = &[
    ("↑/k", "up"),
    ("↓/j", "down"),
    ("enter", "details"),
    ("y", "yank"),
    ("q", "quit"),
    ("?", "help"),
];

pub const FULL_HELP: &[(&str, &str)] = &[
    ("↑/k", "up"),
    ("↓/j", "down"),
    ("home/g", "top"),
    ("end/G", "bottom"),
    ("pgup/pgdn", "page"),
    ("enter", "details"),
    ("y", "yank full name"),
    ("w", "wrap (details)"),
    ("q/esc", "back / quit"),
    ("ctrl+c", "exit"),
    ("?", "close help"),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn vim_and_arrow_keys_share_actions() {
        assert_eq!(action_for(&key(KeyCode::Char('j'))), Some(Action::Down));
        assert_eq!(action_for(&key(KeyCode::Down)), Some(Action::Down));
        assert_eq!(action_for(&key(KeyCode::Char('k'))), Some(Action::Up));
        assert_eq!(action_for(&key(KeyCode::Esc)), Some(Action::Back));
        assert_eq!(action_for(&key(KeyCode::Char('q'))), Some(Action::Back));
        assert_eq!(action_for(&key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn ctrl_c_interrupts() {
        let ev = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(action_for(&ev), Some(Action::Interrupt));
        let ev = KeyEvent::new(KeyCode::Char('y'), KeyModifiers::CONTROL);
        assert_eq!(action_for(&ev), None);
    }
}
