use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use splitflash_app::Key;

pub(crate) fn is_ctrl_c(key: KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

/// Maps a terminal key press onto the orchestrator's key surface. Keys the
/// orchestrator never reacts to map to `None`.
pub(crate) fn to_key(key: KeyEvent) -> Option<Key> {
    if is_ctrl_c(key) {
        return Some(Key::CtrlC);
    }

    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return None;
    }

    match key.code {
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Tab => Some(Key::Tab),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Esc),
        KeyCode::Char(value) => Some(Key::Char(value)),
        _ => None,
    }
}
