//! Keyboard surface: maps key presses to [`Action`]s.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    PlayPause,
    Next,
    Previous,
    ToggleLoop,
    ToggleShuffle,
    TogglePlaylistView,
    ToggleShortcuts,
    ScrubBack,
    ScrubForward,
    VolumeDown,
    VolumeUp,
    Slower,
    Faster,
    OpenDirectory,
    NewPlaylist,
    AddToPlaylist,
    CyclePlaylist,
    CursorUp,
    CursorDown,
    SelectAtCursor,
    /// Close the innermost overlay, or quit when nothing is open.
    Close,

    // focused text input
    Type(char),
    Erase,
    Submit,
    Cancel,
}

/// Resolve a key press. While a text input has focus every printable key is
/// text; Ctrl-C quits regardless.
pub fn action_for_key(key: KeyEvent, input_focused: bool) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }

    if input_focused {
        return match key.code {
            KeyCode::Char(c) if !c.is_control() => Some(Action::Type(c)),
            KeyCode::Backspace => Some(Action::Erase),
            KeyCode::Enter => Some(Action::Submit),
            KeyCode::Esc => Some(Action::Cancel),
            _ => None,
        };
    }

    let action = match key.code {
        KeyCode::Char(' ') => Action::PlayPause,
        KeyCode::Right => Action::Next,
        KeyCode::Left => Action::Previous,
        KeyCode::Char('l' | 'L') => Action::ToggleLoop,
        KeyCode::Char('s' | 'S') => Action::ToggleShuffle,
        KeyCode::Char('p' | 'P') => Action::TogglePlaylistView,
        KeyCode::Char('k' | 'K' | '?') => Action::ToggleShortcuts,
        KeyCode::Char('[') => Action::ScrubBack,
        KeyCode::Char(']') => Action::ScrubForward,
        KeyCode::Char('-') => Action::VolumeDown,
        KeyCode::Char('=' | '+') => Action::VolumeUp,
        KeyCode::Char('<' | ',') => Action::Slower,
        KeyCode::Char('>' | '.') => Action::Faster,
        KeyCode::Char('o') => Action::OpenDirectory,
        KeyCode::Char('n') => Action::NewPlaylist,
        KeyCode::Char('a') => Action::AddToPlaylist,
        KeyCode::Tab => Action::CyclePlaylist,
        KeyCode::Up => Action::CursorUp,
        KeyCode::Down => Action::CursorDown,
        KeyCode::Enter => Action::SelectAtCursor,
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Esc => Action::Close,
        _ => return None,
    };
    Some(action)
}
