use std::io;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::fetch::FetchOutcome;

/// Everything the event loop reacts to, delivered on one channel.
#[derive(Debug)]
pub enum AppEvent {
    Input(Event),
    Tick,
    Fetched(FetchOutcome),
    /// Reading the terminal failed; the input thread has stopped.
    InputLost(io::Error),
}

/// Navigator-level input, decoupled from concrete keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Quit,
    Confirm,
    Back,
    ShowApis,
    ShowSyncTargets,
    ShowResourceTypes,
    ShowRawDocument,
    AllWorkspaces,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    StartFilter,
    FilterChar(char),
    FilterBackspace,
    FilterAccept,
    FilterCancel,
}

/// Map a terminal event to an input. `filtering` routes printable keys into the filter.
pub fn map_event(event: &Event, filtering: bool) -> Option<Input> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => map_key(key, filtering),
        _ => None,
    }
}

fn map_key(key: &KeyEvent, filtering: bool) -> Option<Input> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return Some(Input::Quit);
    }

    if filtering {
        return match key.code {
            KeyCode::Enter => Some(Input::FilterAccept),
            KeyCode::Esc => Some(Input::FilterCancel),
            KeyCode::Backspace => Some(Input::FilterBackspace),
            KeyCode::Up => Some(Input::Up),
            KeyCode::Down => Some(Input::Down),
            KeyCode::Char(c) if !ctrl => Some(Input::FilterChar(c)),
            _ => None,
        };
    }

    let input = match key.code {
        KeyCode::Char('q') => Input::Quit,
        KeyCode::Enter => Input::Confirm,
        KeyCode::Backspace | KeyCode::Esc => Input::Back,
        KeyCode::Char('a') => Input::ShowApis,
        KeyCode::Char('s') => Input::ShowSyncTargets,
        KeyCode::Char('r') => Input::ShowResourceTypes,
        KeyCode::Char('y') => Input::ShowRawDocument,
        KeyCode::Char('w') => Input::AllWorkspaces,
        KeyCode::Char('/') => Input::StartFilter,
        KeyCode::Up | KeyCode::Char('k') => Input::Up,
        KeyCode::Down | KeyCode::Char('j') => Input::Down,
        KeyCode::PageUp => Input::PageUp,
        KeyCode::PageDown => Input::PageDown,
        KeyCode::Home | KeyCode::Char('g') => Input::Home,
        KeyCode::End | KeyCode::Char('G') => Input::End,
        _ => return None,
    };
    Some(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(map_event(&key(KeyCode::Char('q')), false), Some(Input::Quit));
        assert_eq!(map_event(&key(KeyCode::Enter), false), Some(Input::Confirm));
        assert_eq!(map_event(&key(KeyCode::Backspace), false), Some(Input::Back));
        assert_eq!(map_event(&key(KeyCode::Esc), false), Some(Input::Back));
        assert_eq!(map_event(&key(KeyCode::Char('a')), false), Some(Input::ShowApis));
        assert_eq!(map_event(&key(KeyCode::Char('w')), false), Some(Input::AllWorkspaces));
        assert_eq!(map_event(&key(KeyCode::Char('j')), false), Some(Input::Down));
        assert_eq!(map_event(&key(KeyCode::Char('x')), false), None);
    }

    #[test]
    fn test_filter_mode_captures_printable_keys() {
        assert_eq!(map_event(&key(KeyCode::Char('q')), true), Some(Input::FilterChar('q')));
        assert_eq!(map_event(&key(KeyCode::Esc), true), Some(Input::FilterCancel));
        assert_eq!(map_event(&key(KeyCode::Enter), true), Some(Input::FilterAccept));
    }

    #[test]
    fn test_ctrl_c_always_quits() {
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(map_event(&ctrl_c, false), Some(Input::Quit));
        assert_eq!(map_event(&ctrl_c, true), Some(Input::Quit));
    }

    #[test]
    fn test_non_key_events_ignored() {
        assert_eq!(map_event(&Event::Resize(80, 24), false), None);
    }
}
