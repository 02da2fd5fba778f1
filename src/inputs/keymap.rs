//! Key and mouse bindings for the main viewer
//!
//! Popups (file dialog, prompts, help) handle their own keys; this map
//! only applies when no popup is open.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};

use crate::pdf::ScrollDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Open,
    Find,
    GoTo,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    NextHit,
    PrevHit,
    ClearSearch,
    Scroll(ScrollDirection),
    Help,
    Quit,
}

/// Map a key press to an action, `None` for unbound keys and releases
pub fn map_key(key: &KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    if ctrl {
        return match key.code {
            KeyCode::Char('o') => Some(Action::Open),
            KeyCode::Char('f') => Some(Action::Find),
            KeyCode::Char('g') => Some(Action::GoTo),
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }

    let action = match key.code {
        KeyCode::Char('/') => Action::Find,
        KeyCode::Char('g') => Action::GoTo,
        KeyCode::Left if shift => Action::Scroll(ScrollDirection::Left),
        KeyCode::Right if shift => Action::Scroll(ScrollDirection::Right),
        KeyCode::Right | KeyCode::PageDown | KeyCode::Char(' ') => Action::NextPage,
        KeyCode::Left | KeyCode::PageUp => Action::PrevPage,
        KeyCode::Home => Action::FirstPage,
        KeyCode::End => Action::LastPage,
        KeyCode::Char('+') | KeyCode::Char('=') => Action::ZoomIn,
        KeyCode::Char('-') => Action::ZoomOut,
        KeyCode::Char('0') => Action::ResetZoom,
        KeyCode::Char('n') => Action::NextHit,
        KeyCode::Char('N') => Action::PrevHit,
        KeyCode::Esc => Action::ClearSearch,
        KeyCode::Up | KeyCode::Char('k') => Action::Scroll(ScrollDirection::Up),
        KeyCode::Down | KeyCode::Char('j') => Action::Scroll(ScrollDirection::Down),
        KeyCode::Char('h') => Action::Scroll(ScrollDirection::Left),
        KeyCode::Char('l') => Action::Scroll(ScrollDirection::Right),
        KeyCode::Char('?') => Action::Help,
        KeyCode::Char('q') => Action::Quit,
        _ => return None,
    };
    Some(action)
}

/// Wheel scrolling over the canvas; shift turns vertical wheel into horizontal
pub fn map_scroll(mouse: &MouseEvent) -> Option<ScrollDirection> {
    let shift = mouse.modifiers.contains(KeyModifiers::SHIFT);
    match mouse.kind {
        MouseEventKind::ScrollDown if shift => Some(ScrollDirection::Right),
        MouseEventKind::ScrollUp if shift => Some(ScrollDirection::Left),
        MouseEventKind::ScrollDown => Some(ScrollDirection::Down),
        MouseEventKind::ScrollUp => Some(ScrollDirection::Up),
        MouseEventKind::ScrollRight => Some(ScrollDirection::Right),
        MouseEventKind::ScrollLeft => Some(ScrollDirection::Left),
        _ => None,
    }
}
