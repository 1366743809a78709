//! Semantic application events: crossterm key events mapped to a
//! widget-agnostic vocabulary so widgets never touch crossterm directly.
//!
//! # Usage
//!
//! In the main event loop, call [`to_app_event`] on every [`crossterm::event::Event`]
//! and match on the returned [`AppEvent`] instead of crossterm types.
//!
//! # Keybindings
//!
//! | Key(s)                  | Event                      |
//! |-------------------------|----------------------------|
//! | `q`, `Ctrl+c`           | `Quit`                     |
//! | `Tab` / `Shift+Tab`     | `FocusNext` / `FocusPrev`  |
//! | `Ctrl+r`                | `Submit`                   |
//! | `Ctrl+s`                | `CycleStage`               |
//! | `PageUp`, `Ctrl+u`      | `ScrollUp`                 |
//! | `PageDown`, `Ctrl+d`    | `ScrollDown`               |
//! | `g` / `G`               | `ScrollToTop` / `ScrollToBottom` |
//! | `↑` / `k`               | `Nav(Up)`                  |
//! | `↓` / `j`               | `Nav(Down)`                |
//! | `←` / `h`               | `Nav(Left)`                |
//! | `→` / `l`               | `Nav(Right)`               |
//! | `Home` / `End`          | `LineStart` / `LineEnd`    |
//! | printable char          | `Char(c)`                  |
//! | `Backspace`             | `Backspace`                |
//! | `Enter`                 | `Enter`                    |
//! | terminal resize         | `Resize(w, h)`             |
//!
//! ## Insert mode
//!
//! When a form field or the command bar is focused, the event loop calls
//! [`to_app_event_insert`] instead. In insert mode:
//! - hjkl, q, g, G produce `Char` events
//! - Arrow keys still produce `Nav` for cursor movement
//! - Only the `Ctrl` chords, `Escape`, `Enter`, `Tab`, `Home`, `End` and
//!   `Backspace` keep their special bindings

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

/// Cardinal direction for cursor movement and result scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A semantic application event derived from a raw crossterm [`Event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Exit the application.
    Quit,
    /// Move keyboard focus to the next pane.
    FocusNext,
    /// Move keyboard focus to the previous pane.
    FocusPrev,
    /// Send the current form to the backend.
    Submit,
    /// Append the next known stage name to the stages field.
    CycleStage,
    /// Scroll the result pane up one page.
    ScrollUp,
    /// Scroll the result pane down one page.
    ScrollDown,
    ScrollToTop,
    ScrollToBottom,
    /// Cursor movement in a field, or line scrolling in the result pane.
    Nav(Direction),
    LineStart,
    LineEnd,
    /// A printable character forwarded to the active text input.
    Char(char),
    /// Delete the character before the cursor in the active text input.
    Backspace,
    /// Confirm the active input.
    Enter,
    /// The terminal was resized to the given (width, height).
    Resize(u16, u16),
    /// Cancel the running query or leave the active field.
    Escape,
}

/// Map a raw crossterm [`Event`] to an [`AppEvent`] (normal / navigation mode).
///
/// Returns `None` for events that carry no semantic meaning for the
/// application (mouse events, unbound keys).
pub fn to_app_event(event: Event) -> Option<AppEvent> {
    match event {
        Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
        Event::Key(key) => map_key(key),
        _ => None,
    }
}

/// Map a raw crossterm [`Event`] to an [`AppEvent`] for text-input ("insert") mode.
///
/// Call this variant whenever a form field or the command bar has focus.
pub fn to_app_event_insert(event: Event) -> Option<AppEvent> {
    match event {
        Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
        Event::Key(key) => map_key_insert(key),
        _ => None,
    }
}

/// Bindings shared by both modes. Checked first.
fn map_common(key: &KeyEvent) -> Option<AppEvent> {
    use KeyCode::*;
    use KeyModifiers as Mod;

    match key.code {
        Char('c') if key.modifiers == Mod::CONTROL => Some(AppEvent::Quit),
        Char('r') if key.modifiers == Mod::CONTROL => Some(AppEvent::Submit),
        Char('s') if key.modifiers == Mod::CONTROL => Some(AppEvent::CycleStage),
        Tab if key.modifiers == Mod::NONE => Some(AppEvent::FocusNext),
        // Most terminals report Shift+Tab as BackTab, some with SHIFT set
        BackTab => Some(AppEvent::FocusPrev),
        PageUp => Some(AppEvent::ScrollUp),
        PageDown => Some(AppEvent::ScrollDown),
        Home => Some(AppEvent::LineStart),
        End => Some(AppEvent::LineEnd),
        Backspace if key.modifiers == Mod::NONE => Some(AppEvent::Backspace),
        Enter if key.modifiers == Mod::NONE => Some(AppEvent::Enter),
        Esc => Some(AppEvent::Escape),
        _ => None,
    }
}

fn map_key(key: KeyEvent) -> Option<AppEvent> {
    use KeyCode::*;
    use KeyModifiers as Mod;

    if let Some(ev) = map_common(&key) {
        return Some(ev);
    }

    match key.code {
        Char('q') if key.modifiers == Mod::NONE => Some(AppEvent::Quit),

        Char('u') if key.modifiers == Mod::CONTROL => Some(AppEvent::ScrollUp),
        Char('d') if key.modifiers == Mod::CONTROL => Some(AppEvent::ScrollDown),

        Char('g') if key.modifiers == Mod::NONE => Some(AppEvent::ScrollToTop),
        // Uppercase G: SHIFT may or may not be set depending on the terminal
        Char('G') => Some(AppEvent::ScrollToBottom),

        Up | Char('k') if key.modifiers == Mod::NONE => Some(AppEvent::Nav(Direction::Up)),
        Down | Char('j') if key.modifiers == Mod::NONE => Some(AppEvent::Nav(Direction::Down)),
        Left | Char('h') if key.modifiers == Mod::NONE => Some(AppEvent::Nav(Direction::Left)),
        Right | Char('l') if key.modifiers == Mod::NONE => {
            Some(AppEvent::Nav(Direction::Right))
        }

        Char(c) if key.modifiers == Mod::NONE || key.modifiers == Mod::SHIFT => {
            Some(AppEvent::Char(c))
        }

        _ => None,
    }
}

fn map_key_insert(key: KeyEvent) -> Option<AppEvent> {
    use KeyCode::*;
    use KeyModifiers as Mod;

    if let Some(ev) = map_common(&key) {
        return Some(ev);
    }

    match key.code {
        Up => Some(AppEvent::Nav(Direction::Up)),
        Down => Some(AppEvent::Nav(Direction::Down)),
        Left => Some(AppEvent::Nav(Direction::Left)),
        Right => Some(AppEvent::Nav(Direction::Right)),

        // Every printable character, including normal-mode shortcuts, is literal
        Char(c) if key.modifiers == Mod::NONE || key.modifiers == Mod::SHIFT => {
            Some(AppEvent::Char(c))
        }

        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
