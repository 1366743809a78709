//! Text field widget: one bordered single-line input of the search form.
//!
//! # Editing
//!
//! - `Char(c)` inserts at the cursor.
//! - `Backspace` deletes the character before the cursor.
//! - `Nav(Left)` / `Nav(Right)` move the cursor by one character.
//! - `LineStart` / `LineEnd` jump to either end.

use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct TextFieldState {
    value: String,
    /// Byte offset of the cursor within `value`.
    cursor: usize,
}

impl TextFieldState {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the contents and park the cursor at the end.
    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Handle a key event from the app shell. Events other than editing and
    /// cursor movement are ignored.
    pub fn handle(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Char(c) => {
                self.value.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                tracing::debug!(value = %self.value, cursor = self.cursor, "field: char inserted");
            }
            AppEvent::Backspace => {
                if self.cursor > 0 {
                    let prev = self.prev_boundary();
                    self.value.remove(prev);
                    self.cursor = prev;
                    tracing::debug!(value = %self.value, cursor = self.cursor, "field: backspace");
                }
            }
            AppEvent::Nav(Direction::Left) => {
                if self.cursor > 0 {
                    self.cursor = self.prev_boundary();
                }
            }
            AppEvent::Nav(Direction::Right) => {
                if self.cursor < self.value.len() {
                    self.cursor = self.value[self.cursor..]
                        .char_indices()
                        .nth(1)
                        .map(|(i, _)| self.cursor + i)
                        .unwrap_or(self.value.len());
                }
            }
            AppEvent::LineStart => self.cursor = 0,
            AppEvent::LineEnd => self.cursor = self.value.len(),
            _ => {}
        }
    }

    fn prev_boundary(&self) -> usize {
        self.value[..self.cursor]
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct TextField<'a> {
    state: &'a TextFieldState,
    title: &'a str,
    placeholder: &'a str,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> TextField<'a> {
    pub fn new(
        state: &'a TextFieldState,
        title: &'a str,
        placeholder: &'a str,
        focused: bool,
        theme: &'a Theme,
    ) -> Self {
        Self { state, title, placeholder, focused, theme }
    }

    /// Absolute terminal position of the text cursor within this widget's
    /// rendered area. Pass to `frame.set_cursor_position()` after rendering.
    pub fn cursor_position(&self, area: Rect) -> (u16, u16) {
        // The block adds 1-cell borders; text starts at (area.x+1, area.y+1).
        // Matches the horizontal scroll applied in render().
        let col = self.state.value[..self.state.cursor].chars().count() as u16;
        let inner_width = area.width.saturating_sub(2);
        let x = area.x + 1 + col.min(inner_width.saturating_sub(1));
        (x, area.y + 1)
    }
}

impl Widget for TextField<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            self.theme.border_focused
        } else {
            self.theme.border_unfocused
        };

        let block = Block::bordered().title(self.title).border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        let line = if self.state.value.is_empty() && !self.focused {
            Line::from(Span::styled(self.placeholder, self.theme.hint))
        } else {
            Line::from(self.state.value.as_str())
        };

        // Keep the cursor visible when the value is wider than the field
        let col = self.state.value[..self.state.cursor].chars().count() as u16;
        let scroll = col.saturating_sub(inner.width.saturating_sub(1));
        Paragraph::new(line).scroll((0, scroll)).render(inner, buf);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
