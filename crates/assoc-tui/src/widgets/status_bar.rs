//! Status bar widget: the 1-line strip at the top of the screen.
//!
//! Left to right: the app name and backend endpoint, the waiting indicator
//! while a query is in flight, and the latest status message. Keybinding
//! hints are right-aligned in the same row.

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};
use std::time::Duration;

const SPINNER: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub struct StatusBar<'a> {
    endpoint: &'a str,
    /// Time since the in-flight query was sent, if any.
    waiting: Option<Duration>,
    message: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(
        endpoint: &'a str,
        waiting: Option<Duration>,
        message: Option<&'a str>,
        theme: &'a Theme,
    ) -> Self {
        Self { endpoint, waiting, message, theme }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![
            Span::styled(" assoc ", Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)),
            Span::styled(format!(" {} ", self.endpoint), Style::default().add_modifier(Modifier::DIM)),
        ];

        if let Some(elapsed) = self.waiting {
            let frame = SPINNER[(elapsed.as_millis() / 100) as usize % SPINNER.len()];
            spans.push(Span::styled(
                format!(" {frame} waiting for results… {}s (Esc to cancel) ", elapsed.as_secs()),
                self.theme.waiting,
            ));
        }

        if let Some(message) = self.message {
            spans.push(Span::styled(format!(" {message}"), self.theme.message));
        }

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);

        let hint = " Enter:run  ?:help  Ctrl+c:quit ";
        let hint_x = area.right().saturating_sub(hint.chars().count() as u16);
        buf.set_string(hint_x, area.y, hint, Style::default().add_modifier(Modifier::DIM));
    }
}
