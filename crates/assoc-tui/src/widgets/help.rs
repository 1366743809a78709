//! Help popup: centred floating overlay listing keybindings and commands.
//!
//! Toggle with `?` from the result pane; close with `?` or `Escape`.

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Widget},
};

const BINDINGS: &[(&str, &str)] = &[
    ("Ctrl+c", "Quit"),
    ("q", "Quit (result pane)"),
    ("Tab / Shift+Tab", "Cycle focus: terms → stages → flavortext → results"),
    ("Enter  /  Ctrl+r", "Run the query"),
    ("Escape", "Cancel running query, or leave the field"),
    ("Ctrl+s", "Append the next known stage"),
    ("↑ k  /  ↓ j", "Scroll results"),
    ("← h  /  → l", "Scroll results sideways"),
    ("PageUp / PageDown", "Scroll results by a page"),
    ("g  /  G", "Top / bottom of results"),
    (":", "Open the command bar (result pane)"),
    ("?", "Toggle this help popup"),
];

const COMMANDS: &[(&str, &str)] = &[
    (":run  :cancel", "Run / cancel the query"),
    (":demo <synonym|wiki>", "Fill the form with an example"),
    (":stage <Name>", "Append a stage"),
    (":unstage", "Remove the last stage"),
    (":clear", "Clear the flavortext"),
    (":theme <default|gruvbox>", "Switch colour theme"),
    (":ts", "Toggle result timestamps"),
    (":q", "Quit"),
];

pub struct HelpPopup<'a> {
    theme: &'a Theme,
}

impl<'a> HelpPopup<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }
}

impl Widget for HelpPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = (BINDINGS.len() + COMMANDS.len() + 5) as u16;
        let popup = centered_rect(80, height, area);
        Clear.render(popup, buf);

        let block = Block::bordered()
            .title(" assoc: keybindings (? to close) ")
            .border_style(self.theme.border_focused);

        let inner = block.inner(popup);
        block.render(popup, buf);

        let row = |(key, desc): &(&'static str, &'static str)| {
            Line::from(vec![
                Span::styled(
                    format!("  {:<26}", key),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(*desc),
            ])
        };

        let mut lines: Vec<Line> = BINDINGS.iter().map(row).collect();
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("  Commands", self.theme.heading)));
        lines.extend(COMMANDS.iter().map(row));

        Paragraph::new(lines).render(inner, buf);
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}
