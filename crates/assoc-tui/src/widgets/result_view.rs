//! Result view widget: the scrollable display area under the form.
//!
//! Shows one of: an idle hint, the formatted chains of the last query, the
//! backend's error text verbatim, a request failure, or a cancellation note.
//!
//! # Navigation (when pane is focused)
//!
//! | Key | Action |
//! |-----|--------|
//! | `↑` / `k`, `↓` / `j` | Scroll one line |
//! | `←` / `h`, `→` / `l` | Scroll sideways (lines are not wrapped) |
//! | `PageUp` / `Ctrl+u`, `PageDown` / `Ctrl+d` | Scroll one page |
//! | `g` / `G` | Jump to top / bottom |

use std::cell::Cell;
use std::time::Duration;

use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use chrono::{DateTime, Local};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{
        Block, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget,
    },
};

const PAGE_STEP: usize = 10;
const HSCROLL_STEP: usize = 8;

const IDLE_HINT: &[&str] = &[
    "Fill in terms and stages, then press Enter to search.",
    "",
    "Try :demo synonym or :demo wiki for an example, ? for help.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Idle,
    Results,
    /// `{"error": ...}` from the backend.
    ServerError,
    /// Transport, timeout, status or decode failure.
    Failed,
    Cancelled,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

pub struct ResultViewState {
    kind: ResultKind,
    lines: Vec<String>,
    /// Index of the first visible line.
    pub scroll: usize,
    /// Columns hidden on the left.
    pub hscroll: usize,
    pub completed_at: Option<DateTime<Local>>,
    pub elapsed: Option<Duration>,
    pub show_timestamps: bool,
    pub timestamp_format: String,
    /// Cached from the last render so `handle()` can clamp scrolling.
    last_height: Cell<usize>,
}

impl ResultViewState {
    pub fn new(show_timestamps: bool, timestamp_format: impl Into<String>) -> Self {
        Self {
            kind: ResultKind::Idle,
            lines: Vec::new(),
            scroll: 0,
            hscroll: 0,
            completed_at: None,
            elapsed: None,
            show_timestamps,
            timestamp_format: timestamp_format.into(),
            last_height: Cell::new(20),
        }
    }

    pub fn kind(&self) -> ResultKind {
        self.kind
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Replace the displayed content and reset scrolling.
    pub fn show(&mut self, kind: ResultKind, text: &str, elapsed: Duration) {
        self.kind = kind;
        self.lines = text.lines().map(str::to_string).collect();
        self.scroll = 0;
        self.hscroll = 0;
        self.completed_at = Some(Local::now());
        self.elapsed = Some(elapsed);
        tracing::debug!(?kind, lines = self.lines.len(), "results: replaced");
    }

    fn height(&self) -> usize {
        self.last_height.get().max(1)
    }

    fn max_scroll(&self) -> usize {
        self.lines.len().saturating_sub(self.height())
    }

    pub fn handle(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Nav(Direction::Up) => self.scroll = self.scroll.saturating_sub(1),
            AppEvent::Nav(Direction::Down) => {
                self.scroll = (self.scroll + 1).min(self.max_scroll())
            }
            AppEvent::Nav(Direction::Left) => {
                self.hscroll = self.hscroll.saturating_sub(HSCROLL_STEP)
            }
            AppEvent::Nav(Direction::Right) => self.hscroll += HSCROLL_STEP,
            AppEvent::ScrollUp => self.scroll = self.scroll.saturating_sub(PAGE_STEP),
            AppEvent::ScrollDown => {
                self.scroll = (self.scroll + PAGE_STEP).min(self.max_scroll())
            }
            AppEvent::ScrollToTop => {
                self.scroll = 0;
                self.hscroll = 0;
            }
            AppEvent::ScrollToBottom => self.scroll = self.max_scroll(),
            _ => return,
        }
        tracing::debug!(scroll = self.scroll, hscroll = self.hscroll, "results: scrolled");
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct ResultView<'a> {
    state: &'a ResultViewState,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> ResultView<'a> {
    pub fn new(state: &'a ResultViewState, focused: bool, theme: &'a Theme) -> Self {
        Self { state, focused, theme }
    }

    fn title(&self) -> String {
        let label = match self.state.kind {
            ResultKind::Idle | ResultKind::Results => "Results",
            ResultKind::ServerError => "Backend error",
            ResultKind::Failed => "Request failed",
            ResultKind::Cancelled => "Cancelled",
        };
        match (self.state.show_timestamps, self.state.completed_at, self.state.elapsed) {
            (true, Some(at), Some(elapsed)) => format!(
                " {label} · {} · {:.1}s ",
                at.format(&self.state.timestamp_format),
                elapsed.as_secs_f64()
            ),
            _ => format!(" {label} "),
        }
    }
}

impl Widget for ResultView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            self.theme.border_focused
        } else {
            self.theme.border_unfocused
        };

        let block = Block::bordered().title(self.title()).border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        let height = inner.height as usize;
        self.state.last_height.set(height);

        let lines: Vec<Line> = match self.state.kind {
            ResultKind::Idle => hint_lines(IDLE_HINT, self.theme),
            ResultKind::Results if self.state.lines.is_empty() => {
                hint_lines(&["The backend returned no associations."], self.theme)
            }
            kind => self
                .state
                .lines
                .iter()
                .skip(self.state.scroll)
                .take(height)
                .map(|text| styled_line(kind, text, self.theme))
                .collect(),
        };

        let text_area = Rect { width: inner.width.saturating_sub(1), ..inner };
        let sb_area = Rect {
            x: inner.right().saturating_sub(1),
            width: 1,
            ..inner
        };

        Paragraph::new(lines)
            .scroll((0, self.state.hscroll.min(u16::MAX as usize) as u16))
            .render(text_area, buf);

        let total = self.state.lines.len();
        if total > height {
            let mut sb_state = ScrollbarState::new(total)
                .position(self.state.scroll)
                .viewport_content_length(height);
            StatefulWidget::render(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(None)
                    .end_symbol(None),
                sb_area,
                buf,
                &mut sb_state,
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Line rendering
// ---------------------------------------------------------------------------

fn hint_lines(text: &[&'static str], theme: &Theme) -> Vec<Line<'static>> {
    text.iter()
        .map(|t| Line::from(Span::styled(*t, theme.hint)))
        .collect()
}

fn styled_line<'a>(kind: ResultKind, text: &'a str, theme: &Theme) -> Line<'a> {
    let style: Style = match kind {
        ResultKind::ServerError | ResultKind::Failed => theme.error,
        ResultKind::Cancelled => theme.cancelled,
        ResultKind::Idle | ResultKind::Results => {
            if let Some(association) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
                theme.association_style(association)
            } else if text.starts_with("- nothing found") {
                theme.nothing_found
            } else {
                theme.explanation
            }
        }
    };
    Line::from(Span::styled(text, style))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
