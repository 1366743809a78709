//! Top-level application state and the main event loop.
//!
//! [`App::run`] sets up the terminal, drives the crossterm event loop, and
//! tears everything down cleanly on exit or panic. Queries run on the tokio
//! runtime through a [`Dispatch`] implementation; their outcomes are applied
//! to [`AppState`] on the next tick.

use crate::{
    commands::{execute_command, Command},
    event::{self, AppEvent},
    runner::{Completion, Dispatch},
    theme::Theme,
    widgets::{
        command_bar::{CommandBar, CommandBarState},
        help::HelpPopup,
        result_view::{ResultKind, ResultView, ResultViewState},
        status_bar::StatusBar,
        text_field::{TextField, TextFieldState},
    },
};
use assoc_client::{ClientError, QueryOutcome};
use assoc_core::{config::Config, format_response, Query, Stage};
use crossterm::{
    event::{self as ct_event, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction as LayoutDir, Layout, Rect},
    Frame, Terminal,
};
use std::{
    io,
    time::{Duration, Instant},
};
use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Terms,
    Stages,
    Flavortext,
    Results,
    /// Vim-style `:` command line is active.
    Command,
}

impl Focus {
    fn next(self) -> Focus {
        match self {
            Focus::Terms => Focus::Stages,
            Focus::Stages => Focus::Flavortext,
            Focus::Flavortext => Focus::Results,
            Focus::Results | Focus::Command => Focus::Terms,
        }
    }

    fn prev(self) -> Focus {
        match self {
            Focus::Terms => Focus::Results,
            Focus::Stages => Focus::Terms,
            Focus::Flavortext => Focus::Stages,
            Focus::Results | Focus::Command => Focus::Flavortext,
        }
    }

    fn is_field(self) -> bool {
        matches!(self, Focus::Terms | Focus::Stages | Focus::Flavortext)
    }
}

/// The query currently awaiting an answer.
#[derive(Debug)]
pub struct InFlight {
    pub id: u64,
    pub token: CancellationToken,
    pub started: Instant,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub terms: TextFieldState,
    pub stages: TextFieldState,
    pub flavortext: TextFieldState,
    pub results: ResultViewState,
    pub focus: Focus,
    /// Focus state before entering command mode, restored on exit.
    pub prev_focus: Focus,
    pub theme: Theme,
    pub config: Config,
    /// Backend URL shown in the status bar.
    pub endpoint: String,
    pub show_help: bool,
    pub command_bar: CommandBarState,
    /// `Some` while a query is outstanding; drives the waiting indicator.
    pub waiting: Option<InFlight>,
    /// Latest one-line status message.
    pub status: Option<String>,
    next_id: u64,
    /// Index into [`Stage::ALL`] of the stage `Ctrl+s` appends next.
    next_stage: usize,
    pub quit: bool,
}

impl AppState {
    pub fn new(config: Config, theme: Theme, endpoint: impl Into<String>) -> Self {
        let results = ResultViewState::new(config.ui.show_timestamps, config.ui.timestamp_format.clone());
        Self {
            terms: TextFieldState::default(),
            stages: TextFieldState::default(),
            flavortext: TextFieldState::default(),
            results,
            focus: Focus::Terms,
            prev_focus: Focus::Terms,
            theme,
            config,
            endpoint: endpoint.into(),
            show_help: false,
            command_bar: CommandBarState::default(),
            waiting: None,
            status: None,
            next_id: 1,
            next_stage: 0,
            quit: false,
        }
    }

    /// The request the form currently describes.
    pub fn build_query(&self) -> Query {
        Query::from_fields(self.terms.value(), self.stages.value(), self.flavortext.value())
    }

    /// Send the form to the backend. Refused while another query is in flight.
    pub fn submit(&mut self, runner: &mut dyn Dispatch) {
        if self.waiting.is_some() {
            tracing::debug!("submit refused, query already in flight");
            self.status = Some("a query is already running (Esc to cancel)".to_string());
            return;
        }

        let query = self.build_query();
        let unknown = query.unknown_stages();
        if !unknown.is_empty() {
            tracing::debug!(?unknown, "submitting unrecognised stage names as-is");
        }

        let id = self.next_id;
        self.next_id += 1;
        let token = CancellationToken::new();
        tracing::info!(id, terms = ?query.terms, stages = ?query.stages, "query submitted");
        runner.dispatch(id, query, token.clone());

        self.waiting = Some(InFlight { id, token, started: Instant::now() });
        self.status = None;
    }

    /// Abandon the in-flight query, if any. Its late answer is ignored.
    pub fn cancel(&mut self) {
        match self.waiting.take() {
            Some(in_flight) => {
                in_flight.token.cancel();
                tracing::info!(id = in_flight.id, "query cancelled by user");
                self.results.show(
                    ResultKind::Cancelled,
                    "Query cancelled.",
                    in_flight.started.elapsed(),
                );
                self.status = Some("cancelled".to_string());
            }
            None => {
                self.status = Some("nothing to cancel".to_string());
            }
        }
    }

    /// Show a finished query. Completions for anything but the current
    /// in-flight id are stale and dropped.
    pub fn apply(&mut self, completion: Completion) {
        let in_flight = match self.waiting.take() {
            Some(in_flight) if in_flight.id == completion.id => in_flight,
            other => {
                tracing::debug!(id = completion.id, "stale completion ignored");
                self.waiting = other;
                return;
            }
        };
        let elapsed = in_flight.started.elapsed();

        let (kind, text) = match completion.outcome {
            Ok(QueryOutcome::Results(result)) => (ResultKind::Results, format_response(&result)),
            Ok(QueryOutcome::ServerError(message)) => (ResultKind::ServerError, message),
            Err(ClientError::Cancelled) => (ResultKind::Cancelled, "Query cancelled.".to_string()),
            Err(e @ ClientError::Transport(_)) => (ResultKind::Failed, e.to_string()),
            Err(e) => (ResultKind::Failed, format!("request failed: {e}")),
        };
        tracing::debug!(id = completion.id, ?kind, elapsed_ms = elapsed.as_millis() as u64, "query applied");
        self.results.show(kind, &text, elapsed);
        self.status = None;
    }

    /// Append the next known stage, cycling through [`Stage::ALL`].
    fn cycle_stage(&mut self) {
        let stage = Stage::ALL[self.next_stage % Stage::ALL.len()].clone();
        self.next_stage += 1;
        let stages = crate::form::add_stage(self.stages.value(), stage.name());
        tracing::debug!(stage = stage.name(), "stage appended");
        self.stages.set(stages);
    }

    fn focused_field(&mut self) -> Option<&mut TextFieldState> {
        match self.focus {
            Focus::Terms => Some(&mut self.terms),
            Focus::Stages => Some(&mut self.stages),
            Focus::Flavortext => Some(&mut self.flavortext),
            Focus::Results | Focus::Command => None,
        }
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    state: AppState,
    runner: Box<dyn Dispatch>,
}

impl App {
    pub fn new(state: AppState, runner: Box<dyn Dispatch>) -> Self {
        App { state, runner }
    }

    /// Set up the terminal, run the event loop, and restore the terminal on exit.
    pub fn run(mut self) -> anyhow::Result<()> {
        install_panic_hook();

        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        // Always restore terminal, even if the loop returned an error
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        // Don't leave a request running behind us
        if let Some(in_flight) = self.state.waiting.take() {
            in_flight.token.cancel();
        }

        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        loop {
            self.drain_completions();

            {
                let s = &self.state;
                terminal.draw(|frame| draw(frame, s))?;
            }

            if self.state.quit {
                break;
            }

            if ct_event::poll(Duration::from_millis(16))? {
                match ct_event::read()? {
                    Event::Key(key)
                        if key.kind == crossterm::event::KeyEventKind::Press =>
                    {
                        let raw = Event::Key(key);
                        // Use insert-mode mapping when a text widget is focused
                        let app_event = if is_insert_mode(self.state.focus) {
                            event::to_app_event_insert(raw)
                        } else {
                            event::to_app_event(raw)
                        };
                        if let Some(ev) = app_event {
                            tracing::debug!(
                                focus = ?self.state.focus,
                                event = ?ev,
                                "key event"
                            );
                            self.handle(ev);
                        }
                    }
                    other => {
                        if let Some(ev) = event::to_app_event(other) {
                            self.handle(ev);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn drain_completions(&mut self) {
        while let Some(completion) = self.runner.try_recv() {
            self.state.apply(completion);
        }
    }

    fn handle(&mut self, event: AppEvent) {
        let s = &mut self.state;
        let runner = self.runner.as_mut();

        // Help popup intercepts all events; only close keys pass through.
        if s.show_help {
            match event {
                AppEvent::Char('?') | AppEvent::Escape | AppEvent::Quit => {
                    tracing::debug!("help popup closed");
                    s.show_help = false;
                }
                _ => {}
            }
            return;
        }

        // Command mode intercepts all events.
        if s.focus == Focus::Command {
            match event {
                AppEvent::Escape => {
                    tracing::debug!("command bar cancelled");
                    s.command_bar.clear();
                    s.focus = s.prev_focus;
                }
                AppEvent::Enter => {
                    let input = s.command_bar.input.clone();
                    match Command::parse(&input) {
                        Ok(cmd) => {
                            tracing::debug!(command = ?cmd, "executing command");
                            s.command_bar.clear();
                            s.focus = s.prev_focus;
                            execute_command(s, cmd, runner);
                        }
                        Err(msg) if msg.is_empty() => {
                            // Empty input, just close
                            s.command_bar.clear();
                            s.focus = s.prev_focus;
                        }
                        Err(msg) => {
                            // Show the error; bar stays open
                            s.command_bar.error = Some(msg);
                        }
                    }
                }
                AppEvent::Quit => s.quit = true,
                other => s.command_bar.handle(&other),
            }
            return;
        }

        match event {
            AppEvent::Char('?') if s.focus == Focus::Results => {
                tracing::debug!("help popup opened");
                s.show_help = true;
            }

            AppEvent::Char(':') if s.focus == Focus::Results => {
                tracing::debug!(prev_focus = ?s.focus, "entering command mode");
                s.prev_focus = s.focus;
                s.command_bar.clear();
                s.focus = Focus::Command;
            }

            AppEvent::Quit => {
                tracing::debug!("quit");
                s.quit = true;
            }

            AppEvent::Submit => s.submit(runner),
            AppEvent::Enter if s.focus.is_field() => s.submit(runner),

            // Cancel first; with nothing in flight, leave the form for the results
            AppEvent::Escape => {
                if s.waiting.is_some() {
                    s.cancel();
                } else if s.focus.is_field() {
                    tracing::debug!(from = ?s.focus, "focus -> Results");
                    s.focus = Focus::Results;
                }
            }

            AppEvent::FocusNext | AppEvent::FocusPrev => {
                let to = if event == AppEvent::FocusNext {
                    s.focus.next()
                } else {
                    s.focus.prev()
                };
                tracing::debug!(from = ?s.focus, to = ?to, "focus cycle");
                s.focus = to;
            }

            AppEvent::CycleStage => s.cycle_stage(),

            // Terminal resize is handled automatically by ratatui
            AppEvent::Resize(_, _) => {}

            other => dispatch_to_focused(s, other),
        }
    }
}

/// Returns true when the current focus is on a text-input widget, meaning
/// alphabetic keys should produce characters rather than trigger shortcuts.
fn is_insert_mode(focus: Focus) -> bool {
    focus.is_field() || focus == Focus::Command
}

/// Route an event to the widget that owns the current focus.
fn dispatch_to_focused(s: &mut AppState, event: AppEvent) {
    if s.focus == Focus::Results {
        s.results.handle(&event);
    } else if let Some(field) = s.focused_field() {
        field.handle(&event);
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn draw(frame: &mut Frame, state: &AppState) {
    let area = frame.area();

    // Vertical: status line | terms | stages | flavortext | results
    let vert = Layout::default()
        .direction(LayoutDir::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Fill(1),
        ])
        .split(area);

    let waiting = state.waiting.as_ref().map(|w| w.started.elapsed());
    frame.render_widget(
        StatusBar::new(&state.endpoint, waiting, state.status.as_deref(), &state.theme),
        vert[0],
    );

    let fields = [
        (&state.terms, " Terms ", "comma separated, e.g. symbol,coral", Focus::Terms, vert[1]),
        (&state.stages, " Stages ", "comma separated, Ctrl+s adds one", Focus::Stages, vert[2]),
        (&state.flavortext, " Flavortext ", "optional", Focus::Flavortext, vert[3]),
    ];
    for (field, title, placeholder, focus, rect) in fields {
        let widget = TextField::new(field, title, placeholder, state.focus == focus, &state.theme);
        if state.focus == focus {
            let (cx, cy) = widget.cursor_position(rect);
            frame.render_widget(widget, rect);
            frame.set_cursor_position((cx, cy));
        } else {
            frame.render_widget(widget, rect);
        }
    }

    frame.render_widget(
        ResultView::new(&state.results, state.focus == Focus::Results, &state.theme),
        vert[4],
    );

    if state.show_help {
        frame.render_widget(HelpPopup::new(&state.theme), area);
    }

    // Command bar overlays the bottom row of the screen
    if state.focus == Focus::Command {
        let cmd_area = Rect { y: area.bottom().saturating_sub(1), height: 1, ..area };
        frame.render_widget(CommandBar::new(&state.command_bar, &state.theme), cmd_area);
        let col = state.command_bar.cursor_col(cmd_area);
        frame.set_cursor_position((col, cmd_area.y));
    }
}

// ---------------------------------------------------------------------------
// Terminal helpers
// ---------------------------------------------------------------------------

fn install_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original(info);
    }));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assoc_core::{Chain, ChainStep, TermResult};
    use pretty_assertions::assert_eq;
    use std::{cell::RefCell, collections::VecDeque, rc::Rc};

    #[derive(Default)]
    struct Shared {
        sent: Vec<(u64, Query, CancellationToken)>,
        ready: VecDeque<Completion>,
    }

    /// Records dispatched queries; completions are queued by the test.
    #[derive(Clone, Default)]
    struct Recording(Rc<RefCell<Shared>>);

    impl Dispatch for Recording {
        fn dispatch(&mut self, id: u64, query: Query, token: CancellationToken) {
            self.0.borrow_mut().sent.push((id, query, token));
        }

        fn try_recv(&mut self) -> Option<Completion> {
            self.0.borrow_mut().ready.pop_front()
        }
    }

    fn app() -> (App, Recording) {
        let recording = Recording::default();
        let state = AppState::new(Config::defaults(), Theme::load_default(), "http://test/query");
        (App::new(state, Box::new(recording.clone())), recording)
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle(AppEvent::Char(c));
        }
    }

    fn one_term_result() -> QueryOutcome {
        let chain = Chain::new(vec![ChainStep::new(Stage::Synonym, "symbol", "", "token")]);
        QueryOutcome::Results(vec![TermResult::new(vec![("symbol".to_string(), chain)])])
    }

    #[test]
    fn enter_in_a_field_submits_the_form() {
        let (mut app, rec) = app();
        type_str(&mut app, "symbol,coral");
        app.handle(AppEvent::FocusNext);
        type_str(&mut app, "Synonym");
        app.handle(AppEvent::Enter);

        let shared = rec.0.borrow();
        assert_eq!(shared.sent.len(), 1);
        let (id, query, _) = &shared.sent[0];
        assert_eq!(*id, 1);
        assert_eq!(query.terms, vec!["symbol", "coral"]);
        assert_eq!(query.stages, vec!["Synonym"]);
        assert_eq!(query.flavortext, "");
        assert!(app.state.waiting.is_some());
    }

    #[test]
    fn second_submit_is_refused_while_waiting() {
        let (mut app, rec) = app();
        app.handle(AppEvent::Submit);
        app.handle(AppEvent::Submit);
        assert_eq!(rec.0.borrow().sent.len(), 1);
        assert!(app.state.status.as_deref().unwrap().contains("already running"));
    }

    #[test]
    fn completion_shows_results_and_clears_waiting() {
        let (mut app, rec) = app();
        app.handle(AppEvent::Submit);
        rec.0.borrow_mut().ready.push_back(Completion { id: 1, outcome: Ok(one_term_result()) });
        app.drain_completions();

        assert!(app.state.waiting.is_none());
        assert_eq!(app.state.results.kind(), ResultKind::Results);
        assert_eq!(app.state.results.lines(), &["[token]", "- symbol is a synonym of token"]);
    }

    #[test]
    fn every_failure_clears_waiting() {
        let failures = [
            Ok(QueryOutcome::ServerError("no terms".to_string())),
            Err(ClientError::Timeout(Duration::from_secs(30))),
            Err(ClientError::Status { status: 502, body: "bad gateway".to_string() }),
            Err(ClientError::Cancelled),
        ];
        let kinds = [ResultKind::ServerError, ResultKind::Failed, ResultKind::Failed, ResultKind::Cancelled];

        for (outcome, kind) in failures.into_iter().zip(kinds) {
            let (mut app, rec) = app();
            app.handle(AppEvent::Submit);
            rec.0.borrow_mut().ready.push_back(Completion { id: 1, outcome });
            app.drain_completions();
            assert!(app.state.waiting.is_none());
            assert_eq!(app.state.results.kind(), kind);
        }
    }

    #[test]
    fn server_error_is_shown_verbatim() {
        let (mut app, rec) = app();
        app.handle(AppEvent::Submit);
        rec.0.borrow_mut().ready.push_back(Completion {
            id: 1,
            outcome: Ok(QueryOutcome::ServerError("unknown stage: Foo".to_string())),
        });
        app.drain_completions();
        assert_eq!(app.state.results.lines(), &["unknown stage: Foo"]);
    }

    #[test]
    fn timeout_reads_as_request_failed() {
        let (mut app, rec) = app();
        app.handle(AppEvent::Submit);
        rec.0.borrow_mut().ready.push_back(Completion {
            id: 1,
            outcome: Err(ClientError::Timeout(Duration::from_secs(30))),
        });
        app.drain_completions();
        assert_eq!(app.state.results.lines(), &["request failed: no response within 30s"]);
    }

    #[test]
    fn escape_cancels_and_stale_completion_is_ignored() {
        let (mut app, rec) = app();
        app.handle(AppEvent::Submit);
        app.handle(AppEvent::Escape);

        assert!(app.state.waiting.is_none());
        assert!(rec.0.borrow().sent[0].2.is_cancelled());
        assert_eq!(app.state.results.kind(), ResultKind::Cancelled);

        // A late answer for the cancelled query must not overwrite anything.
        rec.0.borrow_mut().ready.push_back(Completion { id: 1, outcome: Ok(one_term_result()) });
        app.drain_completions();
        assert_eq!(app.state.results.kind(), ResultKind::Cancelled);

        // A new submission gets a fresh id.
        app.handle(AppEvent::Submit);
        assert_eq!(rec.0.borrow().sent[1].0, 2);
    }

    #[test]
    fn escape_without_query_leaves_the_form() {
        let (mut app, _) = app();
        app.handle(AppEvent::Escape);
        assert_eq!(app.state.focus, Focus::Results);
        assert_eq!(app.state.status, None);
    }

    #[test]
    fn focus_cycles_through_form_and_results() {
        let (mut app, _) = app();
        let mut seen = vec![app.state.focus];
        for _ in 0..4 {
            app.handle(AppEvent::FocusNext);
            seen.push(app.state.focus);
        }
        assert_eq!(
            seen,
            vec![Focus::Terms, Focus::Stages, Focus::Flavortext, Focus::Results, Focus::Terms]
        );
        app.handle(AppEvent::FocusPrev);
        assert_eq!(app.state.focus, Focus::Results);
    }

    #[test]
    fn ctrl_s_appends_stages_in_order() {
        let (mut app, _) = app();
        app.handle(AppEvent::CycleStage);
        app.handle(AppEvent::CycleStage);
        assert_eq!(app.state.stages.value(), "Homophone,Synonym");
    }

    #[test]
    fn question_mark_is_literal_in_fields() {
        let (mut app, _) = app();
        type_str(&mut app, "?:");
        assert_eq!(app.state.terms.value(), "?:");
        assert!(!app.state.show_help);
        assert_eq!(app.state.focus, Focus::Terms);
    }

    #[test]
    fn command_bar_runs_demo_and_stage_commands() {
        let (mut app, _) = app();
        app.state.focus = Focus::Results;

        app.handle(AppEvent::Char(':'));
        assert_eq!(app.state.focus, Focus::Command);
        type_str(&mut app, "demo synonym");
        app.handle(AppEvent::Enter);
        assert_eq!(app.state.focus, Focus::Results);
        assert_eq!(app.state.terms.value(), "symbol,coral,cord,loot");
        assert_eq!(app.state.stages.value(), "Homophone,WikiArticleStem");

        app.handle(AppEvent::Char(':'));
        type_str(&mut app, "unstage");
        app.handle(AppEvent::Enter);
        assert_eq!(app.state.stages.value(), "Homophone");

        app.handle(AppEvent::Char(':'));
        type_str(&mut app, "stage synonym");
        app.handle(AppEvent::Enter);
        assert_eq!(app.state.stages.value(), "Homophone,Synonym");
    }

    #[test]
    fn bad_command_keeps_the_bar_open() {
        let (mut app, _) = app();
        app.state.focus = Focus::Results;
        app.handle(AppEvent::Char(':'));
        type_str(&mut app, "nope");
        app.handle(AppEvent::Enter);
        assert_eq!(app.state.focus, Focus::Command);
        assert_eq!(app.state.command_bar.error.as_deref(), Some("unknown command: nope"));
    }

    #[test]
    fn run_and_cancel_commands() {
        let (mut app, rec) = app();
        execute_command(&mut app.state, Command::Run, &mut rec.clone());
        assert!(app.state.waiting.is_some());
        execute_command(&mut app.state, Command::Cancel, &mut rec.clone());
        assert!(app.state.waiting.is_none());
        execute_command(&mut app.state, Command::Cancel, &mut rec.clone());
        assert_eq!(app.state.status.as_deref(), Some("nothing to cancel"));
    }

    #[test]
    fn clear_command_empties_only_flavortext() {
        let (mut app, rec) = app();
        app.state.terms.set("a");
        app.state.flavortext.set("things in a cupboard");
        execute_command(&mut app.state, Command::Clear, &mut rec.clone());
        assert_eq!(app.state.flavortext.value(), "");
        assert_eq!(app.state.terms.value(), "a");
    }
}
