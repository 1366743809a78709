//! assoc TUI: ratatui application shell around the query form.

pub mod app;
pub mod commands;
pub mod event;
pub mod form;
pub mod runner;
pub mod theme;
pub mod widgets;

pub use app::{App, AppState};
pub use runner::{Completion, Dispatch, QueryRunner};

use assoc_client::QueryClient;
use assoc_core::config::Config;
use tokio::runtime::Handle;

/// Start the TUI against `client`. Queries are spawned onto `handle`; the
/// call blocks the current thread until the user quits.
pub fn run(config: Config, client: QueryClient, handle: Handle) -> anyhow::Result<()> {
    let theme = theme::Theme::by_name(&config.ui.theme);
    let endpoint = client.endpoint().to_string();
    tracing::info!(%endpoint, theme = %config.ui.theme, "starting tui");

    let state = AppState::new(config, theme, endpoint);
    let runner = QueryRunner::new(handle, client);
    App::new(state, Box::new(runner)).run()
}
