//! Ratatui widgets for the assoc TUI.

pub mod command_bar;
pub mod help;
pub mod result_view;
pub mod status_bar;
pub mod text_field;
