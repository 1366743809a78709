// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

use crate::{
    app::AppState,
    form::{self, preset, preset_names, resolve_stage, stage_names},
    runner::Dispatch,
    theme::Theme,
};

/// A parsed, validated command ready to be executed by the app shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    // Display help
    Help,
    // Change theme
    Theme(String),
    // Toggle display of the completion time in the result title
    Timestamps,
    // Fill the form with a named preset
    Demo(String),
    // Append a stage, already resolved to its canonical name
    Stage(String),
    Unstage,
    // Clear the flavortext field
    Clear,
    Run,
    Cancel,
}

impl Command {
    /// Parse a raw command string (the text after the `:` prefix).
    ///
    /// Returns `Ok(cmd)` on success, `Err(message)` on failure. An empty
    /// string returns `Err("")` as a sentinel meaning "close without acting".
    pub fn parse(input: &str) -> Result<Command, String> {
        let input = input.trim();
        if input.is_empty() {
            return Err(String::new());
        }

        let (word, rest) = input
            .split_once(char::is_whitespace)
            .map(|(w, r)| (w, r.trim()))
            .unwrap_or((input, ""));

        match word {
            "q" | "quit" => Ok(Command::Quit),
            "help" => Ok(Command::Help),
            "ts" | "timestamps" => Ok(Command::Timestamps),
            "run" => Ok(Command::Run),
            "cancel" => Ok(Command::Cancel),
            "unstage" => Ok(Command::Unstage),
            "clear" => Ok(Command::Clear),
            "theme" => {
                if rest.is_empty() {
                    Err("usage: theme <default|gruvbox>".to_string())
                } else {
                    Ok(Command::Theme(rest.to_string()))
                }
            }
            "demo" => match preset(rest) {
                Some(p) => Ok(Command::Demo(p.name.to_string())),
                None => Err(format!("usage: demo <{}>", preset_names().replace(", ", "|"))),
            },
            "stage" => match resolve_stage(rest) {
                Some(stage) => Ok(Command::Stage(stage.name().to_string())),
                None if rest.is_empty() => Err(format!("usage: stage <{}>", stage_names())),
                None => Err(format!("unknown stage {rest:?}, expected one of {}", stage_names())),
            },
            other => Err(format!("unknown command: {other}")),
        }
    }
}

/// Execute a parsed [`Command`] against the application state.
pub fn execute_command(s: &mut AppState, cmd: Command, runner: &mut dyn Dispatch) {
    match cmd {
        Command::Quit => {
            s.quit = true;
        }
        Command::Help => {
            s.show_help = !s.show_help;
        }
        Command::Theme(name) => {
            s.theme = Theme::by_name(&name);
        }
        Command::Timestamps => {
            s.results.show_timestamps = !s.results.show_timestamps;
        }
        Command::Demo(name) => {
            if let Some(p) = preset(&name) {
                s.terms.set(p.terms);
                s.stages.set(p.stages);
                s.flavortext.set(p.flavortext);
                s.status = Some(format!("loaded demo {}", p.name));
                tracing::debug!(demo = p.name, "form filled from preset");
            }
        }
        Command::Stage(name) => {
            let stages = form::add_stage(s.stages.value(), &name);
            s.stages.set(stages);
        }
        Command::Unstage => {
            let stages = form::remove_last_stage(s.stages.value());
            s.stages.set(stages);
        }
        Command::Clear => {
            s.flavortext.clear();
        }
        Command::Run => s.submit(runner),
        Command::Cancel => s.cancel(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
