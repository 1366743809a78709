//! Form helpers: demo presets and the comma-separated stage list edits.
//!
//! These operate on plain field values so they can be tested without a
//! terminal; the app shell writes the results back into its text fields.

use assoc_core::Stage;

/// Literal example values for the three form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub terms: &'static str,
    pub stages: &'static str,
    pub flavortext: &'static str,
}

pub const PRESETS: &[Preset] = &[
    Preset {
        name: "synonym",
        terms: "symbol,coral,cord,loot",
        stages: "Homophone,WikiArticleStem",
        flavortext: "",
    },
    Preset {
        name: "wiki",
        terms: "tom bowler,red devil,agate,cats eye",
        stages: "WikiAllStem",
        flavortext: "",
    },
];

pub fn preset(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

pub fn preset_names() -> String {
    PRESETS.iter().map(|p| p.name).collect::<Vec<_>>().join(", ")
}

/// Append `stage` to a comma-separated stage list. An empty list becomes
/// just `stage` rather than `,stage`.
pub fn add_stage(field: &str, stage: &str) -> String {
    if field.is_empty() {
        return stage.to_string();
    }
    format!("{field},{stage}")
}

/// Drop the last entry of a comma-separated stage list.
pub fn remove_last_stage(field: &str) -> String {
    match field.rsplit_once(',') {
        Some((rest, _)) => rest.to_string(),
        None => String::new(),
    }
}

/// Resolve a user-typed stage name to its canonical spelling, ignoring case.
pub fn resolve_stage(name: &str) -> Option<Stage> {
    Stage::ALL
        .into_iter()
        .find(|stage| stage.name().eq_ignore_ascii_case(name.trim()))
}

/// Names of all known stages, for error messages.
pub fn stage_names() -> String {
    Stage::ALL
        .iter()
        .map(Stage::name)
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
