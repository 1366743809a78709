//! Search stages: the named strategies the backend applies to find a related
//! term, and the sentence each one produces when a chain is explained.

use crate::error::UnknownStage;
use std::str::FromStr;

/// A search strategy applied by the backend at one step of a chain.
///
/// Names the client does not recognise are kept as [`Stage::Unrecognized`] so
/// a chain from a newer backend still renders instead of failing outright.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Stage {
    Homophone,
    Synonym,
    WikiArticleStem,
    WikiArticleExact,
    WikiAllStem,
    Unrecognized(String),
}

impl Stage {
    /// Every stage the client knows how to explain, in picker order.
    pub const ALL: [Stage; 5] = [
        Stage::Homophone,
        Stage::Synonym,
        Stage::WikiArticleStem,
        Stage::WikiArticleExact,
        Stage::WikiAllStem,
    ];

    /// Lenient conversion used when decoding backend output. Never fails.
    pub fn from_wire(name: String) -> Self {
        name.parse().unwrap_or(Stage::Unrecognized(name))
    }

    /// Canonical wire name.
    pub fn name(&self) -> &str {
        match self {
            Stage::Homophone => "Homophone",
            Stage::Synonym => "Synonym",
            Stage::WikiArticleStem => "WikiArticleStem",
            Stage::WikiArticleExact => "WikiArticleExact",
            Stage::WikiAllStem => "WikiAllStem",
            Stage::Unrecognized(name) => name,
        }
    }

    /// Render the explanation sentence for one step.
    ///
    /// `excerpt` is the already-truncated search match.
    pub fn explain(&self, search_term: &str, excerpt: &str, search_result: &str) -> String {
        match self {
            Stage::Homophone => format!("{search_term} sounds like {search_result}"),
            Stage::Synonym => format!("{search_term} is a synonym of {search_result}"),
            Stage::WikiArticleStem => {
                format!("\"{excerpt}\" mentions {search_term} in article {search_result}")
            }
            Stage::WikiArticleExact => {
                format!("\"{excerpt}\" links exactly to {search_term} in article {search_result}")
            }
            Stage::WikiAllStem => {
                format!("\"{excerpt}\" mentions {search_term} in article or list {search_result}")
            }
            Stage::Unrecognized(name) => {
                tracing::warn!(stage = %name, "explaining step from unrecognized stage");
                format!("{search_term} -> {search_result} via unrecognized stage {name}")
            }
        }
    }
}

impl FromStr for Stage {
    type Err = UnknownStage;

    /// Strict parse of a canonical stage name. Case-sensitive, like the backend.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Homophone" => Ok(Stage::Homophone),
            "Synonym" => Ok(Stage::Synonym),
            "WikiArticleStem" => Ok(Stage::WikiArticleStem),
            "WikiArticleExact" => Ok(Stage::WikiArticleExact),
            "WikiAllStem" => Ok(Stage::WikiAllStem),
            other => Err(UnknownStage(other.to_string())),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
