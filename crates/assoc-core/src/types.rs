//! Wire types exchanged with the `/query` backend.
//!
//! The request is a plain [`Query`]. The response is a [`QueryResult`]: one
//! [`TermResult`] per input term, each mapping a term to the [`Chain`] of
//! association steps the backend followed. Chains travel as flat string
//! arrays and are decoded into [`ChainStep`]s here, so the rest of the crate
//! never sees a partial group.

use crate::{error::ChainError, stage::Stage};
use serde::{
    de::{MapAccess, Visitor},
    Deserialize, Deserializer, Serialize,
};
use std::fmt;

/// Number of strings making up one step of a flat chain.
const STEP_WIDTH: usize = 4;

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Request body for `POST /query`. Built fresh for every submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Query {
    pub stages: Vec<String>,
    pub terms: Vec<String>,
    pub flavortext: String,
}

impl Query {
    /// Build a query from the raw comma-separated form fields.
    ///
    /// Fields are split on `,` without trimming; an empty field becomes a
    /// single empty string, exactly what the backend has always received.
    pub fn from_fields(terms: &str, stages: &str, flavortext: &str) -> Self {
        Self {
            stages: split_field(stages),
            terms: split_field(terms),
            flavortext: flavortext.to_string(),
        }
    }

    /// Stage names in this query that the client does not recognise.
    /// They are still sent; this is only used for diagnostics.
    pub fn unknown_stages(&self) -> Vec<&str> {
        self.stages
            .iter()
            .map(String::as_str)
            .filter(|s| s.parse::<Stage>().is_err())
            .collect()
    }
}

fn split_field(field: &str) -> Vec<String> {
    field.split(',').map(str::to_string).collect()
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// One association step: `stage` was applied to `search_term`, which was
/// found inside `search_match`, yielding `search_result`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainStep {
    pub stage: Stage,
    pub search_term: String,
    pub search_match: String,
    pub search_result: String,
}

impl ChainStep {
    pub fn new(
        stage: Stage,
        search_term: impl Into<String>,
        search_match: impl Into<String>,
        search_result: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            search_term: search_term.into(),
            search_match: search_match.into(),
            search_result: search_result.into(),
        }
    }
}

/// Steps connecting an input term to its association, stored in reverse
/// derivation order (last-found step first) as the backend sends them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chain {
    steps: Vec<ChainStep>,
}

impl Chain {
    pub fn new(steps: Vec<ChainStep>) -> Self {
        Self { steps }
    }

    /// Decode the backend's flat `[stage, term, match, result, ...]` array.
    pub fn from_flat(items: Vec<String>) -> Result<Self, ChainError> {
        if items.len() % STEP_WIDTH != 0 {
            return Err(ChainError::Ragged { len: items.len() });
        }

        let mut steps = Vec::with_capacity(items.len() / STEP_WIDTH);
        let mut it = items.into_iter();
        while let (Some(stage), Some(term), Some(matched), Some(result)) =
            (it.next(), it.next(), it.next(), it.next())
        {
            steps.push(ChainStep::new(Stage::from_wire(stage), term, matched, result));
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[ChainStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<'de> Deserialize<'de> for Chain {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let flat = Vec::<String>::deserialize(deserializer)?;
        Chain::from_flat(flat).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// TermResult / QueryResult
// ---------------------------------------------------------------------------

/// One element of the response array: term → chain, in the order the backend
/// wrote the keys. A `null` chain decodes as an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermResult {
    entries: Vec<(String, Chain)>,
}

impl TermResult {
    pub fn new(entries: Vec<(String, Chain)>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Chain)> {
        self.entries.iter().map(|(term, chain)| (term.as_str(), chain))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for TermResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TermResultVisitor;

        impl<'de> Visitor<'de> for TermResultVisitor {
            type Value = TermResult;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from search term to chain")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<TermResult, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((term, chain)) = map.next_entry::<String, Option<Chain>>()? {
                    entries.push((term, chain.unwrap_or_default()));
                }
                Ok(TermResult { entries })
            }
        }

        deserializer.deserialize_map(TermResultVisitor)
    }
}

/// Full response body of a successful query, one entry per input term.
pub type QueryResult = Vec<TermResult>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
