//! Chain formatter: turns a backend [`QueryResult`] into display text.
//!
//! Every function here is pure. Positions and lengths count `char`s, so an
//! excerpt can never split a code point regardless of what the backend sends.
//!
//! # Output shape
//!
//! ```text
//! [moon]
//! - "the cranium of" mentions cranium in article moon <= head is a synonym of cranium
//! - nothing found for term: [tide]
//!
//! [sun]
//! - ...
//! ```

use crate::types::{Chain, QueryResult, TermResult};

/// Characters of context kept on each side of a match.
const EXCERPT_CONTEXT: usize = 15;
/// Length of the excerpt when the term does not occur in the match at all.
const UNMATCHED_EXCERPT_LEN: usize = 30;
const ELLIPSIS: &str = "...";

/// Separator between the explanations of one chain.
const STEP_SEPARATOR: &str = " <= ";

/// Result of formatting a single chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattedChain {
    /// Search result of the last step processed; empty for an empty chain.
    pub final_association: String,
    /// One sentence per step, in derivation order.
    pub explanations: Vec<String>,
}

/// Excerpt of `search_match` centred on the first case-insensitive occurrence
/// of `search_term`.
///
/// Without an occurrence the first 30 characters are returned as-is. With
/// one, 15 characters of context are kept on each side, and `...` marks
/// whichever side was cut.
pub fn truncate_search_match(search_term: &str, search_match: &str) -> String {
    let haystack: Vec<char> = search_match.chars().collect();
    let needle: Vec<char> = search_term.chars().collect();

    let Some(idx) = find_ignore_case(&haystack, &needle) else {
        return haystack.iter().take(UNMATCHED_EXCERPT_LEN).collect();
    };

    let start = idx.saturating_sub(EXCERPT_CONTEXT);
    let end = idx + needle.len() + EXCERPT_CONTEXT;

    let mut excerpt = String::new();
    if idx > EXCERPT_CONTEXT {
        excerpt.push_str(ELLIPSIS);
    }
    excerpt.extend(&haystack[start..end.min(haystack.len())]);
    if end < haystack.len() {
        excerpt.push_str(ELLIPSIS);
    }
    excerpt
}

fn find_ignore_case(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    (0..=haystack.len() - needle.len()).find(|&i| {
        haystack[i..i + needle.len()]
            .iter()
            .zip(needle)
            .all(|(&a, &b)| a == b || a.to_lowercase().eq(b.to_lowercase()))
    })
}

/// Explain every step of `chain`.
///
/// Steps are processed in storage order (reverse derivation), so the final
/// association is the result of the last stored step, and the explanations
/// are flipped before returning to read in derivation order.
pub fn format_single_chain(chain: &Chain) -> FormattedChain {
    let mut final_association = String::new();
    let mut explanations = Vec::with_capacity(chain.len());

    for step in chain.steps() {
        let excerpt = truncate_search_match(&step.search_term, &step.search_match);
        explanations.push(step.stage.explain(&step.search_term, &excerpt, &step.search_result));
        final_association.clone_from(&step.search_result);
    }

    explanations.reverse();
    FormattedChain {
        final_association,
        explanations,
    }
}

/// Render a whole response: one `[association]` block per [`TermResult`],
/// blocks separated by a blank line. An empty response renders as `""`.
pub fn format_response(result: &QueryResult) -> String {
    result
        .iter()
        .map(format_term_result)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_term_result(term_result: &TermResult) -> String {
    // Distinct associations in first-seen order. The backend groups terms that
    // share one association, so more than one entry here is unexpected.
    let mut associations: Vec<String> = Vec::new();
    let mut lines = Vec::with_capacity(term_result.len() + 1);

    for (term, chain) in term_result.iter() {
        let formatted = format_single_chain(chain);
        if formatted.final_association.is_empty() {
            lines.push(format!("- nothing found for term: [{term}]"));
        } else {
            lines.push(format!("- {}", formatted.explanations.join(STEP_SEPARATOR)));
            if !associations.contains(&formatted.final_association) {
                associations.push(formatted.final_association);
            }
        }
    }

    if associations.len() > 1 {
        tracing::warn!(?associations, "terms in one result resolved to different associations");
    }

    let heading = format!("[{}]", associations.join(" | "));
    std::iter::once(heading)
        .chain(lines)
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{stage::Stage, types::ChainStep};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn two_step_chain() -> Chain {
        Chain::new(vec![
            ChainStep::new(Stage::Synonym, "head", "skull", "cranium"),
            ChainStep::new(Stage::WikiArticleStem, "cranium", "...cranium...", "moon"),
        ])
    }

    #[rstest]
    #[case::whole_string("moon", "the moon is bright", "the moon is bright")]
    #[case::absent("zz", "abcdefghijklmnopqrstuvwxyz0123456789", "abcdefghijklmnopqrstuvwxyz0123")]
    #[case::absent_short("zz", "short", "short")]
    #[case::ignores_case("MOON", "the moon is bright", "the moon is bright")]
    #[case::cut_both_sides(
        "needle",
        "aaaaaaaaaaaaaaaaaaaa needle bbbbbbbbbbbbbbbbbbbb",
        "...aaaaaaaaaaaaaa needle bbbbbbbbbbbbbb..."
    )]
    #[case::exactly_fifteen_before("x", "123456789012345x", "123456789012345x")]
    #[case::sixteen_before("x", "1234567890123456x", "...234567890123456x")]
    #[case::empty_term("", "abcdefghijklmnopqrstuvwxyz", "abcdefghijklmno...")]
    fn truncation(#[case] term: &str, #[case] haystack: &str, #[case] expected: &str) {
        assert_eq!(truncate_search_match(term, haystack), expected);
    }

    #[test]
    fn truncation_preserves_original_casing() {
        assert_eq!(truncate_search_match("moon", "The MOON"), "The MOON");
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        let haystack = "ééééééééééééééééééé café ééééééééééééééééééé";
        let out = truncate_search_match("CAFÉ", haystack);
        assert_eq!(out, "...éééééééééééééé café éééééééééééééé...");
    }

    #[test]
    fn single_chain_reverses_explanations() {
        let formatted = format_single_chain(&two_step_chain());
        assert_eq!(formatted.final_association, "moon");
        assert_eq!(
            formatted.explanations,
            vec![
                "\"...cranium...\" mentions cranium in article moon".to_string(),
                "head is a synonym of cranium".to_string(),
            ]
        );
    }

    #[test]
    fn empty_chain_has_no_association() {
        assert_eq!(format_single_chain(&Chain::default()), FormattedChain::default());
    }

    #[test]
    fn empty_response_is_empty_string() {
        assert_eq!(format_response(&Vec::new()), "");
    }

    #[test]
    fn nothing_found_uses_empty_heading() {
        let result = vec![TermResult::new(vec![("tide".to_string(), Chain::default())])];
        assert_eq!(format_response(&result), "[]\n- nothing found for term: [tide]");
    }

    #[test]
    fn blocks_are_separated_by_blank_line() {
        let result = vec![
            TermResult::new(vec![("head".to_string(), two_step_chain())]),
            TermResult::new(vec![(
                "cord".to_string(),
                Chain::new(vec![ChainStep::new(Stage::Homophone, "cord", "", "chord")]),
            )]),
        ];
        assert_eq!(
            format_response(&result),
            "[moon]\n\
             - \"...cranium...\" mentions cranium in article moon <= head is a synonym of cranium\n\
             \n\
             [chord]\n\
             - cord sounds like chord"
        );
    }

    #[test]
    fn divergent_associations_are_all_listed() {
        let result = vec![TermResult::new(vec![
            (
                "cord".to_string(),
                Chain::new(vec![ChainStep::new(Stage::Homophone, "cord", "", "chord")]),
            ),
            ("tide".to_string(), Chain::default()),
            (
                "loot".to_string(),
                Chain::new(vec![ChainStep::new(Stage::Homophone, "loot", "", "lute")]),
            ),
        ])];
        let text = format_response(&result);
        assert!(text.starts_with("[chord | lute]\n"), "{text}");
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn formatting_is_idempotent() {
        let result = vec![TermResult::new(vec![("head".to_string(), two_step_chain())])];
        assert_eq!(format_response(&result), format_response(&result));
    }
}
