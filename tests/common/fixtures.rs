//! Canned backend responses and the text they format to.

/// Two terms resolving to the same association, one of them in two steps.
pub const AGREEING_RESPONSE: &str = r#"[
  {
    "head": ["Synonym", "head", "skull", "cranium",
             "WikiArticleStem", "cranium", "...cranium...", "moon"],
    "crescent": ["Homophone", "crescent", "", "moon"]
  }
]"#;

pub const AGREEING_FORMATTED: &str = "[moon]
- \"...cranium...\" mentions cranium in article moon <= head is a synonym of cranium
- crescent sounds like moon";

/// Two result groups: one with a miss, one fully resolved.
pub const TWO_GROUP_RESPONSE: &str = r#"[
  {
    "symbol": ["Synonym", "symbol", "", "token"],
    "loot": null
  },
  {
    "cord": ["Homophone", "cord", "", "chord"]
  }
]"#;

pub const TWO_GROUP_FORMATTED: &str = "[token]
- symbol is a synonym of token
- nothing found for term: [loot]

[chord]
- cord sounds like chord";

/// A chain whose flat array is not a whole number of steps.
pub const RAGGED_RESPONSE: &str = r#"[{"head": ["Synonym", "head", "skull"]}]"#;

pub const SERVER_ERROR_BODY: &str = r#"{"error": "unknown stage: Anagram"}"#;
