//! assoc-core: query model and chain formatting for assoc.
//!
//! This crate holds everything that does not touch the network or the
//! terminal: the wire types exchanged with the `/query` backend, the
//! [`Stage`] vocabulary, the chain formatter that turns a backend answer into
//! readable text, and the user configuration.
//!
//! # Data flow
//!
//! ```text
//! form fields ──► Query ──► (assoc-client) ──► QueryResult ──► format ──► text
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod stage;
pub mod types;

pub use error::{ChainError, UnknownStage};
pub use format::{format_response, format_single_chain, truncate_search_match, FormattedChain};
pub use stage::Stage;
pub use types::{Chain, ChainStep, Query, QueryResult, TermResult};
