//! Shared test utilities for assoc integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file.

pub mod fake_query_api;
pub mod fixtures;

pub use fixtures::*;
