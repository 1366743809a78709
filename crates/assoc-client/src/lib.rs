//! assoc-client: the `/query` HTTP contract.
//!
//! [`QueryClient`] posts a [`Query`](assoc_core::Query) to the backend and
//! decodes the answer into a [`QueryOutcome`]: either a result set ready for
//! the chain formatter, or an error string the backend wants shown verbatim.
//! Everything else (transport failures, timeouts, cancellation, unexpected
//! status codes, undecodable bodies) comes back as a [`ClientError`].

pub mod client;
pub mod error;

pub use client::{ClientConfig, QueryClient, QueryOutcome};
pub use error::ClientError;
