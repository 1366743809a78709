//! Background query execution.
//!
//! The event loop is synchronous, so each submitted query is spawned onto the
//! tokio runtime and its outcome comes back over an unbounded channel tagged
//! with the id the app assigned. The loop drains that channel once per tick.

use assoc_client::{ClientError, QueryClient, QueryOutcome};
use assoc_core::Query;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;

/// A finished query, successful or not.
#[derive(Debug)]
pub struct Completion {
    pub id: u64,
    pub outcome: Result<QueryOutcome, ClientError>,
}

/// Where the app sends queries and collects their outcomes.
pub trait Dispatch {
    fn dispatch(&mut self, id: u64, query: Query, token: CancellationToken);

    /// Next finished query, if one is ready. Never blocks.
    fn try_recv(&mut self) -> Option<Completion>;
}

pub struct QueryRunner {
    handle: Handle,
    client: QueryClient,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
}

impl QueryRunner {
    pub fn new(handle: Handle, client: QueryClient) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { handle, client, tx, rx }
    }
}

impl Dispatch for QueryRunner {
    fn dispatch(&mut self, id: u64, query: Query, token: CancellationToken) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let outcome = client.query_cancellable(&query, token).await;
            // The receiver lives as long as the app; a send error means it quit.
            if tx.send(Completion { id, outcome }).is_err() {
                tracing::debug!(id, "completion dropped, app has exited");
            }
        });
        tracing::debug!(id, "query task spawned");
    }

    fn try_recv(&mut self) -> Option<Completion> {
        match self.rx.try_recv() {
            Ok(completion) => Some(completion),
            Err(TryRecvError::Empty) => None,
            // We hold a sender ourselves, so this never happens in practice.
            Err(TryRecvError::Disconnected) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
