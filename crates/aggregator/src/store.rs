//! Published market collection
//!
//! Every fetch takes a ticket carrying a generation number. A finished
//! fetch is merged in only when its ticket is still the newest one issued,
//! so a slow stale fetch can never overwrite a fresher one. Committed
//! collections are broadcast to subscribers through a watch channel.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

use metamoney_core::{merge_markets, CoreResult, Market, Snapshot};

/// Generation handed out when a fetch starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What subscribers see
#[derive(Debug, Clone, Default)]
pub struct MarketsView {
    pub markets: Arc<Vec<Market>>,
    /// Generation of the fetch that produced this view, 0 before the first commit
    pub generation: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Result of offering a snapshot to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed { generation: u64, markets: usize },
    /// A newer fetch was started after this one
    Stale { generation: u64, latest: u64 },
    /// The owning session was torn down
    Closed,
}

impl CommitOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitOutcome::Committed { .. })
    }
}

#[derive(Debug)]
struct StoreState {
    view: MarketsView,
    closed: bool,
}

/// Single in-memory market collection with last-issued-wins commits
#[derive(Debug)]
pub struct MarketStore {
    issued: AtomicU64,
    state: RwLock<StoreState>,
    tx: watch::Sender<MarketsView>,
}

impl MarketStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(MarketsView::default());
        Self {
            issued: AtomicU64::new(0),
            state: RwLock::new(StoreState {
                view: MarketsView::default(),
                closed: false,
            }),
            tx,
        }
    }

    /// Start a fetch; any fetch started earlier becomes stale
    pub fn begin_fetch(&self) -> FetchTicket {
        let generation = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Issued fetch generation {}", generation);
        FetchTicket { generation }
    }

    pub fn latest_generation(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// Merge `snapshot` into the held collection if `ticket` is still current
    pub fn commit(&self, ticket: FetchTicket, snapshot: Snapshot) -> CoreResult<CommitOutcome> {
        let mut state = self.state.write();

        if state.closed {
            debug!("Store closed, dropping fetch generation {}", ticket.generation);
            return Ok(CommitOutcome::Closed);
        }

        let latest = self.issued.load(Ordering::SeqCst);
        if ticket.generation != latest {
            info!(
                "Discarding stale fetch generation {} (latest {})",
                ticket.generation, latest
            );
            return Ok(CommitOutcome::Stale {
                generation: ticket.generation,
                latest,
            });
        }

        let merged = merge_markets(&state.view.markets, &snapshot.markets)?;
        let view = MarketsView {
            markets: Arc::new(merged),
            generation: ticket.generation,
            updated_at: Some(snapshot.fetched_at),
        };
        let count = view.markets.len();

        state.view = view.clone();
        self.tx.send_replace(view);

        Ok(CommitOutcome::Committed {
            generation: ticket.generation,
            markets: count,
        })
    }

    pub fn markets(&self) -> Arc<Vec<Market>> {
        Arc::clone(&self.state.read().view.markets)
    }

    pub fn view(&self) -> MarketsView {
        self.state.read().view.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MarketsView> {
        self.tx.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.state.read().closed
    }

    /// Tear down: in-flight fetches can no longer commit
    pub fn close(&self) {
        self.state.write().closed = true;
    }

    /// Start over empty for a new session
    pub fn reopen(&self) {
        let mut state = self.state.write();
        // invalidate anything issued before the reset
        self.issued.fetch_add(1, Ordering::SeqCst);
        state.view = MarketsView::default();
        state.closed = false;
        self.tx.send_replace(MarketsView::default());
    }
}

impl Default for MarketStore {
    fn default() -> Self {
        Self::new()
    }
}
