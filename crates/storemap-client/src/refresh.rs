//! One refresh cycle: fetch every feed, aggregate, and commit the result.
//!
//! The three core datasets must all arrive or the cycle fails as a whole.
//! Boundaries and nearby businesses are enrichment: when they fail the
//! snapshot is still built, without them.
//!
//! Completions are ordered by generation. A cycle's result is committed only
//! if the consumer is still live and no newer cycle has already committed.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use storemap_core::{ingest_business_feed, BusinessPoi};
use storemap_hierarchy::{aggregate, Hierarchy};
use storemap_map::BoundaryLayer;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::client::DataClient;
use crate::error::ClientError;

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("failed to fetch {dataset}: {source}")]
    DataFetch {
        dataset: &'static str,
        #[source]
        source: ClientError,
    },
}

/// Everything the dashboard shows, as of one successful refresh.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub hierarchy: Hierarchy,
    /// `None` when the business feed could not be loaded.
    pub businesses: Option<Vec<BusinessPoi>>,
    /// `None` when the boundary document could not be loaded.
    pub boundaries: Option<BoundaryLayer>,
    pub refreshed_at: DateTime<Utc>,
    pub generation: u64,
}

impl DashboardSnapshot {
    /// Business POIs, or an empty slice when the feed is absent.
    #[must_use]
    pub fn businesses(&self) -> &[BusinessPoi] {
        self.businesses.as_deref().unwrap_or_default()
    }
}

/// A refresh cycle's place in line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket {
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitDecision {
    Committed,
    /// A newer cycle already committed; this result was dropped.
    Stale { latest: u64 },
    /// The consumer was torn down; this result was dropped.
    TornDown,
}

/// The committed state guarded by the consumer's lock.
#[derive(Debug, Default)]
pub struct SnapshotSlot {
    pub snapshot: Option<Arc<DashboardSnapshot>>,
    pub last_error: Option<String>,
    pub last_attempt: Option<DateTime<Utc>>,
}

/// Issues generations and decides which completions may commit.
#[derive(Debug)]
pub struct RefreshGate {
    next: AtomicU64,
    committed: AtomicU64,
    live: Arc<AtomicBool>,
}

impl Default for RefreshGate {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshGate {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
            committed: AtomicU64::new(0),
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Start a cycle.
    pub fn begin(&self) -> RefreshTicket {
        RefreshTicket {
            generation: self.next.fetch_add(1, Ordering::SeqCst),
        }
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Mark the consumer gone. Every later completion is discarded.
    pub fn teardown(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn latest_committed(&self) -> u64 {
        self.committed.load(Ordering::SeqCst)
    }

    /// Commit a successful cycle into `slot`. Call while holding the lock
    /// guarding `slot` so the check and the write are one step.
    pub fn commit_snapshot(
        &self,
        slot: &mut SnapshotSlot,
        ticket: RefreshTicket,
        snapshot: DashboardSnapshot,
    ) -> CommitDecision {
        let decision = self.claim(ticket);
        if decision == CommitDecision::Committed {
            slot.snapshot = Some(Arc::new(snapshot));
            slot.last_error = None;
            slot.last_attempt = Some(Utc::now());
            tracing::info!(generation = ticket.generation, "refresh committed");
        }
        decision
    }

    /// Commit a failed cycle: the previous snapshot is discarded so no
    /// outdated data is shown alongside the error.
    pub fn commit_failure(
        &self,
        slot: &mut SnapshotSlot,
        ticket: RefreshTicket,
        error: &RefreshError,
    ) -> CommitDecision {
        let decision = self.claim(ticket);
        if decision == CommitDecision::Committed {
            slot.snapshot = None;
            slot.last_error = Some(error.to_string());
            slot.last_attempt = Some(Utc::now());
            tracing::warn!(generation = ticket.generation, error = %error, "refresh failed");
        }
        decision
    }

    fn claim(&self, ticket: RefreshTicket) -> CommitDecision {
        if !self.is_live() {
            tracing::debug!(generation = ticket.generation, "discarding completion after teardown");
            return CommitDecision::TornDown;
        }
        let previous = self.committed.fetch_max(ticket.generation, Ordering::SeqCst);
        if previous >= ticket.generation {
            tracing::debug!(
                generation = ticket.generation,
                latest = previous,
                "discarding stale completion"
            );
            return CommitDecision::Stale { latest: previous };
        }
        CommitDecision::Committed
    }
}

/// Fetch every feed and build a snapshot stamped with `ticket`.
///
/// # Errors
///
/// Returns [`RefreshError::DataFetch`] naming the first core dataset that
/// failed. Enrichment failures are logged and never returned.
pub async fn fetch_snapshot(
    client: &DataClient,
    ticket: RefreshTicket,
    boundary_name_keys: &[String],
) -> Result<DashboardSnapshot, RefreshError> {
    tracing::info!(generation = ticket.generation, "refresh started");

    let core = async {
        tokio::try_join!(
            async {
                client.fetch_cities().await.map_err(|source| RefreshError::DataFetch {
                    dataset: "cities",
                    source,
                })
            },
            async {
                client.fetch_areas().await.map_err(|source| RefreshError::DataFetch {
                    dataset: "areas",
                    source,
                })
            },
            async {
                client.fetch_zones().await.map_err(|source| RefreshError::DataFetch {
                    dataset: "zones",
                    source,
                })
            },
        )
    };
    let enrichment = async {
        tokio::join!(
            client.fetch_boundaries(boundary_name_keys),
            client.fetch_store_businesses()
        )
    };
    let (core, (boundaries, businesses)) = tokio::join!(core, enrichment);
    let (cities, areas, zones) = core?;

    let boundaries = boundaries
        .map_err(|error| tracing::warn!(error = %error, "boundary geometry unavailable"))
        .ok();
    let businesses = businesses
        .map(|feed| ingest_business_feed(&feed))
        .map_err(|error| tracing::warn!(error = %error, "business feed unavailable"))
        .ok();

    let hierarchy = aggregate(&cities, &areas, &zones);
    Ok(DashboardSnapshot {
        hierarchy,
        businesses,
        boundaries,
        refreshed_at: Utc::now(),
        generation: ticket.generation,
    })
}

/// Run one full cycle and commit its outcome into `slot`.
///
/// # Errors
///
/// Returns the cycle's [`RefreshError`] after recording it in `slot` (when
/// the cycle is still current).
pub async fn refresh(
    client: &DataClient,
    gate: &RefreshGate,
    slot: &RwLock<SnapshotSlot>,
    boundary_name_keys: &[String],
) -> Result<CommitDecision, RefreshError> {
    let ticket = gate.begin();
    let fetched = fetch_snapshot(client, ticket, boundary_name_keys).await;
    let mut slot = slot.write().await;
    match fetched {
        Ok(snapshot) => Ok(gate.commit_snapshot(&mut slot, ticket, snapshot)),
        Err(error) => {
            gate.commit_failure(&mut slot, ticket, &error);
            Err(error)
        }
    }
}
