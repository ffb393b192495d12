//! HTTP access to the dashboard backend and the refresh cycle that turns its
//! feeds into committed snapshots.

pub mod client;
pub mod error;
pub mod refresh;
mod retry;

pub use client::{parse_collection, ClientOptions, DataClient};
pub use error::ClientError;
pub use refresh::{
    fetch_snapshot, refresh, CommitDecision, DashboardSnapshot, RefreshError, RefreshGate,
    RefreshTicket, SnapshotSlot,
};
