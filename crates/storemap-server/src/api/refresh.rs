use axum::{extract::State, Extension, Json};
use serde::Serialize;
use storemap_client::CommitDecision;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct RefreshView {
    /// `committed`, `stale`, or `torn_down`.
    pub decision: &'static str,
    pub generation: u64,
}

pub(super) async fn trigger_refresh(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<RefreshView>>, ApiError> {
    let decision = state.refresh().await.map_err(|e| {
        tracing::error!(error = %e, "manual refresh failed");
        ApiError::new(req_id.0.clone(), "refresh_failed", e.to_string())
    })?;

    let view = RefreshView {
        decision: match decision {
            CommitDecision::Committed => "committed",
            CommitDecision::Stale { .. } => "stale",
            CommitDecision::TornDown => "torn_down",
        },
        generation: state.gate.latest_committed(),
    };
    Ok(ApiResponse::new(req_id.0, view))
}
