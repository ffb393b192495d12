use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use storemap_map::{ApplyOutcome, LayerStateSurface, RenderPlan};

use crate::middleware::RequestId;

use super::{require_snapshot, ApiError, ApiResponse, AppState};

const MAX_ZOOM: f64 = 24.0;

#[derive(Debug, Serialize)]
pub(super) struct PlanView {
    /// `applied`, `queued`, or `unchanged`.
    pub outcome: &'static str,
    pub plan: RenderPlan,
}

#[derive(Debug, Serialize)]
pub(super) struct LayersView {
    pub ready: bool,
    pub queued: bool,
    pub surface: LayerStateSurface,
}

#[derive(Debug, Serialize)]
pub(super) struct ReadyView {
    pub ready: bool,
    pub outcome: &'static str,
}

#[derive(Debug, Deserialize)]
pub(super) struct ZoomRequest {
    pub zoom: f64,
}

#[derive(Debug, Deserialize)]
pub(super) struct CategoryRequest {
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ReadyRequest {
    pub ready: bool,
}

fn outcome_label(outcome: ApplyOutcome) -> &'static str {
    match outcome {
        ApplyOutcome::Applied => "applied",
        ApplyOutcome::Queued => "queued",
        ApplyOutcome::Unchanged => "unchanged",
    }
}

pub(super) async fn get_plan(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<PlanView>>, ApiError> {
    let snapshot = require_snapshot(&state, &req_id.0).await?;
    let (plan, outcome) = state.session.lock().await.render(&snapshot);
    let view = PlanView {
        outcome: outcome_label(outcome),
        plan,
    };
    Ok(ApiResponse::new(req_id.0, view))
}

pub(super) async fn set_zoom(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ZoomRequest>,
) -> Result<Json<ApiResponse<PlanView>>, ApiError> {
    if !body.zoom.is_finite() || !(0.0..=MAX_ZOOM).contains(&body.zoom) {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            format!("zoom must be between 0 and {MAX_ZOOM}"),
        ));
    }
    let snapshot = require_snapshot(&state, &req_id.0).await?;
    let mut session = state.session.lock().await;
    session.zoom = body.zoom;
    let (plan, outcome) = session.render(&snapshot);
    let view = PlanView {
        outcome: outcome_label(outcome),
        plan,
    };
    Ok(ApiResponse::new(req_id.0, view))
}

pub(super) async fn set_category(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CategoryRequest>,
) -> Result<Json<ApiResponse<PlanView>>, ApiError> {
    let snapshot = require_snapshot(&state, &req_id.0).await?;
    let mut session = state.session.lock().await;
    session
        .engine
        .set_category(&body.category)
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;
    let (plan, outcome) = session.render(&snapshot);
    let view = PlanView {
        outcome: outcome_label(outcome),
        plan,
    };
    Ok(ApiResponse::new(req_id.0, view))
}

/// Readiness of the client's render surface. Works before any data has
/// loaded; a queued plan is replayed once data and readiness both exist.
pub(super) async fn set_ready(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ReadyRequest>,
) -> Json<ApiResponse<ReadyView>> {
    let mut session = state.session.lock().await;
    let outcome = session.controller.set_ready(body.ready);
    let view = ReadyView {
        ready: session.controller.is_ready(),
        outcome: outcome_label(outcome),
    };
    ApiResponse::new(req_id.0, view)
}

pub(super) async fn get_layers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<LayersView>> {
    let session = state.session.lock().await;
    let view = LayersView {
        ready: session.controller.is_ready(),
        queued: session.controller.queued().is_some(),
        surface: session.controller.surface().clone(),
    };
    ApiResponse::new(req_id.0, view)
}
