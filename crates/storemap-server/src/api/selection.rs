use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use storemap_core::{BrowseMode, CityChosen, Selection, SelectionError};
use storemap_hierarchy::{summarize, SelectionSummary};

use crate::middleware::RequestId;

use super::{require_snapshot, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct SelectionView {
    pub mode: BrowseMode,
    pub selection: Selection,
}

#[derive(Debug, Serialize)]
pub(super) struct SelectResponse {
    pub mode: BrowseMode,
    pub selection: Selection,
    /// Present only when a city was picked.
    pub city_chosen: Option<CityChosen>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SelectRequest {
    /// Defaults to the current browsing level.
    pub mode: Option<String>,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct BrowseModeRequest {
    pub mode: String,
}

fn map_selection_error(request_id: String, error: &SelectionError) -> ApiError {
    match error {
        SelectionError::UnknownMode(_) => {
            ApiError::new(request_id, "validation_error", error.to_string())
        }
        SelectionError::UnknownName { .. } => {
            ApiError::new(request_id, "not_found", error.to_string())
        }
    }
}

pub(super) async fn get_selection(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<SelectionView>> {
    let session = state.session.lock().await;
    let view = SelectionView {
        mode: session.model.mode(),
        selection: session.model.selection().clone(),
    };
    ApiResponse::new(req_id.0, view)
}

pub(super) async fn select(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<SelectRequest>,
) -> Result<Json<ApiResponse<SelectResponse>>, ApiError> {
    let snapshot = require_snapshot(&state, &req_id.0).await?;
    let mut session = state.session.lock().await;

    let mode = match body.mode.as_deref() {
        Some(raw) => raw
            .parse::<BrowseMode>()
            .map_err(|e| map_selection_error(req_id.0.clone(), &e))?,
        None => session.model.mode(),
    };
    let item = snapshot
        .hierarchy
        .resolve(mode, &body.name)
        .map_err(|e| map_selection_error(req_id.0.clone(), &e))?;

    let outcome = session.model.select(item);
    if let Some(chosen) = &outcome.city_chosen {
        tracing::info!(city = %chosen.city, "city chosen");
    }
    session.render(&snapshot);

    let response = SelectResponse {
        mode: session.model.mode(),
        selection: outcome.selection,
        city_chosen: outcome.city_chosen,
    };
    Ok(ApiResponse::new(req_id.0, response))
}

pub(super) async fn clear_selection(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<SelectionView>>, ApiError> {
    let snapshot = require_snapshot(&state, &req_id.0).await?;
    let mut session = state.session.lock().await;
    session.model.clear();
    session.render(&snapshot);

    let view = SelectionView {
        mode: session.model.mode(),
        selection: session.model.selection().clone(),
    };
    Ok(ApiResponse::new(req_id.0, view))
}

pub(super) async fn set_browse_mode(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<BrowseModeRequest>,
) -> Result<Json<ApiResponse<SelectionView>>, ApiError> {
    let mode = body
        .mode
        .parse::<BrowseMode>()
        .map_err(|e| map_selection_error(req_id.0.clone(), &e))?;
    let snapshot = require_snapshot(&state, &req_id.0).await?;
    let mut session = state.session.lock().await;
    session.model.set_mode(mode);
    session.render(&snapshot);

    let view = SelectionView {
        mode: session.model.mode(),
        selection: session.model.selection().clone(),
    };
    Ok(ApiResponse::new(req_id.0, view))
}

/// Summary of the stores behind the current selection.
pub(super) async fn get_summary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<SelectionSummary>>, ApiError> {
    let snapshot = require_snapshot(&state, &req_id.0).await?;
    let selection = state.session.lock().await.model.selection().clone();
    let stores = snapshot.hierarchy.stores_for(&selection);
    let summary = summarize(&stores, state.style.top_formats);
    Ok(ApiResponse::new(req_id.0, summary))
}
