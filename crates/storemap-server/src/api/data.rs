use axum::{extract::State, Extension, Json};
use storemap_core::{Area, City, Store, Zone};

use crate::middleware::RequestId;

use super::{require_snapshot, ApiError, ApiResponse, AppState};

pub(super) async fn list_cities(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<City>>>, ApiError> {
    let snapshot = require_snapshot(&state, &req_id.0).await?;
    Ok(ApiResponse::new(req_id.0, snapshot.hierarchy.cities.clone()))
}

pub(super) async fn list_areas(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<Area>>>, ApiError> {
    let snapshot = require_snapshot(&state, &req_id.0).await?;
    Ok(ApiResponse::new(req_id.0, snapshot.hierarchy.areas.clone()))
}

pub(super) async fn list_zones(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<Zone>>>, ApiError> {
    let snapshot = require_snapshot(&state, &req_id.0).await?;
    Ok(ApiResponse::new(req_id.0, snapshot.hierarchy.zones.clone()))
}

/// The deduplicated store catalog.
pub(super) async fn list_stores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<Store>>>, ApiError> {
    let snapshot = require_snapshot(&state, &req_id.0).await?;
    Ok(ApiResponse::new(
        req_id.0,
        snapshot.hierarchy.catalog.stores().to_vec(),
    ))
}
