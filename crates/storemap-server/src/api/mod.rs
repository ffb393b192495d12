mod data;
mod map;
mod refresh;
mod selection;

use std::{sync::Arc, time::Duration};

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use storemap_client::{
    CommitDecision, DashboardSnapshot, DataClient, RefreshError, RefreshGate, SnapshotSlot,
};
use storemap_core::MapStyleConfig;
use tokio::sync::{Mutex, RwLock};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};
use crate::session::Session;

#[derive(Clone)]
pub struct AppState {
    pub data: Arc<RwLock<SnapshotSlot>>,
    pub gate: Arc<RefreshGate>,
    pub session: Arc<Mutex<Session>>,
    pub client: Arc<DataClient>,
    pub style: Arc<MapStyleConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(client: DataClient, style: MapStyleConfig) -> Self {
        Self {
            data: Arc::new(RwLock::new(SnapshotSlot::default())),
            gate: Arc::new(RefreshGate::new()),
            session: Arc::new(Mutex::new(Session::new(style.clone()))),
            client: Arc::new(client),
            style: Arc::new(style),
        }
    }

    /// Run one refresh cycle and, when it commits, re-render the session
    /// against the new snapshot.
    ///
    /// # Errors
    ///
    /// Returns the cycle's [`RefreshError`] when a core dataset failed.
    pub async fn refresh(&self) -> Result<CommitDecision, RefreshError> {
        let decision = storemap_client::refresh(
            &self.client,
            &self.gate,
            &self.data,
            &self.style.boundary_name_keys,
        )
        .await?;

        if decision == CommitDecision::Committed {
            if let Some(snapshot) = self.current_snapshot().await {
                let mut session = self.session.lock().await;
                session.render(&snapshot);
            }
        }
        Ok(decision)
    }

    async fn current_snapshot(&self) -> Option<Arc<DashboardSnapshot>> {
        self.data.read().await.snapshot.clone()
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    data: &'static str,
    generation: Option<u64>,
    refreshed_at: Option<DateTime<Utc>>,
    last_attempt: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(request_id: String, data: T) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::new(request_id),
        })
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "data_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            "refresh_failed" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// The committed snapshot, or `503 data_unavailable` before the first
/// successful refresh (and after a failed one).
pub(super) async fn require_snapshot(
    state: &AppState,
    request_id: &str,
) -> Result<Arc<DashboardSnapshot>, ApiError> {
    let slot = state.data.read().await;
    slot.snapshot.clone().ok_or_else(|| {
        let message = slot.last_error.as_deref().map_or_else(
            || "dashboard data has not been loaded yet".to_owned(),
            |e| format!("dashboard data unavailable: {e}"),
        );
        ApiError::new(request_id, "data_unavailable", message)
    })
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

fn dashboard_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/cities", get(data::list_cities))
        .route("/api/v1/areas", get(data::list_areas))
        .route("/api/v1/zones", get(data::list_zones))
        .route("/api/v1/stores", get(data::list_stores))
        .route(
            "/api/v1/selection",
            get(selection::get_selection)
                .post(selection::select)
                .delete(selection::clear_selection),
        )
        .route("/api/v1/browse-mode", put(selection::set_browse_mode))
        .route("/api/v1/summary", get(selection::get_summary))
        .route("/api/v1/map/zoom", put(map::set_zoom))
        .route("/api/v1/map/category", put(map::set_category))
        .route("/api/v1/map/ready", put(map::set_ready))
        .route("/api/v1/map/plan", get(map::get_plan))
        .route("/api/v1/map/layers", get(map::get_layers))
        .route("/api/v1/refresh", post(refresh::trigger_refresh))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(dashboard_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let slot = state.data.read().await;
    let snapshot = slot.snapshot.as_deref();
    let data = HealthData {
        status: if snapshot.is_some() { "ok" } else { "degraded" },
        data: if snapshot.is_some() { "ready" } else { "unavailable" },
        generation: snapshot.map(|s| s.generation),
        refreshed_at: snapshot.map(|s| s.refreshed_at),
        last_attempt: slot.last_attempt,
        last_error: slot.last_error.clone(),
    };
    drop(slot);

    let status = if data.data == "ready" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, ApiResponse::new(req_id.0, data))
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(600, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
