//! HTTP request handlers

use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::models::{CachedResponse, RouteStatus, StatusResponse};
use super::state::AppState;
use crate::cache::CachedSource;

/// Reads a route through its cache and renders the JSON body
async fn respond<P>(source: &CachedSource<P>) -> Result<Response, ApiError>
where
    P: Serialize + Clone + Send + Sync + 'static,
{
    let cached = source
        .read(Utc::now())
        .await
        .map_err(|error| ApiError::Unavailable {
            route: source.name(),
            error,
        })?;

    let mut response = Json(CachedResponse::from(cached)).into_response();
    if let Some(secs) = source.revalidate_secs() {
        let value = format!("public, s-maxage={secs}, stale-while-revalidate={secs}");
        if let Ok(value) = HeaderValue::from_str(&value) {
            response.headers_mut().insert(header::CACHE_CONTROL, value);
        }
    }
    Ok(response)
}

pub async fn earthquakes(State(state): State<AppState>) -> Result<Response, ApiError> {
    respond(&state.earthquakes).await
}

pub async fn geomagnetic(State(state): State<AppState>) -> Result<Response, ApiError> {
    respond(&state.geomagnetic).await
}

pub async fn lightning(State(state): State<AppState>) -> Result<Response, ApiError> {
    respond(&state.lightning).await
}

pub async fn seismic(State(state): State<AppState>) -> Result<Response, ApiError> {
    respond(&state.seismic).await
}

async fn route_status<P>(source: &CachedSource<P>, now: DateTime<Utc>) -> RouteStatus
where
    P: Clone + Send + Sync + 'static,
{
    RouteStatus::new(
        source.status(now).await,
        source.ttl_secs(),
        source.revalidate_secs(),
    )
}

/// Cache state of every route, without triggering refreshes
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let now = Utc::now();
    let mut routes = StatusResponse::new();
    routes.insert(state.earthquakes.name(), route_status(&state.earthquakes, now).await);
    routes.insert(state.geomagnetic.name(), route_status(&state.geomagnetic, now).await);
    routes.insert(state.lightning.name(), route_status(&state.lightning, now).await);
    routes.insert(state.seismic.name(), route_status(&state.seismic, now).await);
    Json(routes)
}

/// Health check endpoint
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "vitalsigns"
    }))
}

#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
    pub password: String,
}

/// Exchanges the gate password for the access cookie
pub async fn unlock(
    State(state): State<AppState>,
    Json(request): Json<UnlockRequest>,
) -> Result<Response, ApiError> {
    if !state.gate.check_password(&request.password) {
        tracing::info!("rejected unlock attempt");
        return Err(ApiError::WrongPassword);
    }

    let mut response = StatusCode::NO_CONTENT.into_response();
    if let Some(cookie) = state.gate.access_cookie() {
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    Ok(response)
}
