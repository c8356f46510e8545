// SPDX-License-Identifier: MIT

//! Routes backed by external services: day distances, weather, traffic.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::DayDistance;
use crate::services::distance::DistanceCalculator;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/distances", get(list_distances))
        .route("/api/distances/calculate", post(calculate_distances))
        .route("/api/weather", get(get_weather))
        .route("/api/traffic", get(get_traffic))
}

// ─── Distances ───────────────────────────────────────────────

#[derive(Deserialize)]
struct DistancesQuery {
    date: NaiveDate,
}

#[derive(Serialize)]
pub struct DistancesResponse {
    pub distances: Vec<DayDistance>,
    /// Segments that could not be computed, one message each.
    pub errors: Vec<String>,
}

/// Stored segment distances for one delivery day.
async fn list_distances(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DistancesQuery>,
) -> Result<Json<DistancesResponse>> {
    let distances = state.db.list_day_distances(params.date).await?;
    Ok(Json(DistancesResponse {
        distances,
        errors: Vec::new(),
    }))
}

#[derive(Deserialize)]
pub struct CalculatePayload {
    pub date: NaiveDate,
}

/// Compute and persist driving distances for one day's recorded events.
async fn calculate_distances(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CalculatePayload>,
) -> Result<Json<DistancesResponse>> {
    let calculator = DistanceCalculator {
        db: &state.db,
        directions: &state.directions,
    };

    let outcome = calculator
        .calculate_for_date(user.user_id, payload.date)
        .await?;

    Ok(Json(DistancesResponse {
        distances: outcome.distances,
        errors: outcome.errors,
    }))
}

// ─── Weather / Traffic ───────────────────────────────────────

#[derive(Deserialize)]
struct CoordsQuery {
    lat: f64,
    lon: f64,
}

/// Current weather at a point, passed through from the upstream provider.
async fn get_weather(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CoordsQuery>,
) -> Result<Json<serde_json::Value>> {
    let payload = state.conditions.weather(params.lat, params.lon).await?;
    Ok(Json(payload))
}

/// Traffic incidents around a point, passed through from the upstream provider.
async fn get_traffic(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CoordsQuery>,
) -> Result<Json<serde_json::Value>> {
    let payload = state.conditions.traffic(params.lat, params.lon).await?;
    Ok(Json(payload))
}
