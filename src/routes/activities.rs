// SPDX-License-Identifier: MIT

//! GPS activity and activity type routes.

use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Extension, Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::{Validate, ValidationError};

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::activity::{Activity, ActivityType, CANONICAL_EVENTS};
use crate::time_utils::timestamp_id;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/activities", get(list_activities).post(create_activity))
        .route("/api/activities/dates", get(list_activity_dates))
        .route(
            "/api/activities/{id}",
            put(update_activity).delete(delete_activity),
        )
        .route(
            "/api/activity-types",
            get(list_activity_types).post(create_activity_type),
        )
        .route(
            "/api/activity-types/{name}",
            put(update_activity_type).delete(delete_activity_type),
        )
}

// ─── Activities ──────────────────────────────────────────────

#[derive(Deserialize)]
struct ActivitiesQuery {
    /// Restrict to one calendar day (UTC).
    date: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct ActivitiesResponse {
    pub activities: Vec<Activity>,
}

/// List the operator's activities, newest first.
async fn list_activities(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ActivitiesQuery>,
) -> Result<Json<ActivitiesResponse>> {
    let activities = state.db.list_activities(user.user_id, params.date).await?;
    Ok(Json(ActivitiesResponse { activities }))
}

#[derive(Serialize)]
pub struct ActivityDatesResponse {
    pub dates: Vec<NaiveDate>,
}

/// Distinct delivery dates that have recorded activities, newest first.
async fn list_activity_dates(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ActivityDatesResponse>> {
    let activities = state.db.list_activities(user.user_id, None).await?;

    let mut dates: Vec<NaiveDate> = Vec::new();
    for activity in &activities {
        let date = activity.timestamp.date_naive();
        if !dates.contains(&date) {
            dates.push(date);
        }
    }

    Ok(Json(ActivityDatesResponse { dates }))
}

#[derive(Deserialize, Validate)]
pub struct ActivityPayload {
    pub timestamp: DateTime<Utc>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(length(min = 1, max = 100))]
    pub activity_type: String,
    #[serde(default)]
    pub is_manual: bool,
}

/// Reject event names the application does not know about.
async fn ensure_known_type(state: &AppState, name: &str) -> Result<()> {
    if CANONICAL_EVENTS.contains(&name) {
        return Ok(());
    }
    if state.db.get_activity_type(name).await?.is_some() {
        return Ok(());
    }
    Err(AppError::BadRequest(format!(
        "Unknown activity type '{}'",
        name
    )))
}

/// Record a new GPS event.
async fn create_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ActivityPayload>,
) -> Result<Json<Activity>> {
    payload.validate()?;
    ensure_known_type(&state, &payload.activity_type).await?;

    let activity = Activity {
        id: timestamp_id(),
        user_id: user.user_id,
        timestamp: payload.timestamp,
        latitude: payload.latitude,
        longitude: payload.longitude,
        activity_type: payload.activity_type,
        is_manual: payload.is_manual,
    };

    state.db.set_activity(&activity).await?;

    tracing::debug!(
        activity_id = activity.id,
        activity_type = %activity.activity_type,
        "Recorded activity"
    );

    Ok(Json(activity))
}

/// Rewrite an existing GPS event.
async fn update_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u64>,
    Json(payload): Json<ActivityPayload>,
) -> Result<Json<Activity>> {
    payload.validate()?;
    ensure_known_type(&state, &payload.activity_type).await?;

    let existing = state
        .db
        .get_activity(id)
        .await?
        .filter(|a| a.user_id == user.user_id)
        .ok_or_else(|| AppError::NotFound(format!("Activity {} not found", id)))?;

    let activity = Activity {
        id: existing.id,
        user_id: existing.user_id,
        timestamp: payload.timestamp,
        latitude: payload.latitude,
        longitude: payload.longitude,
        activity_type: payload.activity_type,
        is_manual: payload.is_manual,
    };

    state.db.set_activity(&activity).await?;
    Ok(Json(activity))
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

async fn delete_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<Json<DeleteResponse>> {
    state
        .db
        .get_activity(id)
        .await?
        .filter(|a| a.user_id == user.user_id)
        .ok_or_else(|| AppError::NotFound(format!("Activity {} not found", id)))?;

    state.db.delete_activity(id).await?;
    Ok(Json(DeleteResponse { success: true }))
}

// ─── Activity Types ──────────────────────────────────────────

fn validate_color(value: &str) -> std::result::Result<(), ValidationError> {
    let valid = value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("color"))
    }
}

#[derive(Deserialize, Validate)]
pub struct ActivityTypePayload {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub alias: String,
    /// Display color as "#rrggbb".
    #[validate(custom(function = validate_color))]
    pub color: String,
}

#[derive(Serialize)]
pub struct ActivityTypesResponse {
    pub activity_types: Vec<ActivityType>,
}

async fn list_activity_types(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ActivityTypesResponse>> {
    let activity_types = state.db.list_activity_types().await?;
    Ok(Json(ActivityTypesResponse { activity_types }))
}

async fn create_activity_type(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ActivityTypePayload>,
) -> Result<Json<ActivityType>> {
    payload.validate()?;

    if state.db.get_activity_type(&payload.name).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Activity type '{}' already exists",
            payload.name
        )));
    }

    let activity_type = ActivityType {
        name: payload.name,
        alias: payload.alias,
        color: payload.color,
    };

    state.db.set_activity_type(&activity_type).await?;
    Ok(Json(activity_type))
}

#[derive(Deserialize, Validate)]
pub struct ActivityTypeUpdatePayload {
    #[validate(length(min = 1, max = 100))]
    pub alias: String,
    #[validate(custom(function = validate_color))]
    pub color: String,
}

/// Update the alias or color of a type. The name is the identity and
/// cannot change.
async fn update_activity_type(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(payload): Json<ActivityTypeUpdatePayload>,
) -> Result<Json<ActivityType>> {
    payload.validate()?;

    state
        .db
        .get_activity_type(&name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Activity type '{}' not found", name)))?;

    let activity_type = ActivityType {
        name,
        alias: payload.alias,
        color: payload.color,
    };

    state.db.set_activity_type(&activity_type).await?;
    Ok(Json(activity_type))
}

/// Remove a type, unless recorded activities still reference it.
async fn delete_activity_type(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(name): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state
        .db
        .get_activity_type(&name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Activity type '{}' not found", name)))?;

    if state.db.activity_type_in_use(user.user_id, &name).await? {
        return Err(AppError::BadRequest(format!(
            "Activity type '{}' is still used by recorded activities",
            name
        )));
    }

    state.db.delete_activity_type(&name).await?;
    Ok(Json(DeleteResponse { success: true }))
}
