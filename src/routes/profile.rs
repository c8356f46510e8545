// SPDX-License-Identifier: MIT

//! Service profile, location and delivery setting routes.

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::{Validate, ValidationError};

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::profile::SETTING_KEYS;
use crate::models::{DeliverySetting, Location, ServiceProfile};
use crate::time_utils::timestamp_id;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/service-profiles",
            get(list_profiles).post(create_profile),
        )
        .route(
            "/api/service-profiles/{id}",
            put(update_profile).delete(delete_profile),
        )
        .route("/api/locations", get(list_locations).post(create_location))
        .route(
            "/api/locations/{id}",
            put(update_location).delete(delete_location),
        )
        .route("/api/delivery-settings", get(get_settings))
        .route("/api/delivery-settings/{key}", put(put_setting))
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

// ─── Service Profiles ────────────────────────────────────────

#[derive(Serialize)]
pub struct ProfileSummary {
    #[serde(flatten)]
    pub profile: ServiceProfile,
    pub total_distance: f64,
    pub total_cost: f64,
}

#[derive(Serialize)]
pub struct ProfilesResponse {
    pub profiles: Vec<ProfileSummary>,
}

fn summarize(profile: ServiceProfile) -> ProfileSummary {
    let total_distance = profile.total_distance();
    let total_cost = profile.total_cost();
    ProfileSummary {
        profile,
        total_distance,
        total_cost,
    }
}

async fn list_profiles(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProfilesResponse>> {
    let profiles = state
        .db
        .list_service_profiles(user.user_id)
        .await?
        .into_iter()
        .map(summarize)
        .collect();
    Ok(Json(ProfilesResponse { profiles }))
}

fn validate_distance_unit(value: &str) -> std::result::Result<(), ValidationError> {
    match value {
        "mile" | "km" => Ok(()),
        _ => Err(ValidationError::new("distance_unit")),
    }
}

#[derive(Deserialize, Validate)]
pub struct ProfilePayload {
    pub round_id: Option<u64>,
    #[validate(range(min = 0.0))]
    pub fuel_cost_per_unit: f64,
    /// "mile" or "km".
    #[validate(custom(function = validate_distance_unit))]
    pub distance_unit: String,
    #[validate(range(min = 0.0))]
    pub distance_home_to_depot: f64,
    #[validate(range(min = 0.0))]
    pub distance_depot_to_start: f64,
    #[validate(range(min = 0.0))]
    pub distance_end_to_home: f64,
    pub loading_time_minutes: u32,
    #[validate(range(min = 0.0))]
    pub loading_time_cost_per_hour: f64,
}

fn profile_from_payload(id: u64, user_id: u64, payload: ProfilePayload) -> ServiceProfile {
    ServiceProfile {
        id,
        user_id,
        round_id: payload.round_id,
        fuel_cost_per_unit: payload.fuel_cost_per_unit,
        distance_unit: payload.distance_unit,
        distance_home_to_depot: payload.distance_home_to_depot,
        distance_depot_to_start: payload.distance_depot_to_start,
        distance_end_to_home: payload.distance_end_to_home,
        loading_time_minutes: payload.loading_time_minutes,
        loading_time_cost_per_hour: payload.loading_time_cost_per_hour,
    }
}

async fn ensure_round_exists(state: &AppState, user_id: u64, round_id: Option<u64>) -> Result<()> {
    if let Some(round_id) = round_id {
        state
            .db
            .get_round(round_id)
            .await?
            .filter(|r| r.user_id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("Round {} not found", round_id)))?;
    }
    Ok(())
}

async fn create_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ProfilePayload>,
) -> Result<Json<ProfileSummary>> {
    payload.validate()?;
    ensure_round_exists(&state, user.user_id, payload.round_id).await?;

    let profile = profile_from_payload(timestamp_id(), user.user_id, payload);
    state.db.set_service_profile(&profile).await?;
    Ok(Json(summarize(profile)))
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u64>,
    Json(payload): Json<ProfilePayload>,
) -> Result<Json<ProfileSummary>> {
    payload.validate()?;
    ensure_round_exists(&state, user.user_id, payload.round_id).await?;

    state
        .db
        .get_service_profile(id)
        .await?
        .filter(|p| p.user_id == user.user_id)
        .ok_or_else(|| AppError::NotFound(format!("Service profile {} not found", id)))?;

    let profile = profile_from_payload(id, user.user_id, payload);
    state.db.set_service_profile(&profile).await?;
    Ok(Json(summarize(profile)))
}

async fn delete_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<Json<DeleteResponse>> {
    state
        .db
        .get_service_profile(id)
        .await?
        .filter(|p| p.user_id == user.user_id)
        .ok_or_else(|| AppError::NotFound(format!("Service profile {} not found", id)))?;

    state.db.delete_service_profile(id).await?;
    Ok(Json(DeleteResponse { success: true }))
}

// ─── Locations ───────────────────────────────────────────────

#[derive(Serialize)]
pub struct LocationsResponse {
    pub locations: Vec<Location>,
}

async fn list_locations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<LocationsResponse>> {
    let locations = state.db.list_locations(user.user_id).await?;
    Ok(Json(LocationsResponse { locations }))
}

#[derive(Deserialize, Validate)]
pub struct LocationPayload {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

async fn create_location(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<LocationPayload>,
) -> Result<Json<Location>> {
    payload.validate()?;

    let location = Location {
        id: timestamp_id(),
        user_id: user.user_id,
        name: payload.name,
        latitude: payload.latitude,
        longitude: payload.longitude,
    };

    state.db.set_location(&location).await?;
    Ok(Json(location))
}

async fn update_location(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u64>,
    Json(payload): Json<LocationPayload>,
) -> Result<Json<Location>> {
    payload.validate()?;

    state
        .db
        .get_location(id)
        .await?
        .filter(|l| l.user_id == user.user_id)
        .ok_or_else(|| AppError::NotFound(format!("Location {} not found", id)))?;

    let location = Location {
        id,
        user_id: user.user_id,
        name: payload.name,
        latitude: payload.latitude,
        longitude: payload.longitude,
    };

    state.db.set_location(&location).await?;
    Ok(Json(location))
}

async fn delete_location(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<Json<DeleteResponse>> {
    state
        .db
        .get_location(id)
        .await?
        .filter(|l| l.user_id == user.user_id)
        .ok_or_else(|| AppError::NotFound(format!("Location {} not found", id)))?;

    state.db.delete_location(id).await?;
    Ok(Json(DeleteResponse { success: true }))
}

// ─── Delivery Settings ───────────────────────────────────────

#[derive(Serialize)]
pub struct SettingsResponse {
    pub settings: Vec<DeliverySetting>,
}

/// All managed settings; keys without a stored value report zero.
async fn get_settings(State(state): State<Arc<AppState>>) -> Result<Json<SettingsResponse>> {
    let stored = state.db.list_delivery_settings().await?;

    let settings = SETTING_KEYS
        .iter()
        .map(|key| {
            stored
                .iter()
                .find(|s| s.key == *key)
                .cloned()
                .unwrap_or_else(|| DeliverySetting {
                    key: (*key).to_string(),
                    value: 0.0,
                })
        })
        .collect();

    Ok(Json(SettingsResponse { settings }))
}

#[derive(Deserialize, Validate)]
pub struct SettingPayload {
    #[validate(range(min = 0.0))]
    pub value: f64,
}

async fn put_setting(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(payload): Json<SettingPayload>,
) -> Result<Json<DeliverySetting>> {
    payload.validate()?;

    if !SETTING_KEYS.contains(&key.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Unknown delivery setting '{}'",
            key
        )));
    }

    let setting = DeliverySetting {
        key,
        value: payload.value,
    };

    state.db.set_delivery_setting(&setting).await?;
    Ok(Json(setting))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_unit_validation() {
        assert!(validate_distance_unit("mile").is_ok());
        assert!(validate_distance_unit("km").is_ok());
        assert!(validate_distance_unit("furlong").is_err());
        assert!(validate_distance_unit("").is_err());
        assert!(validate_distance_unit("Mile").is_err());
    }
}
