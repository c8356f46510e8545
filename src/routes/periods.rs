// SPDX-License-Identifier: MIT

//! Pay period and paid holiday routes.

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::{Holiday, Period};
use crate::time_utils::timestamp_id;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/periods", get(list_periods).post(create_period))
        .route(
            "/api/periods/{id}",
            put(update_period).delete(delete_period),
        )
        .route("/api/holidays", get(list_holidays).post(create_holiday))
        .route(
            "/api/holidays/{id}",
            put(update_holiday).delete(delete_holiday),
        )
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

fn ensure_date_order(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if end < start {
        return Err(AppError::BadRequest(
            "end_date must not be before start_date".to_string(),
        ));
    }
    Ok(())
}

// ─── Periods ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct PeriodsResponse {
    pub periods: Vec<Period>,
}

/// All pay periods, earliest first.
async fn list_periods(State(state): State<Arc<AppState>>) -> Result<Json<PeriodsResponse>> {
    let periods = state.db.list_periods().await?;
    Ok(Json(PeriodsResponse { periods }))
}

#[derive(Deserialize, Validate)]
pub struct PeriodPayload {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

async fn create_period(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PeriodPayload>,
) -> Result<Json<Period>> {
    payload.validate()?;
    ensure_date_order(payload.start_date, payload.end_date)?;

    let period = Period {
        id: timestamp_id(),
        name: payload.name,
        start_date: payload.start_date,
        end_date: payload.end_date,
    };

    state.db.set_period(&period).await?;
    Ok(Json(period))
}

async fn update_period(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(payload): Json<PeriodPayload>,
) -> Result<Json<Period>> {
    payload.validate()?;
    ensure_date_order(payload.start_date, payload.end_date)?;

    state
        .db
        .get_period(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Period {} not found", id)))?;

    let period = Period {
        id,
        name: payload.name,
        start_date: payload.start_date,
        end_date: payload.end_date,
    };

    state.db.set_period(&period).await?;
    Ok(Json(period))
}

async fn delete_period(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<DeleteResponse>> {
    state
        .db
        .get_period(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Period {} not found", id)))?;

    state.db.delete_period(id).await?;
    Ok(Json(DeleteResponse { success: true }))
}

// ─── Holidays ────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HolidaysResponse {
    pub holidays: Vec<Holiday>,
}

async fn list_holidays(State(state): State<Arc<AppState>>) -> Result<Json<HolidaysResponse>> {
    let holidays = state.db.list_holidays().await?;
    Ok(Json(HolidaysResponse { holidays }))
}

#[derive(Deserialize, Validate)]
pub struct HolidayPayload {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Credited pay per covered working day.
    #[validate(range(min = 0.0))]
    pub daily_rate: f64,
}

async fn create_holiday(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<HolidayPayload>,
) -> Result<Json<Holiday>> {
    payload.validate()?;
    ensure_date_order(payload.start_date, payload.end_date)?;

    let holiday = Holiday {
        id: timestamp_id(),
        start_date: payload.start_date,
        end_date: payload.end_date,
        daily_rate: payload.daily_rate,
    };

    state.db.set_holiday(&holiday).await?;
    Ok(Json(holiday))
}

async fn update_holiday(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(payload): Json<HolidayPayload>,
) -> Result<Json<Holiday>> {
    payload.validate()?;
    ensure_date_order(payload.start_date, payload.end_date)?;

    state
        .db
        .get_holiday(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Holiday {} not found", id)))?;

    let holiday = Holiday {
        id,
        start_date: payload.start_date,
        end_date: payload.end_date,
        daily_rate: payload.daily_rate,
    };

    state.db.set_holiday(&holiday).await?;
    Ok(Json(holiday))
}

async fn delete_holiday(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<DeleteResponse>> {
    state
        .db
        .get_holiday(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Holiday {} not found", id)))?;

    state.db.delete_holiday(id).await?;
    Ok(Json(DeleteResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_order_check() {
        let early = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let late = NaiveDate::from_ymd_opt(2025, 6, 7).unwrap();
        assert!(ensure_date_order(early, late).is_ok());
        assert!(ensure_date_order(early, early).is_ok());
        assert!(ensure_date_order(late, early).is_err());
    }
}
